//! Error types for Metrado core.

use thiserror::Error;

/// Errors surfaced at the application seam.
///
/// The interaction core itself never errors during normal operation:
/// invalid coordinates, unknown formula ids and history exhaustion are
/// no-ops or absent results.
#[derive(Error, Debug)]
pub enum MetradoError {
    #[error("Unknown partida: {0}")]
    UnknownPartida(String),
}

pub type Result<T> = std::result::Result<T, MetradoError>;
