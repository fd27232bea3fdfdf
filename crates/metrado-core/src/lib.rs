//! metrado-core - UI-agnostic interaction and budget document model.

pub mod budget;
pub mod error;
pub mod grid;
pub mod history;

pub use budget::{
    AreaSource, AreaSourceKind, ItemPartida, MetradoView, Partida, Presupuesto, DRIFT_TOLERANCE,
};
pub use error::{MetradoError, Result};
pub use grid::{CellCoord, Focus, GridHost, GridKey, GridState, KeyInput, KeyOutcome, Modifiers};
pub use history::History;
