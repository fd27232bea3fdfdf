//! The budget document: an ordered list of partidas addressed by id.

use super::partida::Partida;
use crate::error::{MetradoError, Result};
use metrado_engine::SectionSnapshot;
use serde::{Deserialize, Serialize};

/// The whole budget. Wrapped in a `History` by the host so grid commits
/// become undo steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Presupuesto {
    pub partidas: Vec<Partida>,
}

impl Presupuesto {
    pub fn new(partidas: Vec<Partida>) -> Self {
        Self { partidas }
    }

    pub fn partida(&self, id: &str) -> Option<&Partida> {
        self.partidas.iter().find(|p| p.id == id)
    }

    pub fn partida_mut(&mut self, id: &str) -> Option<&mut Partida> {
        self.partidas.iter_mut().find(|p| p.id == id)
    }

    /// Sync one line's metrado from the live formula value.
    /// Returns whether anything changed.
    pub fn sync_partida(&mut self, id: &str, snapshot: &SectionSnapshot) -> Result<bool> {
        let partida = self
            .partida_mut(id)
            .ok_or_else(|| MetradoError::UnknownPartida(id.to_string()))?;
        Ok(partida.sync(snapshot))
    }

    /// Flip one line between auto and manual sourcing.
    pub fn toggle_source_partida(&mut self, id: &str) -> Result<()> {
        let partida = self
            .partida_mut(id)
            .ok_or_else(|| MetradoError::UnknownPartida(id.to_string()))?;
        partida.toggle_source();
        Ok(())
    }

    pub fn costo_total(&self) -> f64 {
        self.partidas.iter().map(Partida::costo_total).sum()
    }
}
