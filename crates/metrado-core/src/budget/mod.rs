//! Budget document model and metrado reconciliation.

mod partida;
mod presupuesto;

pub use partida::{
    AreaSource, AreaSourceKind, ItemPartida, MetradoView, Partida, DRIFT_TOLERANCE,
};
pub use presupuesto::Presupuesto;
