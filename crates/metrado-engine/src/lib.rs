//! metrado-engine - Section aggregation store + formula resolution.

pub mod aggregates;
pub mod formula;
pub mod store;

pub use aggregates::{
    ColumnasResumen, EscaleraPiso, EscaleraResumen, LosaPiso, LosaResumen, MurosPiso,
    MurosResumen, SectionAggregate, SectionKey, SectionSnapshot, VigasPiso, VigasResumen,
};
pub use formula::{FormulaResult, resolve};
pub use store::{AggregateStore, SubscriptionId};
