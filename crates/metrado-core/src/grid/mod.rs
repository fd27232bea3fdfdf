//! Grid interaction engine: spreadsheet-style selection and in-place
//! editing over a logical R×C table.
//!
//! The engine holds no cell data. It tracks the cursor and edit mode and
//! dispatches against a host-supplied [`GridHost`]: the host owns the
//! in-place editor and the table values; the engine decides when the
//! editor opens, commits, and where the cursor goes next.

mod dispatch;
mod state;

pub use dispatch::{GridKey, KeyInput, KeyOutcome, Modifiers};
pub use state::{CellCoord, Focus, GridHost, GridState};
