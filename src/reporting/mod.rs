//! Dashboard-facing views over engine results: status badge and cycle grid

mod grid;
mod status;

pub use grid::{cycle_grid, CycleGrid, GridDay};
pub use status::compliance_status;
