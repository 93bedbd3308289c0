//! Recursive chip evaluation for chipcost.
//!
//! This crate turns [`ChipSpec`] trees into evaluated [`Chip`]s:
//! - Pad grid sizing from signal, power and test pad counts
//! - Area, yield, quality, cost, NRE and power roll-up through the hierarchy
//! - Parallel evaluation of independent trees with reproducible draws

pub mod chip;
pub mod config;
pub mod error;
pub mod evaluate;
pub mod pads;
pub mod report;
pub mod spec;
pub mod stackup;

pub use chip::{Carrier, Chip};
pub use config::ModelConfig;
pub use error::{Error, Result};
pub use evaluate::{Catalogs, Evaluator};
pub use pads::{PadGrid, PadRequirements, pad_grid};
pub use report::ChipReport;
pub use spec::ChipSpec;
pub use stackup::{parse_stackup, resolve_stackup};
