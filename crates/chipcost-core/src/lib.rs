//! Process catalogs, interconnect model and die geometry for chipcost.
//!
//! This crate provides the immutable inputs shared by every chip in a
//! design: named process records collected in [`Catalog`]s, the global
//! [`InterconnectModel`] describing which blocks talk to each other, and the
//! geometric helpers used to pack dies onto wafers and reticles.

pub mod catalog;
pub mod error;
pub mod geometry;
pub mod interconnect;
pub mod io;
pub mod wafer;

pub use catalog::{Catalog, Named};
pub use error::{Error, Result, ensure};
pub use geometry::{
    die_sides, dies_per_wafer_grid, dies_per_wafer_line, expanded_area, number_of_reticles,
};
pub use interconnect::{InterconnectModel, Link, ReachCount, SignalCount};
pub use io::{InterconnectParams, InterconnectType};
pub use wafer::{WaferProcess, WaferProcessParams};
