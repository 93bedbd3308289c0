//! Process models for chipcost.
//!
//! This crate provides the yield and cost models owned by each process:
//! - [`Layer`]: negative-binomial layer yield and wafer-packing layer cost
//! - [`AssemblyProcess`]: pick-and-place/bonding cost and assembly yield
//! - [`TestProcess`]: test yield, outgoing quality and derated test cost
//!
//! All models are pure functions of their inputs, except test cost, which
//! draws from a caller-supplied random source.

pub mod assembly;
pub mod derating;
pub mod error;
pub mod layer;
pub mod test_process;

pub use assembly::{AssemblyParams, AssemblyProcess};
pub use derating::TestDistribution;
pub use error::{Error, Result};
pub use layer::{Layer, LayerParams, UNMANUFACTURABLE_COST_PER_MM2, reticle_utilization};
pub use test_process::{TestParams, TestProcess};
