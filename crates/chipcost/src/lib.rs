//! # chipcost
//!
//! A cost, yield, area and power model for chiplet-based systems-in-package.
//!
//! A design is a tree of chips: dies stacked on interposers, interposers on
//! packages. Each chip references named wafer, layer, assembly and test
//! processes, and a global interconnect model describes which blocks talk to
//! each other. Evaluating the tree rolls area, yield, quality, unit cost,
//! NRE and power up from the leaves.
//!
//! ## Quick Start
//!
//! ```rust
//! use chipcost::prelude::*;
//!
//! let mut catalogs = Catalogs::new();
//! catalogs
//!     .wafer_processes
//!     .insert(WaferProcess::new("n7", WaferProcessParams::default()).unwrap())
//!     .unwrap();
//! catalogs
//!     .layers
//!     .insert(Layer::new("metal", LayerParams { cost_per_mm2: 0.1, ..Default::default() }).unwrap())
//!     .unwrap();
//! catalogs
//!     .assembly_processes
//!     .insert(AssemblyProcess::new("bump", AssemblyParams::default()).unwrap())
//!     .unwrap();
//! catalogs
//!     .test_processes
//!     .insert(TestProcess::new("none", TestParams::default()).unwrap())
//!     .unwrap();
//! catalogs.freeze();
//!
//! let spec = ChipSpec::new("cpu", 20.0)
//!     .with_processes("n7", "bump", "none")
//!     .with_stackup("8:metal")
//!     .with_power(2.0, 0.8);
//!
//! let interconnect = InterconnectModel::default();
//! let chip = Evaluator::new(&catalogs, &interconnect).evaluate(&spec).unwrap();
//! assert!(chip.area() >= 20.0);
//! assert!(chip.cost() > 0.0);
//! ```

// Re-export member crates
pub use chipcost_core as core;
pub use chipcost_model as model;
pub use chipcost_process as process;

// ============================================================================
// Convenient re-exports from chipcost_core
// ============================================================================

pub use chipcost_core::{
    Catalog,
    // Errors
    Error as CoreError,
    // Interconnect
    InterconnectModel,
    InterconnectParams,
    InterconnectType,
    Named,
    SignalCount,
    // Wafer
    WaferProcess,
    WaferProcessParams,
    // Geometry
    dies_per_wafer_grid,
    dies_per_wafer_line,
    expanded_area,
    number_of_reticles,
};

// ============================================================================
// Convenient re-exports from chipcost_process
// ============================================================================

pub use chipcost_process::{
    AssemblyParams,
    AssemblyProcess,
    // Errors
    Error as ProcessError,
    Layer,
    LayerParams,
    TestDistribution,
    TestParams,
    TestProcess,
};

// ============================================================================
// Convenient re-exports from chipcost_model
// ============================================================================

pub use chipcost_model::{
    Catalogs, Chip, ChipReport, ChipSpec, Error, Evaluator, ModelConfig, PadGrid, Result,
};

// ============================================================================
// Re-export commonly used external types
// ============================================================================

/// Re-export of nalgebra's dynamic matrix type, used for adjacency matrices.
pub use nalgebra::DMatrix;

// ============================================================================
// Prelude module for convenient imports
// ============================================================================

/// Prelude module containing commonly used types.
///
/// ```rust
/// use chipcost::prelude::*;
/// ```
pub mod prelude {
    // Records
    pub use crate::{
        AssemblyParams, AssemblyProcess, InterconnectParams, InterconnectType, Layer, LayerParams,
        TestDistribution, TestParams, TestProcess, WaferProcess, WaferProcessParams,
    };

    // Model
    pub use crate::{Catalogs, Chip, ChipSpec, Evaluator, InterconnectModel, ModelConfig};

    // Common external types
    pub use crate::DMatrix;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prelude_imports() {
        use crate::prelude::*;

        let config = ModelConfig::default().with_seed(1);
        assert_eq!(config.seed, Some(1));
        let m: DMatrix<f64> = DMatrix::zeros(2, 2);
        assert!(InterconnectModel::new(["a", "b"]).is_ok());
        assert_eq!(m.nrows(), 2);
    }

    #[test]
    fn test_catalogs_from_json() {
        let layer: LayerParams = serde_json::from_str(r#"{"defect_density": 0.001}"#).unwrap();
        assert_eq!(layer.clustering_factor, 2.0);
        let layer = Layer::new("m1", layer).unwrap();
        assert_eq!(layer.name(), "m1");
    }
}
