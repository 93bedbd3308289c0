//! Wafer fabrication process records.

use serde::{Deserialize, Serialize};

use crate::catalog::Named;
use crate::error::{Result, ensure};

/// Wafer process parameters.
///
/// Lengths are in mm, areas in mm², costs in USD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaferProcessParams {
    /// Wafer diameter (mm). Default: 300.0.
    pub wafer_diameter: f64,
    /// Unusable ring at the wafer edge (mm). Default: 3.0.
    pub edge_exclusion: f64,
    /// Fraction of dies not lost to wafer-level defects. Default: 1.0.
    pub wafer_process_yield: f64,
    /// Dicing street width between dies (mm). Default: 0.1.
    pub dicing_distance: f64,
    /// Reticle width (mm). Default: 26.0.
    pub reticle_x: f64,
    /// Reticle height (mm). Default: 33.0.
    pub reticle_y: f64,
    /// Pack dies on an aligned grid instead of independent rows. Default: true.
    pub wafer_fill_grid: bool,

    // ========================================================================
    // NRE cost per mm² of core area
    // ========================================================================
    /// Front-end NRE for memory (USD/mm²). Default: 0.0.
    pub nre_front_end_memory: f64,
    /// Back-end NRE for memory (USD/mm²). Default: 0.0.
    pub nre_back_end_memory: f64,
    /// Front-end NRE for logic (USD/mm²). Default: 0.0.
    pub nre_front_end_logic: f64,
    /// Back-end NRE for logic (USD/mm²). Default: 0.0.
    pub nre_back_end_logic: f64,
    /// Front-end NRE for analog (USD/mm²). Default: 0.0.
    pub nre_front_end_analog: f64,
    /// Back-end NRE for analog (USD/mm²). Default: 0.0.
    pub nre_back_end_analog: f64,
}

impl Default for WaferProcessParams {
    fn default() -> Self {
        Self {
            wafer_diameter: 300.0,
            edge_exclusion: 3.0,
            wafer_process_yield: 1.0,
            dicing_distance: 0.1,
            reticle_x: 26.0,
            reticle_y: 33.0,
            wafer_fill_grid: true,
            nre_front_end_memory: 0.0,
            nre_back_end_memory: 0.0,
            nre_front_end_logic: 0.0,
            nre_back_end_logic: 0.0,
            nre_front_end_analog: 0.0,
            nre_back_end_analog: 0.0,
        }
    }
}

/// A validated, immutable wafer process.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaferProcess {
    name: String,
    params: WaferProcessParams,
}

impl WaferProcess {
    /// Validate parameters and create a wafer process.
    pub fn new(name: impl Into<String>, params: WaferProcessParams) -> Result<Self> {
        let name = name.into();
        let p = &params;
        ensure(p.wafer_diameter > 0.0, &name, "wafer_diameter", p.wafer_diameter, "must be positive")?;
        ensure(
            p.edge_exclusion >= 0.0 && 2.0 * p.edge_exclusion < p.wafer_diameter,
            &name,
            "edge_exclusion",
            p.edge_exclusion,
            "must be non-negative and leave a usable wafer",
        )?;
        ensure(
            (0.0..=1.0).contains(&p.wafer_process_yield),
            &name,
            "wafer_process_yield",
            p.wafer_process_yield,
            "must be in [0, 1]",
        )?;
        ensure(p.dicing_distance >= 0.0, &name, "dicing_distance", p.dicing_distance, "must be non-negative")?;
        ensure(p.reticle_x > 0.0, &name, "reticle_x", p.reticle_x, "must be positive")?;
        ensure(p.reticle_y > 0.0, &name, "reticle_y", p.reticle_y, "must be positive")?;
        Ok(Self { name, params })
    }

    pub fn params(&self) -> &WaferProcessParams {
        &self.params
    }

    pub fn wafer_diameter(&self) -> f64 {
        self.params.wafer_diameter
    }

    pub fn edge_exclusion(&self) -> f64 {
        self.params.edge_exclusion
    }

    pub fn wafer_process_yield(&self) -> f64 {
        self.params.wafer_process_yield
    }

    pub fn dicing_distance(&self) -> f64 {
        self.params.dicing_distance
    }

    pub fn reticle_x(&self) -> f64 {
        self.params.reticle_x
    }

    pub fn reticle_y(&self) -> f64 {
        self.params.reticle_y
    }

    pub fn wafer_fill_grid(&self) -> bool {
        self.params.wafer_fill_grid
    }

    /// Area of one reticle field (mm²).
    pub fn reticle_area(&self) -> f64 {
        self.params.reticle_x * self.params.reticle_y
    }

    /// Diameter left after removing the edge exclusion ring (mm).
    pub fn usable_diameter(&self) -> f64 {
        self.params.wafer_diameter - 2.0 * self.params.edge_exclusion
    }

    /// Total wafer area (mm²), the area whose cost is spread across the dies.
    pub fn wafer_area(&self) -> f64 {
        let r = self.params.wafer_diameter / 2.0;
        std::f64::consts::PI * r * r
    }

    /// Area inside the edge exclusion ring (mm²).
    pub fn usable_wafer_area(&self) -> f64 {
        let r = self.usable_diameter() / 2.0;
        std::f64::consts::PI * r * r
    }

    /// Front-end NRE per mm² weighted by the memory/logic/analog mix.
    pub fn nre_front_end_cost_per_mm2(&self, memory: f64, logic: f64, analog: f64) -> f64 {
        let p = &self.params;
        p.nre_front_end_memory * memory + p.nre_front_end_logic * logic + p.nre_front_end_analog * analog
    }

    /// Back-end NRE per mm² weighted by the memory/logic/analog mix.
    pub fn nre_back_end_cost_per_mm2(&self, memory: f64, logic: f64, analog: f64) -> f64 {
        let p = &self.params;
        p.nre_back_end_memory * memory + p.nre_back_end_logic * logic + p.nre_back_end_analog * analog
    }
}

impl Named for WaferProcess {
    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn params() -> WaferProcessParams {
        WaferProcessParams {
            wafer_diameter: 234.0,
            edge_exclusion: 1.2,
            wafer_process_yield: 0.98,
            dicing_distance: 0.87,
            reticle_x: 32.0,
            reticle_y: 23.0,
            wafer_fill_grid: false,
            nre_front_end_memory: 0.1,
            nre_back_end_memory: 0.2,
            nre_front_end_logic: 0.3,
            nre_back_end_logic: 0.4,
            nre_front_end_analog: 0.5,
            nre_back_end_analog: 0.6,
        }
    }

    #[test]
    fn test_accessors() {
        let wp = WaferProcess::new("wp", params()).unwrap();
        assert_eq!(wp.name(), "wp");
        assert_eq!(wp.reticle_area(), 736.0);
        assert!((wp.usable_diameter() - 231.6).abs() < 1e-12);
        assert!(!wp.wafer_fill_grid());
    }

    #[test]
    fn test_nre_weighting() {
        let wp = WaferProcess::new("wp", params()).unwrap();
        let fe = wp.nre_front_end_cost_per_mm2(0.2, 0.5, 0.3);
        let be = wp.nre_back_end_cost_per_mm2(0.2, 0.5, 0.3);
        assert!((fe * 10.0 - 3.2).abs() < 1e-12);
        assert!((be * 10.0 - 4.2).abs() < 1e-12);
    }

    #[test]
    fn test_yield_out_of_range() {
        let mut p = params();
        p.wafer_process_yield = 1.5;
        let err = WaferProcess::new("bad", p).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidParameter {
                field: "wafer_process_yield",
                ..
            }
        ));
    }

    #[test]
    fn test_zero_reticle_rejected() {
        let mut p = params();
        p.reticle_y = 0.0;
        assert!(WaferProcess::new("bad", p).is_err());
    }

    #[test]
    fn test_params_from_json() {
        let p: WaferProcessParams =
            serde_json::from_str(r#"{"wafer_diameter": 200.0, "wafer_fill_grid": false}"#).unwrap();
        assert_eq!(p.wafer_diameter, 200.0);
        assert_eq!(p.reticle_x, 26.0);
        assert!(!p.wafer_fill_grid);
    }
}
