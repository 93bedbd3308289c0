//! Process layer yield and cost model.
//!
//! A layer's yield follows a negative-binomial defect model. Its cost is the
//! wafer cost spread over the dies that fit on the wafer, with the
//! lithography share of that cost further scaled by how well the die fills
//! its reticle.

use chipcost_core::{
    Named, WaferProcess, die_sides, dies_per_wafer_grid, dies_per_wafer_line, ensure,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Cost per mm² reported for dies whose diagonal does not fit the wafer.
pub const UNMANUFACTURABLE_COST_PER_MM2: f64 = 1e9;

/// Process layer parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerParams {
    /// Whether the layer contains active devices. Default: true.
    pub active: bool,
    /// Processing cost per wafer mm² (USD/mm²). Default: 0.0.
    pub cost_per_mm2: f64,
    /// Millions of transistors per mm². Default: 0.0.
    pub transistor_density: f64,
    /// Defects per mm². Default: 0.0.
    pub defect_density: f64,
    /// Fraction of area in which a defect is fatal. Default: 1.0.
    pub critical_area_ratio: f64,
    /// Negative-binomial clustering parameter. Default: 2.0.
    pub clustering_factor: f64,
    /// Fraction of the layer cost that scales with reticle fill. Default: 0.0.
    pub litho_percent: f64,
    /// Mask set cost (USD). Default: 0.0.
    pub mask_cost: f64,
    /// Yield of a single reticle stitch. Default: 1.0.
    pub stitching_yield: f64,
}

impl Default for LayerParams {
    fn default() -> Self {
        Self {
            active: true,
            cost_per_mm2: 0.0,
            transistor_density: 0.0,
            defect_density: 0.0,
            critical_area_ratio: 1.0,
            clustering_factor: 2.0,
            litho_percent: 0.0,
            mask_cost: 0.0,
            stitching_yield: 1.0,
        }
    }
}

/// A validated process layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layer {
    name: String,
    params: LayerParams,
}

impl Layer {
    pub fn new(name: impl Into<String>, params: LayerParams) -> Result<Self> {
        let name = name.into();
        let p = &params;
        ensure(p.cost_per_mm2 >= 0.0, &name, "cost_per_mm2", p.cost_per_mm2, "must be non-negative")?;
        ensure(p.defect_density >= 0.0, &name, "defect_density", p.defect_density, "must be non-negative")?;
        ensure(
            p.critical_area_ratio >= 0.0,
            &name,
            "critical_area_ratio",
            p.critical_area_ratio,
            "must be non-negative",
        )?;
        ensure(
            p.clustering_factor > 0.0,
            &name,
            "clustering_factor",
            p.clustering_factor,
            "must be positive",
        )?;
        ensure(p.mask_cost >= 0.0, &name, "mask_cost", p.mask_cost, "must be non-negative")?;
        ensure(
            (0.0..=1.0).contains(&p.stitching_yield),
            &name,
            "stitching_yield",
            p.stitching_yield,
            "must be in [0, 1]",
        )?;
        Ok(Self { name, params })
    }

    pub fn params(&self) -> &LayerParams {
        &self.params
    }

    pub fn active(&self) -> bool {
        self.params.active
    }

    pub fn cost_per_mm2(&self) -> f64 {
        self.params.cost_per_mm2
    }

    pub fn transistor_density(&self) -> f64 {
        self.params.transistor_density
    }

    /// Logic gates per mm², counting four transistors per gate.
    pub fn gates_per_mm2(&self) -> f64 {
        self.params.transistor_density * 1e6 / 4.0
    }

    pub fn defect_density(&self) -> f64 {
        self.params.defect_density
    }

    pub fn critical_area_ratio(&self) -> f64 {
        self.params.critical_area_ratio
    }

    pub fn clustering_factor(&self) -> f64 {
        self.params.clustering_factor
    }

    pub fn litho_percent(&self) -> f64 {
        self.params.litho_percent
    }

    pub fn mask_cost(&self) -> f64 {
        self.params.mask_cost
    }

    pub fn stitching_yield(&self) -> f64 {
        self.params.stitching_yield
    }

    /// Yield of a single-reticle die of the given area.
    pub fn layer_yield(&self, area: f64) -> f64 {
        self.stitched_layer_yield(area, 0)
    }

    /// Yield of a die of the given area that spans `num_stitches` reticle
    /// stitches.
    ///
    /// `stitching_yield^n * (1 + D0 * A * cr / alpha)^(-alpha)`
    pub fn stitched_layer_yield(&self, area: f64, num_stitches: u32) -> f64 {
        let p = &self.params;
        let alpha = p.clustering_factor;
        let stitching = p.stitching_yield.powi(num_stitches as i32);
        stitching * (1.0 + p.defect_density * area * p.critical_area_ratio / alpha).powf(-alpha)
    }

    /// Cost per mm² of die for a die of the given area and aspect ratio.
    ///
    /// The whole wafer is paid for, so the cost is the wafer area times the
    /// layer's cost per mm², divided over the area of the dies that fit.
    pub fn cost_per_mm2_for_die(&self, area: f64, aspect_ratio: f64, wp: &WaferProcess) -> Result<f64> {
        let (x, y) = die_sides(area, aspect_ratio);
        let usable = wp.usable_diameter();
        if (x * x + y * y).sqrt() > usable / 2.0 {
            log::warn!(
                "layer {}: {:.3}x{:.3} die does not fit wafer {}, reporting unmanufacturable cost",
                self.name,
                x,
                y,
                wp.name()
            );
            return Ok(UNMANUFACTURABLE_COST_PER_MM2);
        }
        if x == 0.0 || y == 0.0 {
            return Err(Error::ZeroDieSide {
                layer: self.name.clone(),
                area,
                aspect_ratio,
            });
        }

        let dies = if wp.wafer_fill_grid() {
            dies_per_wafer_grid(x, y, usable, wp.dicing_distance())
        } else {
            dies_per_wafer_line(x, y, usable, wp.dicing_distance())
        };
        if dies == 0 {
            return Err(Error::NoDiesPerWafer {
                layer: self.name.clone(),
                wafer: wp.name().to_string(),
                area,
            });
        }
        log::trace!("layer {}: {} dies of {} mm² per wafer", self.name, dies, area);

        Ok(self.params.cost_per_mm2 * wp.wafer_area() / (dies as f64 * area))
    }

    /// Manufacturing cost of this layer for one die.
    ///
    /// The litho share of the cost is divided by the reticle utilization;
    /// the remainder is unaffected.
    pub fn layer_cost(&self, area: f64, aspect_ratio: f64, wp: &WaferProcess) -> Result<f64> {
        if area < 0.0 {
            return Err(Error::NegativeArea {
                layer: self.name.clone(),
                area,
            });
        }
        if area == 0.0 {
            return Ok(0.0);
        }
        let litho = self.params.litho_percent;
        if litho < 0.0 {
            return Err(Error::NegativeLithoPercent {
                layer: self.name.clone(),
                litho_percent: litho,
            });
        }

        let cost = area * self.cost_per_mm2_for_die(area, aspect_ratio, wp)?;
        let utilization = if litho == 0.0 {
            1.0
        } else {
            reticle_utilization(area, wp.reticle_x(), wp.reticle_y())
        };
        Ok(cost * (1.0 - litho) + cost * litho / utilization)
    }
}

impl Named for Layer {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Fraction of the exposed reticle area occupied by whole dies.
///
/// The exposure is the smallest multiple of the reticle area that covers one
/// die; as many dies as fit are placed in it and the leftover is waste.
pub fn reticle_utilization(area: f64, reticle_x: f64, reticle_y: f64) -> f64 {
    if area <= 0.0 {
        return 1.0;
    }
    let reticle = reticle_x * reticle_y;
    let exposed = (area / reticle).ceil().max(1.0) * reticle;
    let dies = (exposed / area).floor();
    let unused = exposed - dies * area;
    (exposed - unused) / exposed
}
