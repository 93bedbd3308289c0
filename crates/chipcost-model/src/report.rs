//! Evaluation reports.

use std::fmt;

use chipcost_core::Named;
use serde::Serialize;

use crate::chip::Chip;

/// Serializable snapshot of an evaluated chip tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChipReport {
    pub name: String,
    pub wafer_process: String,
    pub assembly_process: String,
    pub test_process: String,
    pub core_area: f64,
    pub area: f64,
    pub io_area: f64,
    pub pad_area: f64,
    pub stacked_area: f64,
    pub signal_pads: f64,
    pub power_pads: u64,
    pub test_pads: u32,
    pub gate_count: f64,
    pub self_test_time: f64,
    pub assembly_test_time: f64,
    pub reticles: u64,
    pub stitches: u64,
    pub power: f64,
    pub io_power: f64,
    pub total_power: f64,
    pub self_true_yield: f64,
    pub self_test_yield: f64,
    pub self_quality: f64,
    pub assembly_yield: f64,
    pub chip_true_yield: f64,
    pub chip_test_yield: f64,
    pub quality: f64,
    pub self_layer_cost: f64,
    pub self_test_cost: f64,
    pub self_cost: f64,
    pub assembly_cost: f64,
    pub assembly_test_cost: f64,
    pub cost: f64,
    pub nre_design_cost: f64,
    pub mask_cost: f64,
    pub nre_cost: f64,
    pub total_cost: f64,
    pub self_perfect_yield_cost: f64,
    pub perfect_yield_cost: f64,
    pub scrap_cost: f64,
    pub total_non_scrap_cost: f64,
    pub chips: Vec<ChipReport>,
}

impl Chip {
    /// Snapshot this chip and its children.
    pub fn report(&self) -> ChipReport {
        let (reticles, stitches) = self.number_of_reticles();
        ChipReport {
            name: self.name().to_string(),
            wafer_process: self.wafer_process().name().to_string(),
            assembly_process: self.assembly_process().name().to_string(),
            test_process: self.test_process().name().to_string(),
            core_area: self.core_area(),
            area: self.area(),
            io_area: self.io_area(),
            pad_area: self.pad_area(),
            stacked_area: self.stacked_area(),
            signal_pads: self.signal_pads(),
            power_pads: self.power_pads(),
            test_pads: self.test_pads(),
            gate_count: self.gate_count(),
            self_test_time: self.self_test_time(),
            assembly_test_time: self.assembly_test_time(),
            reticles,
            stitches,
            power: self.power(),
            io_power: self.io_power(),
            total_power: self.total_power(),
            self_true_yield: self.self_true_yield(),
            self_test_yield: self.self_test_yield(),
            self_quality: self.self_quality(),
            assembly_yield: self.assembly_yield(),
            chip_true_yield: self.chip_true_yield(),
            chip_test_yield: self.chip_test_yield(),
            quality: self.quality(),
            self_layer_cost: self.self_layer_cost(),
            self_test_cost: self.self_test_cost(),
            self_cost: self.self_cost(),
            assembly_cost: self.assembly_cost(),
            assembly_test_cost: self.assembly_test_cost(),
            cost: self.cost(),
            nre_design_cost: self.nre_design_cost(),
            mask_cost: self.mask_cost(),
            nre_cost: self.nre_cost(),
            total_cost: self.total_cost(),
            self_perfect_yield_cost: self.self_perfect_yield_cost(),
            perfect_yield_cost: self.perfect_yield_cost(),
            scrap_cost: self.scrap_cost(),
            total_non_scrap_cost: self.total_non_scrap_cost(),
            chips: self.chips().iter().map(Chip::report).collect(),
        }
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let pad = "  ".repeat(depth);
        writeln!(
            f,
            "{}{}: area {:.3} mm², power {:.3} W, yield {:.4}, quality {:.4}, cost {:.4}, total {:.4}",
            pad,
            self.name(),
            self.area(),
            self.total_power(),
            self.chip_true_yield(),
            self.quality(),
            self.cost(),
            self.total_cost()
        )?;
        for chip in self.chips() {
            chip.fmt_indented(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for Chip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}
