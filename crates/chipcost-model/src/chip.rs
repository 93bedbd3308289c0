//! The recursive chip model.
//!
//! A [`Chip`] is evaluated once, children first, and is read-only
//! afterwards. Each level combines its own geometric and statistical models
//! with the already-final values of its children:
//!
//! ```text
//! area        = bb_area | max(core + io, stacked dies, pad grid)
//! true yield  = self quality * Π child quality * assembly yield * wafer yield
//! cost        = (self cost + Σ child cost + assembly cost + assembly test) / test yield
//! total power = (bb_power | own + io) + Σ child total power
//! ```

use std::sync::Arc;

use chipcost_core::{
    InterconnectModel, SignalCount, WaferProcess, expanded_area, number_of_reticles,
};
use chipcost_process::{AssemblyProcess, Layer, TestProcess};
use rand::Rng;

use crate::error::{Error, Result};
use crate::evaluate::Catalogs;
use crate::pads::{PadGrid, PadRequirements, pad_grid};
use crate::spec::ChipSpec;
use crate::stackup::resolve_stackup;

/// Bonding parameters a chip inherits from the carrier it is mounted on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Carrier {
    /// Bond pad pitch of the carrier's assembly process (mm).
    pub bonding_pitch: f64,
    /// Die separation of the carrier's assembly process (mm).
    pub die_separation: f64,
}

impl Carrier {
    /// The bonding a chip gets when mounted on a chip assembled with `assembly`.
    pub fn of(assembly: &AssemblyProcess) -> Self {
        Self {
            bonding_pitch: assembly.bonding_pitch(),
            die_separation: assembly.die_separation(),
        }
    }
}

/// Shared, read-only inputs to chip construction.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BuildContext<'a> {
    pub catalogs: &'a Catalogs,
    pub interconnect: &'a InterconnectModel,
    pub include_nre_in_self_cost: bool,
}

/// A fully evaluated chip and the chips stacked on it.
#[derive(Debug, Clone)]
pub struct Chip {
    name: String,
    core_area: f64,
    fraction_memory: f64,
    fraction_logic: f64,
    fraction_analog: f64,
    reticle_share: f64,
    quantity: u64,
    buried: bool,
    power: f64,
    core_voltage: f64,
    aspect_ratio: f64,
    bb_area: Option<f64>,
    bb_cost: Option<f64>,
    bb_quality: Option<f64>,
    bb_power: Option<f64>,
    wafer_process: Arc<WaferProcess>,
    assembly_process: Arc<AssemblyProcess>,
    test_process: Arc<TestProcess>,
    stackup: Vec<Arc<Layer>>,
    chips: Vec<Chip>,
    nre_in_self_cost: bool,

    // Derived values, fixed at construction.
    chip_names: Vec<String>,
    signal_count: SignalCount,
    chips_signal_count: f64,
    io_area: f64,
    self_gates_per_mm2: f64,
    assembly_gate_count: f64,
    self_test_time: f64,
    assembly_test_time: f64,
    power_pads: u64,
    test_pads: u32,
    pad_grid: PadGrid,
    stacked_area: f64,
    area: f64,
    stack_power: f64,
    io_power: f64,
    total_power: f64,
    nre_front_end_cost: f64,
    nre_back_end_cost: f64,
    mask_cost: f64,
    self_true_yield: f64,
    self_test_yield: f64,
    self_quality: f64,
    assembly_yield: f64,
    chip_true_yield: f64,
    chip_test_yield: f64,
    quality: f64,
    self_layer_cost: f64,
    self_test_cost: f64,
    self_cost: f64,
    assembly_cost: f64,
    assembly_test_cost: f64,
    cost: f64,
}

impl Chip {
    /// Evaluate `spec` and all of its children.
    ///
    /// `carrier` is the chip this one is mounted on, if any; its bonding
    /// pitch and die separation govern this chip's pad grid.
    pub(crate) fn build<R: Rng + ?Sized>(
        spec: &ChipSpec,
        carrier: Option<Carrier>,
        ctx: &BuildContext<'_>,
        rng: &mut R,
    ) -> Result<Self> {
        validate(spec)?;
        let name = spec.name.clone();

        let wafer_process = ctx.catalogs.wafer_processes.lookup(&spec.wafer_process)?;
        let assembly_process = ctx.catalogs.assembly_processes.lookup(&spec.assembly_process)?;
        let test_process = ctx.catalogs.test_processes.lookup(&spec.test_process)?;
        let stackup = resolve_stackup(&name, &spec.stackup, &ctx.catalogs.layers)?;

        let own_carrier = Carrier::of(&assembly_process);
        let chips = spec
            .chips
            .iter()
            .map(|child| Chip::build(child, Some(own_carrier), ctx, &mut *rng))
            .collect::<Result<Vec<_>>>()?;

        if ctx.interconnect.num_blocks() > 0 && ctx.interconnect.block_index(&name).is_none() {
            log::warn!("{} is not an interconnect block, it gets no IO", name);
        }
        for (field, value) in [
            ("bb_area", spec.bb_area),
            ("bb_cost", spec.bb_cost),
            ("bb_quality", spec.bb_quality),
            ("bb_power", spec.bb_power),
        ] {
            if let Some(v) = value {
                log::warn!("{}: black-box {} = {} replaces the computed value", name, field, v);
            }
        }

        let mut chip_names = vec![name.clone()];
        for child in &chips {
            chip_names.extend(child.chip_names.iter().cloned());
        }

        // Power
        let stack_power: f64 = chips.iter().map(|c| c.total_power).sum();
        let io_power = ctx.interconnect.signal_power(&name, &chip_names);
        let total_power = spec.bb_power.unwrap_or(spec.power + io_power) + stack_power;

        // NRE
        let nre_front_end_cost = spec.core_area
            * wafer_process.nre_front_end_cost_per_mm2(
                spec.fraction_memory,
                spec.fraction_logic,
                spec.fraction_analog,
            );
        let nre_back_end_cost = spec.core_area
            * wafer_process.nre_back_end_cost_per_mm2(
                spec.fraction_memory,
                spec.fraction_logic,
                spec.fraction_analog,
            );
        let mask_cost = stackup.iter().map(|l| l.mask_cost()).sum::<f64>() * spec.reticle_share;

        // Area
        let io_area = ctx.interconnect.io_area(&name);
        let stacked_area = stacked_die_area(&chips, &assembly_process);
        let signal_count = ctx.interconnect.signal_count(&name, &chip_names);
        let power_pads = power_pad_count(total_power, assembly_process.power_per_pad(spec.core_voltage));
        let test_pads = test_process.num_test_ios();
        let bonding = carrier.unwrap_or(own_carrier);
        let pad_grid = pad_grid(
            &name,
            &PadRequirements {
                by_reach: &signal_count.by_reach,
                total_pads: signal_count.total + power_pads as f64 + f64::from(test_pads),
                pitch: bonding.bonding_pitch,
                die_separation: bonding.die_separation,
                aspect_ratio: spec.aspect_ratio,
            },
        )?;
        let area = spec
            .bb_area
            .unwrap_or_else(|| (spec.core_area + io_area).max(stacked_area).max(pad_grid.area()));

        // Yield
        let self_true_yield: f64 = stackup
            .iter()
            .map(|l| l.layer_yield(spec.core_area + io_area))
            .product();
        let self_test_yield = test_process.self_test_yield(self_true_yield);
        let self_quality = spec
            .bb_quality
            .unwrap_or_else(|| test_process.self_quality(self_true_yield, self_test_yield));

        let chips_signal_count: f64 = chips
            .iter()
            .map(|c| ctx.interconnect.signal_count(&c.name, &chip_names).total)
            .sum();
        let assembly_yield = assembly_process.assembly_yield(chips.len(), chips_signal_count, stacked_area);
        let children_quality: f64 = chips.iter().map(|c| c.quality).product();
        let chip_true_yield =
            self_quality * children_quality * assembly_yield * wafer_process.wafer_process_yield();
        let chip_test_yield = test_process.assembly_test_yield(chip_true_yield);
        let quality = test_process.assembly_quality(chip_true_yield, chip_test_yield);

        // Test time
        let self_gates_per_mm2: f64 = stackup.iter().map(|l| l.gates_per_mm2()).sum();
        let gate_count = spec.core_area * self_gates_per_mm2;
        let assembly_gate_count = gate_count + chips.iter().map(|c| c.assembly_gate_count).sum::<f64>();
        let self_test_time = test_process.self_test_time(gate_count);
        let assembly_test_time = test_process.assembly_test_time(assembly_gate_count);

        // Cost
        let own_nre_cost = (nre_front_end_cost + nre_back_end_cost + mask_cost) / spec.quantity as f64;
        let (self_layer_cost, self_test_cost, self_cost) = match spec.bb_cost {
            Some(cost) => (0.0, 0.0, cost),
            None => {
                let layer_cost = stackup
                    .iter()
                    .map(|l| l.layer_cost(area, spec.aspect_ratio, &wafer_process))
                    .sum::<std::result::Result<f64, _>>()?;
                let test_cost = test_process.self_test_cost(spec.core_area, chip_true_yield, rng)
                    + test_process.tester_cost(self_test_time);
                let nre = if ctx.include_nre_in_self_cost { own_nre_cost } else { 0.0 };
                (layer_cost, test_cost, (layer_cost + nre + test_cost) / self_test_yield)
            }
        };
        let assembly_cost = assembly_process.assembly_cost(chips.len(), stacked_area);
        let assembly_core_area = spec.core_area + chips.iter().map(|c| c.core_area).sum::<f64>();
        let assembly_test_cost = test_process.assembly_test_cost(assembly_core_area, chip_true_yield, rng)
            + test_process.tester_cost(assembly_test_time);
        let children_cost: f64 = chips.iter().map(|c| c.cost).sum();
        let cost = (self_cost + children_cost + assembly_cost + assembly_test_cost) / chip_test_yield;

        log::debug!(
            "{}: area {:.4} mm², yield {:.6}, quality {:.6}, cost {:.4}, power {:.4} W",
            name,
            area,
            chip_true_yield,
            quality,
            cost,
            total_power
        );

        Ok(Self {
            name,
            core_area: spec.core_area,
            fraction_memory: spec.fraction_memory,
            fraction_logic: spec.fraction_logic,
            fraction_analog: spec.fraction_analog,
            reticle_share: spec.reticle_share,
            quantity: spec.quantity,
            buried: spec.buried,
            power: spec.power,
            core_voltage: spec.core_voltage,
            aspect_ratio: spec.aspect_ratio,
            bb_area: spec.bb_area,
            bb_cost: spec.bb_cost,
            bb_quality: spec.bb_quality,
            bb_power: spec.bb_power,
            wafer_process,
            assembly_process,
            test_process,
            stackup,
            chips,
            nre_in_self_cost: ctx.include_nre_in_self_cost,
            chip_names,
            signal_count,
            chips_signal_count,
            io_area,
            self_gates_per_mm2,
            assembly_gate_count,
            self_test_time,
            assembly_test_time,
            power_pads,
            test_pads,
            pad_grid,
            stacked_area,
            area,
            stack_power,
            io_power,
            total_power,
            nre_front_end_cost,
            nre_back_end_cost,
            mask_cost,
            self_true_yield,
            self_test_yield,
            self_quality,
            assembly_yield,
            chip_true_yield,
            chip_test_yield,
            quality,
            self_layer_cost,
            self_test_cost,
            self_cost,
            assembly_cost,
            assembly_test_cost,
            cost,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn core_area(&self) -> f64 {
        self.core_area
    }

    pub fn fraction_memory(&self) -> f64 {
        self.fraction_memory
    }

    pub fn fraction_logic(&self) -> f64 {
        self.fraction_logic
    }

    pub fn fraction_analog(&self) -> f64 {
        self.fraction_analog
    }

    pub fn reticle_share(&self) -> f64 {
        self.reticle_share
    }

    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    pub fn buried(&self) -> bool {
        self.buried
    }

    /// Core power as specified, before IO and stacked chips (W).
    pub fn power(&self) -> f64 {
        self.power
    }

    pub fn core_voltage(&self) -> f64 {
        self.core_voltage
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }

    pub fn bb_area(&self) -> Option<f64> {
        self.bb_area
    }

    pub fn bb_cost(&self) -> Option<f64> {
        self.bb_cost
    }

    pub fn bb_quality(&self) -> Option<f64> {
        self.bb_quality
    }

    pub fn bb_power(&self) -> Option<f64> {
        self.bb_power
    }

    pub fn wafer_process(&self) -> &WaferProcess {
        &self.wafer_process
    }

    pub fn assembly_process(&self) -> &AssemblyProcess {
        &self.assembly_process
    }

    pub fn test_process(&self) -> &TestProcess {
        &self.test_process
    }

    /// Layers in stack order, repeated per their stackup count.
    pub fn stackup(&self) -> &[Arc<Layer>] {
        &self.stackup
    }

    /// Chips stacked directly on this one.
    pub fn chips(&self) -> &[Chip] {
        &self.chips
    }

    /// Names of this chip and every chip below it in the tree.
    pub fn chip_names(&self) -> &[String] {
        &self.chip_names
    }

    // ========================================================================
    // Area
    // ========================================================================

    /// Footprint (mm²).
    pub fn area(&self) -> f64 {
        self.area
    }

    /// Pad area of this chip's own IO (mm²).
    pub fn io_area(&self) -> f64 {
        self.io_area
    }

    /// Bounding area of the non-buried stacked chips plus edge exclusion (mm²).
    pub fn stacked_area(&self) -> f64 {
        self.stacked_area
    }

    /// Area of the bond pad grid (mm²).
    pub fn pad_area(&self) -> f64 {
        self.pad_grid.area()
    }

    pub fn pad_grid(&self) -> PadGrid {
        self.pad_grid
    }

    /// Signal pads leaving this chip's subtree, split by reach.
    pub fn signal_count(&self) -> &SignalCount {
        &self.signal_count
    }

    pub fn signal_pads(&self) -> f64 {
        self.signal_count.total
    }

    /// Power plus ground pads.
    pub fn power_pads(&self) -> u64 {
        self.power_pads
    }

    pub fn test_pads(&self) -> u32 {
        self.test_pads
    }

    /// Signals bonded between the stacked chips and the rest of the design.
    pub fn chips_signal_count(&self) -> f64 {
        self.chips_signal_count
    }

    /// Reticle fields and stitches needed to expose this chip.
    pub fn number_of_reticles(&self) -> (u64, u64) {
        number_of_reticles(
            self.area,
            self.wafer_process.reticle_x(),
            self.wafer_process.reticle_y(),
        )
    }

    /// Core area over footprint, 0 for a zero footprint.
    ///
    /// This is the share of the die spent on core logic. Wafer edge loss
    /// and dicing streets are not part of it.
    pub fn wafer_area_efficiency(&self) -> f64 {
        if self.area > 0.0 { self.core_area / self.area } else { 0.0 }
    }

    // ========================================================================
    // Test
    // ========================================================================

    /// Gates per mm² summed over the stackup.
    pub fn self_gates_per_mm2(&self) -> f64 {
        self.self_gates_per_mm2
    }

    /// Gates in this chip's core.
    pub fn gate_count(&self) -> f64 {
        self.core_area * self.self_gates_per_mm2
    }

    /// Gates in this chip and every chip below it.
    pub fn assembly_gate_count(&self) -> f64 {
        self.assembly_gate_count
    }

    /// Tester seconds for the self test (s).
    pub fn self_test_time(&self) -> f64 {
        self.self_test_time
    }

    /// Tester seconds for the assembly test (s).
    pub fn assembly_test_time(&self) -> f64 {
        self.assembly_test_time
    }

    // ========================================================================
    // Power
    // ========================================================================

    /// Power drawn by this chip's external IO (W).
    pub fn io_power(&self) -> f64 {
        self.io_power
    }

    /// Total power of the stacked chips (W).
    pub fn stack_power(&self) -> f64 {
        self.stack_power
    }

    /// Power of this chip including IO and everything stacked on it (W).
    pub fn total_power(&self) -> f64 {
        self.total_power
    }

    // ========================================================================
    // Yield
    // ========================================================================

    /// Yield of this die alone, before test.
    pub fn self_true_yield(&self) -> f64 {
        self.self_true_yield
    }

    /// Fraction of dies passing self test.
    pub fn self_test_yield(&self) -> f64 {
        self.self_test_yield
    }

    /// Probability a die that passed self test is good.
    pub fn self_quality(&self) -> f64 {
        self.self_quality
    }

    /// Yield of the assembly step for the stacked chips.
    pub fn assembly_yield(&self) -> f64 {
        self.assembly_yield
    }

    /// Probability the assembled chip is good, before assembly test.
    pub fn chip_true_yield(&self) -> f64 {
        self.chip_true_yield
    }

    /// Fraction of assembled chips passing assembly test.
    pub fn chip_test_yield(&self) -> f64 {
        self.chip_test_yield
    }

    /// Probability a shipped chip is good.
    pub fn quality(&self) -> f64 {
        self.quality
    }

    // ========================================================================
    // Cost
    // ========================================================================

    /// Layer manufacturing cost of this die.
    pub fn self_layer_cost(&self) -> f64 {
        self.self_layer_cost
    }

    /// Per-pattern self test cost plus tester time.
    pub fn self_test_cost(&self) -> f64 {
        self.self_test_cost
    }

    /// Cost of one good-tested die, excluding stacked chips.
    pub fn self_cost(&self) -> f64 {
        self.self_cost
    }

    /// Pick-and-place, bonding and materials cost of the stacked chips.
    pub fn assembly_cost(&self) -> f64 {
        self.assembly_cost
    }

    /// Per-pattern assembly test cost plus tester time.
    pub fn assembly_test_cost(&self) -> f64 {
        self.assembly_test_cost
    }

    /// Cost of one shipped chip including stacked chips.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub fn nre_front_end_cost(&self) -> f64 {
        self.nre_front_end_cost
    }

    pub fn nre_back_end_cost(&self) -> f64 {
        self.nre_back_end_cost
    }

    /// Front-end plus back-end design NRE.
    pub fn nre_design_cost(&self) -> f64 {
        self.nre_front_end_cost + self.nre_back_end_cost
    }

    /// Mask set cost charged to this chip.
    pub fn mask_cost(&self) -> f64 {
        self.mask_cost
    }

    /// NRE of this die amortized over its quantity.
    pub fn own_nre_cost(&self) -> f64 {
        (self.nre_design_cost() + self.mask_cost) / self.quantity as f64
    }

    /// Amortized NRE of this chip and every chip below it.
    pub fn nre_cost(&self) -> f64 {
        self.own_nre_cost() + self.chips.iter().map(Chip::nre_cost).sum::<f64>()
    }

    /// Unit cost with amortized NRE.
    pub fn total_cost(&self) -> f64 {
        if self.nre_in_self_cost {
            self.cost
        } else {
            self.cost + self.nre_cost()
        }
    }

    /// Cost of this die alone if every part were good.
    pub fn self_perfect_yield_cost(&self) -> f64 {
        self.bb_cost.unwrap_or(self.self_layer_cost + self.self_test_cost)
    }

    /// Cost of the whole stack if every part and step were good.
    ///
    /// Uses the layer cost even for black-box chips, so the stack can be
    /// compared against a known manufacturing floor.
    pub fn perfect_yield_cost(&self) -> f64 {
        self.self_layer_cost
            + self.assembly_cost
            + self.assembly_test_cost
            + self.chips.iter().map(Chip::perfect_yield_cost).sum::<f64>()
    }

    /// Cost lost to parts and stacks discarded at test.
    pub fn scrap_cost(&self) -> f64 {
        self.cost - self.perfect_yield_cost()
    }

    /// Perfect-yield cost plus amortized NRE.
    pub fn total_non_scrap_cost(&self) -> f64 {
        self.perfect_yield_cost() + self.nre_cost()
    }
}

/// Power plus ground pads for `total_power`; saturates for absurd power.
fn power_pad_count(total_power: f64, power_per_pad: f64) -> u64 {
    // float to int casts saturate
    let pairs = (total_power / power_per_pad).ceil() as u64;
    pairs.saturating_mul(2)
}

fn stacked_die_area(chips: &[Chip], assembly: &AssemblyProcess) -> f64 {
    let half_separation = assembly.die_separation() / 2.0;
    let dies: f64 = chips
        .iter()
        .filter(|c| !c.buried)
        .map(|c| expanded_area(c.area, half_separation, c.aspect_ratio))
        .sum();
    expanded_area(dies, assembly.edge_exclusion(), 1.0)
}

fn validate(spec: &ChipSpec) -> Result<()> {
    if spec.name.is_empty() {
        return Err(Error::EmptyChipName);
    }
    let check = |ok: bool, field: &'static str, value: f64, reason: &'static str| {
        if ok {
            Ok(())
        } else {
            Err(Error::InvalidChipParameter {
                chip: spec.name.clone(),
                field,
                value,
                reason,
            })
        }
    };
    check(spec.core_area >= 0.0, "core_area", spec.core_area, "must be non-negative")?;
    for (field, value) in [
        ("fraction_memory", spec.fraction_memory),
        ("fraction_logic", spec.fraction_logic),
        ("fraction_analog", spec.fraction_analog),
        ("reticle_share", spec.reticle_share),
        ("power", spec.power),
    ] {
        check(value >= 0.0, field, value, "must be non-negative")?;
    }
    check(spec.quantity > 0, "quantity", spec.quantity as f64, "must be positive")?;
    check(spec.core_voltage > 0.0, "core_voltage", spec.core_voltage, "must be positive")?;
    check(spec.aspect_ratio > 0.0, "aspect_ratio", spec.aspect_ratio, "must be positive")?;
    for (field, value) in [
        ("bb_area", spec.bb_area),
        ("bb_cost", spec.bb_cost),
        ("bb_power", spec.bb_power),
    ] {
        if let Some(v) = value {
            check(v >= 0.0, field, v, "must be non-negative")?;
        }
    }
    if let Some(q) = spec.bb_quality {
        check((0.0..=1.0).contains(&q), "bb_quality", q, "must be in [0, 1]")?;
    }
    Ok(())
}
