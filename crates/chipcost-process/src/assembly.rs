//! Die assembly (pick-and-place plus bonding) cost and yield model.

use chipcost_core::{Named, ensure};
use serde::{Deserialize, Serialize};

use crate::error::Result;

const SECONDS_PER_YEAR: f64 = 365.0 * 24.0 * 60.0 * 60.0;

/// Assembly process parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyParams {
    /// Substrate and underfill materials (USD/mm²). Default: 0.0.
    pub materials_cost_per_mm2: f64,

    // ========================================================================
    // Pick-and-place
    // ========================================================================
    /// Pick-and-place machine purchase cost (USD). Default: 0.0.
    pub picknplace_machine_cost: f64,
    /// Pick-and-place machine depreciation lifetime (years). Default: 5.0.
    pub picknplace_machine_lifetime: f64,
    /// Fraction of the year the machine is running. Default: 1.0.
    pub picknplace_machine_uptime: f64,
    /// Yearly technician cost for the machine (USD). Default: 0.0.
    pub picknplace_technician_yearly_cost: f64,
    /// Time to place one group of dies (s). Default: 0.0.
    pub picknplace_time: f64,
    /// Dies placed per group. Default: 1.
    pub picknplace_group: u32,

    // ========================================================================
    // Bonding
    // ========================================================================
    /// Bonding machine purchase cost (USD). Default: 0.0.
    pub bonding_machine_cost: f64,
    /// Bonding machine depreciation lifetime (years). Default: 5.0.
    pub bonding_machine_lifetime: f64,
    /// Fraction of the year the machine is running. Default: 1.0.
    pub bonding_machine_uptime: f64,
    /// Yearly technician cost for the machine (USD). Default: 0.0.
    pub bonding_technician_yearly_cost: f64,
    /// Time to bond one group of dies (s). Default: 0.0.
    pub bonding_time: f64,
    /// Dies bonded per group. Default: 1.
    pub bonding_group: u32,

    // ========================================================================
    // Geometry and yield
    // ========================================================================
    /// Spacing between adjacent dies (mm). Default: 0.0.
    pub die_separation: f64,
    /// Keep-out at the edge of the carrier (mm). Default: 0.0.
    pub edge_exclusion: f64,
    /// Maximum current density through a pad (A/mm²). Default: 1.0.
    pub max_pad_current_density: f64,
    /// Bond pad pitch (mm). Default: 0.1.
    pub bonding_pitch: f64,
    /// Probability a die is placed within alignment tolerance. Default: 1.0.
    pub alignment_yield: f64,
    /// Probability a single signal bond is good. Default: 1.0.
    pub bonding_yield: f64,
    /// Dielectric bond defects per mm². Default: 0.0.
    pub dielectric_bond_defect_density: f64,
}

impl Default for AssemblyParams {
    fn default() -> Self {
        Self {
            materials_cost_per_mm2: 0.0,
            picknplace_machine_cost: 0.0,
            picknplace_machine_lifetime: 5.0,
            picknplace_machine_uptime: 1.0,
            picknplace_technician_yearly_cost: 0.0,
            picknplace_time: 0.0,
            picknplace_group: 1,
            bonding_machine_cost: 0.0,
            bonding_machine_lifetime: 5.0,
            bonding_machine_uptime: 1.0,
            bonding_technician_yearly_cost: 0.0,
            bonding_time: 0.0,
            bonding_group: 1,
            die_separation: 0.0,
            edge_exclusion: 0.0,
            max_pad_current_density: 1.0,
            bonding_pitch: 0.1,
            alignment_yield: 1.0,
            bonding_yield: 1.0,
            dielectric_bond_defect_density: 0.0,
        }
    }
}

/// A validated assembly process with cached machine rates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssemblyProcess {
    name: String,
    params: AssemblyParams,
    picknplace_cost_per_second: f64,
    bonding_cost_per_second: f64,
}

impl AssemblyProcess {
    pub fn new(name: impl Into<String>, params: AssemblyParams) -> Result<Self> {
        let name = name.into();
        let p = &params;
        ensure(
            p.picknplace_machine_lifetime > 0.0,
            &name,
            "picknplace_machine_lifetime",
            p.picknplace_machine_lifetime,
            "must be positive",
        )?;
        ensure(
            p.bonding_machine_lifetime > 0.0,
            &name,
            "bonding_machine_lifetime",
            p.bonding_machine_lifetime,
            "must be positive",
        )?;
        ensure(
            p.picknplace_group > 0,
            &name,
            "picknplace_group",
            f64::from(p.picknplace_group),
            "must be positive",
        )?;
        ensure(
            p.bonding_group > 0,
            &name,
            "bonding_group",
            f64::from(p.bonding_group),
            "must be positive",
        )?;
        ensure(p.bonding_pitch > 0.0, &name, "bonding_pitch", p.bonding_pitch, "must be positive")?;
        ensure(p.die_separation >= 0.0, &name, "die_separation", p.die_separation, "must be non-negative")?;
        ensure(p.edge_exclusion >= 0.0, &name, "edge_exclusion", p.edge_exclusion, "must be non-negative")?;
        ensure(
            p.max_pad_current_density > 0.0,
            &name,
            "max_pad_current_density",
            p.max_pad_current_density,
            "must be positive",
        )?;
        for (field, value) in [
            ("alignment_yield", p.alignment_yield),
            ("bonding_yield", p.bonding_yield),
            ("picknplace_machine_uptime", p.picknplace_machine_uptime),
            ("bonding_machine_uptime", p.bonding_machine_uptime),
        ] {
            ensure((0.0..=1.0).contains(&value), &name, field, value, "must be in [0, 1]")?;
        }

        let picknplace_cost_per_second = cost_per_second(
            p.picknplace_machine_cost,
            p.picknplace_machine_lifetime,
            p.picknplace_technician_yearly_cost,
            p.picknplace_machine_uptime,
        );
        let bonding_cost_per_second = cost_per_second(
            p.bonding_machine_cost,
            p.bonding_machine_lifetime,
            p.bonding_technician_yearly_cost,
            p.bonding_machine_uptime,
        );
        Ok(Self {
            name,
            params,
            picknplace_cost_per_second,
            bonding_cost_per_second,
        })
    }

    pub fn params(&self) -> &AssemblyParams {
        &self.params
    }

    pub fn materials_cost_per_mm2(&self) -> f64 {
        self.params.materials_cost_per_mm2
    }

    pub fn die_separation(&self) -> f64 {
        self.params.die_separation
    }

    pub fn edge_exclusion(&self) -> f64 {
        self.params.edge_exclusion
    }

    pub fn bonding_pitch(&self) -> f64 {
        self.params.bonding_pitch
    }

    pub fn max_pad_current_density(&self) -> f64 {
        self.params.max_pad_current_density
    }

    pub fn alignment_yield(&self) -> f64 {
        self.params.alignment_yield
    }

    pub fn bonding_yield(&self) -> f64 {
        self.params.bonding_yield
    }

    pub fn dielectric_bond_defect_density(&self) -> f64 {
        self.params.dielectric_bond_defect_density
    }

    /// Machine and labour cost of one second of pick-and-place.
    pub fn picknplace_cost_per_second(&self) -> f64 {
        self.picknplace_cost_per_second
    }

    /// Machine and labour cost of one second of bonding.
    pub fn bonding_cost_per_second(&self) -> f64 {
        self.bonding_cost_per_second
    }

    /// Seconds spent placing `n_chips` dies.
    pub fn picknplace_time(&self, n_chips: usize) -> f64 {
        batches(n_chips, self.params.picknplace_group) * self.params.picknplace_time
    }

    /// Seconds spent bonding `n_chips` dies.
    pub fn bonding_time(&self, n_chips: usize) -> f64 {
        batches(n_chips, self.params.bonding_group) * self.params.bonding_time
    }

    /// Cost of assembling `n_chips` dies onto a carrier of the given area.
    pub fn assembly_cost(&self, n_chips: usize, area: f64) -> f64 {
        self.picknplace_cost_per_second * self.picknplace_time(n_chips)
            + self.bonding_cost_per_second * self.bonding_time(n_chips)
            + self.params.materials_cost_per_mm2 * area
    }

    /// Probability that assembling `n_chips` dies with `n_bonds` signal bonds
    /// over the given bonded area succeeds.
    ///
    /// Dielectric bond defects enter as `1 / (1 + D * area)`, which stays
    /// positive for any bonded area.
    pub fn assembly_yield(&self, n_chips: usize, n_bonds: f64, area: f64) -> f64 {
        let p = &self.params;
        p.alignment_yield.powf(n_chips as f64) * p.bonding_yield.powf(n_bonds)
            / (1.0 + p.dielectric_bond_defect_density * area)
    }

    /// Power one pad can deliver at the given supply voltage (W).
    ///
    /// The conducting cross-section is a circle of diameter `pitch / 2`.
    pub fn power_per_pad(&self, core_voltage: f64) -> f64 {
        let radius = self.params.bonding_pitch / 4.0;
        let pad_area = std::f64::consts::PI * radius * radius;
        pad_area * self.params.max_pad_current_density * core_voltage
    }
}

impl Named for AssemblyProcess {
    fn name(&self) -> &str {
        &self.name
    }
}

fn cost_per_second(machine_cost: f64, lifetime: f64, technician_yearly_cost: f64, uptime: f64) -> f64 {
    (machine_cost / lifetime + technician_yearly_cost) / SECONDS_PER_YEAR * uptime
}

fn batches(n: usize, group: u32) -> f64 {
    n.div_ceil(group as usize) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn process() -> AssemblyProcess {
        AssemblyProcess::new(
            "ap",
            AssemblyParams {
                materials_cost_per_mm2: 0.1,
                picknplace_machine_cost: 1e6,
                picknplace_machine_lifetime: 5.0,
                picknplace_machine_uptime: 0.9,
                picknplace_technician_yearly_cost: 200000.0,
                picknplace_time: 10.0,
                picknplace_group: 1,
                bonding_machine_cost: 2e6,
                bonding_machine_lifetime: 5.0,
                bonding_machine_uptime: 0.8,
                bonding_technician_yearly_cost: 210000.0,
                bonding_time: 20.0,
                bonding_group: 2,
                die_separation: 0.2,
                edge_exclusion: 0.3,
                max_pad_current_density: 0.4,
                bonding_pitch: 0.5,
                alignment_yield: 0.987,
                bonding_yield: 0.999,
                dielectric_bond_defect_density: 0.0003,
            },
        )
        .unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12 * b.abs().max(1.0)
    }

    #[test]
    fn test_power_per_pad() {
        let ap = process();
        assert!(close(ap.power_per_pad(1.0), 0.019634954084936207));
        assert!(close(ap.power_per_pad(10.0), 0.19634954084936207));
    }

    #[test]
    fn test_times() {
        let ap = process();
        assert_eq!(ap.picknplace_time(5), 50.0);
        assert_eq!(ap.bonding_time(5), 60.0);
        assert_eq!(ap.bonding_time(0), 0.0);
    }

    #[test]
    fn test_cost_per_second() {
        let ap = process();
        assert!(close(ap.picknplace_cost_per_second(), 0.01141552511415525));
        assert!(close(ap.bonding_cost_per_second(), 0.015474378488077117));
    }

    #[test]
    fn test_assembly_cost() {
        let ap = process();
        assert!(close(ap.assembly_cost(1, 10.0), 1.423642820903095));
        assert!(close(ap.assembly_cost(100, 10.0), 27.88990360223237));
        assert!(close(ap.assembly_cost(70, 33.0), 22.122932521562657));
    }

    #[test]
    fn test_assembly_yield() {
        let ap = process();
        assert!(close(ap.assembly_yield(1, 1.0, 10.0), 0.9830638085742773));
        assert!(close(ap.assembly_yield(10, 1000.0, 10.0), 0.3216316803268721));
        assert!(close(ap.assembly_yield(100, 1000.0, 400.0), 0.08871263319082526));
    }

    #[test]
    fn test_assembly_yield_large_bonded_area() {
        // 0.0003 defects/mm² over 10000 mm² would be a negative linear yield.
        let ap = process();
        let y = ap.assembly_yield(0, 0.0, 10000.0);
        assert!(close(y, 1.0 / 4.0));
        assert!(close(ap.assembly_yield(0, 0.0, 0.36), 1.0 / 1.000108));
    }

    #[test]
    fn test_assembly_yield_identity_and_trend() {
        let ap = process();
        assert_eq!(ap.assembly_yield(0, 0.0, 0.0), 1.0);
        let base = ap.assembly_yield(2, 10.0, 5.0);
        assert!(ap.assembly_yield(3, 10.0, 5.0) < base);
        assert!(ap.assembly_yield(2, 11.0, 5.0) < base);
        assert!(ap.assembly_yield(2, 10.0, 6.0) < base);
    }

    #[test]
    fn test_zero_group_rejected() {
        let mut p = process().params().clone();
        p.bonding_group = 0;
        assert!(AssemblyProcess::new("bad", p).is_err());
    }
}
