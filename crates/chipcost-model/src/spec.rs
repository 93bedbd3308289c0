//! Chip specification trees.
//!
//! A [`ChipSpec`] is the plain-record description of one chip and the chips
//! stacked on it, as produced by any front end. Process references are by
//! name and are resolved against the catalogs at evaluation time.

use serde::{Deserialize, Deserializer, Serialize};

/// Specification of one chip and its children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChipSpec {
    /// Chip name; must match the block name in the interconnect model to
    /// receive IO.
    pub name: String,
    /// Core (logic, memory, analog) area (mm²). Default: 0.0.
    pub core_area: f64,
    /// Fraction of the core that is memory. Default: 0.0.
    pub fraction_memory: f64,
    /// Fraction of the core that is logic. Default: 0.0.
    pub fraction_logic: f64,
    /// Fraction of the core that is analog. Default: 0.0.
    pub fraction_analog: f64,
    /// Share of the mask set paid by this chip. Default: 1.0.
    pub reticle_share: f64,
    /// Production volume NRE is amortized over. Default: 1.
    pub quantity: u64,
    /// Embedded in the carrier (e.g. a bridge die); excluded from stacked
    /// area. Default: false.
    pub buried: bool,
    /// Core power (W). Default: 0.0.
    pub power: f64,
    /// Core supply voltage (V). Default: 1.0.
    pub core_voltage: f64,
    /// Voltage regulation mode, carried for front ends.
    pub core_voltage_regulation: Option<String>,
    /// Width over height. Default: 1.0.
    pub aspect_ratio: f64,
    /// Placement hint, carried for front ends.
    pub x_location: Option<f64>,
    /// Placement hint, carried for front ends.
    pub y_location: Option<f64>,
    pub wafer_process: String,
    pub assembly_process: String,
    pub test_process: String,
    /// Layer stack as `<count>:<layer>[,<count>:<layer>...]`.
    pub stackup: String,

    // ========================================================================
    // Black-box overrides
    // ========================================================================
    /// Replaces the computed area.
    #[serde(deserialize_with = "blank_as_none")]
    pub bb_area: Option<f64>,
    /// Replaces the computed self cost.
    #[serde(deserialize_with = "blank_as_none")]
    pub bb_cost: Option<f64>,
    /// Replaces the computed self quality.
    #[serde(deserialize_with = "blank_as_none")]
    pub bb_quality: Option<f64>,
    /// Replaces the chip's own and IO power; children's power is still added.
    #[serde(deserialize_with = "blank_as_none")]
    pub bb_power: Option<f64>,

    /// Chips stacked on this one.
    pub chips: Vec<ChipSpec>,
}

impl Default for ChipSpec {
    fn default() -> Self {
        Self {
            name: String::new(),
            core_area: 0.0,
            fraction_memory: 0.0,
            fraction_logic: 0.0,
            fraction_analog: 0.0,
            reticle_share: 1.0,
            quantity: 1,
            buried: false,
            power: 0.0,
            core_voltage: 1.0,
            core_voltage_regulation: None,
            aspect_ratio: 1.0,
            x_location: None,
            y_location: None,
            wafer_process: String::new(),
            assembly_process: String::new(),
            test_process: String::new(),
            stackup: String::new(),
            bb_area: None,
            bb_cost: None,
            bb_quality: None,
            bb_power: None,
            chips: Vec::new(),
        }
    }
}

impl ChipSpec {
    /// Create a spec with the given name and core area.
    pub fn new(name: impl Into<String>, core_area: f64) -> Self {
        Self {
            name: name.into(),
            core_area,
            ..Default::default()
        }
    }

    /// Set the wafer, assembly and test process names.
    pub fn with_processes(
        mut self,
        wafer: impl Into<String>,
        assembly: impl Into<String>,
        test: impl Into<String>,
    ) -> Self {
        self.wafer_process = wafer.into();
        self.assembly_process = assembly.into();
        self.test_process = test.into();
        self
    }

    /// Set the layer stack.
    pub fn with_stackup(mut self, stackup: impl Into<String>) -> Self {
        self.stackup = stackup.into();
        self
    }

    /// Set core power and supply voltage.
    pub fn with_power(mut self, power: f64, core_voltage: f64) -> Self {
        self.power = power;
        self.core_voltage = core_voltage;
        self
    }

    /// Stack a child chip on this one.
    pub fn with_child(mut self, child: ChipSpec) -> Self {
        self.chips.push(child);
        self
    }

    /// Number of chips in this tree, including this one.
    pub fn tree_size(&self) -> usize {
        1 + self.chips.iter().map(ChipSpec::tree_size).sum::<usize>()
    }
}

/// Accept a number, a numeric string, or an empty string (no override).
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(v)) => Ok(Some(v)),
        Some(Raw::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Raw::Text(s)) => s.trim().parse().map(Some).map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_tree() {
        let spec = ChipSpec::new("interposer", 0.0)
            .with_child(ChipSpec::new("cpu", 50.0))
            .with_child(ChipSpec::new("hbm", 0.0).with_child(ChipSpec::new("dram", 10.0)));
        assert_eq!(spec.tree_size(), 4);
        assert_eq!(spec.chips[1].chips[0].name, "dram");
        assert_eq!(spec.aspect_ratio, 1.0);
    }

    #[test]
    fn test_blank_overrides() {
        let spec: ChipSpec = serde_json::from_str(
            r#"{"name": "a", "bb_area": "", "bb_cost": "12.5", "bb_power": 3, "chips": [{"name": "b"}]}"#,
        )
        .unwrap();
        assert_eq!(spec.bb_area, None);
        assert_eq!(spec.bb_cost, Some(12.5));
        assert_eq!(spec.bb_power, Some(3.0));
        assert_eq!(spec.bb_quality, None);
        assert_eq!(spec.chips[0].quantity, 1);
    }

    #[test]
    fn test_bad_override_rejected() {
        let res: Result<ChipSpec, _> = serde_json::from_str(r#"{"name": "a", "bb_area": "large"}"#);
        assert!(res.is_err());
    }
}
