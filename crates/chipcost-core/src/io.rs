//! Interconnect (IO) type records.

use serde::{Deserialize, Serialize};

use crate::catalog::Named;
use crate::error::{Result, ensure};

/// Interconnect type parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterconnectParams {
    /// Receiver pad area (mm²). Default: 0.0.
    pub rx_area: f64,
    /// Transmitter pad area (mm²). Default: 0.0.
    pub tx_area: f64,
    /// Die edge consumed per link (mm). Default: 0.0.
    pub shoreline: f64,
    /// Bandwidth per link (Gb/s). Default: 0.0.
    pub bandwidth: f64,
    /// Wires (signal pads) per link. Default: 1.
    pub wire_count: u32,
    /// Whether a link carries traffic in both directions. Default: false.
    pub bidirectional: bool,
    /// Energy per transferred bit (pJ). Default: 0.0.
    pub energy_per_bit: f64,
    /// Maximum connection distance from the die edge (mm). Default: 0.0.
    pub reach: f64,
}

impl Default for InterconnectParams {
    fn default() -> Self {
        Self {
            rx_area: 0.0,
            tx_area: 0.0,
            shoreline: 0.0,
            bandwidth: 0.0,
            wire_count: 1,
            bidirectional: false,
            energy_per_bit: 0.0,
            reach: 0.0,
        }
    }
}

/// A validated interconnect type, identified by its type name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterconnectType {
    name: String,
    params: InterconnectParams,
}

impl InterconnectType {
    pub fn new(name: impl Into<String>, params: InterconnectParams) -> Result<Self> {
        let name = name.into();
        let p = &params;
        ensure(p.rx_area >= 0.0, &name, "rx_area", p.rx_area, "must be non-negative")?;
        ensure(p.tx_area >= 0.0, &name, "tx_area", p.tx_area, "must be non-negative")?;
        ensure(p.bandwidth >= 0.0, &name, "bandwidth", p.bandwidth, "must be non-negative")?;
        ensure(p.energy_per_bit >= 0.0, &name, "energy_per_bit", p.energy_per_bit, "must be non-negative")?;
        ensure(p.reach >= 0.0, &name, "reach", p.reach, "must be non-negative")?;
        Ok(Self { name, params })
    }

    pub fn params(&self) -> &InterconnectParams {
        &self.params
    }

    pub fn rx_area(&self) -> f64 {
        self.params.rx_area
    }

    pub fn tx_area(&self) -> f64 {
        self.params.tx_area
    }

    pub fn shoreline(&self) -> f64 {
        self.params.shoreline
    }

    pub fn bandwidth(&self) -> f64 {
        self.params.bandwidth
    }

    pub fn wire_count(&self) -> u32 {
        self.params.wire_count
    }

    pub fn bidirectional(&self) -> bool {
        self.params.bidirectional
    }

    pub fn energy_per_bit(&self) -> f64 {
        self.params.energy_per_bit
    }

    pub fn reach(&self) -> f64 {
        self.params.reach
    }

    /// Bidirectional links share pads between both ends, so each end is
    /// charged half.
    pub fn bidirectional_factor(&self) -> f64 {
        if self.params.bidirectional { 0.5 } else { 1.0 }
    }
}

impl Named for InterconnectType {
    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bidirectional_factor() {
        let mut p = InterconnectParams {
            rx_area: 1.0,
            tx_area: 2.0,
            shoreline: 0.5,
            bandwidth: 3.0,
            wire_count: 4,
            bidirectional: true,
            energy_per_bit: 0.9,
            reach: 5.0,
        };
        let io = InterconnectType::new("test_io", p.clone()).unwrap();
        assert_eq!(io.bidirectional_factor(), 0.5);
        assert_eq!(io.wire_count(), 4);
        assert_eq!(io.name(), "test_io");

        p.bidirectional = false;
        let io = InterconnectType::new("test_io", p).unwrap();
        assert_eq!(io.bidirectional_factor(), 1.0);
    }

    #[test]
    fn test_negative_reach_rejected() {
        let p = InterconnectParams {
            reach: -1.0,
            ..Default::default()
        };
        assert!(InterconnectType::new("bad", p).is_err());
    }
}
