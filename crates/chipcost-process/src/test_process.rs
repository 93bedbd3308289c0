//! Test process yield, quality and cost model.
//!
//! A chip may be tested once on its own ("self test", before assembly) and
//! once after its children are assembled onto it ("assembly test"). Testing
//! raises outgoing quality by screening out detected defects, at the price
//! of the parts it rejects and the tester time it takes.

use chipcost_core::{Named, ensure};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::derating::TestDistribution;
use crate::error::Result;

/// Test process parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestParams {
    /// Tester time per scan cycle (s). Default: 0.0.
    pub time_per_test_cycle: f64,
    /// Tester cost (USD/s). Default: 0.0.
    pub cost_per_second: f64,

    // ========================================================================
    // Self test
    // ========================================================================
    /// Test each chip before assembly. Default: false.
    pub test_self: bool,
    /// Fraction of defects detected by self test. Default: 1.0.
    pub self_defect_coverage: f64,
    /// Self test cost per mm² of core per pattern (USD). Default: 0.0.
    pub self_test_cost_per_mm2: f64,
    /// Number of self test patterns. Default: 0.0.
    pub self_pattern_count: f64,
    /// Flops per self test scan chain. Default: 0.0.
    pub self_scan_chain_length: f64,
    /// Parallel test sites sharing the self test. Default: 1.0.
    pub self_test_reuse: f64,
    /// Number of self test scan chains. Default: 0.
    pub self_num_scan_chains: u32,
    /// Pads per self test scan chain. Default: 0.
    pub self_num_io_per_scan_chain: u32,
    /// Self test pads not tied to scan chains. Default: 0.
    pub self_num_test_io_offset: u32,
    /// Self test failure distribution. Default: uniform.
    pub self_test_failure_dist: TestDistribution,

    // ========================================================================
    // Assembly test
    // ========================================================================
    /// Test the assembled stack. Default: false.
    pub test_assembly: bool,
    /// Fraction of defects detected by assembly test. Default: 1.0.
    pub assembly_defect_coverage: f64,
    /// Assembly test cost per mm² of core per pattern (USD). Default: 0.0.
    pub assembly_test_cost_per_mm2: f64,
    /// Number of assembly test patterns. Default: 0.0.
    pub assembly_pattern_count: f64,
    /// Flops per assembly test scan chain. Default: 0.0.
    pub assembly_scan_chain_length: f64,
    /// Parallel test sites sharing the assembly test. Default: 1.0.
    pub assembly_test_reuse: f64,
    /// Number of assembly test scan chains. Default: 0.
    pub assembly_num_scan_chains: u32,
    /// Pads per assembly test scan chain. Default: 0.
    pub assembly_num_io_per_scan_chain: u32,
    /// Assembly test pads not tied to scan chains. Default: 0.
    pub assembly_num_test_io_offset: u32,
    /// Assembly test failure distribution. Default: uniform.
    pub assembly_test_failure_dist: TestDistribution,
}

impl Default for TestParams {
    fn default() -> Self {
        Self {
            time_per_test_cycle: 0.0,
            cost_per_second: 0.0,
            test_self: false,
            self_defect_coverage: 1.0,
            self_test_cost_per_mm2: 0.0,
            self_pattern_count: 0.0,
            self_scan_chain_length: 0.0,
            self_test_reuse: 1.0,
            self_num_scan_chains: 0,
            self_num_io_per_scan_chain: 0,
            self_num_test_io_offset: 0,
            self_test_failure_dist: TestDistribution::Uniform,
            test_assembly: false,
            assembly_defect_coverage: 1.0,
            assembly_test_cost_per_mm2: 0.0,
            assembly_pattern_count: 0.0,
            assembly_scan_chain_length: 0.0,
            assembly_test_reuse: 1.0,
            assembly_num_scan_chains: 0,
            assembly_num_io_per_scan_chain: 0,
            assembly_num_test_io_offset: 0,
            assembly_test_failure_dist: TestDistribution::Uniform,
        }
    }
}

/// A validated test process.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestProcess {
    name: String,
    params: TestParams,
}

impl TestProcess {
    pub fn new(name: impl Into<String>, params: TestParams) -> Result<Self> {
        let name = name.into();
        let p = &params;
        for (field, value) in [
            ("self_defect_coverage", p.self_defect_coverage),
            ("assembly_defect_coverage", p.assembly_defect_coverage),
        ] {
            ensure((0.0..=1.0).contains(&value), &name, field, value, "must be in [0, 1]")?;
        }
        for (field, value) in [
            ("self_test_reuse", p.self_test_reuse),
            ("assembly_test_reuse", p.assembly_test_reuse),
        ] {
            ensure(value > 0.0, &name, field, value, "must be positive")?;
        }
        Ok(Self { name, params })
    }

    pub fn params(&self) -> &TestParams {
        &self.params
    }

    pub fn test_self(&self) -> bool {
        self.params.test_self
    }

    pub fn test_assembly(&self) -> bool {
        self.params.test_assembly
    }

    /// Fraction of chips that pass self test.
    pub fn self_test_yield(&self, self_true_yield: f64) -> f64 {
        if self.params.test_self {
            1.0 - (1.0 - self_true_yield) * self.params.self_defect_coverage
        } else {
            1.0
        }
    }

    /// Probability that a chip which passed self test is good.
    pub fn self_quality(&self, self_true_yield: f64, self_test_yield: f64) -> f64 {
        self_true_yield / self_test_yield
    }

    /// Fraction of assembled stacks that pass assembly test.
    pub fn assembly_test_yield(&self, chip_true_yield: f64) -> f64 {
        if self.params.test_assembly {
            1.0 - (1.0 - chip_true_yield) * self.params.assembly_defect_coverage
        } else {
            1.0
        }
    }

    /// Probability that a stack which passed assembly test is good.
    pub fn assembly_quality(&self, chip_true_yield: f64, chip_test_yield: f64) -> f64 {
        chip_true_yield / chip_test_yield
    }

    /// Cost of self testing a chip with the given core area.
    pub fn self_test_cost<R: Rng + ?Sized>(&self, core_area: f64, true_yield: f64, rng: &mut R) -> f64 {
        let p = &self.params;
        if !p.test_self {
            return 0.0;
        }
        let cost = core_area * p.self_test_cost_per_mm2 * p.self_pattern_count;
        cost * p.self_test_failure_dist.derating_factor(true_yield, rng)
    }

    /// Cost of testing an assembled stack whose cores sum to `core_area`.
    pub fn assembly_test_cost<R: Rng + ?Sized>(&self, core_area: f64, true_yield: f64, rng: &mut R) -> f64 {
        let p = &self.params;
        if !p.test_assembly {
            return 0.0;
        }
        let cost = core_area * p.assembly_test_cost_per_mm2 * p.assembly_pattern_count;
        cost * p.assembly_test_failure_dist.derating_factor(true_yield, rng)
    }

    /// Pads needed to access the self test scan chains.
    pub fn required_self_test_ios(&self) -> u32 {
        let p = &self.params;
        scan_ios(
            p.test_self,
            p.self_num_scan_chains,
            p.self_num_io_per_scan_chain,
            p.self_num_test_io_offset,
        )
    }

    /// Pads needed to access the assembly test scan chains.
    pub fn required_assembly_test_ios(&self) -> u32 {
        let p = &self.params;
        scan_ios(
            p.test_assembly,
            p.assembly_num_scan_chains,
            p.assembly_num_io_per_scan_chain,
            p.assembly_num_test_io_offset,
        )
    }

    /// Dedicated test pads; self and assembly test share the same pads.
    pub fn num_test_ios(&self) -> u32 {
        self.required_self_test_ios().max(self.required_assembly_test_ios())
    }

    /// Tester seconds for self testing a part with `gate_count` gates.
    pub fn self_test_time(&self, gate_count: f64) -> f64 {
        let p = &self.params;
        if !p.test_self {
            return 0.0;
        }
        self.scan_time(
            gate_count,
            p.self_defect_coverage,
            p.self_pattern_count,
            p.self_scan_chain_length,
            p.self_test_reuse,
        )
    }

    /// Tester seconds for testing an assembled part with `gate_count` gates.
    pub fn assembly_test_time(&self, gate_count: f64) -> f64 {
        let p = &self.params;
        if !p.test_assembly {
            return 0.0;
        }
        self.scan_time(
            gate_count,
            p.assembly_defect_coverage,
            p.assembly_pattern_count,
            p.assembly_scan_chain_length,
            p.assembly_test_reuse,
        )
    }

    /// Tester cost of `seconds` on the tester (USD).
    pub fn tester_cost(&self, seconds: f64) -> f64 {
        seconds * self.params.cost_per_second
    }

    fn scan_time(&self, gate_count: f64, coverage: f64, patterns: f64, chain_length: f64, reuse: f64) -> f64 {
        if gate_count <= 0.0 || patterns <= 0.0 || chain_length <= 0.0 {
            log::debug!(
                "test process {}: no scan time without positive gate count, patterns and chain length",
                self.name
            );
            return 0.0;
        }
        let cycles = gate_count * coverage / patterns / chain_length;
        cycles * self.params.time_per_test_cycle / reuse
    }
}

impl Named for TestProcess {
    fn name(&self) -> &str {
        &self.name
    }
}

fn scan_ios(enabled: bool, chains: u32, io_per_chain: u32, offset: u32) -> u32 {
    if !enabled || chains == 0 || io_per_chain == 0 {
        return 0;
    }
    chains * io_per_chain + offset
}
