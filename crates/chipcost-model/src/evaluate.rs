//! Chip tree evaluation.
//!
//! An [`Evaluator`] binds a frozen set of [`Catalogs`] and the global
//! [`InterconnectModel`] to a [`ModelConfig`], then turns [`ChipSpec`] trees
//! into evaluated [`Chip`]s. Independent trees may be evaluated in parallel.

use chipcost_core::{Catalog, InterconnectModel, WaferProcess};
use chipcost_process::{AssemblyProcess, Layer, TestProcess};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use rayon::prelude::*;

use crate::chip::{BuildContext, Chip};
use crate::config::ModelConfig;
use crate::error::Result;
use crate::spec::ChipSpec;

/// The named process records a design can reference.
#[derive(Debug, Clone)]
pub struct Catalogs {
    pub wafer_processes: Catalog<WaferProcess>,
    pub layers: Catalog<Layer>,
    pub assembly_processes: Catalog<AssemblyProcess>,
    pub test_processes: Catalog<TestProcess>,
}

impl Default for Catalogs {
    fn default() -> Self {
        Self {
            wafer_processes: Catalog::new("wafer process"),
            layers: Catalog::new("layer"),
            assembly_processes: Catalog::new("assembly process"),
            test_processes: Catalog::new("test process"),
        }
    }
}

impl Catalogs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Freeze every catalog. Further inserts fail.
    pub fn freeze(&mut self) {
        self.wafer_processes.freeze();
        self.layers.freeze();
        self.assembly_processes.freeze();
        self.test_processes.freeze();
    }

    pub fn is_frozen(&self) -> bool {
        self.wafer_processes.is_frozen()
            && self.layers.is_frozen()
            && self.assembly_processes.is_frozen()
            && self.test_processes.is_frozen()
    }
}

/// Evaluates chip trees against a fixed set of catalogs and interconnect.
#[derive(Debug, Clone)]
pub struct Evaluator<'a> {
    catalogs: &'a Catalogs,
    interconnect: &'a InterconnectModel,
    config: ModelConfig,
}

impl<'a> Evaluator<'a> {
    pub fn new(catalogs: &'a Catalogs, interconnect: &'a InterconnectModel) -> Self {
        Self {
            catalogs,
            interconnect,
            config: ModelConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ModelConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn catalogs(&self) -> &Catalogs {
        self.catalogs
    }

    pub fn interconnect(&self) -> &InterconnectModel {
        self.interconnect
    }

    /// Evaluate one chip tree.
    ///
    /// Test cost derating draws come from a generator seeded with
    /// `config.seed`, or from the thread-local generator when unseeded.
    pub fn evaluate(&self, spec: &ChipSpec) -> Result<Chip> {
        let mut rng: Box<dyn RngCore> = match self.config.seed {
            Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
            None => Box::new(rand::thread_rng()),
        };
        self.evaluate_with_rng(spec, &mut *rng)
    }

    /// Evaluate one chip tree drawing from `rng`.
    pub fn evaluate_with_rng<R: Rng + ?Sized>(&self, spec: &ChipSpec, rng: &mut R) -> Result<Chip> {
        if !self.catalogs.is_frozen() {
            log::warn!("evaluating {} against catalogs that are not frozen", spec.name);
        }
        let ctx = BuildContext {
            catalogs: self.catalogs,
            interconnect: self.interconnect,
            include_nre_in_self_cost: self.config.include_nre_in_self_cost,
        };
        let chip = Chip::build(spec, None, &ctx, rng)?;
        log::info!(
            "Evaluated {} ({} chips): area {:.3} mm², cost {:.4}, quality {:.6}",
            chip.name(),
            spec.tree_size(),
            chip.area(),
            chip.cost(),
            chip.quality()
        );
        Ok(chip)
    }

    /// Evaluate independent chip trees, in parallel when worthwhile.
    ///
    /// Tree `i` draws from a generator seeded with `seed + i` when a seed is
    /// configured, so results do not depend on scheduling. Falls back to
    /// sequential evaluation when there are fewer than
    /// `config.min_trees_for_parallel` trees or only one rayon thread.
    pub fn evaluate_all(&self, specs: &[ChipSpec]) -> Vec<Result<Chip>> {
        let use_parallel =
            specs.len() >= self.config.min_trees_for_parallel && rayon::current_num_threads() > 1;

        if use_parallel {
            log::info!(
                "Evaluating {} chip trees on {} threads",
                specs.len(),
                rayon::current_num_threads()
            );
            specs
                .par_iter()
                .enumerate()
                .map(|(idx, spec)| self.evaluate_indexed(idx, spec))
                .collect()
        } else {
            specs
                .iter()
                .enumerate()
                .map(|(idx, spec)| self.evaluate_indexed(idx, spec))
                .collect()
        }
    }

    fn evaluate_indexed(&self, idx: usize, spec: &ChipSpec) -> Result<Chip> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(idx as u64)),
            None => StdRng::from_entropy(),
        };
        self.evaluate_with_rng(spec, &mut rng)
    }
}
