//! Global interconnect model.
//!
//! The design-wide netlist is stored as one square adjacency matrix per
//! interconnect type, indexed by a shared ordered list of block names, plus a
//! matching matrix of average bandwidth utilization. Every chip in a design
//! reads from the same model; chips whose name is not a block are treated as
//! pass-through carriers (interposers, substrates) with no direct IO.

use std::collections::HashSet;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use nalgebra::DMatrix;

use crate::catalog::Named;
use crate::error::{Error, Result};
use crate::io::InterconnectType;

/// Adjacency and utilization matrices for one interconnect type.
#[derive(Debug, Clone)]
pub struct Link {
    io: Arc<InterconnectType>,
    /// Wire-bundle count from row block to column block.
    adjacency: DMatrix<f64>,
    /// Average bandwidth utilization of each entry of `adjacency`.
    utilization: DMatrix<f64>,
}

impl Link {
    pub fn io(&self) -> &InterconnectType {
        &self.io
    }

    pub fn adjacency(&self) -> &DMatrix<f64> {
        &self.adjacency
    }

    pub fn utilization(&self) -> &DMatrix<f64> {
        &self.utilization
    }
}

/// Signal pads required by one reach class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReachCount {
    /// Interconnect reach (mm).
    pub reach: f64,
    /// Signal pads that must lie within `reach` of the die edge.
    pub signals: f64,
}

/// Externally-facing signal count of a block, split by reach.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalCount {
    /// Total signal pads over all interconnect types.
    pub total: f64,
    /// Per-reach buckets sorted by ascending reach.
    pub by_reach: Vec<ReachCount>,
}

impl SignalCount {
    fn add(&mut self, reach: f64, signals: f64) {
        self.total += signals;
        match self.by_reach.iter_mut().find(|b| b.reach == reach) {
            Some(bucket) => bucket.signals += signals,
            None => {
                let pos = self.by_reach.partition_point(|b| b.reach < reach);
                self.by_reach.insert(pos, ReachCount { reach, signals });
            }
        }
    }
}

/// Block names plus per-interconnect-type adjacency matrices.
#[derive(Debug, Clone, Default)]
pub struct InterconnectModel {
    blocks: IndexSet<String>,
    links: IndexMap<String, Link>,
}

impl InterconnectModel {
    /// Create a model over the given ordered block names.
    pub fn new<S: Into<String>>(block_names: impl IntoIterator<Item = S>) -> Result<Self> {
        let mut blocks = IndexSet::new();
        for name in block_names {
            let name = name.into();
            if name.is_empty() {
                return Err(Error::EmptyName("block"));
            }
            if !blocks.insert(name.clone()) {
                return Err(Error::Duplicate { kind: "block", name });
            }
        }
        Ok(Self {
            blocks,
            links: IndexMap::new(),
        })
    }

    /// Register the adjacency matrix of one interconnect type.
    ///
    /// A missing utilization matrix is treated as all-zero, which makes the
    /// type contribute area and pads but no IO power.
    pub fn add_link(
        &mut self,
        io: Arc<InterconnectType>,
        adjacency: DMatrix<f64>,
        utilization: Option<DMatrix<f64>>,
    ) -> Result<()> {
        let n = self.blocks.len();
        let utilization = utilization.unwrap_or_else(|| DMatrix::zeros(n, n));
        for m in [&adjacency, &utilization] {
            if m.nrows() != n || m.ncols() != n {
                return Err(Error::DimensionMismatch {
                    io_type: io.name().to_string(),
                    expected: n,
                    rows: m.nrows(),
                    cols: m.ncols(),
                });
            }
        }
        let name = io.name().to_string();
        if self.links.contains_key(&name) {
            return Err(Error::Duplicate {
                kind: "interconnect type",
                name,
            });
        }
        self.links.insert(
            name,
            Link {
                io,
                adjacency,
                utilization,
            },
        );
        Ok(())
    }

    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    pub fn block_names(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().map(String::as_str)
    }

    /// Index of a block, if the name is part of the netlist.
    pub fn block_index(&self, name: &str) -> Option<usize> {
        self.blocks.get_index_of(name)
    }

    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.values()
    }

    pub fn link(&self, io_type: &str) -> Option<&Link> {
        self.links.get(io_type)
    }

    /// IO pad area of a block: outgoing bundles weighted by transmitter area
    /// plus incoming bundles weighted by receiver area.
    pub fn io_area(&self, name: &str) -> f64 {
        let Some(b) = self.block_index(name) else {
            return 0.0;
        };
        self.links
            .values()
            .map(|link| {
                let outgoing = link.adjacency.row(b).sum();
                let incoming = link.adjacency.column(b).sum();
                outgoing * link.io.tx_area() + incoming * link.io.rx_area()
            })
            .sum()
    }

    /// Signal pads of `name` towards every block outside `internal`.
    ///
    /// `internal` lists the blocks of the subtree being packaged together;
    /// wires between them never leave the package and need no pads.
    pub fn signal_count(&self, name: &str, internal: &[String]) -> SignalCount {
        let mut count = SignalCount::default();
        let Some(b) = self.block_index(name) else {
            log::debug!("{} is not a netlist block, no signal pads", name);
            return count;
        };
        let internal = self.index_set(internal);
        for link in self.links.values() {
            let weight = f64::from(link.io.wire_count()) * link.io.bidirectional_factor();
            for j in (0..self.blocks.len()).filter(|j| !internal.contains(j)) {
                let bundles = link.adjacency[(b, j)] + link.adjacency[(j, b)];
                count.add(link.io.reach(), bundles * weight);
            }
        }
        count
    }

    /// IO power of `name` towards every block outside `internal`.
    pub fn signal_power(&self, name: &str, internal: &[String]) -> f64 {
        let Some(b) = self.block_index(name) else {
            return 0.0;
        };
        let internal = self.index_set(internal);
        self.links
            .values()
            .map(|link| {
                let weighted: f64 = (0..self.blocks.len())
                    .filter(|j| !internal.contains(j))
                    .map(|j| {
                        link.adjacency[(b, j)] * link.utilization[(b, j)]
                            + link.adjacency[(j, b)] * link.utilization[(j, b)]
                    })
                    .sum();
                weighted * link.io.bandwidth() * link.io.energy_per_bit() * link.io.bidirectional_factor()
            })
            .sum()
    }

    fn index_set(&self, names: &[String]) -> HashSet<usize> {
        names.iter().filter_map(|n| self.block_index(n)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::InterconnectParams;

    fn io(name: &str, reach: f64, bidirectional: bool) -> Arc<InterconnectType> {
        Arc::new(
            InterconnectType::new(
                name,
                InterconnectParams {
                    rx_area: 0.01,
                    tx_area: 0.02,
                    bandwidth: 10.0,
                    wire_count: 8,
                    bidirectional,
                    energy_per_bit: 0.5,
                    reach,
                    ..Default::default()
                },
            )
            .unwrap(),
        )
    }

    // a -> b: 2 bundles, b -> a: 1 bundle, a -> c: 3 bundles
    fn model() -> InterconnectModel {
        let mut m = InterconnectModel::new(["a", "b", "c"]).unwrap();
        let adj = DMatrix::from_row_slice(3, 3, &[0.0, 2.0, 3.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let util = DMatrix::from_element(3, 3, 0.5);
        m.add_link(io("ucie", 2.0, false), adj, Some(util)).unwrap();
        m
    }

    #[test]
    fn test_block_index() {
        let m = model();
        assert_eq!(m.block_index("c"), Some(2));
        assert_eq!(m.block_index("interposer"), None);
        assert_eq!(m.num_blocks(), 3);
    }

    #[test]
    fn test_io_area_row_and_column() {
        let m = model();
        // outgoing 5 * 0.02 + incoming 1 * 0.01
        assert!((m.io_area("a") - 0.11).abs() < 1e-12);
        // outgoing 1 * 0.02 + incoming 2 * 0.01
        assert!((m.io_area("b") - 0.04).abs() < 1e-12);
        assert_eq!(m.io_area("missing"), 0.0);
    }

    #[test]
    fn test_signal_count_excludes_internal() {
        let m = model();
        let all = m.signal_count("a", &[]);
        assert!((all.total - 6.0 * 8.0).abs() < 1e-12);

        let internal = vec!["a".to_string(), "b".to_string()];
        let external = m.signal_count("a", &internal);
        assert!((external.total - 3.0 * 8.0).abs() < 1e-12);
        assert_eq!(external.by_reach.len(), 1);
        assert_eq!(external.by_reach[0].reach, 2.0);
    }

    #[test]
    fn test_signal_count_buckets_sorted() {
        let mut m = model();
        let adj = DMatrix::from_row_slice(3, 3, &[0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        m.add_link(io("serdes", 0.5, true), adj, None).unwrap();
        let count = m.signal_count("a", &[]);
        let reaches: Vec<f64> = count.by_reach.iter().map(|b| b.reach).collect();
        assert_eq!(reaches, vec![0.5, 2.0]);
        assert!((count.by_reach[0].signals - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_missing_block_has_no_signals() {
        let m = model();
        let count = m.signal_count("interposer", &[]);
        assert_eq!(count.total, 0.0);
        assert!(count.by_reach.is_empty());
        assert_eq!(m.signal_power("interposer", &[]), 0.0);
    }

    #[test]
    fn test_signal_power() {
        let m = model();
        // (2 + 3 + 1) * 0.5 * 10 * 0.5
        assert!((m.signal_power("a", &[]) - 15.0).abs() < 1e-12);
        let internal = vec!["a".to_string(), "c".to_string()];
        // only a<->b remains: (2 + 1) * 0.5 * 10 * 0.5
        assert!((m.signal_power("a", &internal) - 7.5).abs() < 1e-12);
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut m = InterconnectModel::new(["a", "b"]).unwrap();
        let err = m.add_link(io("x", 1.0, false), DMatrix::zeros(3, 3), None).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { expected: 2, rows: 3, .. }));
    }

    #[test]
    fn test_duplicate_block_names() {
        assert!(InterconnectModel::new(["a", "a"]).is_err());
    }
}
