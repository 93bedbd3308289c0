//! Bond pad grid sizing.
//!
//! Signal pads must sit within their interconnect's reach of the die edge,
//! so short-reach pads confine the usable pad area to a band along the
//! perimeter. Reach classes are processed from shortest to longest, growing
//! a working rectangle until each cumulative pad count fits its band. A
//! final pass grows the rectangle to also hold power and test pads.

use chipcost_core::ReachCount;

use crate::error::{Error, Result};

/// A rectangular grid of bond pads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PadGrid {
    /// Pad columns.
    pub grid_x: u64,
    /// Pad rows.
    pub grid_y: u64,
    /// Pad pitch (mm).
    pub pitch: f64,
}

impl PadGrid {
    /// Area covered by the grid (mm²).
    pub fn area(&self) -> f64 {
        self.grid_x as f64 * self.grid_y as f64 * self.pitch * self.pitch
    }
}

/// Inputs to the pad grid estimate of one chip.
#[derive(Debug, Clone, Copy)]
pub struct PadRequirements<'a> {
    /// Signal pads grouped by reach, ascending.
    pub by_reach: &'a [ReachCount],
    /// All pads: signal, power and test.
    pub total_pads: f64,
    /// Bond pitch of the carrier the chip is bonded to (mm).
    pub pitch: f64,
    /// Die separation of the carrier the chip is bonded to (mm).
    pub die_separation: f64,
    pub aspect_ratio: f64,
}

/// Size the pad grid for `chip`.
pub fn pad_grid(chip: &str, req: &PadRequirements<'_>) -> Result<PadGrid> {
    let pitch = req.pitch;
    let ar = req.aspect_ratio;
    let area_per_pad = pitch * pitch;
    let snap = |v: f64| (v / pitch).ceil() * pitch;

    let mut current_x = 0.0_f64;
    let mut current_y = 0.0_f64;
    let mut count = 0.0;
    for bucket in req.by_reach {
        let band = bucket.reach - req.die_separation;
        // A zero-width band can hold no pads at all.
        if band < 0.0 || (band == 0.0 && bucket.signals > 0.0) {
            return Err(Error::ReachBelowSeparation {
                chip: chip.to_string(),
                reach: bucket.reach,
                die_separation: req.die_separation,
            });
        }
        count += bucket.signals;
        let required = count * area_per_pad;

        let usable = if band < current_x && band < current_y {
            band * (current_x + current_y) - band * band
        } else {
            current_x * current_y
        };
        if usable > required {
            continue;
        }

        let required_x = (required * ar).sqrt();
        let required_y = (required / ar).sqrt();
        let (new_x, new_y) = if required_x > band && required_y > band {
            // Smallest rectangle of this aspect ratio whose perimeter band
            // holds the required area.
            let y = (2.0 * required / band + 2.0 * band) / (2.0 * ar + 2.0);
            (ar * y, y)
        } else {
            (required_x, required_y)
        };
        current_x = current_x.max(snap(new_x));
        current_y = current_y.max(snap(new_y));
    }

    let required = area_per_pad * req.total_pads;
    let (grid_x, grid_y) = if required <= current_x * current_y {
        (cells(current_x, pitch), cells(current_y, pitch))
    } else if current_x < current_y && current_y * current_y <= required {
        (cells(required / current_y, pitch), cells(current_y, pitch))
    } else if current_y < current_x && current_x * current_x <= required {
        (cells(current_x, pitch), cells(required / current_x, pitch))
    } else {
        let side = cells(required.sqrt(), pitch);
        (side, side)
    };

    Ok(PadGrid {
        grid_x,
        grid_y,
        pitch,
    })
}

fn cells(length: f64, pitch: f64) -> u64 {
    (length / pitch).ceil() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(by_reach: &[ReachCount], total_pads: f64) -> PadRequirements<'_> {
        PadRequirements {
            by_reach,
            total_pads,
            pitch: 0.5,
            die_separation: 0.2,
            aspect_ratio: 1.0,
        }
    }

    #[test]
    fn test_power_pads_only() {
        // 306 pads at 0.5 mm pitch: side sqrt(76.5) rounds up to 18 pads.
        let grid = pad_grid("c", &req(&[], 306.0)).unwrap();
        assert_eq!((grid.grid_x, grid.grid_y), (18, 18));
        assert!((grid.area() - 81.0).abs() < 1e-12);
    }

    #[test]
    fn test_no_pads() {
        let grid = pad_grid("c", &req(&[], 0.0)).unwrap();
        assert_eq!(grid.area(), 0.0);
    }

    #[test]
    fn test_long_reach_fills_square() {
        // Reach wider than the die: the whole rectangle is usable.
        let buckets = [ReachCount {
            reach: 100.0,
            signals: 100.0,
        }];
        let grid = pad_grid("c", &req(&buckets, 100.0)).unwrap();
        // sqrt(25) = 5 mm = 10 pads per side
        assert_eq!((grid.grid_x, grid.grid_y), (10, 10));
    }

    #[test]
    fn test_short_reach_grows_perimeter() {
        // 0.5 mm band, 400 pads = 100 mm² of pads.
        let buckets = [ReachCount {
            reach: 0.7,
            signals: 400.0,
        }];
        let grid = pad_grid("c", &req(&buckets, 400.0)).unwrap();
        // y = (2*100/0.5 + 2*0.5) / 4 = 100.25 -> 100.5 after snapping
        assert_eq!((grid.grid_x, grid.grid_y), (201, 201));
        let unconstrained = pad_grid(
            "c",
            &req(
                &[ReachCount {
                    reach: 100.0,
                    signals: 400.0,
                }],
                400.0,
            ),
        )
        .unwrap();
        assert!(grid.area() > unconstrained.area());
    }

    #[test]
    fn test_reach_below_separation() {
        let buckets = [ReachCount {
            reach: 0.1,
            signals: 4.0,
        }];
        let err = pad_grid("c", &req(&buckets, 4.0)).unwrap_err();
        assert!(matches!(err, Error::ReachBelowSeparation { .. }));
    }

    #[test]
    fn test_reach_equal_to_separation() {
        let buckets = [ReachCount {
            reach: 0.2,
            signals: 40.0,
        }];
        let err = pad_grid("c", &req(&buckets, 40.0)).unwrap_err();
        assert!(matches!(err, Error::ReachBelowSeparation { .. }));

        // Without signals in that class the band is never used.
        let empty = [ReachCount {
            reach: 0.2,
            signals: 0.0,
        }];
        let grid = pad_grid("c", &req(&empty, 4.0)).unwrap();
        assert_eq!((grid.grid_x, grid.grid_y), (2, 2));
    }

    #[test]
    fn test_area_of_large_grid() {
        let grid = PadGrid {
            grid_x: u64::MAX,
            grid_y: 2,
            pitch: 1.0,
        };
        assert!(grid.area() > 1e19);
    }

    #[test]
    fn test_power_pads_extend_long_side() {
        // Tall rectangle from signals, then power pads widen it.
        let buckets = [ReachCount {
            reach: 100.0,
            signals: 16.0,
        }];
        let mut r = req(&buckets, 64.0);
        r.aspect_ratio = 0.25;
        let grid = pad_grid("c", &r).unwrap();
        // signals: 4 mm² -> 1 x 4 mm; all pads: 16 mm² > 4*4 -> square 4 x 4 mm
        assert_eq!((grid.grid_x, grid.grid_y), (8, 8));
    }
}
