//! Die and wafer geometry.
//!
//! Closed-form helpers shared by the layer cost model and the chip area
//! model: rectangle inflation, reticle counting and the two dies-per-wafer
//! packing heuristics.

/// Area of a rectangle with the given area and aspect ratio after adding
/// `border` on every side.
///
/// The rectangle has sides `x = sqrt(area * aspect_ratio)` and
/// `y = sqrt(area / aspect_ratio)`.
pub fn expanded_area(area: f64, border: f64, aspect_ratio: f64) -> f64 {
    let x = (area * aspect_ratio).sqrt();
    let y = (area / aspect_ratio).sqrt();
    (x + 2.0 * border) * (y + 2.0 * border)
}

/// Side lengths `(x, y)` of a rectangle with the given area and aspect ratio.
pub fn die_sides(area: f64, aspect_ratio: f64) -> (f64, f64) {
    ((area * aspect_ratio).sqrt(), (area / aspect_ratio).sqrt())
}

/// Estimate how many reticle fields a die spans and how many stitches join
/// them.
///
/// Reticles are arranged as the largest perfect square that fits, with the
/// remainder appended along its edges. This is a bin-packing approximation,
/// not an exact layout.
pub fn number_of_reticles(area: f64, reticle_x: f64, reticle_y: f64) -> (u64, u64) {
    let reticles = (area / (reticle_x * reticle_y)).ceil().max(1.0) as u64;
    let side = (reticles as f64).sqrt().floor() as u64;
    let remainder = reticles - side * side;
    let stitches = side * (side - 1) * 2 + 2 * remainder - remainder.div_ceil(side);
    (reticles, stitches)
}

/// Dies per wafer when every row is packed independently ("line fill").
///
/// `x`, `y` are die dimensions, `diameter` the usable wafer diameter and
/// `dicing` the street width. Two arrangements are evaluated, one with a
/// row centred on the wafer diameter and one with two rows straddling it,
/// and the better count is returned.
pub fn dies_per_wafer_line(x: f64, y: f64, diameter: f64, dicing: f64) -> u64 {
    let xe = x + dicing;
    let ye = y + dicing;
    let r = diameter * 0.5;
    let hd = dicing * 0.5;
    // Dies fitting in the chord at height `h` (measured to the row edge
    // nearest the centre).
    let row = |h: f64| -> u64 {
        let chord = (r * r - (h - hd) * (h - hd)).sqrt() * 2.0 + dicing;
        (chord / xe).floor() as u64
    };

    // Centre row straddles the diameter.
    let mut h = ye * 0.5;
    if h - hd >= r {
        return 0;
    }
    let mut centred = row(h);
    h += ye;
    while h < r && h - hd < r {
        centred += 2 * row(h);
        h += ye;
    }

    // Two rows meet on the diameter.
    let mut h = ye;
    if h - hd >= r {
        return centred;
    }
    let mut split = 2 * row(h);
    h += ye;
    while h < r && h - hd < r {
        split += 2 * row(h);
        h += ye;
    }

    centred.max(split)
}

/// Dies per wafer when columns stay aligned across rows ("grid fill").
///
/// Every possible height of the central block of rows is tried. For each,
/// the central block is as wide as its narrowest chord allows, a partial
/// column is added where it still fits, and the rows above and below are
/// snapped to the same column grid. The best count is returned.
pub fn dies_per_wafer_grid(x: f64, y: f64, diameter: f64, dicing: f64) -> u64 {
    if x <= 0.0 || y <= 0.0 || diameter <= 0.0 {
        return 0;
    }
    let r = diameter * 0.5;
    let r2 = r * r;
    let xe = x + dicing;
    let ye = y + dicing;
    let hxe = xe * 0.5;
    let hye = ye * 0.5;
    let hd = dicing * 0.5;

    let centre_chord = (r2 - (hxe - hd) * (hxe - hd)).sqrt() * 2.0;
    let max_rows = (centre_chord / hye).ceil() as i64 + 1;

    let mut best = 0;
    for rows in 1..max_rows {
        let rows_f = rows as f64;
        let half_height = rows_f * hye - hd;
        if half_height >= r {
            continue;
        }
        let chord = 2.0 * (r2 - half_height * half_height).sqrt();
        let columns = ((chord + dicing) / xe).trunc() as i64;
        if columns <= 0 {
            continue;
        }
        let mut dies = columns * rows;

        // One more column at the right edge, row by row.
        let next_row = half_height + ye;
        let edge = columns as f64 * xe - chord * 0.5 + xe;
        for i in 0..rows {
            let yy = ye * i as f64 - next_row + ye;
            if edge * edge + yy * yy > r2 {
                continue;
            }
            let top = yy + ye;
            if edge * edge + top * top <= r2 {
                dies += 1;
            }
        }

        // Rows above and below the central block, aligned to its columns.
        let start = (diameter - chord) * 0.5;
        let mut h = next_row;
        while h < r && h * h < r2 {
            let row_chord = 2.0 * (r2 - h * h).sqrt();
            let left = (diameter - row_chord) * 0.5;
            let snapped = ((left - start) / xe).ceil() * xe + start;
            let usable = row_chord - (snapped - left);
            if usable > 0.0 {
                dies += 2 * (usable / xe).trunc() as i64;
            }
            h += ye;
        }

        best = best.max(dies);
    }
    best.max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expanded_area() {
        assert!((expanded_area(10.0, 0.1, 1.0) - 11.304911064067355).abs() < 1e-9);
        assert!((expanded_area(10.0, 0.1, 0.8) - 11.312792206135788).abs() < 1e-9);
        assert!((expanded_area(9.0, 1.0, 1.0) - 25.0).abs() < 1e-9);
        assert!((expanded_area(100.0, 0.7, 2.0) - 131.65848480983502).abs() < 1e-9);
    }

    #[test]
    fn test_expanded_area_zero() {
        // A zero-area die still occupies its border.
        assert!((expanded_area(0.0, 0.3, 1.0) - 0.36).abs() < 1e-12);
    }

    #[test]
    fn test_number_of_reticles() {
        assert_eq!(number_of_reticles(100.0, 32.0, 23.0), (1, 0));
        assert_eq!(number_of_reticles(1000.0, 32.0, 23.0), (2, 1));
        // 4 reticles form a 2x2 square with 4 stitches.
        assert_eq!(number_of_reticles(4.0 * 736.0, 32.0, 23.0), (4, 4));
    }

    #[test]
    fn test_dies_per_wafer_line() {
        assert_eq!(dies_per_wafer_line(10.0, 10.0, 300.0, 1.0), 550);
        assert_eq!(dies_per_wafer_line(1.0, 1.0, 300.0, 1.0), 17590);
        assert_eq!(dies_per_wafer_line(100.0, 100.0, 300.0, 1.0), 4);
        assert_eq!(dies_per_wafer_line(10.0, 10.0, 100.0, 1.0), 52);
        assert_eq!(dies_per_wafer_line(10.0, 10.0, 300.0, 0.1), 651);
        assert_eq!(dies_per_wafer_line(10.0, 10.0, 300.0, 2.0), 462);
    }

    #[test]
    fn test_dies_per_wafer_grid() {
        assert_eq!(dies_per_wafer_grid(10.0, 10.0, 300.0, 1.0), 540);
        assert_eq!(dies_per_wafer_grid(1.0, 1.0, 300.0, 1.0), 17470);
        assert_eq!(dies_per_wafer_grid(100.0, 100.0, 300.0, 1.0), 4);
        assert_eq!(dies_per_wafer_grid(10.0, 10.0, 100.0, 1.0), 52);
        assert_eq!(dies_per_wafer_grid(10.0, 10.0, 300.0, 0.1), 639);
        assert_eq!(dies_per_wafer_grid(10.0, 10.0, 300.0, 2.0), 452);
    }

    #[test]
    fn test_large_die_grid_stays_geometric() {
        // Dies a quarter of the wafer wide or more: the count comes from the
        // chord search alone and stays under the wafer-to-die area ratio.
        for (side, expected) in [(80.0, 6), (100.0, 4)] {
            let dies = dies_per_wafer_grid(side, side, 300.0, 1.0);
            assert_eq!(dies, expected);
            let bound = (std::f64::consts::PI * 150.0 * 150.0 / ((side + 1.0) * (side + 1.0))).floor();
            assert!((dies as f64) <= bound);
        }
        // Two rows of three 101 mm cells need a 303 mm chord.
        assert!(dies_per_wafer_grid(100.0, 100.0, 300.0, 1.0) < 6);
    }

    #[test]
    fn test_degenerate_grid_inputs() {
        assert_eq!(dies_per_wafer_grid(0.0, 10.0, 300.0, 1.0), 0);
        assert_eq!(dies_per_wafer_grid(10.0, 10.0, 0.0, 1.0), 0);
    }
}
