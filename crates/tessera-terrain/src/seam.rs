//! Seam stitching between independently generated tiles.
//!
//! [`stitch_edge`] fits a quadratic trend through the cells approaching a shared
//! border from both sides, takes the trend value at the border as the seam
//! height, and ramps each side toward a second quadratic through (far cell, seam,
//! far cell on the other side). Both border lines end up bit-identical.
//!
//! [`stitch_tiles`] runs every edge stitch of a tile set, then re-aligns shared
//! lines perturbed by perpendicular stitches, then forces the four copies of each
//! tile corner to one value. Corner repair always runs last.

use hashbrown::{HashMap, HashSet};

use crate::heightfield::Heightfield;
use crate::tile::{Neighbor, Side, TileCoord};

/// Heightfields of adjacent tiles keyed by coordinate.
pub type TileSet = HashMap<TileCoord, Heightfield>;

/// A set of tile coordinates.
pub type TileCoordSet = HashSet<TileCoord>;

/// Value chosen for the four copies of a shared tile corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CornerStatistic {
    #[default]
    Max,
    Min,
    Mean,
}

impl CornerStatistic {
    /// Combine corner heights given in north-west, north-east, south-west,
    /// south-east order.
    pub fn combine(self, values: &[f32]) -> f32 {
        match self {
            CornerStatistic::Max => values.iter().copied().fold(f32::NEG_INFINITY, f32::max),
            CornerStatistic::Min => values.iter().copied().fold(f32::INFINITY, f32::min),
            CornerStatistic::Mean => values.iter().sum::<f32>() / values.len() as f32,
        }
    }
}

/// Parameters of a tile-set stitch pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StitchSettings {
    /// Cells on each side of a border that are blended.
    pub blend_width: usize,
    /// How the four copies of a shared corner are combined in the final repair.
    pub corner: CornerStatistic,
}

impl Default for StitchSettings {
    fn default() -> Self {
        Self {
            blend_width: 3,
            corner: CornerStatistic::Max,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Axis {
    /// First tile is west of the second; lines are rows.
    Horizontal,
    /// First tile is north of the second; lines are columns.
    Vertical,
}

/// Cell of a tile at distance `depth` from the shared border on line `line`.
#[inline]
fn border_cell(field: &Heightfield, axis: Axis, first: bool, line: usize, depth: usize) -> (usize, usize) {
    let (w, h) = field.dimensions();
    match (axis, first) {
        (Axis::Horizontal, true) => (w - 1 - depth, line),
        (Axis::Horizontal, false) => (depth, line),
        (Axis::Vertical, true) => (line, h - 1 - depth),
        (Axis::Vertical, false) => (line, depth),
    }
}

fn orient(side: Side) -> (Axis, bool) {
    // (axis, whether `a` is the first tile of the pair)
    match side {
        Side::Right => (Axis::Horizontal, true),
        Side::Left => (Axis::Horizontal, false),
        Side::Bottom => (Axis::Vertical, true),
        Side::Top => (Axis::Vertical, false),
    }
}

fn line_geometry(field: &Heightfield, axis: Axis) -> (usize, usize) {
    // (number of lines, cells per line perpendicular to the border)
    let (w, h) = field.dimensions();
    match axis {
        Axis::Horizontal => (h, w),
        Axis::Vertical => (w, h),
    }
}

/// Stitch the border between `a` and `b`, where `b` lies on `side` of `a`.
///
/// Cells farther than `blend_width` from the border are untouched. Bounds of
/// both fields are recomputed.
///
/// # Panics
///
/// Panics if the fields differ in size, if `blend_width` is zero, or if
/// `blend_width` is not smaller than the grid extent across the border.
pub fn stitch_edge(a: &mut Heightfield, b: &mut Heightfield, side: Side, blend_width: usize) {
    let (axis, a_first) = orient(side);
    let (first, second) = if a_first { (a, b) } else { (b, a) };
    stitch_oriented(first, second, axis, blend_width);
}

fn stitch_oriented(first: &mut Heightfield, second: &mut Heightfield, axis: Axis, k: usize) {
    assert!(
        first.same_dimensions(second),
        "cannot stitch {:?} against {:?}",
        first.dimensions(),
        second.dimensions()
    );
    let (lines, depth) = line_geometry(first, axis);
    assert!(
        k >= 1 && k < depth,
        "blend width {k} must be in 1..{depth}"
    );

    let mut near = vec![0.0; k + 1];
    let mut far = vec![0.0; k + 1];
    for line in 0..lines {
        for d in 0..=k {
            let (x, y) = border_cell(first, axis, true, line, d);
            near[d] = first.get(x, y);
            let (x, y) = border_cell(second, axis, false, line, d);
            far[d] = second.get(x, y);
        }
        stitch_line(&mut near, &mut far, k);
        for d in 0..=k {
            let (x, y) = border_cell(first, axis, true, line, d);
            first.set(x, y, near[d]);
            let (x, y) = border_cell(second, axis, false, line, d);
            second.set(x, y, far[d]);
        }
    }
    first.recompute_bounds();
    second.recompute_bounds();
}

/// Stitch one line. `near[d]` and `far[d]` are the cells at distance `d` from
/// the border on each side; both slices hold `k + 1` cells.
///
/// Positions along the fitted axis: `near[d]` sits at `k - d`, `far[d]` at `k + d`.
pub(crate) fn stitch_line(near: &mut [f32], far: &mut [f32], k: usize) {
    let kf = k as f64;
    let mut samples = Vec::with_capacity(2 * k + 1);
    for d in 0..k {
        samples.push(((k - d) as f64, near[d] as f64));
    }
    for (d, &v) in far.iter().enumerate().take(k + 1) {
        samples.push(((k + d) as f64, v as f64));
    }

    let seam = fit_trend(&samples).eval(kf);
    let trend = Trend::through(
        (1.0, near[k - 1] as f64),
        (kf, seam),
        (2.0 * kf, far[k] as f64),
    );

    for d in 0..k {
        let weight = (k - d) as f64 / kf;
        near[d] = (trend.eval((k - d) as f64) * weight + near[d] as f64 * (1.0 - weight)) as f32;
    }
    for d in 0..=k {
        let weight = (k - d) as f64 / kf;
        far[d] = (trend.eval((k + d) as f64) * weight + far[d] as f64 * (1.0 - weight)) as f32;
    }

    let seam = seam as f32;
    near[0] = seam;
    far[0] = seam;
}

/// A fitted curve along the stitch axis.
#[derive(Clone, Copy, Debug)]
enum Trend {
    /// `c[0] * p^2 + c[1] * p + c[2]`
    Quadratic([f64; 3]),
    /// Linear through two anchors on each side of `mid`.
    Piecewise {
        start: (f64, f64),
        mid: (f64, f64),
        end: (f64, f64),
    },
    Constant(f64),
}

impl Trend {
    fn eval(&self, p: f64) -> f64 {
        match *self {
            Trend::Quadratic([a, b, c]) => a * p * p + b * p + c,
            Trend::Piecewise { start, mid, end } => {
                let (from, to) = if p <= mid.0 { (start, mid) } else { (mid, end) };
                let span = to.0 - from.0;
                if span.abs() < f64::EPSILON {
                    to.1
                } else {
                    from.1 + (to.1 - from.1) * (p - from.0) / span
                }
            }
            Trend::Constant(v) => v,
        }
    }

    /// Exact quadratic through three points, or straight segments when two
    /// positions coincide.
    fn through(p0: (f64, f64), p1: (f64, f64), p2: (f64, f64)) -> Self {
        let m = [
            [p0.0 * p0.0, p0.0, 1.0],
            [p1.0 * p1.0, p1.0, 1.0],
            [p2.0 * p2.0, p2.0, 1.0],
        ];
        match solve3(m, [p0.1, p1.1, p2.1]) {
            Some(coeffs) => Trend::Quadratic(coeffs),
            None => Trend::Piecewise {
                start: p0,
                mid: p1,
                end: p2,
            },
        }
    }
}

/// Least-squares quadratic through `samples`, falling back to a line and then
/// to the mean when the normal equations are singular.
fn fit_trend(samples: &[(f64, f64)]) -> Trend {
    let mut s = [0.0f64; 5];
    let mut r = [0.0f64; 3];
    for &(p, v) in samples {
        let mut pk = 1.0;
        for sk in s.iter_mut() {
            *sk += pk;
            pk *= p;
        }
        r[0] += p * p * v;
        r[1] += p * v;
        r[2] += v;
    }
    let normal = [[s[4], s[3], s[2]], [s[3], s[2], s[1]], [s[2], s[1], s[0]]];
    if let Some(coeffs) = solve3(normal, r) {
        return Trend::Quadratic(coeffs);
    }

    let n = s[0];
    let det = n * s[2] - s[1] * s[1];
    if det.abs() > 1e-9 * (n * s[2]).abs().max(1.0) {
        let slope = (n * r[1] - s[1] * r[2]) / det;
        let intercept = (r[2] - slope * s[1]) / n;
        return Trend::Quadratic([0.0, slope, intercept]);
    }
    Trend::Constant(if n > 0.0 { r[2] / n } else { 0.0 })
}

fn det3(m: &[[f64; 3]; 3]) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

/// Cramer's rule; `None` when the determinant is negligible relative to the
/// product of the diagonal.
fn solve3(m: [[f64; 3]; 3], r: [f64; 3]) -> Option<[f64; 3]> {
    let det = det3(&m);
    let scale = (m[0][0] * m[1][1] * m[2][2]).abs();
    if det == 0.0 || det.abs() <= 1e-9 * scale {
        return None;
    }
    let mut out = [0.0; 3];
    for (col, slot) in out.iter_mut().enumerate() {
        let mut mc = m;
        for row in 0..3 {
            mc[row][col] = r[row];
        }
        *slot = det3(&mc) / det;
    }
    Some(out)
}

/// Set each shared border cell of `a` and `b` to the mean of its two copies.
///
/// # Panics
///
/// Panics if the fields differ in size.
pub fn sync_border(a: &mut Heightfield, b: &mut Heightfield, side: Side) {
    let (axis, a_first) = orient(side);
    let (first, second) = if a_first { (a, b) } else { (b, a) };
    assert!(
        first.same_dimensions(second),
        "cannot sync {:?} against {:?}",
        first.dimensions(),
        second.dimensions()
    );
    let (lines, _) = line_geometry(first, axis);
    for line in 0..lines {
        let (fx, fy) = border_cell(first, axis, true, line, 0);
        let (sx, sy) = border_cell(second, axis, false, line, 0);
        let value = (first.get(fx, fy) + second.get(sx, sy)) * 0.5;
        first.set(fx, fy, value);
        second.set(sx, sy, value);
    }
    first.recompute_bounds();
    second.recompute_bounds();
}

/// Run `f` on two distinct tiles of the set.
fn with_pair(tiles: &mut TileSet, a: TileCoord, b: TileCoord, f: impl FnOnce(&mut Heightfield, &mut Heightfield)) {
    let Some(mut second) = tiles.remove(&b) else {
        return;
    };
    if let Some(first) = tiles.get_mut(&a) {
        f(first, &mut second);
    }
    tiles.insert(b, second);
}

/// Adjacent pairs `(first, second, side)` with `second` east or south of `first`.
fn adjacent_pairs(tiles: &TileSet) -> Vec<(TileCoord, TileCoord, Side)> {
    let mut coords: Vec<TileCoord> = tiles.keys().copied().collect();
    coords.sort();
    coords
        .into_iter()
        .flat_map(|c| {
            [
                (c, c.neighbor(Neighbor::East), Side::Right),
                (c, c.neighbor(Neighbor::South), Side::Bottom),
            ]
        })
        .filter(|(_, other, _)| tiles.contains_key(other))
        .collect()
}

/// Force the copies of every tile corner touching `touched` to one value.
///
/// A corner is repaired when at least two of the four tiles around it are
/// present. Returns the tiles where a corner value changed.
pub fn repair_corners(
    tiles: &mut TileSet,
    touched: &TileCoordSet,
    statistic: CornerStatistic,
) -> TileCoordSet {
    let mut origins: Vec<TileCoord> = touched
        .iter()
        .flat_map(|&c| [c, c.offset(-1, 0), c.offset(0, -1), c.offset(-1, -1)])
        .collect();
    origins.sort();
    origins.dedup();

    let mut changed = TileCoordSet::new();
    let mut values = Vec::with_capacity(4);
    for origin in origins {
        // North-west, north-east, south-west, south-east around the shared point.
        let members = [
            (origin, true, true),
            (origin.offset(1, 0), false, true),
            (origin.offset(0, 1), true, false),
            (origin.offset(1, 1), false, false),
        ];

        values.clear();
        for &(coord, east_edge, south_edge) in &members {
            if let Some(field) = tiles.get(&coord) {
                let (x, y) = corner_cell(field, east_edge, south_edge);
                values.push(field.get(x, y));
            }
        }
        if values.len() < 2 {
            continue;
        }

        let target = statistic.combine(&values);
        for &(coord, east_edge, south_edge) in &members {
            if let Some(field) = tiles.get_mut(&coord) {
                let (x, y) = corner_cell(field, east_edge, south_edge);
                if field.get(x, y) != target {
                    field.set(x, y, target);
                    changed.insert(coord);
                }
            }
        }
    }
    changed
}

fn corner_cell(field: &Heightfield, east_edge: bool, south_edge: bool) -> (usize, usize) {
    let (w, h) = field.dimensions();
    (
        if east_edge { w - 1 } else { 0 },
        if south_edge { h - 1 } else { 0 },
    )
}

/// Repair every corner in the set.
pub fn repair_all_corners(tiles: &mut TileSet, statistic: CornerStatistic) -> TileCoordSet {
    let all: TileCoordSet = tiles.keys().copied().collect();
    repair_corners(tiles, &all, statistic)
}

/// Stitch every adjacent pair in `tiles`. Returns the tiles whose heights changed.
pub fn stitch_tiles(tiles: &mut TileSet, settings: &StitchSettings) -> TileCoordSet {
    let all: TileCoordSet = tiles.keys().copied().collect();
    stitch_tiles_touching(tiles, &all, settings)
}

/// Stitch only the pairs that include a tile from `dirty`.
///
/// Order: trend stitch of every selected pair, then border sync of every pair
/// whose shared line a perpendicular stitch may have moved, then corner repair
/// around every changed tile. Returns the tiles whose heights changed.
///
/// # Panics
///
/// Panics under the same conditions as [`stitch_edge`].
pub fn stitch_tiles_touching(
    tiles: &mut TileSet,
    dirty: &TileCoordSet,
    settings: &StitchSettings,
) -> TileCoordSet {
    let pairs = adjacent_pairs(tiles);

    let mut stitched_across_columns = TileCoordSet::new();
    let mut stitched_across_rows = TileCoordSet::new();
    for &(a, b, side) in &pairs {
        if dirty.contains(&a) || dirty.contains(&b) {
            with_pair(tiles, a, b, |fa, fb| stitch_edge(fa, fb, side, settings.blend_width));
            let stitched = if side == Side::Right {
                &mut stitched_across_columns
            } else {
                &mut stitched_across_rows
            };
            stitched.insert(a);
            stitched.insert(b);
        }
    }

    let mut touched: TileCoordSet = stitched_across_columns
        .union(&stitched_across_rows)
        .copied()
        .collect();
    for &(a, b, side) in &pairs {
        // A column border only moves when a row stitch ran on either tile, and
        // the other way round.
        let perturbing = if side == Side::Right {
            &stitched_across_rows
        } else {
            &stitched_across_columns
        };
        if perturbing.contains(&a) || perturbing.contains(&b) {
            with_pair(tiles, a, b, |fa, fb| sync_border(fa, fb, side));
            touched.insert(a);
            touched.insert(b);
        }
    }

    let repaired = repair_corners(tiles, &touched, settings.corner);
    touched.extend(repaired);
    tracing::debug!(
        dirty = dirty.len(),
        row_stitched = stitched_across_columns.len(),
        column_stitched = stitched_across_rows.len(),
        touched = touched.len(),
        "stitch pass complete"
    );
    for coord in &touched {
        if let Some(field) = tiles.get_mut(coord) {
            field.recompute_bounds();
        }
    }
    touched
}

#[cfg(test)]
mod tests {
    use super::*;

    fn max_border_diff(tiles: &TileSet) -> f32 {
        let mut worst = 0.0f32;
        for (a, b, side) in adjacent_pairs(tiles) {
            let fa = &tiles[&a];
            let fb = &tiles[&b];
            let (w, h) = fa.dimensions();
            match side {
                Side::Right => (0..h).for_each(|y| worst = worst.max((fa.get(w - 1, y) - fb.get(0, y)).abs())),
                _ => (0..w).for_each(|x| worst = worst.max((fa.get(x, h - 1) - fb.get(x, 0)).abs())),
            }
        }
        worst
    }

    #[test]
    fn test_constant_fields_meet_between_values() {
        let mut a = Heightfield::filled(5, 5, 1.0);
        let mut b = Heightfield::filled(5, 5, 2.0);
        stitch_edge(&mut a, &mut b, Side::Right, 2);

        for y in 0..5 {
            assert_eq!(a.get(4, y), b.get(0, y), "row {y} border not shared");
            let seam = a.get(4, y);
            assert!(seam > 1.0 && seam < 2.0, "seam {seam}");
            assert!((seam - 1.548_387).abs() < 1e-5, "seam {seam}");
            assert!((b.get(1, y) - 1.940_860).abs() < 1e-5, "ramp {}", b.get(1, y));
            // Untouched at the blend width and beyond.
            for x in 0..=2 {
                assert_eq!(a.get(x, y), 1.0);
                assert_eq!(b.get(x + 2, y), 2.0);
            }
        }
        assert!(a.bounds_hold() && b.bounds_hold());
    }

    #[test]
    fn test_left_side_mirrors_right() {
        let mut a = Heightfield::filled(5, 5, 1.0);
        let mut b = Heightfield::filled(5, 5, 2.0);
        stitch_edge(&mut b, &mut a, Side::Left, 2);
        assert!((a.get(4, 0) - 1.548_387).abs() < 1e-5);
        assert_eq!(a.get(4, 0), b.get(0, 0));
    }

    #[test]
    fn test_vertical_stitch_shares_row() {
        let mut top = Heightfield::from_fn(6, 6, |x, y| (x + y) as f32 * 0.1);
        let mut bottom = Heightfield::from_fn(6, 6, |x, y| 3.0 - (x * y) as f32 * 0.05);
        stitch_edge(&mut top, &mut bottom, Side::Bottom, 3);
        for x in 0..6 {
            assert_eq!(top.get(x, 5), bottom.get(x, 0), "column {x}");
        }

        let mut top2 = top.clone();
        let mut bottom2 = bottom.clone();
        stitch_edge(&mut bottom2, &mut top2, Side::Top, 3);
        for x in 0..6 {
            assert_eq!(top2.get(x, 5), bottom2.get(x, 0));
        }
    }

    #[test]
    fn test_continuous_ramp_is_preserved() {
        let mut a = Heightfield::from_fn(5, 3, |x, _| x as f32 * 0.1);
        let mut b = Heightfield::from_fn(5, 3, |x, _| (x + 4) as f32 * 0.1);
        let (before_a, before_b) = (a.clone(), b.clone());
        stitch_edge(&mut a, &mut b, Side::Right, 2);
        for (x, y) in [(3, 0), (4, 1), (0, 2)] {
            assert!((a.get(x, y) - before_a.get(x, y)).abs() < 1e-5);
            assert!((b.get(x, y) - before_b.get(x, y)).abs() < 1e-5);
        }
    }

    #[test]
    fn test_blend_width_one_uses_linear_fallback() {
        let mut a = Heightfield::filled(4, 2, 1.0);
        let mut b = Heightfield::filled(4, 2, 2.0);
        stitch_edge(&mut a, &mut b, Side::Right, 1);
        assert!((a.get(3, 0) - 1.5).abs() < 1e-6, "seam {}", a.get(3, 0));
        assert_eq!(a.get(3, 1), b.get(0, 1));
        assert_eq!(a.get(2, 0), 1.0);
        assert_eq!(b.get(1, 0), 2.0);
    }

    #[test]
    #[should_panic(expected = "cannot stitch")]
    fn test_mismatched_dimensions_panic() {
        let mut a = Heightfield::filled(5, 5, 0.0);
        let mut b = Heightfield::filled(5, 6, 0.0);
        stitch_edge(&mut a, &mut b, Side::Right, 2);
    }

    #[test]
    #[should_panic(expected = "blend width")]
    fn test_blend_wider_than_grid_panics() {
        let mut a = Heightfield::filled(4, 4, 0.0);
        let mut b = Heightfield::filled(4, 4, 0.0);
        stitch_edge(&mut a, &mut b, Side::Right, 4);
    }

    #[test]
    fn test_corner_repair_takes_max() {
        let mut tiles = TileSet::new();
        let corners = [
            (TileCoord::new(0, 0), (2, 2), 0.1),
            (TileCoord::new(1, 0), (0, 2), 0.5),
            (TileCoord::new(0, 1), (2, 0), 0.3),
            (TileCoord::new(1, 1), (0, 0), 0.9),
        ];
        for &(coord, (x, y), value) in &corners {
            let mut field = Heightfield::filled(3, 3, 0.0);
            field.set(x, y, value);
            tiles.insert(coord, field);
        }
        repair_all_corners(&mut tiles, CornerStatistic::Max);
        for &(coord, (x, y), _) in &corners {
            assert_eq!(tiles[&coord].get(x, y), 0.9, "{coord}");
        }
    }

    #[test]
    fn test_corner_statistics() {
        let values = [0.1, 0.5, 0.3, 0.9];
        assert_eq!(CornerStatistic::Max.combine(&values), 0.9);
        assert_eq!(CornerStatistic::Min.combine(&values), 0.1);
        assert!((CornerStatistic::Mean.combine(&values) - 0.45).abs() < 1e-6);
    }

    #[test]
    fn test_stitch_tiles_leaves_no_discontinuity() {
        let mut tiles = TileSet::new();
        for y in 0..3 {
            for x in 0..3 {
                let base = ((x * 3 + y) % 4) as f32;
                let field = Heightfield::from_fn(9, 9, |cx, cy| base + (cx * cy) as f32 * 0.01);
                tiles.insert(TileCoord::new(x, y), field);
            }
        }
        let touched = stitch_tiles(
            &mut tiles,
            &StitchSettings {
                blend_width: 3,
                corner: CornerStatistic::Max,
            },
        );
        assert_eq!(touched.len(), 9);
        assert_eq!(max_border_diff(&tiles), 0.0);

        let centre = &tiles[&TileCoord::new(1, 1)];
        let corner = centre.get(8, 8);
        assert_eq!(tiles[&TileCoord::new(2, 1)].get(0, 8), corner);
        assert_eq!(tiles[&TileCoord::new(1, 2)].get(8, 0), corner);
        assert_eq!(tiles[&TileCoord::new(2, 2)].get(0, 0), corner);
        assert!(tiles.values().all(Heightfield::bounds_hold));
    }

    #[test]
    fn test_touching_only_stitches_dirty_pairs() {
        let mut tiles = TileSet::new();
        for x in 0..2 {
            tiles.insert(TileCoord::new(x, 0), Heightfield::filled(6, 6, x as f32));
        }
        stitch_tiles(&mut tiles, &StitchSettings::default());
        let settled = tiles[&TileCoord::new(0, 0)].clone();

        tiles.insert(TileCoord::new(2, 0), Heightfield::filled(6, 6, 2.0));
        let mut dirty = TileCoordSet::new();
        dirty.insert(TileCoord::new(2, 0));
        let touched = stitch_tiles_touching(&mut tiles, &dirty, &StitchSettings::default());

        assert!(!touched.contains(&TileCoord::new(0, 0)), "{touched:?}");
        assert_eq!(tiles[&TileCoord::new(0, 0)], settled);
        assert!(touched.contains(&TileCoord::new(1, 0)));
        assert!(touched.contains(&TileCoord::new(2, 0)));
        for y in 0..6 {
            assert_eq!(
                tiles[&TileCoord::new(1, 0)].get(5, y),
                tiles[&TileCoord::new(2, 0)].get(0, y)
            );
            assert_eq!(
                tiles[&TileCoord::new(0, 0)].get(5, y),
                tiles[&TileCoord::new(1, 0)].get(0, y)
            );
        }
    }
}
