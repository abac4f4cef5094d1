//! Dense 2D height grid with cached value bounds.

/// A fixed-size grid of heights stored row-major (`index = y * width + x`).
///
/// The cached `min_value`/`max_value` always enclose every cell: [`Heightfield::set`]
/// widens them, and [`Heightfield::recompute_bounds`] tightens them again after
/// bulk edits such as stitching.
#[derive(Clone, Debug, PartialEq)]
pub struct Heightfield {
    width: usize,
    height: usize,
    values: Vec<f32>,
    min_value: f32,
    max_value: f32,
}

impl Heightfield {
    /// Create a grid with every cell set to `value`.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    pub fn filled(width: usize, height: usize, value: f32) -> Self {
        assert!(width > 0 && height > 0, "heightfield dimensions must be non-zero");
        Self {
            width,
            height,
            values: vec![value; width * height],
            min_value: value,
            max_value: value,
        }
    }

    /// Wrap an existing row-major buffer, computing its bounds.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero or `values.len() != width * height`.
    pub fn from_values(width: usize, height: usize, values: Vec<f32>) -> Self {
        assert!(width > 0 && height > 0, "heightfield dimensions must be non-zero");
        assert_eq!(
            values.len(),
            width * height,
            "expected {}x{} values, got {}",
            width,
            height,
            values.len()
        );
        let mut field = Self {
            width,
            height,
            values,
            min_value: 0.0,
            max_value: 0.0,
        };
        field.recompute_bounds();
        field
    }

    /// Build a grid by evaluating `f(x, y)` for every cell.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> f32) -> Self {
        let mut values = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                values.push(f(x, y));
            }
        }
        Self::from_values(width, height, values)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns `(width, height)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Returns `true` if `other` has the same width and height.
    pub fn same_dimensions(&self, other: &Heightfield) -> bool {
        self.dimensions() == other.dimensions()
    }

    /// Height at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the grid.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.values[self.index(x, y)]
    }

    /// Overwrite one cell and widen the cached bounds to include it.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the grid.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        let index = self.index(x, y);
        self.values[index] = value;
        self.min_value = self.min_value.min(value);
        self.max_value = self.max_value.max(value);
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        assert!(
            x < self.width && y < self.height,
            "({x}, {y}) is outside the {}x{} heightfield",
            self.width,
            self.height
        );
        y * self.width + x
    }

    /// Row-major cell values.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// One row of the grid.
    pub fn row(&self, y: usize) -> &[f32] {
        &self.values[y * self.width..(y + 1) * self.width]
    }

    pub fn min_value(&self) -> f32 {
        self.min_value
    }

    pub fn max_value(&self) -> f32 {
        self.max_value
    }

    /// Recalculate the cached bounds from the current cell values.
    pub fn recompute_bounds(&mut self) {
        let (min, max) = self
            .values
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        self.min_value = min;
        self.max_value = max;
    }

    /// Apply `f` to every cell in place, then refresh the bounds.
    pub fn map_in_place(&mut self, mut f: impl FnMut(usize, usize, f32) -> f32) {
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = y * self.width + x;
                self.values[idx] = f(x, y, self.values[idx]);
            }
        }
        self.recompute_bounds();
    }

    /// Returns `true` if the cached bounds enclose every cell.
    pub fn bounds_hold(&self) -> bool {
        self.values
            .iter()
            .all(|&v| self.min_value <= v && v <= self.max_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_values_computes_bounds() {
        let field = Heightfield::from_values(2, 2, vec![0.5, -1.0, 3.0, 0.0]);
        assert_eq!(field.min_value(), -1.0);
        assert_eq!(field.max_value(), 3.0);
        assert!(field.bounds_hold());
    }

    #[test]
    fn test_row_major_layout() {
        let field = Heightfield::from_fn(3, 2, |x, y| (y * 10 + x) as f32);
        assert_eq!(field.get(2, 1), 12.0);
        assert_eq!(field.row(1), &[10.0, 11.0, 12.0]);
    }

    #[test]
    fn test_set_widens_bounds() {
        let mut field = Heightfield::filled(4, 4, 1.0);
        field.set(1, 1, 5.0);
        field.set(2, 2, -2.0);
        assert_eq!(field.max_value(), 5.0);
        assert_eq!(field.min_value(), -2.0);
    }

    #[test]
    fn test_recompute_tightens_bounds() {
        let mut field = Heightfield::filled(4, 4, 1.0);
        field.set(0, 0, 9.0);
        field.set(0, 0, 1.0);
        assert_eq!(field.max_value(), 9.0, "set never shrinks bounds");
        field.recompute_bounds();
        assert_eq!(field.max_value(), 1.0);
    }

    #[test]
    fn test_map_in_place_refreshes_bounds() {
        let mut field = Heightfield::from_fn(4, 1, |x, _| x as f32);
        field.map_in_place(|_, _, v| v * 2.0);
        assert_eq!(field.max_value(), 6.0);
        assert!(field.bounds_hold());
    }

    #[test]
    #[should_panic(expected = "expected 2x2 values")]
    fn test_from_values_rejects_wrong_length() {
        let _ = Heightfield::from_values(2, 2, vec![0.0; 3]);
    }

    #[test]
    #[should_panic(expected = "outside the 3x2 heightfield")]
    fn test_get_rejects_column_past_width() {
        // (3, 0) would alias (0, 1) in a row-major buffer.
        let field = Heightfield::filled(3, 2, 0.0);
        let _ = field.get(3, 0);
    }

    #[test]
    #[should_panic(expected = "outside the 3x2 heightfield")]
    fn test_set_rejects_column_past_width() {
        let mut field = Heightfield::filled(3, 2, 0.0);
        field.set(3, 0, 1.0);
    }
}
