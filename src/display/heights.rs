//! Per-line pixel heights with prefix sums.
//!
//! Backed by a Fenwick tree so that height-at-line and line-at-height stay
//! logarithmic on large documents. Structural edits rebuild the tree.

/// Heights of every logical line of a document.
///
/// Continuation lines of a fold and hidden lines have height zero; the
/// start of a folded visual line carries the height of the whole visual line.
#[derive(Clone, Debug, Default)]
pub struct HeightMap {
    first: usize,
    heights: Vec<f64>,
    tree: Vec<f64>,
}

impl HeightMap {
    /// `count` lines of `height` starting at `first`.
    #[must_use]
    pub fn new(first: usize, count: usize, height: f64) -> Self {
        let mut map = Self {
            first,
            heights: vec![height; count],
            tree: Vec::new(),
        };
        map.rebuild();
        map
    }

    #[must_use]
    pub fn first(&self) -> usize {
        self.first
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.heights.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    pub fn set_first(&mut self, first: usize) {
        self.first = first;
    }

    fn slot(&self, line: usize) -> Option<usize> {
        line.checked_sub(self.first)
            .filter(|&i| i < self.heights.len())
    }

    #[must_use]
    pub fn height(&self, line: usize) -> f64 {
        self.slot(line).map_or(0.0, |i| self.heights[i])
    }

    pub fn set_height(&mut self, line: usize, height: f64) {
        let Some(i) = self.slot(line) else {
            return;
        };
        let delta = height - self.heights[i];
        if delta == 0.0 {
            return;
        }
        self.heights[i] = height;
        let mut k = i + 1;
        while k < self.tree.len() {
            self.tree[k] += delta;
            k += k & k.wrapping_neg();
        }
    }

    fn prefix(&self, count: usize) -> f64 {
        let mut k = count.min(self.heights.len());
        let mut sum = 0.0;
        while k > 0 {
            sum += self.tree[k];
            k &= k - 1;
        }
        sum
    }

    /// Sum of the heights of the lines above `line`.
    #[must_use]
    pub fn height_at_line(&self, line: usize) -> f64 {
        self.prefix(line.saturating_sub(self.first))
    }

    /// Height of the whole document.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.prefix(self.heights.len())
    }

    /// The line covering vertical offset `h`, or one past the last line
    /// when `h` is below the document.
    #[must_use]
    pub fn line_at_height(&self, h: f64) -> usize {
        let n = self.heights.len();
        let mut pos = 0;
        let mut rem = h;
        let mut step = n.checked_next_power_of_two().unwrap_or(0);
        if step > n {
            step >>= 1;
        }
        while step > 0 {
            let next = pos + step;
            if next <= n && self.tree[next] <= rem {
                pos = next;
                rem -= self.tree[next];
            }
            step >>= 1;
        }
        self.first + pos
    }

    /// Replace `remove` lines starting at `line` with lines of the given
    /// heights.
    pub fn splice(&mut self, line: usize, remove: usize, insert: &[f64]) {
        let start = line.saturating_sub(self.first).min(self.heights.len());
        let end = (start + remove).min(self.heights.len());
        self.heights.splice(start..end, insert.iter().copied());
        self.rebuild();
    }

    /// Replace every height.
    pub fn reset(&mut self, first: usize, heights: Vec<f64>) {
        self.first = first;
        self.heights = heights;
        self.rebuild();
    }

    fn rebuild(&mut self) {
        let n = self.heights.len();
        self.tree = vec![0.0; n + 1];
        for i in 1..=n {
            self.tree[i] += self.heights[i - 1];
            let parent = i + (i & i.wrapping_neg());
            if parent <= n {
                self.tree[parent] += self.tree[i];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn uniform_heights() {
        let map = HeightMap::new(0, 100, 10.0);
        assert_eq!(map.total(), 1000.0);
        assert_eq!(map.height_at_line(5), 50.0);
        assert_eq!(map.line_at_height(0.0), 0);
        assert_eq!(map.line_at_height(55.0), 5);
        assert_eq!(map.line_at_height(-3.0), 0);
        assert_eq!(map.line_at_height(5000.0), 100);
    }

    #[test]
    fn zero_height_lines_are_skipped() {
        let mut map = HeightMap::new(0, 5, 10.0);
        map.set_height(1, 30.0);
        map.set_height(2, 0.0);
        map.set_height(3, 0.0);
        assert_eq!(map.line_at_height(25.0), 1);
        assert_eq!(map.line_at_height(40.0), 4);
        assert_eq!(map.height_at_line(4), 40.0);
    }

    #[test]
    fn splice_shifts_following_lines() {
        let mut map = HeightMap::new(3, 4, 10.0);
        map.splice(4, 2, &[5.0, 5.0, 5.0]);
        assert_eq!(map.len(), 5);
        assert_eq!(map.height_at_line(8), 35.0);
        assert_eq!(map.height(5), 5.0);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prefix_sums_match_naive(heights in prop::collection::vec(0u8..40, 1..60), probe in 0u16..2400) {
            let hs: Vec<f64> = heights.iter().map(|&h| f64::from(h)).collect();
            let mut map = HeightMap::new(0, 0, 0.0);
            map.reset(0, hs.clone());
            let mut acc = 0.0;
            for (i, h) in hs.iter().enumerate() {
                prop_assert_eq!(map.height_at_line(i), acc);
                acc += h;
            }
            let probe = f64::from(probe);
            let mut expected = hs.len();
            let mut sum = 0.0;
            for (i, h) in hs.iter().enumerate() {
                if probe < sum + h {
                    expected = i;
                    break;
                }
                sum += h;
            }
            prop_assert_eq!(map.line_at_height(probe), expected);
        }
    }
}
