/// Lazy iterator over the `k`-element subsets of `0..n`, in lexicographic order.
///
/// Each item is the sorted list of chosen indices. The iterator keeps only the current index
/// frontier, so memory use does not depend on the number of subsets.
#[derive(Clone, Debug)]
pub struct Combinations {
    n: usize,
    indices: Vec<usize>,
    started: bool,
    done: bool,
}

impl Combinations {
    /// Iterate over the subsets of size `k` of `0..n`. Yields nothing if `k > n` and a single
    /// empty subset if `k == 0`.
    pub fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            indices: (0..k).collect(),
            started: false,
            done: k > n,
        }
    }

    fn advance(&mut self) -> bool {
        let k = self.indices.len();
        // rightmost index which can still move
        let Some(i) = (0..k).rev().find(|&i| self.indices[i] < self.n - k + i) else {
            return false;
        };
        self.indices[i] += 1;
        for j in (i + 1)..k {
            self.indices[j] = self.indices[j - 1] + 1;
        }
        true
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.started {
            if !self.advance() {
                self.done = true;
                return None;
            }
        } else {
            self.started = true;
        }
        Some(self.indices.clone())
    }
}

/// Every way of choosing the first hemisphere of a split of `n` objects into two non-empty
/// groups, with at most `n / 2` objects in the first one.
///
/// Splits with exactly `n / 2` objects on each side appear twice (once per side) for even `n`.
pub fn hemisphere_partitions(n: usize) -> impl Iterator<Item = Vec<usize>> {
    (1..=n / 2).flat_map(move |k| Combinations::new(n, k))
}
