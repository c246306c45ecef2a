//! Representative paths picked by terminal price
//!
//! During the tracking phase every full path goes into a bounded
//! [`Cohort`]. When tracking ends the cohort is sorted once by terminal
//! price (stable, so ties keep insertion order) and five ranks are fixed:
//! ```text
//! min = 0, p25 = ⌊M/4⌋, p50 = ⌊M/2⌋, p75 = ⌊3M/4⌋, max = M - 1
//! ```
//! The ranks index into the cohort's own storage; nothing is copied.

use std::cmp::Ordering;
use std::fmt;

/// One of the five tracked ranks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Percentile {
    Min,
    P25,
    P50,
    P75,
    Max,
}

impl Percentile {
    pub const ALL: [Percentile; 5] = [
        Percentile::Min,
        Percentile::P25,
        Percentile::P50,
        Percentile::P75,
        Percentile::Max,
    ];

    /// Map 0, 25, 50, 75 or 100 to a rank; anything else is unrecognized.
    pub fn from_value(p: i64) -> Option<Self> {
        match p {
            0 => Some(Percentile::Min),
            25 => Some(Percentile::P25),
            50 => Some(Percentile::P50),
            75 => Some(Percentile::P75),
            100 => Some(Percentile::Max),
            _ => None,
        }
    }

    pub fn value(self) -> u32 {
        match self {
            Percentile::Min => 0,
            Percentile::P25 => 25,
            Percentile::P50 => 50,
            Percentile::P75 => 75,
            Percentile::Max => 100,
        }
    }

    /// Rank of this percentile in a sorted cohort of `m` paths.
    pub fn index(self, m: usize) -> Option<usize> {
        if m == 0 {
            return None;
        }
        Some(match self {
            Percentile::Min => 0,
            Percentile::P25 => m / 4,
            Percentile::P50 => m / 2,
            Percentile::P75 => 3 * m / 4,
            Percentile::Max => m - 1,
        })
    }
}

impl fmt::Display for Percentile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format!("p{}", self.value()))
    }
}

/// A stored trajectory with its terminal price cached for sorting.
#[derive(Debug, Clone, PartialEq)]
pub struct PricePath {
    prices: Vec<f64>,
    terminal: f64,
}

impl PricePath {
    pub fn new(prices: Vec<f64>) -> Self {
        let terminal = prices.last().copied().unwrap_or(f64::NAN);
        Self { prices, terminal }
    }

    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    pub fn terminal(&self) -> f64 {
        self.terminal
    }
}

/// Resolved ranks into a sorted cohort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PercentileIndices {
    pub min: usize,
    pub p25: usize,
    pub p50: usize,
    pub p75: usize,
    pub max: usize,
}

impl PercentileIndices {
    pub fn for_cohort(m: usize) -> Option<Self> {
        Some(Self {
            min: Percentile::Min.index(m)?,
            p25: Percentile::P25.index(m)?,
            p50: Percentile::P50.index(m)?,
            p75: Percentile::P75.index(m)?,
            max: Percentile::Max.index(m)?,
        })
    }

    pub fn get(&self, p: Percentile) -> usize {
        match p {
            Percentile::Min => self.min,
            Percentile::P25 => self.p25,
            Percentile::P50 => self.p50,
            Percentile::P75 => self.p75,
            Percentile::Max => self.max,
        }
    }
}

/// Ascending by terminal price. NaN terminals order after every number.
pub fn compare_terminal(a: &PricePath, b: &PricePath) -> Ordering {
    a.terminal.total_cmp(&b.terminal)
}

/// Bounded store of full paths from the tracking phase.
#[derive(Debug, Clone, Default)]
pub struct Cohort {
    paths: Vec<PricePath>,
    capacity: usize,
    indices: Option<PercentileIndices>,
}

impl Cohort {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            paths: Vec::new(),
            capacity,
            indices: None,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.paths.len() >= self.capacity
    }

    pub fn is_finalized(&self) -> bool {
        self.indices.is_some()
    }

    /// Store `path` if there is room. Returns whether it was kept.
    ///
    /// A finalized cohort accepts nothing further.
    pub fn push(&mut self, path: PricePath) -> bool {
        if self.is_full() || self.indices.is_some() {
            return false;
        }
        self.paths.push(path);
        true
    }

    /// Sort by terminal price and fix the five ranks.
    ///
    /// Returns `None` (and stays unfinalized) when the cohort is empty.
    pub fn finalize(&mut self) -> Option<PercentileIndices> {
        if self.indices.is_none() {
            self.paths.sort_by(compare_terminal);
            self.indices = PercentileIndices::for_cohort(self.paths.len());
        }
        self.indices
    }

    pub fn indices(&self) -> Option<PercentileIndices> {
        self.indices
    }

    /// The path at percentile `p`, once finalized.
    pub fn path(&self, p: Percentile) -> Option<&PricePath> {
        let idx = self.indices?.get(p);
        self.paths.get(idx)
    }

    /// Stored paths; sorted by terminal price once finalized.
    pub fn paths(&self) -> &[PricePath] {
        &self.paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_ending_at(terminal: f64) -> PricePath {
        PricePath::new(vec![100.0, terminal])
    }

    #[test]
    fn test_from_value() {
        assert_eq!(Percentile::from_value(0), Some(Percentile::Min));
        assert_eq!(Percentile::from_value(25), Some(Percentile::P25));
        assert_eq!(Percentile::from_value(50), Some(Percentile::P50));
        assert_eq!(Percentile::from_value(75), Some(Percentile::P75));
        assert_eq!(Percentile::from_value(100), Some(Percentile::Max));
        assert_eq!(Percentile::from_value(10), None);
        assert_eq!(Percentile::from_value(-25), None);
        assert_eq!(Percentile::from_value(101), None);

        for p in Percentile::ALL {
            assert_eq!(Percentile::from_value(p.value() as i64), Some(p));
        }
    }

    #[test]
    fn test_index_formulas() {
        let idx = PercentileIndices::for_cohort(1000).expect("non-empty");
        assert_eq!(
            idx,
            PercentileIndices {
                min: 0,
                p25: 250,
                p50: 500,
                p75: 750,
                max: 999
            }
        );

        let idx = PercentileIndices::for_cohort(7).expect("non-empty");
        assert_eq!((idx.p25, idx.p50, idx.p75, idx.max), (1, 3, 5, 6));

        let idx = PercentileIndices::for_cohort(1).expect("non-empty");
        assert_eq!((idx.min, idx.p25, idx.p50, idx.p75, idx.max), (0, 0, 0, 0, 0));

        assert!(PercentileIndices::for_cohort(0).is_none());
    }

    #[test]
    fn test_cohort_capacity() {
        let mut cohort = Cohort::with_capacity(2);
        assert!(cohort.push(path_ending_at(1.0)));
        assert!(cohort.push(path_ending_at(2.0)));
        assert!(cohort.is_full());
        assert!(!cohort.push(path_ending_at(3.0)));
        assert_eq!(cohort.len(), 2);

        let mut none = Cohort::with_capacity(0);
        assert!(!none.push(path_ending_at(1.0)));
        assert!(none.finalize().is_none());
        assert!(none.path(Percentile::P50).is_none());
    }

    #[test]
    fn test_finalize_sorts_and_selects() {
        let mut cohort = Cohort::with_capacity(8);
        for terminal in [105.0, 92.0, 130.0, 99.0, 111.0, 87.0, 101.0, 120.0] {
            cohort.push(path_ending_at(terminal));
        }
        assert!(cohort.path(Percentile::Min).is_none());

        let idx = cohort.finalize().expect("non-empty");
        assert_eq!((idx.p25, idx.p50, idx.p75, idx.max), (2, 4, 6, 7));

        let terminals: Vec<f64> = cohort.paths().iter().map(|p| p.terminal()).collect();
        assert_eq!(
            terminals,
            vec![87.0, 92.0, 99.0, 101.0, 105.0, 111.0, 120.0, 130.0]
        );

        let pick = |p| cohort.path(p).expect("finalized").terminal();
        assert_eq!(pick(Percentile::Min), 87.0);
        assert_eq!(pick(Percentile::P25), 99.0);
        assert_eq!(pick(Percentile::P50), 105.0);
        assert_eq!(pick(Percentile::P75), 120.0);
        assert_eq!(pick(Percentile::Max), 130.0);

        assert!(!cohort.push(path_ending_at(1.0)));
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let mut cohort = Cohort::with_capacity(3);
        cohort.push(PricePath::new(vec![1.0, 50.0]));
        cohort.push(PricePath::new(vec![2.0, 50.0]));
        cohort.push(PricePath::new(vec![3.0, 40.0]));
        cohort.finalize();

        let firsts: Vec<f64> = cohort.paths().iter().map(|p| p.prices()[0]).collect();
        assert_eq!(firsts, vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn test_nan_terminal_sorts_last() {
        let mut cohort = Cohort::with_capacity(3);
        cohort.push(path_ending_at(f64::NAN));
        cohort.push(path_ending_at(10.0));
        cohort.push(path_ending_at(5.0));
        cohort.finalize();

        assert_eq!(cohort.paths()[0].terminal(), 5.0);
        assert_eq!(cohort.paths()[1].terminal(), 10.0);
        assert!(cohort.paths()[2].terminal().is_nan());
    }
}
