#[allow(unused_imports)]
use crate::Rbt;

/// Depth of every absent leaf-slot in the [`Rbt`] tree, a root-only
/// tree has two leaf-slots at depth 1. Tracks minimum, maximum, average
/// and a histogram for percentiles.
#[derive(Clone, Debug)]
pub struct Depth {
    samples: usize,
    min: usize,
    max: usize,
    total: usize,
    histogram: [u64; 256],
}

impl Depth {
    pub(crate) fn new() -> Depth {
        Default::default()
    }

    pub(crate) fn sample(&mut self, depth: usize) {
        self.samples += 1;
        self.total += depth;
        if self.samples == 1 || depth < self.min {
            self.min = depth
        }
        if depth > self.max {
            self.max = depth
        }
        self.histogram[depth] += 1;
    }

    /// Return number of leaf-slots sampled.
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Return depth of the shallowest leaf-slot.
    pub fn min(&self) -> usize {
        self.min
    }

    /// Return depth of the deepest leaf-slot.
    pub fn max(&self) -> usize {
        self.max
    }

    /// Height of the tree, that is the number of nodes on its longest
    /// root to leaf path.
    #[inline]
    pub fn height(&self) -> usize {
        self.max
    }

    /// Return the average depth of leaf-slots.
    pub fn mean(&self) -> usize {
        if self.samples == 0 {
            0
        } else {
            self.total / self.samples
        }
    }

    /// Return depth as tuple of percentiles, each tuple provides
    /// (percentile, depth), from the 90th percentile onwards.
    pub fn percentiles(&self) -> Vec<(u8, usize)> {
        let mut percentiles: Vec<(u8, usize)> = vec![];
        let (mut acc, mut prev_perc) = (0_u64, 90_u8);
        let iter = self.histogram.iter().enumerate().filter(|(_, &n)| n > 0);
        for (depth, n) in iter {
            acc += *n;
            let perc = ((acc as f64 / self.samples as f64) * 100_f64) as u8;
            if perc >= prev_perc {
                percentiles.push((perc, depth));
                prev_perc = perc;
            }
        }
        percentiles
    }

    /// Render depth statistics in human readable form, one line for
    /// min/mean/max and one line per percentile.
    pub fn pretty(&self, prefix: &str) -> String {
        let mut lines = vec![format!(
            "{}depth (min, avg, max): {:?}",
            prefix,
            (self.min, self.mean(), self.max)
        )];
        for (perc, depth) in self.percentiles().into_iter() {
            lines.push(format!("{}  {} percentile = {}", prefix, perc, depth));
        }
        lines.join("\n")
    }
}

impl Default for Depth {
    fn default() -> Self {
        Depth {
            samples: 0,
            min: 0,
            max: 0,
            total: 0,
            histogram: [0; 256],
        }
    }
}
