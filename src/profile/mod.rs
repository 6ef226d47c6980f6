//! Memory accounting and reporting
//!
//! A [`Profile`] is the result of one walk: per-type bytes and counts plus
//! the grand total. Built by [`Profiler`], read-only afterwards.

mod shallow;
mod tracker;

pub use shallow::{shallow_size, Shallow};
pub use tracker::Profiler;

use std::collections::HashMap;

use crate::walk::Sharing;

/// Accumulated numbers for one type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TypeStats {
    /// Shallow bytes of every visited instance (fixed size + owned content)
    pub bytes: usize,

    /// Number of visited instances
    pub count: usize,

    /// Part of `bytes` charged to the grand total
    ///
    /// Equal to `bytes` for independently allocated instances; only the owned
    /// content for instances embedded in a record or sequence.
    pub attributed: usize,
}

/// Memory breakdown of one value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Profile {
    by_type: HashMap<&'static str, TypeStats>,
    total_bytes: usize,
    sharing: Sharing,
}

impl Profile {
    pub(crate) fn new(sharing: Sharing) -> Self {
        Self {
            by_type: HashMap::new(),
            total_bytes: 0,
            sharing,
        }
    }

    pub(crate) fn record(&mut self, type_name: &'static str, bytes: usize, attributed: usize) {
        let stats = self.by_type.entry(type_name).or_default();
        stats.bytes += bytes;
        stats.count += 1;
        stats.attributed += attributed;
        self.total_bytes += attributed;
    }

    /// Grand total of reachable storage
    ///
    /// Shared storage is counted once or once per path, as given by
    /// [`Profile::sharing`].
    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    /// Sharing policy the profile was computed with
    pub fn sharing(&self) -> Sharing {
        self.sharing
    }

    /// Stats for a type name as reported by [`std::any::type_name`]
    pub fn get(&self, type_name: &str) -> Option<&TypeStats> {
        self.by_type.get(type_name)
    }

    /// Stats for `T`
    pub fn stats_for<T: ?Sized>(&self) -> Option<&TypeStats> {
        self.get(std::any::type_name::<T>())
    }

    /// Shallow bytes recorded for `T` (0 if never visited)
    pub fn bytes_for<T: ?Sized>(&self) -> usize {
        self.stats_for::<T>().map_or(0, |stats| stats.bytes)
    }

    /// Instances of `T` visited (0 if never visited)
    pub fn count_for<T: ?Sized>(&self) -> usize {
        self.stats_for::<T>().map_or(0, |stats| stats.count)
    }

    /// Iterate over `(type name, stats)` in unspecified order
    pub fn types(&self) -> impl Iterator<Item = (&'static str, &TypeStats)> + '_ {
        self.by_type.iter().map(|(name, stats)| (*name, stats))
    }

    /// Number of distinct types seen
    pub fn type_count(&self) -> usize {
        self.by_type.len()
    }

    /// Total nodes visited
    pub fn node_count(&self) -> usize {
        self.by_type.values().map(|stats| stats.count).sum()
    }

    /// Sum of attributed bytes over all types; always equals [`Profile::total_bytes`]
    pub fn attributed_total(&self) -> usize {
        self.by_type.values().map(|stats| stats.attributed).sum()
    }

    /// Types ordered by shallow bytes, largest first (ties by name)
    pub fn by_bytes(&self) -> Vec<(&'static str, TypeStats)> {
        let mut rows: Vec<_> = self
            .by_type
            .iter()
            .map(|(name, stats)| (*name, *stats))
            .collect();
        rows.sort_by(|a, b| b.1.bytes.cmp(&a.1.bytes).then_with(|| a.0.cmp(b.0)));
        rows
    }

    /// Generate report
    ///
    /// One line per type, largest first, capped at `limit` rows when given.
    pub fn report(&self, limit: Option<usize>) -> String {
        let rows = self.by_bytes();
        let shown = limit.unwrap_or(rows.len()).min(rows.len());

        let mut out = format!(
            "Total: {} ({} bytes, {} nodes, {:?})\n",
            human_bytes(self.total_bytes),
            self.total_bytes,
            self.node_count(),
            self.sharing
        );
        out.push_str(&format!("{:>10} {:>8} {:>10}  type\n", "bytes", "count", "total"));
        for (name, stats) in &rows[..shown] {
            out.push_str(&format!(
                "{:>10} {:>8} {:>10}  {}\n",
                human_bytes(stats.bytes),
                stats.count,
                human_bytes(stats.attributed),
                name
            ));
        }
        if shown < rows.len() {
            out.push_str(&format!("  ... {} more types\n", rows.len() - shown));
        }
        out
    }
}

/// Format a byte count with SI units (`1.5 kB`, `12 MB`)
pub fn human_bytes(bytes: usize) -> String {
    const UNITS: [&str; 6] = ["B", "kB", "MB", "GB", "TB", "PB"];

    if bytes < 1000 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1000.0 && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }
    if value < 10.0 {
        format!("{value:.1} {}", UNITS[unit])
    } else {
        format!("{value:.0} {}", UNITS[unit])
    }
}
