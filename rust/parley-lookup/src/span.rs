//! Half-open token ranges and the ways a set of them can coexist.

use std::fmt;

/// Token positions `start..end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Whether the two ranges share at least one position. Adjacent ranges
    /// (`0..2` and `2..3`) do not overlap.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Shifts the range right by `offset` positions.
    pub fn offset(&self, offset: usize) -> Span {
        Span::new(self.start + offset, self.end + offset)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Every subset of `spans` whose members are pairwise non-overlapping.
///
/// Subsets are produced in bitmask order over the input, so the empty subset
/// always comes first and the full set (when compatible) last.
pub fn compatible_subsets(spans: &[Span]) -> Vec<Vec<Span>> {
    let mut subsets: Vec<Vec<Span>> = vec![Vec::new()];
    for span in spans {
        let extended: Vec<Vec<Span>> = subsets
            .iter()
            .filter(|subset| subset.iter().all(|chosen| !chosen.overlaps(span)))
            .map(|subset| {
                let mut subset = subset.clone();
                subset.push(*span);
                subset
            })
            .collect();
        subsets.extend(extended);
    }
    subsets
}
