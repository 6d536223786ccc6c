//! Mature miRNA sub-intervals of miRNA transcripts.

use serde::{Deserialize, Serialize};

/// A mature miRNA interval in cDNA coordinates (1-based, inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirnaRegion {
    pub begin: i32,
    pub end: i32,
}

impl MirnaRegion {
    #[must_use]
    pub fn overlaps(&self, start: i32, end: i32) -> bool {
        self.end >= start && self.begin <= end
    }
}
