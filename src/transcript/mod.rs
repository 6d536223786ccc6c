//! Transcript models: regions, coding regions and the gene/transcript arena.

pub mod construction;
pub mod set;
pub mod types;

pub use set::{TranscriptRecord, TranscriptSet};
pub use types::{
    AminoAcidEdit, CodingRegion, Gene, Transcript, TranscriptRegion, TranscriptRegionType,
};
