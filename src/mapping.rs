//! Genomic to cDNA, CDS and protein coordinate mapping.

use std::cmp::Ordering;

use serde::Serialize;

use crate::transcript::{CodingRegion, Transcript, TranscriptRegion};

/// Location of a genomic position relative to a transcript's region list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionIndex {
    BeforeTranscript,
    Region(usize),
    AfterTranscript,
}

impl RegionIndex {
    #[must_use]
    pub fn region(self, regions: &[TranscriptRegion]) -> Option<&TranscriptRegion> {
        match self {
            Self::Region(index) => regions.get(index),
            _ => None,
        }
    }

    /// The region used when resolving coverage: positions outside the transcript clamp to the
    /// nearest terminal region.
    fn covered_region(self, regions: &[TranscriptRegion]) -> Option<&TranscriptRegion> {
        match self {
            Self::BeforeTranscript => regions.first(),
            Self::Region(index) => regions.get(index),
            Self::AfterTranscript => regions.last(),
        }
    }
}

/// Inclusive range of exon or intron ordinals touched by a variant, in transcript order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrdinalRange {
    pub start: u16,
    pub end: u16,
}

impl OrdinalRange {
    /// `"2/5"` or `"2-3/5"`.
    #[must_use]
    pub fn fraction(&self, total: usize) -> String {
        if self.start == self.end {
            format!("{}/{total}", self.start)
        } else {
            format!("{}-{}/{total}", self.start, self.end)
        }
    }

    fn include(range: Option<Self>, id: u16) -> Option<Self> {
        Some(match range {
            None => Self { start: id, end: id },
            Some(r) => Self {
                start: r.start.min(id),
                end: r.end.max(id),
            },
        })
    }
}

/// A variant's position in transcript, CDS and protein coordinates.
///
/// `None` marks a coordinate that is undefined: outside the transcript, intronic, or outside
/// the coding region. Covered positions resolve partially overlapping variants to the part that
/// falls on exonic (or coding) sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappedPosition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cdna_start: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cdna_end: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cds_start: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cds_end: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein_start: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein_end: Option<i32>,
    #[serde(skip)]
    pub covered_cdna: Option<(i32, i32)>,
    #[serde(skip)]
    pub covered_cds: Option<CoveredCds>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exons: Option<OrdinalRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub introns: Option<OrdinalRange>,
    #[serde(skip)]
    pub start_index: RegionIndex,
    #[serde(skip)]
    pub end_index: RegionIndex,
}

/// CDS and protein positions of the covered cDNA interval, clamped to the coding region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoveredCds {
    pub cds_start: i32,
    pub cds_end: i32,
    pub protein_start: i32,
    pub protein_end: i32,
}

/// Binary search for the region containing `position`.
#[must_use]
pub fn find_region(regions: &[TranscriptRegion], position: i32) -> RegionIndex {
    let search = regions.binary_search_by(|region| {
        if region.genomic_end < position {
            Ordering::Less
        } else if region.genomic_start > position {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    });

    match search {
        Ok(index) => RegionIndex::Region(index),
        Err(0) => RegionIndex::BeforeTranscript,
        Err(_) => RegionIndex::AfterTranscript,
    }
}

/// cDNA position of a genomic position; defined only inside exons.
#[must_use]
pub fn cdna_position(region: Option<&TranscriptRegion>, position: i32, on_reverse_strand: bool) -> Option<i32> {
    let region = region.filter(|r| r.is_exon())?;
    Some(if on_reverse_strand {
        region.genomic_end - position + region.cdna_start
    } else {
        position - region.genomic_start + region.cdna_start
    })
}

/// cDNA positions of the genomic start and end, each mapped independently.
#[must_use]
pub fn cdna_positions(
    start_region: Option<&TranscriptRegion>,
    end_region: Option<&TranscriptRegion>,
    start: i32,
    end: i32,
    on_reverse_strand: bool,
) -> (Option<i32>, Option<i32>) {
    (
        cdna_position(start_region, start, on_reverse_strand),
        cdna_position(end_region, end, on_reverse_strand),
    )
}

/// cDNA positions of an insertion (`end == start - 1`).
///
/// When only one flanking base is exonic the other side is inferred from it, so insertions at
/// an exon boundary keep both coordinates.
#[must_use]
pub fn insertion_cdna_positions(
    start_region: Option<&TranscriptRegion>,
    end_region: Option<&TranscriptRegion>,
    start: i32,
    end: i32,
    on_reverse_strand: bool,
) -> (Option<i32>, Option<i32>) {
    if on_reverse_strand {
        if let Some(cdna) = cdna_position(start_region, start, true) {
            return (Some(cdna), Some(cdna + 1));
        }
        return match cdna_position(end_region, end, true) {
            Some(cdna) => (Some(cdna - 1), Some(cdna)),
            None => (None, None),
        };
    }

    if let Some(cdna) = cdna_position(end_region, end, false) {
        return (Some(cdna + 1), Some(cdna));
    }
    match cdna_position(start_region, start, false) {
        Some(cdna) => (Some(cdna), Some(cdna - 1)),
        None => (None, None),
    }
}

fn cds_position(coding: &CodingRegion, start_exon_phase: u8, cdna: Option<i32>) -> Option<i32> {
    let cdna = cdna?;
    if cdna < coding.cdna_start || cdna > coding.cdna_end {
        return None;
    }
    Some(cdna - coding.cdna_start + i32::from(start_exon_phase) + 1)
}

/// CDS positions of a cDNA interval.
///
/// Positions outside the coding region are `None`. Insertions touching either edge of the
/// coding region are silenced entirely.
#[must_use]
pub fn cds_positions(
    coding: Option<&CodingRegion>,
    start_exon_phase: u8,
    cdna_start: Option<i32>,
    cdna_end: Option<i32>,
    is_insertion: bool,
) -> (Option<i32>, Option<i32>) {
    let Some(coding) = coding else {
        return (None, None);
    };

    if is_insertion && (cdna_end == Some(coding.cdna_end) || cdna_start == Some(coding.cdna_start)) {
        return (None, None);
    }

    (
        cds_position(coding, start_exon_phase, cdna_start),
        cds_position(coding, start_exon_phase, cdna_end),
    )
}

/// 1-based codon number of a CDS position: `ceil(cds / 3)`.
#[must_use]
pub fn protein_position(cds_position: i32) -> i32 {
    (cds_position + 2) / 3
}

/// cDNA interval actually covered by a variant that may start or end outside exons.
///
/// Endpoints before or after the transcript clamp to its first or last cDNA base; intronic
/// endpoints move to the adjacent exon base inside the variant. `None` when neither endpoint
/// touches an exon.
#[must_use]
pub fn covered_cdna_positions(
    regions: &[TranscriptRegion],
    cdna_start: Option<i32>,
    start_index: RegionIndex,
    cdna_end: Option<i32>,
    end_index: RegionIndex,
    on_reverse_strand: bool,
) -> Option<(i32, i32)> {
    if let (Some(start), Some(end)) = (cdna_start, cdna_end) {
        return Some((start, end));
    }

    // cDNA start belongs to the genomic end on the reverse strand
    let (start_index, end_index) = if on_reverse_strand {
        (end_index, start_index)
    } else {
        (start_index, end_index)
    };

    let start_region = start_index.covered_region(regions)?;
    let end_region = end_index.covered_region(regions)?;
    if !start_region.is_exon() && !end_region.is_exon() {
        return None;
    }

    let last_cdna = if on_reverse_strand {
        regions.first()?.cdna_end
    } else {
        regions.last()?.cdna_end
    };

    let covered = |is_start: bool, cdna: Option<i32>, region: &TranscriptRegion, index: RegionIndex| {
        if let Some(cdna) = cdna {
            return cdna;
        }
        match index {
            RegionIndex::BeforeTranscript if on_reverse_strand => last_cdna,
            RegionIndex::BeforeTranscript => 1,
            RegionIndex::AfterTranscript if on_reverse_strand => 1,
            RegionIndex::AfterTranscript => last_cdna,
            RegionIndex::Region(_) if is_start => region.cdna_end,
            RegionIndex::Region(_) => region.cdna_start,
        }
    };

    let start = covered(true, cdna_start, start_region, start_index);
    let end = covered(false, cdna_end, end_region, end_index);
    Some(if start < end { (start, end) } else { (end, start) })
}

/// CDS and protein positions of a covered cDNA interval, clamped to the coding region.
#[must_use]
pub fn covered_cds_and_protein_positions(
    covered_cdna: Option<(i32, i32)>,
    coding: Option<&CodingRegion>,
    start_exon_phase: u8,
) -> Option<CoveredCds> {
    let (start, end) = covered_cdna?;
    let coding = coding?;
    if end < coding.cdna_start || start > coding.cdna_end {
        return None;
    }

    let offset = i32::from(start_exon_phase) - coding.cdna_start + 1;
    let cds_start = start.max(coding.cdna_start) + offset;
    let cds_end = end.min(coding.cdna_end) + offset;
    Some(CoveredCds {
        cds_start,
        cds_end,
        protein_start: protein_position(cds_start),
        protein_end: protein_position(cds_end),
    })
}

/// Exon and intron ordinals of the regions spanned by the variant.
#[must_use]
pub fn exons_and_introns(
    regions: &[TranscriptRegion],
    start_index: RegionIndex,
    end_index: RegionIndex,
) -> (Option<OrdinalRange>, Option<OrdinalRange>) {
    let bound = |index: RegionIndex| match index {
        RegionIndex::BeforeTranscript => 0,
        RegionIndex::Region(i) => i,
        RegionIndex::AfterTranscript => regions.len().saturating_sub(1),
    };

    let both_outside = matches!(
        (start_index, end_index),
        (RegionIndex::BeforeTranscript, RegionIndex::BeforeTranscript)
            | (RegionIndex::AfterTranscript, RegionIndex::AfterTranscript)
    );
    if regions.is_empty() || both_outside {
        return (None, None);
    }

    let (a, b) = (bound(start_index), bound(end_index));
    let (low, high) = (a.min(b), a.max(b));

    regions[low..=high]
        .iter()
        .fold((None, None), |(exons, introns), region| {
            if region.is_exon() {
                (OrdinalRange::include(exons, region.id), introns)
            } else {
                (exons, OrdinalRange::include(introns, region.id))
            }
        })
}

/// cDNA stage: region lookup, cDNA positions in transcript order and exon/intron ordinals.
#[must_use]
pub fn map_to_cdna(transcript: &Transcript, start: i32, end: i32, is_insertion: bool) -> MappedPosition {
    let regions = &transcript.regions;
    let on_reverse_strand = transcript.on_reverse_strand();

    let start_index = find_region(regions, start);
    let end_index = find_region(regions, end);
    let start_region = start_index.region(regions);
    let end_region = end_index.region(regions);

    let (mut cdna_start, mut cdna_end) = if is_insertion {
        insertion_cdna_positions(start_region, end_region, start, end, on_reverse_strand)
    } else {
        cdna_positions(start_region, end_region, start, end, on_reverse_strand)
    };
    if on_reverse_strand {
        std::mem::swap(&mut cdna_start, &mut cdna_end);
    }

    let (exons, introns) = exons_and_introns(regions, start_index, end_index);

    MappedPosition {
        cdna_start,
        cdna_end,
        cds_start: None,
        cds_end: None,
        protein_start: None,
        protein_end: None,
        covered_cdna: None,
        covered_cds: None,
        exons,
        introns,
        start_index,
        end_index,
    }
}

/// CDS stage of [`map_to_cdna`]'s result.
#[must_use]
pub fn map_to_cds(transcript: &Transcript, position: &MappedPosition, is_insertion: bool) -> (Option<i32>, Option<i32>) {
    cds_positions(
        transcript.coding_region.as_ref(),
        transcript.start_exon_phase,
        position.cdna_start,
        position.cdna_end,
        is_insertion,
    )
}

/// Full mapping of a genomic interval, including covered positions.
#[must_use]
pub fn map_position(transcript: &Transcript, start: i32, end: i32, is_insertion: bool) -> MappedPosition {
    let mut position = map_to_cdna(transcript, start, end, is_insertion);

    let (cds_start, cds_end) = map_to_cds(transcript, &position, is_insertion);
    position.cds_start = cds_start;
    position.cds_end = cds_end;
    position.protein_start = cds_start.map(protein_position);
    position.protein_end = cds_end.map(protein_position);

    position.covered_cdna = covered_cdna_positions(
        &transcript.regions,
        position.cdna_start,
        position.start_index,
        position.cdna_end,
        position.end_index,
        transcript.on_reverse_strand(),
    );
    position.covered_cds = covered_cds_and_protein_positions(
        position.covered_cdna,
        transcript.coding_region.as_ref(),
        transcript.start_exon_phase,
    );
    position
}
