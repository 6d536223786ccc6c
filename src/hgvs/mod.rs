//! HGVS nomenclature for transcript (`c.`/`n.`) and protein (`p.`) changes.

pub mod coding;
pub mod protein;

pub use coding::hgvs_coding;
pub use protein::{ProteinChange, hgvs_protein};

use crate::mapping::{RegionIndex, cdna_position};
use crate::sequence::{ReferenceSequence, reverse_complement};
use crate::transcript::Transcript;

/// A transcript position in HGVS terms: the nearest cDNA position plus an intronic offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionOffset {
    pub cdna: i32,
    pub offset: i32,
    /// Rendered coordinate, e.g. `120`, `-75-6` or `*909+2`.
    pub value: String,
}

impl PositionOffset {
    fn new(transcript: &Transcript, cdna: i32, offset: i32) -> Self {
        Self {
            cdna,
            offset,
            value: cds_string(transcript, cdna, offset),
        }
    }
}

/// Resolves a genomic position inside the transcript. Intronic positions are expressed relative
/// to the closer flanking exon base; a position equidistant from both uses the 5' exon.
#[must_use]
pub fn position_offset(transcript: &Transcript, position: i32, index: RegionIndex) -> Option<PositionOffset> {
    let region = index.region(&transcript.regions)?;
    let on_reverse_strand = transcript.on_reverse_strand();

    if region.is_exon() {
        let cdna = cdna_position(Some(region), position, on_reverse_strand)?;
        return Some(PositionOffset::new(transcript, cdna, 0));
    }

    let left_distance = position - region.genomic_start + 1;
    let right_distance = region.genomic_end - position + 1;

    let mut offset = left_distance.min(right_distance);
    let upstream_of_next_exon = if on_reverse_strand {
        right_distance > left_distance
    } else {
        right_distance < left_distance
    };
    if upstream_of_next_exon {
        offset = -offset;
    }

    let use_cdna_end = if on_reverse_strand {
        left_distance < right_distance
    } else {
        left_distance > right_distance
    };
    let cdna = if use_cdna_end {
        region.cdna_end
    } else {
        region.cdna_start
    };

    Some(PositionOffset::new(transcript, cdna, offset))
}

/// Renders a cDNA position in coding coordinates: `-N` before the start codon, `*N` after the
/// stop codon, plain cDNA numbers for non-coding transcripts.
#[must_use]
pub fn cds_string(transcript: &Transcript, cdna: i32, offset: i32) -> String {
    let position = match &transcript.coding_region {
        Some(coding) if cdna > coding.cdna_end => format!("*{}", cdna - coding.cdna_end),
        Some(coding) => {
            let past_start = i32::from(cdna >= coding.cdna_start);
            (cdna + past_start - coding.cdna_start + i32::from(transcript.start_exon_phase)).to_string()
        }
        None => cdna.to_string(),
    };

    if offset == 0 {
        position
    } else {
        format!("{position}{offset:+}")
    }
}

/// The kind of change between two genomic alleles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenomicChange {
    Substitution,
    Deletion,
    Duplication,
    Insertion,
    Inversion,
    DelIns,
}

impl GenomicChange {
    /// HGVS keyword. Substitutions render their alleles instead.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Substitution => "",
            Self::Deletion => "del",
            Self::Duplication => "dup",
            Self::Insertion => "ins",
            Self::Inversion => "inv",
            Self::DelIns => "delins",
        }
    }
}

/// Classifies the change from the reference span `[start, end]` and its alleles.
/// `is_duplicate` is only consulted for insertions.
#[must_use]
pub fn genomic_change(start: i32, end: i32, ref_allele: &str, alt_allele: &str, is_duplicate: bool) -> GenomicChange {
    let ref_length = (end - start + 1).max(0) as usize;
    let alt_length = alt_allele.len();

    if alt_length == 0 {
        return GenomicChange::Deletion;
    }

    if ref_length == alt_length {
        if ref_length == 1 {
            return GenomicChange::Substitution;
        }
        return if alt_allele.eq_ignore_ascii_case(&reverse_complement(ref_allele)) {
            GenomicChange::Inversion
        } else {
            GenomicChange::DelIns
        };
    }

    if ref_length == 0 {
        return if is_duplicate {
            GenomicChange::Duplication
        } else {
            GenomicChange::Insertion
        };
    }

    GenomicChange::DelIns
}

/// Genomic interval holding a copy of the inserted bases next to an insertion at `start`, on
/// the 5' side in transcript orientation. `None` when no such copy exists within the transcript.
pub fn duplicated_interval<S: ReferenceSequence + ?Sized>(
    transcript: &Transcript,
    start: i32,
    alt_allele: &str,
    reference: &S,
) -> Option<(i32, i32)> {
    let length = alt_allele.len() as i32;
    if length == 0 {
        return None;
    }

    let (dup_start, dup_end) = if transcript.on_reverse_strand() {
        if start - 1 + length > transcript.end {
            return None;
        }
        (start, start + length - 1)
    } else {
        if start - length < transcript.start {
            return None;
        }
        (start - length, start - 1)
    };

    reference
        .validate(dup_start, dup_end, alt_allele)
        .then_some((dup_start, dup_end))
}

/// Assembles `<id>:<c|n>.<start>[_<end>]<change>`.
#[must_use]
pub fn format_dna_notation(
    transcript: &Transcript,
    start: &str,
    end: &str,
    change: GenomicChange,
    ref_allele: &str,
    alt_allele: &str,
) -> String {
    let notation = if transcript.coding_region.is_some() { 'c' } else { 'n' };

    let mut hgvs = format!("{}:{notation}.{start}", transcript.id);
    if start != end {
        hgvs.push('_');
        hgvs.push_str(end);
    }

    match change {
        GenomicChange::Substitution if ref_allele == alt_allele => hgvs.push('='),
        GenomicChange::Substitution => {
            hgvs.push_str(ref_allele);
            hgvs.push('>');
            hgvs.push_str(alt_allele);
        }
        GenomicChange::Insertion | GenomicChange::DelIns => {
            hgvs.push_str(change.keyword());
            hgvs.push_str(alt_allele);
        }
        GenomicChange::Deletion | GenomicChange::Duplication | GenomicChange::Inversion => {
            hgvs.push_str(change.keyword());
        }
    }
    hgvs
}
