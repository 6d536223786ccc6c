//! Transcript construction: exon normalization, intron insertion, coding region detection.

use crate::error::Error;
use crate::strand::Strand;

use super::types::{AminoAcidEdit, CodingRegion, TranscriptRegion, TranscriptRegionType};

/// An exon given by its genomic bounds (1-based, inclusive).
pub type ExonBounds = (i32, i32);

/// Assign cDNA coordinates to exons and insert introns between them.
///
/// Exons are numbered 5'→3' in transcript order; the result is sorted by genomic start.
pub fn build_transcript_regions(
    exons: &[ExonBounds],
    strand: Strand,
) -> Result<Vec<TranscriptRegion>, Error> {
    if exons.is_empty() {
        return Err(Error::Parse("no exons for transcript".to_string()));
    }

    let mut sorted: Vec<ExonBounds> = exons.to_vec();
    sorted.sort_by_key(|&(start, _)| start);
    for pair in sorted.windows(2) {
        if pair[1].0 <= pair[0].1 {
            return Err(Error::Parse(format!(
                "overlapping exons {}-{} and {}-{}",
                pair[0].0, pair[0].1, pair[1].0, pair[1].1
            )));
        }
    }
    if strand.is_reverse() {
        sorted.reverse();
    }

    let mut regions = Vec::with_capacity(sorted.len() * 2);
    let mut cdna_start: i32 = 1;

    for (index, &(start, end)) in sorted.iter().enumerate() {
        if end < start {
            return Err(Error::Parse(format!("exon {start}-{end} ends before it starts")));
        }
        let cdna_end = cdna_start + (end - start);
        regions.push(TranscriptRegion {
            region_type: TranscriptRegionType::Exon,
            id: (index + 1) as u16,
            genomic_start: start,
            genomic_end: end,
            cdna_start,
            cdna_end,
        });
        cdna_start = cdna_end + 1;
    }

    insert_introns(&mut regions, strand);
    Ok(regions)
}

/// Insert introns between consecutive exon regions.
fn insert_introns(regions: &mut Vec<TranscriptRegion>, strand: Strand) {
    regions.sort_by_key(|r| r.genomic_start);

    let mut introns = Vec::new();
    for window in regions.windows(2) {
        let prev = &window[0];
        let curr = &window[1];
        if curr.genomic_start - prev.genomic_end - 1 <= 0 {
            continue;
        }

        let (cdna_start, cdna_end, id) = if strand.is_reverse() {
            (curr.cdna_end, prev.cdna_start, curr.id)
        } else {
            (prev.cdna_end, curr.cdna_start, prev.id)
        };

        introns.push(TranscriptRegion {
            region_type: TranscriptRegionType::Intron,
            id,
            genomic_start: prev.genomic_end + 1,
            genomic_end: curr.genomic_start - 1,
            cdna_start,
            cdna_end,
        });
    }

    regions.extend(introns);
    regions.sort_by_key(|r| r.genomic_start);
}

/// Map the genomic CDS bounds onto cDNA coordinates (strand-aware).
pub fn detect_coding_region(
    genomic_start: i32,
    genomic_end: i32,
    transcript_regions: &[TranscriptRegion],
    strand: Strand,
    protein_id: &str,
    protein_seq: &str,
    amino_acid_edits: Vec<AminoAcidEdit>,
) -> Result<CodingRegion, Error> {
    let (map_start, map_end) = if strand.is_reverse() {
        (genomic_end, genomic_start)
    } else {
        (genomic_start, genomic_end)
    };

    let cdna_start = map_genomic_to_cdna(map_start, transcript_regions, strand)?;
    let cdna_end = map_genomic_to_cdna(map_end, transcript_regions, strand)?;

    Ok(CodingRegion {
        genomic_start,
        genomic_end,
        cdna_start,
        cdna_end,
        protein_id: protein_id.to_string(),
        protein_seq: protein_seq.to_string(),
        amino_acid_edits,
    })
}

/// Map a genomic position to a cDNA position through transcript regions.
fn map_genomic_to_cdna(
    genomic_pos: i32,
    regions: &[TranscriptRegion],
    strand: Strand,
) -> Result<i32, Error> {
    regions
        .iter()
        .filter(|r| r.is_exon() && r.contains(genomic_pos))
        .map(|region| {
            if strand.is_reverse() {
                region.cdna_start + (region.genomic_end - genomic_pos)
            } else {
                region.cdna_start + (genomic_pos - region.genomic_start)
            }
        })
        .next()
        .ok_or_else(|| {
            Error::Parse(format!(
                "genomic position {genomic_pos} not found in any exon region"
            ))
        })
}
