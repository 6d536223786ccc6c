//! Position of a variant relative to introns, splice sites, the coding region and the cDNA.

use serde::Serialize;

use crate::codon::is_triplet;
use crate::config::AnnotationConfig;
use crate::mapping::{CoveredCds, MappedPosition};
use crate::mirna::MirnaRegion;
use crate::transcript::{CodingRegion, Transcript, TranscriptRegion};
use crate::variant::SimpleVariant;

fn overlaps(start: i32, end: i32, other_start: i32, other_end: i32) -> bool {
    end >= other_start && start <= other_end
}

/// Flags describing where a variant sits on one transcript. Computed per variant and
/// transcript pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionalEffect {
    pub is_within_intron: bool,
    pub is_start_splice_site: bool,
    pub is_end_splice_site: bool,
    pub is_within_splice_site_region: bool,
    pub is_within_frameshift_intron: bool,

    pub has_exon_overlap: bool,
    pub before_coding: bool,
    pub after_coding: bool,
    pub within_cdna: bool,
    pub within_cds: bool,
    pub has_frame_shift: bool,
    pub overlap_with_micro_rna: bool,
    pub is_coding: bool,
}

impl PositionalEffect {
    /// Classifies `variant` on `transcript` given its mapped position.
    ///
    /// `insertion_no_impact` marks an insertion in the start codon that leaves the start intact;
    /// such variants are not treated as coding.
    #[must_use]
    pub fn classify(
        transcript: &Transcript,
        variant: &SimpleVariant,
        position: &MappedPosition,
        insertion_no_impact: bool,
        config: &AnnotationConfig,
    ) -> Self {
        let mut effect = Self::default();
        effect.determine_intronic_effect(
            &transcript.regions,
            variant.start,
            variant.end,
            variant.is_insertion(),
            config,
        );
        effect.determine_exonic_effect(
            transcript,
            variant.start,
            variant.end,
            position,
            &variant.alt_allele,
            insertion_no_impact,
        );
        effect
    }

    /// Intron, splice site and splice region flags. Exons in `regions` are ignored.
    pub fn determine_intronic_effect(
        &mut self,
        regions: &[TranscriptRegion],
        start: i32,
        end: i32,
        is_insertion: bool,
        config: &AnnotationConfig,
    ) {
        let site = config.splice_site_length;
        let region_intron = config.splice_region_intron_length;
        let region_exon = config.splice_region_exon_length;

        for intron in regions.iter().filter(|r| !r.is_exon()) {
            let (intron_start, intron_end) = (intron.genomic_start, intron.genomic_end);
            if !overlaps(start, end, intron_start - region_exon, intron_end + region_exon) {
                continue;
            }

            // short introns are artefacts of the gene build, not real splicing
            let is_frameshift_intron = intron_end - intron_start <= config.max_frameshift_intron_length;
            if is_frameshift_intron && overlaps(start, end, intron_start, intron_end) {
                self.is_within_frameshift_intron = true;
                continue;
            }

            if overlaps(start, end, intron_start, intron_start + site - 1) {
                self.is_start_splice_site = true;
            }
            if overlaps(start, end, intron_end - site + 1, intron_end) {
                self.is_end_splice_site = true;
            }

            let interior_start = intron_start + site;
            let interior_end = intron_end - site;
            if intron_start <= intron_end - 2 * site
                && (overlaps(start, end, interior_start, interior_end)
                    || is_insertion && (start == interior_start || end == interior_end))
            {
                self.is_within_intron = true;
            }

            let in_splice_region = overlaps(start, end, interior_start, intron_start + region_intron - 1)
                || overlaps(start, end, intron_end - region_intron + 1, interior_end)
                || overlaps(start, end, intron_start - region_exon, intron_start - 1)
                || overlaps(start, end, intron_end + 1, intron_end + region_exon)
                || is_insertion
                    && (start == intron_start
                        || end == intron_end
                        || start == interior_start
                        || end == interior_end);
            self.is_within_splice_site_region |= in_splice_region;
        }
    }

    /// Exon, coding and cDNA flags.
    pub fn determine_exonic_effect(
        &mut self,
        transcript: &Transcript,
        start: i32,
        end: i32,
        position: &MappedPosition,
        alt_allele: &str,
        insertion_no_impact: bool,
    ) {
        self.has_exon_overlap = transcript
            .regions
            .iter()
            .any(|r| r.is_exon() && r.overlaps(start, end));

        if let Some(coding) = &transcript.coding_region {
            self.after_coding = is_after_coding(start, end, transcript.end, coding.genomic_end);
            self.before_coding = is_before_coding(start, end, transcript.start, coding.genomic_start);
            self.within_cds = self.is_within_cds(position.covered_cds, Some(coding), start, end);
            self.is_coding = !insertion_no_impact && (position.cds_start.is_some() || position.cds_end.is_some());
        }

        self.within_cdna = is_within_cdna(position.covered_cdna, transcript.total_exon_length);

        if let Some(covered) = position.covered_cds {
            let variant_length = covered.cds_end - covered.cds_start + 1;
            let allele_length = alt_allele.len() as i32;
            self.has_frame_shift = position.cds_start.is_some()
                && position.cds_end.is_some()
                && !is_triplet(allele_length - variant_length);
        }

        self.overlap_with_micro_rna = is_mature_mirna_variant(
            position.cdna_start,
            position.cdna_end,
            &transcript.mirnas,
            transcript.biotype.is_mirna(),
        );
    }

    /// True when the covered interval reaches coding sequence, or when the variant sits in a
    /// frameshift intron inside the coding region.
    #[must_use]
    pub fn is_within_cds(&self, covered_cds: Option<CoveredCds>, coding: Option<&CodingRegion>, start: i32, end: i32) -> bool {
        if covered_cds.is_some() {
            return true;
        }
        match coding {
            Some(coding) if self.is_within_frameshift_intron => {
                overlaps(start, end, coding.genomic_start, coding.genomic_end)
            }
            _ => false,
        }
    }
}

/// True when the variant lies after the coding region end in genomic coordinates, including an
/// insertion directly after the last coding base.
#[must_use]
pub fn is_after_coding(start: i32, end: i32, transcript_end: i32, coding_end: i32) -> bool {
    if start == end + 1 && end == coding_end {
        return true;
    }
    overlaps(start, end, coding_end + 1, transcript_end)
}

/// True when the variant lies before the coding region start in genomic coordinates, including
/// an insertion directly before the first coding base.
#[must_use]
pub fn is_before_coding(start: i32, end: i32, transcript_start: i32, coding_start: i32) -> bool {
    if start == end + 1 && start == coding_start {
        return true;
    }
    overlaps(start, end, transcript_start, coding_start - 1)
}

#[must_use]
pub fn is_within_cdna(covered_cdna: Option<(i32, i32)>, total_exon_length: i32) -> bool {
    covered_cdna.is_some_and(|(start, end)| start > 0 && end <= total_exon_length)
}

/// Mature miRNA overlap, only for miRNA transcripts with both cDNA ends defined.
#[must_use]
pub fn is_mature_mirna_variant(
    cdna_start: Option<i32>,
    cdna_end: Option<i32>,
    mirnas: &[MirnaRegion],
    is_mirna: bool,
) -> bool {
    let (Some(start), Some(end)) = (cdna_start, cdna_end) else {
        return false;
    };
    is_mirna && mirnas.iter().any(|m| m.overlaps(start, end))
}
