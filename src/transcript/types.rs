//! Transcript data model consumed by the annotator.

use serde::{Deserialize, Serialize};

use crate::biotype::BioType;
use crate::codon::GeneticCode;
use crate::error::Error;
use crate::mirna::MirnaRegion;
use crate::sequence::{ReferenceSequence, reverse_complement};
use crate::strand::Strand;

/// Type of a transcript region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptRegionType {
    Exon,
    Intron,
}

/// A region within a transcript (exon or intron) mapping genomic to cDNA coordinates.
///
/// Introns carry the cDNA positions of their flanking exon bases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptRegion {
    #[serde(rename = "type")]
    pub region_type: TranscriptRegionType,
    pub id: u16,
    pub genomic_start: i32,
    pub genomic_end: i32,
    pub cdna_start: i32,
    pub cdna_end: i32,
}

impl TranscriptRegion {
    #[must_use]
    pub fn is_exon(&self) -> bool {
        self.region_type == TranscriptRegionType::Exon
    }

    #[must_use]
    pub fn contains(&self, position: i32) -> bool {
        position >= self.genomic_start && position <= self.genomic_end
    }

    #[must_use]
    pub fn overlaps(&self, start: i32, end: i32) -> bool {
        self.genomic_end >= start && self.genomic_start <= end
    }
}

/// A residue override applied after table-based translation (e.g. selenocysteine).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AminoAcidEdit {
    pub position: u32,  // 1-based position in translated protein
    pub amino_acid: u8, // replacement residue
}

/// Coding region of a transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodingRegion {
    pub genomic_start: i32,
    pub genomic_end: i32,
    pub cdna_start: i32,
    pub cdna_end: i32,
    pub protein_id: String,
    pub protein_seq: String,
    pub amino_acid_edits: Vec<AminoAcidEdit>,
}

/// Gene record; transcripts refer to genes by index into [`super::TranscriptSet::genes`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gene {
    pub symbol: String,
    #[serde(default)]
    pub ensembl_id: Option<String>,
    #[serde(default)]
    pub hgnc_id: Option<i32>,
}

/// A fully populated transcript model.
///
/// Regions are sorted by genomic start and contiguous from the transcript start to its end.
#[derive(Debug, Clone)]
pub struct Transcript {
    pub id: String,
    pub chromosome: String,
    pub start: i32,
    pub end: i32,
    pub biotype: BioType,
    pub strand: Strand,
    pub gene_index: usize,
    pub regions: Vec<TranscriptRegion>,
    pub coding_region: Option<CodingRegion>,
    pub start_exon_phase: u8,
    pub total_exon_length: i32,
    pub mirnas: Vec<MirnaRegion>,
    pub genetic_code: GeneticCode,
}

impl Transcript {
    /// Builds a transcript from its regions, checking the ordering invariants.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: &str,
        chromosome: &str,
        biotype: BioType,
        strand: Strand,
        gene_index: usize,
        regions: Vec<TranscriptRegion>,
        coding_region: Option<CodingRegion>,
        start_exon_phase: u8,
    ) -> Result<Self, Error> {
        let invalid = |reason: String| Error::InvalidTranscript {
            id: id.to_string(),
            reason,
        };

        let (Some(first), Some(last)) = (regions.first(), regions.last()) else {
            return Err(invalid("no transcript regions".to_string()));
        };
        let (start, end) = (first.genomic_start, last.genomic_end);

        for region in &regions {
            if region.genomic_end < region.genomic_start {
                return Err(invalid(format!(
                    "region {}-{} ends before it starts",
                    region.genomic_start, region.genomic_end
                )));
            }
        }
        for pair in regions.windows(2) {
            if pair[1].genomic_start != pair[0].genomic_end + 1 {
                return Err(invalid(format!(
                    "regions {}-{} and {}-{} are not contiguous",
                    pair[0].genomic_start,
                    pair[0].genomic_end,
                    pair[1].genomic_start,
                    pair[1].genomic_end
                )));
            }
        }
        if start_exon_phase > 2 {
            return Err(invalid(format!("start exon phase {start_exon_phase} exceeds 2")));
        }

        let total_exon_length = regions
            .iter()
            .filter(|r| r.is_exon())
            .map(|r| r.cdna_end - r.cdna_start + 1)
            .sum();

        let genetic_code = if matches!(chromosome, "chrM" | "MT" | "M" | "chrMT" | "NC_012920.1") {
            GeneticCode::VertebrateMitochondrial
        } else {
            GeneticCode::Standard
        };

        Ok(Self {
            id: id.to_string(),
            chromosome: chromosome.to_string(),
            start,
            end,
            biotype,
            strand,
            gene_index,
            regions,
            coding_region,
            start_exon_phase,
            total_exon_length,
            mirnas: Vec::new(),
            genetic_code,
        })
    }

    #[must_use]
    pub fn with_mirnas(mut self, mirnas: Vec<MirnaRegion>) -> Self {
        self.mirnas = mirnas;
        self
    }

    #[must_use]
    pub fn with_genetic_code(mut self, genetic_code: GeneticCode) -> Self {
        self.genetic_code = genetic_code;
        self
    }

    #[must_use]
    pub fn on_reverse_strand(&self) -> bool {
        self.strand.is_reverse()
    }

    #[must_use]
    pub fn overlaps(&self, start: i32, end: i32) -> bool {
        self.end >= start && self.start <= end
    }

    /// Number of exons (regions are stored as exon/intron pairs).
    #[must_use]
    pub fn exon_count(&self) -> usize {
        self.regions.iter().filter(|r| r.is_exon()).count()
    }

    /// Coding sequence length including the start-exon phase padding.
    #[must_use]
    pub fn cds_length(&self) -> Option<i32> {
        self.coding_region
            .as_ref()
            .map(|c| c.cdna_end - c.cdna_start + 1 + i32::from(self.start_exon_phase))
    }

    #[must_use]
    pub fn protein_id(&self) -> Option<&str> {
        self.coding_region.as_ref().map(|c| c.protein_id.as_str())
    }

    /// Spliced coding sequence in transcript orientation, prefixed with one `N` per
    /// start-exon phase base. `None` for non-coding transcripts.
    pub fn coding_sequence<S: ReferenceSequence + ?Sized>(
        &self,
        reference: &S,
    ) -> Result<Option<String>, Error> {
        let Some(coding) = &self.coding_region else {
            return Ok(None);
        };
        self.spliced_bases(reference, coding.genomic_start, coding.genomic_end)
            .map(Some)
    }

    /// Coding sequence continued through the 3' UTR to the end of the transcript. Used to read
    /// past the annotated stop codon when a variant removes it or shifts the frame.
    pub fn extended_coding_sequence<S: ReferenceSequence + ?Sized>(
        &self,
        reference: &S,
    ) -> Result<Option<String>, Error> {
        let Some(coding) = &self.coding_region else {
            return Ok(None);
        };
        let (start, end) = if self.strand.is_reverse() {
            (self.start, coding.genomic_end)
        } else {
            (coding.genomic_start, self.end)
        };
        self.spliced_bases(reference, start, end).map(Some)
    }

    fn spliced_bases<S: ReferenceSequence + ?Sized>(
        &self,
        reference: &S,
        from: i32,
        to: i32,
    ) -> Result<String, Error> {
        let mut bases = String::new();
        for region in self.regions.iter().filter(|r| r.is_exon()) {
            if !region.overlaps(from, to) {
                continue;
            }
            let start = region.genomic_start.max(from);
            let end = region.genomic_end.min(to);
            let length = (end - start + 1) as usize;
            let exon_bases = reference.bases(i64::from(start) - 1, length)?;
            if exon_bases.len() != length {
                return Err(Error::Sequence(format!(
                    "exon bases {start}-{end} of {} extend past the reference",
                    self.id
                )));
            }
            bases.push_str(&exon_bases);
        }

        if self.strand.is_reverse() {
            bases = reverse_complement(&bases);
        }
        let mut sequence = "N".repeat(usize::from(self.start_exon_phase));
        sequence.push_str(&bases);
        Ok(sequence)
    }
}
