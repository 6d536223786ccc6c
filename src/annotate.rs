//! Per-transcript annotation: consequences, codons, positions and HGVS.

use serde::Serialize;
use tracing::{debug, trace};

use crate::amino_acid::AminoAcids;
use crate::biotype::BioType;
use crate::codon::{Codons, get_codons};
use crate::config::AnnotationConfig;
use crate::consequence::{
    ConsequenceTerm, FeatureEffects, VariantEffect, resolve_flanking, resolve_small_variant,
    resolve_structural_variant,
};
use crate::error::Error;
use crate::hgvs::{ProteinChange, hgvs_coding, hgvs_protein};
use crate::mapping::{MappedPosition, map_position};
use crate::normalize::{normalize_with_window, rotate_three_prime};
use crate::positional::PositionalEffect;
use crate::sequence::{ReferenceSequence, bidirectional_trim, reverse_complement};
use crate::transcript::Transcript;
use crate::variant::SimpleVariant;

/// Annotation of one variant on one transcript.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedTranscript {
    pub transcript: String,
    pub bio_type: BioType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codons: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amino_acids: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cdna_pos: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cds_pos: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exons: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub introns: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein_pos: Option<String>,
    #[serde(rename = "hgvsc", skip_serializing_if = "Option::is_none")]
    pub hgvs_coding: Option<String>,
    #[serde(rename = "hgvsp", skip_serializing_if = "Option::is_none")]
    pub hgvs_protein: Option<String>,
    #[serde(rename = "consequence")]
    pub consequences: Vec<ConsequenceTerm>,
    #[serde(skip)]
    pub position: MappedPosition,
}

impl AnnotatedTranscript {
    fn new(transcript: &Transcript, position: MappedPosition, consequences: Vec<ConsequenceTerm>) -> Self {
        let intron_count = transcript.regions.len() - transcript.exon_count();
        Self {
            transcript: transcript.id.clone(),
            bio_type: transcript.biotype,
            codons: None,
            amino_acids: None,
            cdna_pos: position_range(position.cdna_start, position.cdna_end),
            cds_pos: position_range(position.cds_start, position.cds_end),
            exons: position.exons.map(|r| r.fraction(transcript.exon_count())),
            introns: position.introns.map(|r| r.fraction(intron_count)),
            protein_pos: position_range(position.protein_start, position.protein_end),
            hgvs_coding: None,
            hgvs_protein: None,
            consequences,
            position,
        }
    }
}

/// `"5"`, `"5-7"`, or `"?-7"` when one side is undefined. Insertions are shown low to high.
fn position_range(start: Option<i32>, end: Option<i32>) -> Option<String> {
    match (start, end) {
        (None, None) => None,
        (Some(start), Some(end)) if start == end => Some(start.to_string()),
        (Some(start), Some(end)) => Some(format!("{}-{}", start.min(end), start.max(end))),
        (start, end) => {
            let side = |p: Option<i32>| p.map_or_else(|| "?".to_string(), |p| p.to_string());
            Some(format!("{}-{}", side(start), side(end)))
        }
    }
}

/// `"ref/alt"`, a single value when both sides match, `-` for an empty side.
fn allele_pair(reference: &str, alternate: &str) -> Option<String> {
    if reference.is_empty() && alternate.is_empty() {
        return None;
    }
    if reference == alternate {
        return Some(reference.to_string());
    }
    let side = |s: &str| if s.is_empty() { "-".to_string() } else { s.to_string() };
    Some(format!("{}/{}", side(reference), side(alternate)))
}

/// Mapping and translation of one representation of a variant.
struct AlleleAnnotation {
    position: MappedPosition,
    transcript_alt_allele: String,
    codons: Codons,
    amino_acids: (String, String),
    covered_amino_acids: (String, String),
    /// Protein start and amino acids after trimming shared residues.
    protein_begin: Option<i32>,
    trimmed_amino_acids: (String, String),
}

impl AlleleAnnotation {
    fn new(
        transcript: &Transcript,
        variant: &SimpleVariant,
        position: MappedPosition,
        coding_sequence: Option<&str>,
        translator: &AminoAcids,
    ) -> Self {
        let transcript_alt_allele = if transcript.on_reverse_strand() {
            reverse_complement(&variant.alt_allele)
        } else {
            variant.alt_allele.clone()
        };

        let edits = transcript
            .coding_region
            .as_ref()
            .map_or(&[][..], |c| c.amino_acid_edits.as_slice());

        let codons = get_codons(
            &transcript_alt_allele,
            position.cds_start,
            position.cds_end,
            position.protein_start,
            position.protein_end,
            coding_sequence,
        );
        let protein_offset = position.protein_start.map_or(0, |p| p - 1);
        let amino_acids = translator.translate(&codons.reference, &codons.alternate, edits, protein_offset);

        let covered_amino_acids = match position.covered_cds {
            Some(covered) => {
                let covered_codons = get_codons(
                    &transcript_alt_allele,
                    Some(covered.cds_start),
                    Some(covered.cds_end),
                    Some(covered.protein_start),
                    Some(covered.protein_end),
                    coding_sequence,
                );
                translator.translate(
                    &covered_codons.reference,
                    &covered_codons.alternate,
                    edits,
                    covered.protein_start - 1,
                )
            }
            None => (String::new(), String::new()),
        };

        let (protein_begin, trimmed_amino_acids) = match position.protein_start {
            Some(start) => {
                let (trimmed_start, reference, alternate) = bidirectional_trim(start, &amino_acids.0, &amino_acids.1);
                if reference.is_empty() {
                    (Some(start), amino_acids.clone())
                } else {
                    (Some(trimmed_start), (reference, alternate))
                }
            }
            None => (None, amino_acids.clone()),
        };

        Self {
            position,
            transcript_alt_allele,
            codons,
            amino_acids,
            covered_amino_acids,
            protein_begin,
            trimmed_amino_acids,
        }
    }

    fn needs_coding_sequence(position: &MappedPosition) -> bool {
        position.cds_start.is_some() || position.cds_end.is_some() || position.covered_cds.is_some()
    }

    /// An insertion in the start codon that keeps the original start residues at its end.
    fn is_insertion_without_impact(&self, variant: &SimpleVariant) -> bool {
        let (reference, alternate) = &self.amino_acids;
        variant.is_insertion()
            && self.position.protein_start.is_some_and(|p| p <= 1)
            && alternate.ends_with(reference.as_str())
    }
}

/// Annotates variants against transcripts with one configuration.
#[derive(Debug, Clone, Default)]
pub struct Annotator {
    config: AnnotationConfig,
}

impl Annotator {
    #[must_use]
    pub fn new(config: AnnotationConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &AnnotationConfig {
        &self.config
    }

    /// Trims and left aligns a variant using the configured window. Structural variants and
    /// reference calls are returned unchanged.
    pub fn normalize<S: ReferenceSequence + ?Sized>(
        &self,
        variant: &SimpleVariant,
        reference: &S,
    ) -> Result<SimpleVariant, Error> {
        if variant.is_structural() || variant.is_reference_call() {
            return Ok(variant.clone());
        }
        let (start, ref_allele, alt_allele) = normalize_with_window(
            variant.start,
            &variant.ref_allele,
            &variant.alt_allele,
            reference,
            self.config.normalize_window,
        )?;
        if start != variant.start {
            debug!(variant = %variant, start, "normalized variant position");
        }
        Ok(SimpleVariant::new(&variant.chromosome, start, &ref_allele, &alt_allele))
    }

    /// Annotates `variant` on `transcript`.
    ///
    /// Variants that do not touch the transcript are reported as upstream or downstream; callers
    /// choose which transcripts fall within the flanking window. Consequences use the variant as
    /// given while HGVS uses its 3'-most representation.
    pub fn annotate<S: ReferenceSequence + ?Sized>(
        &self,
        variant: &SimpleVariant,
        transcript: &Transcript,
        reference: &S,
    ) -> Result<AnnotatedTranscript, Error> {
        let (low, high) = (variant.start.min(variant.end), variant.start.max(variant.end));
        if !transcript.overlaps(low, high) {
            let term = resolve_flanking(transcript, variant);
            trace!(transcript = %transcript.id, variant = %variant, %term, "flanking variant");
            let position = map_position(transcript, variant.start, variant.end, false);
            return Ok(AnnotatedTranscript::new(transcript, position, vec![term]));
        }

        if variant.is_structural() {
            return Ok(self.annotate_structural(variant, transcript));
        }

        self.annotate_small(variant, transcript, reference)
    }

    fn annotate_structural(&self, variant: &SimpleVariant, transcript: &Transcript) -> AnnotatedTranscript {
        let feature = FeatureEffects::for_transcript(transcript, variant);
        let consequences = resolve_structural_variant(&feature, false);
        let position = map_position(transcript, variant.start, variant.end, false);
        AnnotatedTranscript::new(transcript, position, consequences)
    }

    fn annotate_small<S: ReferenceSequence + ?Sized>(
        &self,
        variant: &SimpleVariant,
        transcript: &Transcript,
        reference: &S,
    ) -> Result<AnnotatedTranscript, Error> {
        let on_reverse_strand = transcript.on_reverse_strand();
        let rotated = rotate_three_prime(variant, transcript.start, transcript.end, reference, on_reverse_strand)?;

        let left_position = map_position(transcript, variant.start, variant.end, variant.is_insertion());
        let right_position = rotated
            .as_ref()
            .map(|r| map_position(transcript, r.start, r.end, r.is_insertion()));

        let needs_sequence = AlleleAnnotation::needs_coding_sequence(&left_position)
            || right_position.as_ref().is_some_and(AlleleAnnotation::needs_coding_sequence);
        let coding_sequence = if needs_sequence {
            transcript.coding_sequence(reference)?
        } else {
            None
        };

        let translator = AminoAcids::new(transcript.genetic_code);
        let left = AlleleAnnotation::new(
            transcript,
            variant,
            left_position,
            coding_sequence.as_deref(),
            &translator,
        );
        let right = match (&rotated, right_position) {
            (Some(rotated), Some(position)) => Some(AlleleAnnotation::new(
                transcript,
                rotated,
                position,
                coding_sequence.as_deref(),
                &translator,
            )),
            _ => None,
        };

        let positional = PositionalEffect::classify(
            transcript,
            variant,
            &left.position,
            left.is_insertion_without_impact(variant),
            &self.config,
        );
        let effect = VariantEffect::new(positional, variant, transcript).with_translation(
            left.trimmed_amino_acids.clone(),
            &left.codons,
            left.protein_begin,
            left.covered_amino_acids.clone(),
        );
        let feature = FeatureEffects::for_transcript(transcript, variant);
        let consequences = resolve_small_variant(&effect, &feature);

        let hgvs_variant = rotated.as_ref().unwrap_or(variant);
        let hgvs_allele = right.as_ref().unwrap_or(&left);
        let coding = hgvs_coding(transcript, hgvs_variant, reference);
        let protein =
            protein_nomenclature(transcript, hgvs_variant, hgvs_allele, coding.as_deref(), reference, &translator)?;
        if coding.is_none() {
            debug!(transcript = %transcript.id, variant = %variant, "no HGVS coding description");
        }

        let mut position = left.position;
        if let (Some(begin), Some(_)) = (left.protein_begin, position.protein_start) {
            position.protein_start = Some(begin);
            let ref_length = left.trimmed_amino_acids.0.len() as i32;
            if ref_length > 0 {
                position.protein_end = Some(begin + ref_length - 1);
            }
        }

        let mut annotated = AnnotatedTranscript::new(transcript, position, consequences);
        annotated.codons = allele_pair(&left.codons.reference, &left.codons.alternate);
        annotated.amino_acids = allele_pair(&left.trimmed_amino_acids.0, &left.trimmed_amino_acids.1);
        annotated.hgvs_coding = coding;
        annotated.hgvs_protein = protein;
        Ok(annotated)
    }
}

fn protein_nomenclature<S: ReferenceSequence + ?Sized>(
    transcript: &Transcript,
    variant: &SimpleVariant,
    allele: &AlleleAnnotation,
    coding: Option<&str>,
    reference: &S,
    translator: &AminoAcids,
) -> Result<Option<String>, Error> {
    if coding.is_none() || allele.position.cds_start.is_none() {
        return Ok(None);
    }
    let extended_cds = transcript.extended_coding_sequence(reference)?;
    let change = ProteinChange {
        ref_amino_acids: &allele.amino_acids.0,
        alt_amino_acids: &allele.amino_acids.1,
        protein_start: allele.position.protein_start,
        cds_start: allele.position.cds_start,
        cds_end: allele.position.cds_end,
        transcript_alt_allele: &allele.transcript_alt_allele,
        is_reference_call: variant.is_reference_call(),
    };
    hgvs_protein(transcript, &change, coding, extended_cds.as_deref(), translator)
}

/// Annotates with the default configuration.
pub fn annotate<S: ReferenceSequence + ?Sized>(
    variant: &SimpleVariant,
    transcript: &Transcript,
    reference: &S,
) -> Result<AnnotatedTranscript, Error> {
    Annotator::default().annotate(variant, transcript, reference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::sequence::SimpleSequence;
    use crate::variant::VariantType;

    fn annotate_fixture(start: i32, ref_allele: &str, alt_allele: &str) -> AnnotatedTranscript {
        let transcript = fixtures::enst00000343938();
        let reference = fixtures::enst00000343938_reference();
        let variant = SimpleVariant::new("chr1", start, ref_allele, alt_allele);
        annotate(&variant, &transcript, &reference).unwrap()
    }

    fn protein(annotated: &AnnotatedTranscript) -> &str {
        annotated.hgvs_protein.as_deref().unwrap()
    }

    #[test]
    fn missense() {
        let a = annotate_fixture(1262295, "A", "C");
        assert_eq!(a.consequences, vec![ConsequenceTerm::MissenseVariant]);
        assert_eq!(a.hgvs_coding.as_deref(), Some("ENST00000343938.4:c.5A>C"));
        assert_eq!(protein(&a), "ENSP00000343864.2:p.(Asp2Ala)");
        assert_eq!(a.codons.as_deref(), Some("gAt/gCt"));
        assert_eq!(a.amino_acids.as_deref(), Some("D/A"));
        assert_eq!(a.cds_pos.as_deref(), Some("5"));
        assert_eq!(a.protein_pos.as_deref(), Some("2"));
        assert_eq!(a.exons.as_deref(), Some("2/3"));
    }

    #[test]
    fn inframe_insertion() {
        let a = annotate_fixture(1262297, "", "TTC");
        assert_eq!(a.consequences, vec![ConsequenceTerm::InframeInsertion]);
        assert_eq!(a.hgvs_coding.as_deref(), Some("ENST00000343938.4:c.6_7insTTC"));
        assert_eq!(protein(&a), "ENSP00000343864.2:p.(Asp2_Asp3insPhe)");
    }

    #[test]
    fn insertion_rotated_into_duplication() {
        let a = annotate_fixture(1262297, "", "GAC");
        assert_eq!(a.consequences, vec![ConsequenceTerm::InframeInsertion]);
        assert_eq!(a.hgvs_coding.as_deref(), Some("ENST00000343938.4:c.7_9dup"));
        assert_eq!(protein(&a), "ENSP00000343864.2:p.(Asp3dup)");
    }

    #[test]
    fn inframe_deletion() {
        let a = annotate_fixture(1262300, "TCG", "");
        assert_eq!(a.consequences, vec![ConsequenceTerm::InframeDeletion]);
        assert_eq!(a.hgvs_coding.as_deref(), Some("ENST00000343938.4:c.10_12del"));
        assert_eq!(protein(&a), "ENSP00000343864.2:p.(Ser4del)");
    }

    #[test]
    fn delins_across_two_codons() {
        let a = annotate_fixture(1262300, "TCGGAG", "GAGACA");
        assert_eq!(a.hgvs_coding.as_deref(), Some("ENST00000343938.4:c.10_15delinsGAGACA"));
        assert_eq!(protein(&a), "ENSP00000343864.2:p.(Ser4_Glu5delinsGluThr)");
    }

    #[test]
    fn silent_change_wraps_coding_description() {
        let a = annotate_fixture(1262300, "TCG", "AGT");
        assert_eq!(protein(&a), "ENST00000343938.4:c.10_12delinsAGT(p.(Ser4=))");
    }

    #[test]
    fn frameshift() {
        let a = annotate_fixture(1262300, "TC", "");
        assert_eq!(a.consequences, vec![ConsequenceTerm::FrameshiftVariant]);
        assert_eq!(a.hgvs_coding.as_deref(), Some("ENST00000343938.4:c.10_11del"));
        assert_eq!(protein(&a), "ENSP00000343864.2:p.(Ser4GlyfsTer19)");
    }

    #[test]
    fn insertion_creating_stop() {
        let a = annotate_fixture(1262313, "", "GA");
        assert_eq!(
            a.consequences,
            vec![ConsequenceTerm::StopGained, ConsequenceTerm::FrameshiftVariant]
        );
        assert_eq!(a.hgvs_coding.as_deref(), Some("ENST00000343938.4:c.22_23insGA"));
        assert_eq!(protein(&a), "ENSP00000343864.2:p.(Phe8Ter)");
    }

    #[test]
    fn stop_codon_deletion_extends_protein() {
        let a = annotate_fixture(1263141, "TAG", "");
        assert!(a.consequences.contains(&ConsequenceTerm::StopLost));
        assert_eq!(a.hgvs_coding.as_deref(), Some("ENST00000343938.4:c.643_645del"));
        assert_eq!(protein(&a), "ENSP00000343864.2:p.(Ter215GlyextTer43)");
    }

    #[test]
    fn utr_and_intron() {
        let utr = annotate_fixture(1260247, "A", "G");
        assert_eq!(utr.consequences, vec![ConsequenceTerm::FivePrimeUtrVariant]);
        assert_eq!(utr.hgvs_coding.as_deref(), Some("ENST00000343938.4:c.-311A>G"));
        assert!(utr.hgvs_protein.is_none());
        assert!(utr.cds_pos.is_none());

        let intron = annotate_fixture(1261000, "A", "G");
        assert_eq!(intron.consequences, vec![ConsequenceTerm::IntronVariant]);
        assert_eq!(intron.introns.as_deref(), Some("1/2"));
        assert!(intron.hgvs_protein.is_none());
    }

    #[test]
    fn reverse_strand_intron_without_coding_sequence() {
        let transcript = fixtures::enst00000423372();
        let reference = SimpleSequence::new(Vec::new(), 0);
        let variant = SimpleVariant::new("chr1", 136000, "A", "G");
        let a = annotate(&variant, &transcript, &reference).unwrap();
        assert_eq!(a.consequences, vec![ConsequenceTerm::IntronVariant]);
        assert_eq!(a.hgvs_coding.as_deref(), Some("ENST00000423372.3:c.*910-198T>C"));
    }

    #[test]
    fn flanking_variants() {
        let transcript = fixtures::enst00000343938();
        let reference = fixtures::enst00000343938_reference();
        let upstream = SimpleVariant::new("chr1", 1260000, "A", "G");
        let a = annotate(&upstream, &transcript, &reference).unwrap();
        assert_eq!(a.consequences, vec![ConsequenceTerm::UpstreamGeneVariant]);
        assert!(a.hgvs_coding.is_none());

        let downstream = SimpleVariant::new("chr1", 1265000, "A", "G");
        let a = annotate(&downstream, &transcript, &reference).unwrap();
        assert_eq!(a.consequences, vec![ConsequenceTerm::DownstreamGeneVariant]);
    }

    #[test]
    fn structural_deletion_ablates_transcript() {
        let transcript = fixtures::enst00000343938();
        let reference = fixtures::enst00000343938_reference();
        let variant = SimpleVariant::structural("chr1", 1250000, 1270000, VariantType::Deletion);
        let a = annotate(&variant, &transcript, &reference).unwrap();
        assert_eq!(a.consequences, vec![ConsequenceTerm::TranscriptAblation]);
        assert!(a.hgvs_coding.is_none());
    }

    #[test]
    fn insertion_after_non_coding_transcript() {
        let transcript = fixtures::enst00000579622();
        let reference = SimpleSequence::new(b"ACAC".to_vec(), 70361152);
        let variant = SimpleVariant::new("chrX", 70361157, "", "ACAC");
        let a = annotate(&variant, &transcript, &reference).unwrap();
        assert_eq!(a.hgvs_coding.as_deref(), Some("ENST00000579622.1:n.119_122dup"));
        assert!(a.hgvs_protein.is_none());
    }

    #[test]
    fn json_layout() {
        let a = annotate_fixture(1262295, "A", "C");
        let json = serde_json::to_value(&a).unwrap();
        assert_eq!(json["transcript"], "ENST00000343938.4");
        assert_eq!(json["bioType"], "mRNA");
        assert_eq!(json["hgvsc"], "ENST00000343938.4:c.5A>C");
        assert_eq!(json["consequence"][0], "missense_variant");
        assert!(json.get("position").is_none());
    }

    #[test]
    fn normalize_left_aligns_with_configured_window() {
        let reference = fixtures::enst00000343938_reference();
        let annotator = Annotator::default();
        let unique = SimpleVariant::new("chr1", 1262294, "GA", "");
        let normalized = annotator.normalize(&unique, &reference).unwrap();
        assert_eq!(normalized.start, 1262294);

        // GGGTGTGA
        let repeat = SimpleVariant::new("chr1", 1262531, "TG", "");
        let normalized = annotator.normalize(&repeat, &reference).unwrap();
        assert_eq!(normalized.start, 1262528);
        assert_eq!(normalized.ref_allele, "GT");
        assert_eq!(normalized.variant_type, VariantType::Deletion);
    }

    #[test]
    fn position_ranges() {
        assert_eq!(position_range(Some(5), Some(5)).as_deref(), Some("5"));
        assert_eq!(position_range(Some(7), Some(6)).as_deref(), Some("6-7"));
        assert_eq!(position_range(None, Some(6)).as_deref(), Some("?-6"));
        assert_eq!(position_range(None, None), None);
    }
}
