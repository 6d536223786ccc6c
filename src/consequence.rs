//! Sequence Ontology consequence terms and the rules that produce them.

use std::fmt;

use serde::Serialize;

use crate::amino_acid::STOP;
use crate::biotype::BioType;
use crate::codon::Codons;
use crate::positional::PositionalEffect;
use crate::transcript::Transcript;
use crate::variant::{SimpleVariant, VariantType};

/// Consequence terms in reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsequenceTerm {
    TranscriptAblation,
    TranscriptAmplification,
    #[serde(rename = "mature_miRNA_variant")]
    MatureMirnaVariant,
    SpliceDonorVariant,
    SpliceAcceptorVariant,
    StopGained,
    FrameshiftVariant,
    StopLost,
    StartLost,
    InframeInsertion,
    InframeDeletion,
    MissenseVariant,
    ProteinAlteringVariant,
    SpliceRegionVariant,
    IncompleteTerminalCodonVariant,
    StartRetainedVariant,
    StopRetainedVariant,
    SynonymousVariant,
    CodingSequenceVariant,
    #[serde(rename = "5_prime_UTR_variant")]
    FivePrimeUtrVariant,
    #[serde(rename = "3_prime_UTR_variant")]
    ThreePrimeUtrVariant,
    NonCodingTranscriptExonVariant,
    IntronVariant,
    #[serde(rename = "NMD_transcript_variant")]
    NmdTranscriptVariant,
    NonCodingTranscriptVariant,
    FeatureElongation,
    FeatureTruncation,
    TranscriptTruncation,
    UnidirectionalGeneFusion,
    CopyNumberIncrease,
    CopyNumberDecrease,
    CopyNumberChange,
    ShortTandemRepeatChange,
    ShortTandemRepeatExpansion,
    ShortTandemRepeatContraction,
    UpstreamGeneVariant,
    DownstreamGeneVariant,
    IntergenicVariant,
    TranscriptVariant,
}

impl ConsequenceTerm {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TranscriptAblation => "transcript_ablation",
            Self::TranscriptAmplification => "transcript_amplification",
            Self::MatureMirnaVariant => "mature_miRNA_variant",
            Self::SpliceDonorVariant => "splice_donor_variant",
            Self::SpliceAcceptorVariant => "splice_acceptor_variant",
            Self::StopGained => "stop_gained",
            Self::FrameshiftVariant => "frameshift_variant",
            Self::StopLost => "stop_lost",
            Self::StartLost => "start_lost",
            Self::InframeInsertion => "inframe_insertion",
            Self::InframeDeletion => "inframe_deletion",
            Self::MissenseVariant => "missense_variant",
            Self::ProteinAlteringVariant => "protein_altering_variant",
            Self::SpliceRegionVariant => "splice_region_variant",
            Self::IncompleteTerminalCodonVariant => "incomplete_terminal_codon_variant",
            Self::StartRetainedVariant => "start_retained_variant",
            Self::StopRetainedVariant => "stop_retained_variant",
            Self::SynonymousVariant => "synonymous_variant",
            Self::CodingSequenceVariant => "coding_sequence_variant",
            Self::FivePrimeUtrVariant => "5_prime_UTR_variant",
            Self::ThreePrimeUtrVariant => "3_prime_UTR_variant",
            Self::NonCodingTranscriptExonVariant => "non_coding_transcript_exon_variant",
            Self::IntronVariant => "intron_variant",
            Self::NmdTranscriptVariant => "NMD_transcript_variant",
            Self::NonCodingTranscriptVariant => "non_coding_transcript_variant",
            Self::FeatureElongation => "feature_elongation",
            Self::FeatureTruncation => "feature_truncation",
            Self::TranscriptTruncation => "transcript_truncation",
            Self::UnidirectionalGeneFusion => "unidirectional_gene_fusion",
            Self::CopyNumberIncrease => "copy_number_increase",
            Self::CopyNumberDecrease => "copy_number_decrease",
            Self::CopyNumberChange => "copy_number_change",
            Self::ShortTandemRepeatChange => "short_tandem_repeat_change",
            Self::ShortTandemRepeatExpansion => "short_tandem_repeat_expansion",
            Self::ShortTandemRepeatContraction => "short_tandem_repeat_contraction",
            Self::UpstreamGeneVariant => "upstream_gene_variant",
            Self::DownstreamGeneVariant => "downstream_gene_variant",
            Self::IntergenicVariant => "intergenic_variant",
            Self::TranscriptVariant => "transcript_variant",
        }
    }
}

impl fmt::Display for ConsequenceTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a variant interval overlaps a feature interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapType {
    None,
    Partial,
    /// The variant lies inside the feature.
    CompletelyWithin,
    /// The variant covers the whole feature.
    CompletelyOverlaps,
}

/// Which feature endpoints the variant touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointOverlapType {
    None,
    Start,
    End,
    Both,
}

#[must_use]
pub fn overlap_type(feature_start: i32, feature_end: i32, start: i32, end: i32) -> OverlapType {
    if end < feature_start || start > feature_end {
        OverlapType::None
    } else if start <= feature_start && end >= feature_end {
        OverlapType::CompletelyOverlaps
    } else if start >= feature_start && end <= feature_end {
        OverlapType::CompletelyWithin
    } else {
        OverlapType::Partial
    }
}

#[must_use]
pub fn endpoint_overlap_type(feature_start: i32, feature_end: i32, start: i32, end: i32) -> EndpointOverlapType {
    let touches = |position: i32| start <= position && end >= position;
    match (touches(feature_start), touches(feature_end)) {
        (true, true) => EndpointOverlapType::Both,
        (true, false) => EndpointOverlapType::Start,
        (false, true) => EndpointOverlapType::End,
        (false, false) => EndpointOverlapType::None,
    }
}

/// Whole-feature effects derived from the overlap between a variant and a transcript.
#[derive(Debug, Clone, Copy)]
pub struct FeatureEffects {
    overlap: OverlapType,
    endpoint: EndpointOverlapType,
    variant_type: VariantType,
    is_structural: bool,
}

impl FeatureEffects {
    #[must_use]
    pub fn new(overlap: OverlapType, endpoint: EndpointOverlapType, variant_type: VariantType, is_structural: bool) -> Self {
        Self {
            overlap,
            endpoint,
            variant_type,
            is_structural,
        }
    }

    /// Feature effects of `variant` on `transcript`.
    #[must_use]
    pub fn for_transcript(transcript: &Transcript, variant: &SimpleVariant) -> Self {
        Self::new(
            overlap_type(transcript.start, transcript.end, variant.start, variant.end),
            endpoint_overlap_type(transcript.start, transcript.end, variant.start, variant.end),
            variant.variant_type,
            variant.is_structural(),
        )
    }

    fn is_loss(&self) -> bool {
        matches!(self.variant_type, VariantType::Deletion | VariantType::CopyNumberLoss)
    }

    fn is_gain(&self) -> bool {
        matches!(
            self.variant_type,
            VariantType::CopyNumberGain | VariantType::Duplication | VariantType::TandemDuplication
        )
    }

    #[must_use]
    pub fn ablation(&self) -> bool {
        self.is_loss() && self.overlap == OverlapType::CompletelyOverlaps
    }

    #[must_use]
    pub fn amplification(&self) -> bool {
        self.is_gain() && self.overlap == OverlapType::CompletelyOverlaps
    }

    /// A structural loss that removes part of the transcript.
    #[must_use]
    pub fn truncation(&self) -> bool {
        self.is_structural
            && self.is_loss()
            && matches!(self.overlap, OverlapType::Partial | OverlapType::CompletelyWithin)
    }

    /// A structural gain or insertion inside the transcript.
    #[must_use]
    pub fn elongation(&self) -> bool {
        self.is_structural
            && self.overlap == OverlapType::CompletelyWithin
            && (self.is_gain() || self.variant_type == VariantType::Insertion)
    }

    /// Truncations that cross a transcript end remove the transcript end itself; those inside
    /// shorten the feature.
    fn truncation_term(&self) -> ConsequenceTerm {
        if self.endpoint == EndpointOverlapType::None {
            ConsequenceTerm::FeatureTruncation
        } else {
            ConsequenceTerm::TranscriptTruncation
        }
    }
}

/// Coding facts of the transcript needed by the rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodingFacts {
    /// Coding region length in cDNA bases.
    pub cds_length: i32,
    pub protein_length: i32,
}

/// Everything the consequence predicates look at for one variant on one transcript.
///
/// Amino acid and codon strings are empty when undefined.
#[derive(Debug, Clone)]
pub struct VariantEffect {
    pub positional: PositionalEffect,
    pub variant_type: VariantType,
    pub biotype: BioType,
    pub on_reverse_strand: bool,
    pub coding: Option<CodingFacts>,
    pub is_insertion: bool,
    pub is_deletion: bool,
    pub ref_amino_acids: String,
    pub alt_amino_acids: String,
    pub ref_codons: String,
    pub alt_codons: String,
    pub covered_ref_amino_acids: String,
    pub covered_alt_amino_acids: String,
    pub protein_begin: Option<i32>,
}

fn common_prefix_length(a: &str, b: &str) -> usize {
    a.bytes().zip(b.bytes()).take_while(|(x, y)| x == y).count()
}

fn common_suffix_length(a: &str, b: &str) -> usize {
    a.bytes().rev().zip(b.bytes().rev()).take_while(|(x, y)| x == y).count()
}

impl VariantEffect {
    #[must_use]
    pub fn new(positional: PositionalEffect, variant: &SimpleVariant, transcript: &Transcript) -> Self {
        let coding = transcript.coding_region.as_ref().map(|c| CodingFacts {
            cds_length: c.cdna_end - c.cdna_start + 1,
            protein_length: c.protein_seq.len() as i32,
        });
        Self {
            positional,
            variant_type: variant.variant_type,
            biotype: transcript.biotype,
            on_reverse_strand: transcript.on_reverse_strand(),
            coding,
            is_insertion: variant.alt_allele.len() > variant.ref_allele.len(),
            is_deletion: variant.alt_allele.len() < variant.ref_allele.len(),
            ref_amino_acids: String::new(),
            alt_amino_acids: String::new(),
            ref_codons: String::new(),
            alt_codons: String::new(),
            covered_ref_amino_acids: String::new(),
            covered_alt_amino_acids: String::new(),
            protein_begin: None,
        }
    }

    /// Adds the translated change. `covered` holds the amino acids of the covered interval.
    #[must_use]
    pub fn with_translation(
        mut self,
        amino_acids: (String, String),
        codons: &Codons,
        protein_begin: Option<i32>,
        covered: (String, String),
    ) -> Self {
        (self.ref_amino_acids, self.alt_amino_acids) = amino_acids;
        self.ref_codons = codons.reference.clone();
        self.alt_codons = codons.alternate.clone();
        self.protein_begin = protein_begin;
        (self.covered_ref_amino_acids, self.covered_alt_amino_acids) = covered;
        self
    }

    pub fn is_splice_acceptor_variant(&self) -> bool {
        if self.on_reverse_strand {
            self.positional.is_start_splice_site
        } else {
            self.positional.is_end_splice_site
        }
    }

    pub fn is_splice_donor_variant(&self) -> bool {
        if self.on_reverse_strand {
            self.positional.is_end_splice_site
        } else {
            self.positional.is_start_splice_site
        }
    }

    pub fn is_splice_region_variant(&self) -> bool {
        !self.is_splice_donor_variant()
            && !self.is_splice_acceptor_variant()
            && self.positional.is_within_splice_site_region
    }

    pub fn is_five_prime_utr_variant(&self) -> bool {
        let five_prime_of_coding = if self.on_reverse_strand {
            self.positional.after_coding
        } else {
            self.positional.before_coding
        };
        self.coding.is_some() && five_prime_of_coding && self.positional.within_cdna
    }

    pub fn is_three_prime_utr_variant(&self) -> bool {
        let three_prime_of_coding = if self.on_reverse_strand {
            self.positional.before_coding
        } else {
            self.positional.after_coding
        };
        self.coding.is_some() && three_prime_of_coding && self.positional.within_cdna
    }

    pub fn is_frameshift_variant(&self) -> bool {
        self.positional.is_coding && self.positional.has_frame_shift
    }

    /// The variant touches the final codon of a coding region whose length is not a multiple
    /// of three.
    pub fn is_incomplete_terminal_codon_variant(&self) -> bool {
        let (Some(coding), Some(protein_begin)) = (self.coding, self.protein_begin) else {
            return false;
        };
        let codon_cds_start = protein_begin * 3 - 2;
        let last_codon_length = coding.cds_length - (codon_cds_start - 1);
        last_codon_length > 0 && last_codon_length < 3
    }

    pub fn is_inframe_deletion(&self) -> bool {
        if !self.positional.is_coding || !self.is_deletion {
            return false;
        }
        if self.ref_codons.is_empty()
            || self.is_frameshift_variant()
            || self.is_incomplete_terminal_codon_variant()
            || self.is_stop_gained()
        {
            return false;
        }

        let reference = self.ref_codons.to_ascii_lowercase();
        let alternate = self.alt_codons.to_ascii_lowercase();
        if reference.starts_with(&alternate) || reference.ends_with(&alternate) {
            return true;
        }

        let prefix = common_prefix_length(&self.ref_codons, &self.alt_codons);
        let suffix = common_suffix_length(&self.ref_codons, &self.alt_codons);
        self.alt_codons.len() as i64 - prefix as i64 - suffix as i64 == 0
    }

    pub fn is_inframe_insertion(&self) -> bool {
        if !self.positional.is_coding || !self.is_insertion {
            return false;
        }
        if self.is_stop_retained()
            || self.is_frameshift_variant()
            || self.is_start_lost()
            || self.alt_codons.len() <= self.ref_codons.len()
            || self.is_incomplete_terminal_codon_variant()
        {
            return false;
        }
        !self.is_truncated_by_stop()
    }

    /// The inserted sequence stops translation before adding any residue.
    fn is_truncated_by_stop(&self) -> bool {
        match self.alt_amino_acids.find(STOP) {
            Some(stop) => stop == 0 || self.ref_amino_acids.starts_with(&self.alt_amino_acids[..stop]),
            None => false,
        }
    }

    pub fn is_start_lost(&self) -> bool {
        if !self.positional.is_coding || self.protein_begin != Some(1) || self.ref_amino_acids.is_empty() {
            return false;
        }
        if self.is_insertion && self.alt_amino_acids.ends_with(self.ref_amino_acids.as_str()) {
            return false;
        }
        self.alt_amino_acids.is_empty() || self.alt_amino_acids.as_bytes()[0] != self.ref_amino_acids.as_bytes()[0]
    }

    pub fn is_missense_variant(&self) -> bool {
        if !self.positional.is_coding
            || self.is_start_lost()
            || self.is_stop_lost()
            || self.is_stop_gained()
            || self.is_incomplete_terminal_codon_variant()
            || self.is_frameshift_variant()
            || self.is_inframe_deletion()
            || self.is_inframe_insertion()
        {
            return false;
        }
        self.ref_amino_acids != self.alt_amino_acids && self.ref_amino_acids.len() == self.alt_amino_acids.len()
    }

    pub fn is_protein_altering_variant(&self) -> bool {
        let same_length = self.ref_amino_acids.len() == self.alt_amino_acids.len();
        let starts_with_unknown = self.ref_amino_acids.starts_with('X') || self.alt_amino_acids.starts_with('X');

        !(same_length
            || starts_with_unknown
            || !self.positional.is_coding
            || self.is_inframe_deletion()
            || self.is_stop_lost()
            || self.is_stop_gained()
            || self.is_start_lost()
            || self.is_frameshift_variant()
            || self.is_inframe_insertion()
            || self.is_stop_retained())
    }

    pub fn is_stop_gained(&self) -> bool {
        !self.is_stop_retained()
            && !self.ref_amino_acids.contains(STOP)
            && self.alt_amino_acids.contains(STOP)
    }

    /// Uses the covered amino acids so partially coding variants that remove the stop count.
    pub fn is_stop_lost(&self) -> bool {
        self.covered_ref_amino_acids.contains(STOP) && !self.covered_alt_amino_acids.contains(STOP)
    }

    pub fn is_stop_retained(&self) -> bool {
        if !self.positional.is_coding {
            return false;
        }
        let substituted_stop = !self.ref_amino_acids.is_empty()
            && self.ref_amino_acids == self.alt_amino_acids
            && self.ref_amino_acids.contains(STOP);

        // insertion right after the last residue that starts with a stop
        let inserted_stop = self.ref_amino_acids.is_empty()
            && self.alt_amino_acids.starts_with(STOP)
            && self
                .coding
                .is_some_and(|c| self.protein_begin == Some(c.protein_length + 1));

        substituted_stop || inserted_stop
    }

    pub fn is_start_retained(&self) -> bool {
        if self.protein_begin != Some(1) {
            return false;
        }
        match self.ref_amino_acids.chars().next() {
            Some(start) => self.alt_amino_acids.contains(start),
            None => false,
        }
    }

    pub fn is_synonymous_variant(&self) -> bool {
        !self.ref_amino_acids.is_empty()
            && matches!(self.variant_type, VariantType::Snv | VariantType::Mnv)
            && self.ref_amino_acids == self.alt_amino_acids
            && !self.ref_amino_acids.contains('X')
            && !self.alt_amino_acids.contains('X')
            && !self.is_stop_retained()
    }

    /// Catch-all for coding changes without a more specific term.
    pub fn is_coding_sequence_variant(&self) -> bool {
        let unknown_change =
            self.coding.is_none() || self.alt_amino_acids.is_empty() || self.alt_amino_acids.contains('X');

        self.positional.within_cds
            && unknown_change
            && !(self.is_frameshift_variant()
                || self.is_inframe_deletion()
                || self.is_incomplete_terminal_codon_variant()
                || self.is_protein_altering_variant()
                || self.is_stop_gained()
                || self.is_stop_retained()
                || self.is_stop_lost())
    }

    pub fn is_non_coding_transcript_exon_variant(&self) -> bool {
        self.positional.has_exon_overlap && self.coding.is_none() && !self.positional.overlap_with_micro_rna
    }

    pub fn is_non_coding_transcript_variant(&self) -> bool {
        self.coding.is_none() && !self.positional.overlap_with_micro_rna
    }

    pub fn is_nonsense_mediated_decay_transcript_variant(&self) -> bool {
        self.biotype.is_nonsense_mediated_decay()
    }

    pub fn is_within_intron(&self) -> bool {
        self.positional.is_within_intron
    }

    pub fn is_mature_mirna_variant(&self) -> bool {
        self.positional.overlap_with_micro_rna
    }
}

type Rule = (ConsequenceTerm, fn(&VariantEffect) -> bool);

/// Small variant rules, evaluated in order; every rule that holds adds its term.
static SMALL_VARIANT_RULES: &[Rule] = &[
    (ConsequenceTerm::SpliceDonorVariant, VariantEffect::is_splice_donor_variant),
    (ConsequenceTerm::SpliceAcceptorVariant, VariantEffect::is_splice_acceptor_variant),
    (ConsequenceTerm::StopGained, VariantEffect::is_stop_gained),
    (ConsequenceTerm::FrameshiftVariant, VariantEffect::is_frameshift_variant),
    (ConsequenceTerm::StopLost, VariantEffect::is_stop_lost),
    (ConsequenceTerm::StartLost, VariantEffect::is_start_lost),
    (ConsequenceTerm::InframeInsertion, VariantEffect::is_inframe_insertion),
    (ConsequenceTerm::InframeDeletion, VariantEffect::is_inframe_deletion),
    (ConsequenceTerm::MissenseVariant, VariantEffect::is_missense_variant),
    (ConsequenceTerm::ProteinAlteringVariant, VariantEffect::is_protein_altering_variant),
    (ConsequenceTerm::SpliceRegionVariant, VariantEffect::is_splice_region_variant),
    (
        ConsequenceTerm::IncompleteTerminalCodonVariant,
        VariantEffect::is_incomplete_terminal_codon_variant,
    ),
    (ConsequenceTerm::StartRetainedVariant, VariantEffect::is_start_retained),
    (ConsequenceTerm::StopRetainedVariant, VariantEffect::is_stop_retained),
    (ConsequenceTerm::SynonymousVariant, VariantEffect::is_synonymous_variant),
    (ConsequenceTerm::CodingSequenceVariant, VariantEffect::is_coding_sequence_variant),
    (ConsequenceTerm::FivePrimeUtrVariant, VariantEffect::is_five_prime_utr_variant),
    (ConsequenceTerm::ThreePrimeUtrVariant, VariantEffect::is_three_prime_utr_variant),
    (
        ConsequenceTerm::NonCodingTranscriptExonVariant,
        VariantEffect::is_non_coding_transcript_exon_variant,
    ),
    (ConsequenceTerm::IntronVariant, VariantEffect::is_within_intron),
    (
        ConsequenceTerm::NmdTranscriptVariant,
        VariantEffect::is_nonsense_mediated_decay_transcript_variant,
    ),
    (
        ConsequenceTerm::NonCodingTranscriptVariant,
        VariantEffect::is_non_coding_transcript_variant,
    ),
];

fn whole_transcript_terms(feature: &FeatureEffects) -> Vec<ConsequenceTerm> {
    let mut terms = Vec::new();
    if feature.ablation() {
        terms.push(ConsequenceTerm::TranscriptAblation);
    }
    if feature.amplification() {
        terms.push(ConsequenceTerm::TranscriptAmplification);
    }
    terms
}

fn partial_transcript_terms(feature: &FeatureEffects, terms: &mut Vec<ConsequenceTerm>) {
    if feature.elongation() {
        terms.push(ConsequenceTerm::FeatureElongation);
    }
    if feature.truncation() {
        terms.push(feature.truncation_term());
    }
}

/// Consequences of a small variant.
#[must_use]
pub fn resolve_small_variant(effect: &VariantEffect, feature: &FeatureEffects) -> Vec<ConsequenceTerm> {
    let mut terms = whole_transcript_terms(feature);

    if terms.is_empty() && effect.is_mature_mirna_variant() {
        terms.push(ConsequenceTerm::MatureMirnaVariant);
    }

    if terms.is_empty() {
        terms.extend(
            SMALL_VARIANT_RULES
                .iter()
                .filter(|(_, applies)| applies(effect))
                .map(|&(term, _)| term),
        );
        partial_transcript_terms(feature, &mut terms);
    }

    if terms.is_empty() {
        terms.push(ConsequenceTerm::TranscriptVariant);
    }
    terms
}

/// Consequences of a structural variant. These depend only on how the variant overlaps the
/// transcript, never on exons or codons.
#[must_use]
pub fn resolve_structural_variant(feature: &FeatureEffects, add_gene_fusion: bool) -> Vec<ConsequenceTerm> {
    let mut terms = whole_transcript_terms(feature);
    if terms.is_empty() {
        partial_transcript_terms(feature, &mut terms);
    }
    if add_gene_fusion {
        terms.push(ConsequenceTerm::UnidirectionalGeneFusion);
    }

    match feature.variant_type {
        VariantType::CopyNumberGain => terms.push(ConsequenceTerm::CopyNumberIncrease),
        VariantType::CopyNumberLoss => terms.push(ConsequenceTerm::CopyNumberDecrease),
        VariantType::CopyNumberVariation => terms.push(ConsequenceTerm::CopyNumberChange),
        VariantType::ShortTandemRepeatVariation => terms.push(ConsequenceTerm::ShortTandemRepeatChange),
        VariantType::ShortTandemRepeatExpansion => terms.push(ConsequenceTerm::ShortTandemRepeatExpansion),
        VariantType::ShortTandemRepeatContraction => terms.push(ConsequenceTerm::ShortTandemRepeatContraction),
        _ => {}
    }

    if terms.is_empty() {
        terms.push(ConsequenceTerm::TranscriptVariant);
    }
    terms
}

/// Consequence of a variant outside the transcript but within its flanking window.
#[must_use]
pub fn resolve_flanking(transcript: &Transcript, variant: &SimpleVariant) -> ConsequenceTerm {
    let before_transcript = variant.end < transcript.start;
    if before_transcript == transcript.on_reverse_strand() {
        ConsequenceTerm::DownstreamGeneVariant
    } else {
        ConsequenceTerm::UpstreamGeneVariant
    }
}
