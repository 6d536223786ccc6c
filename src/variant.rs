//! Variant model shared by normalization, mapping and annotation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sequence Ontology type of a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantType {
    Reference,
    #[serde(rename = "SNV")]
    Snv,
    #[serde(rename = "MNV")]
    Mnv,
    Insertion,
    Deletion,
    Indel,
    Duplication,
    TandemDuplication,
    Inversion,
    CopyNumberGain,
    CopyNumberLoss,
    CopyNumberVariation,
    TranslocationBreakend,
    ShortTandemRepeatVariation,
    ShortTandemRepeatExpansion,
    ShortTandemRepeatContraction,
}

impl VariantType {
    /// Infers the type of a small variant from its trimmed alleles.
    #[must_use]
    pub fn from_alleles(ref_allele: &str, alt_allele: &str) -> Self {
        match (ref_allele.len(), alt_allele.len()) {
            _ if ref_allele == alt_allele => Self::Reference,
            (0, _) => Self::Insertion,
            (_, 0) => Self::Deletion,
            (1, 1) => Self::Snv,
            (r, a) if r == a => Self::Mnv,
            _ => Self::Indel,
        }
    }

    /// Types that only exist as structural variants.
    #[must_use]
    pub fn is_structural_only(self) -> bool {
        matches!(
            self,
            Self::Duplication
                | Self::TandemDuplication
                | Self::Inversion
                | Self::CopyNumberGain
                | Self::CopyNumberLoss
                | Self::CopyNumberVariation
                | Self::TranslocationBreakend
                | Self::ShortTandemRepeatVariation
                | Self::ShortTandemRepeatExpansion
                | Self::ShortTandemRepeatContraction
        )
    }

    #[must_use]
    pub fn is_short_tandem_repeat(self) -> bool {
        matches!(
            self,
            Self::ShortTandemRepeatVariation
                | Self::ShortTandemRepeatExpansion
                | Self::ShortTandemRepeatContraction
        )
    }
}

impl fmt::Display for VariantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Reference => "reference",
            Self::Snv => "SNV",
            Self::Mnv => "MNV",
            Self::Insertion => "insertion",
            Self::Deletion => "deletion",
            Self::Indel => "indel",
            Self::Duplication => "duplication",
            Self::TandemDuplication => "tandem_duplication",
            Self::Inversion => "inversion",
            Self::CopyNumberGain => "copy_number_gain",
            Self::CopyNumberLoss => "copy_number_loss",
            Self::CopyNumberVariation => "copy_number_variation",
            Self::TranslocationBreakend => "translocation_breakend",
            Self::ShortTandemRepeatVariation => "short_tandem_repeat_variation",
            Self::ShortTandemRepeatExpansion => "short_tandem_repeat_expansion",
            Self::ShortTandemRepeatContraction => "short_tandem_repeat_contraction",
        };
        f.write_str(s)
    }
}

/// A variant on one chromosome with 1-based, inclusive coordinates.
///
/// Insertions use `end = start - 1`. Empty alleles denote pure insertions or deletions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleVariant {
    pub chromosome: String,
    pub start: i32,
    pub end: i32,
    pub ref_allele: String,
    pub alt_allele: String,
    pub variant_type: VariantType,
    #[serde(default)]
    pub is_structural: bool,
}

impl SimpleVariant {
    /// Builds a small variant, deriving the end coordinate and type from the alleles.
    #[must_use]
    pub fn new(chromosome: &str, start: i32, ref_allele: &str, alt_allele: &str) -> Self {
        let ref_allele = ref_allele.to_ascii_uppercase();
        let alt_allele = alt_allele.to_ascii_uppercase();
        Self {
            chromosome: chromosome.to_string(),
            start,
            end: start + ref_allele.len() as i32 - 1,
            variant_type: VariantType::from_alleles(&ref_allele, &alt_allele),
            ref_allele,
            alt_allele,
            is_structural: false,
        }
    }

    /// Builds a structural variant spanning `[start, end]` without explicit alleles.
    #[must_use]
    pub fn structural(chromosome: &str, start: i32, end: i32, variant_type: VariantType) -> Self {
        Self {
            chromosome: chromosome.to_string(),
            start,
            end,
            ref_allele: String::new(),
            alt_allele: String::new(),
            variant_type,
            is_structural: true,
        }
    }

    #[must_use]
    pub fn is_insertion(&self) -> bool {
        self.variant_type == VariantType::Insertion
    }

    #[must_use]
    pub fn is_deletion(&self) -> bool {
        self.variant_type == VariantType::Deletion
    }

    #[must_use]
    pub fn is_reference_call(&self) -> bool {
        self.variant_type == VariantType::Reference
    }

    #[must_use]
    pub fn is_structural(&self) -> bool {
        self.is_structural || self.variant_type.is_structural_only()
    }

    /// Returns a copy moved to a new position with new alleles and the same type.
    #[must_use]
    pub fn with_alleles(&self, start: i32, ref_allele: String, alt_allele: String) -> Self {
        Self {
            chromosome: self.chromosome.clone(),
            start,
            end: start + ref_allele.len() as i32 - 1,
            ref_allele,
            alt_allele,
            variant_type: self.variant_type,
            is_structural: self.is_structural,
        }
    }

    /// Chromosome names for the mitochondrial genome.
    #[must_use]
    pub fn is_mitochondrial(&self) -> bool {
        matches!(self.chromosome.as_str(), "chrM" | "MT" | "M" | "chrMT" | "NC_012920.1")
    }
}

impl fmt::Display for SimpleVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let allele = |s: &str| if s.is_empty() { "-".to_string() } else { s.to_string() };
        write!(
            f,
            "{}:{}-{} {}>{}",
            self.chromosome,
            self.start,
            self.end,
            allele(&self.ref_allele),
            allele(&self.alt_allele)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infer_types() {
        assert_eq!(VariantType::from_alleles("A", "C"), VariantType::Snv);
        assert_eq!(VariantType::from_alleles("AT", "GC"), VariantType::Mnv);
        assert_eq!(VariantType::from_alleles("", "TG"), VariantType::Insertion);
        assert_eq!(VariantType::from_alleles("TG", ""), VariantType::Deletion);
        assert_eq!(VariantType::from_alleles("TG", "A"), VariantType::Indel);
        assert_eq!(VariantType::from_alleles("T", "T"), VariantType::Reference);
    }

    #[test]
    fn insertion_end_precedes_start() {
        let v = SimpleVariant::new("chr1", 1262297, "", "ttc");
        assert_eq!(v.end, 1262296);
        assert_eq!(v.alt_allele, "TTC");
        assert!(v.is_insertion());
    }

    #[test]
    fn deletion_spans_ref() {
        let v = SimpleVariant::new("chr1", 1262300, "TCG", "");
        assert_eq!(v.end, 1262302);
        assert!(v.is_deletion());
        assert!(!v.is_structural());
    }

    #[test]
    fn structural_types() {
        let v = SimpleVariant::structural("chr1", 100, 5000, VariantType::Deletion);
        assert!(v.is_structural());
        assert!(VariantType::CopyNumberGain.is_structural_only());
        assert!(!VariantType::Deletion.is_structural_only());
    }

    #[test]
    fn display() {
        let v = SimpleVariant::new("chr1", 10, "", "A");
        assert_eq!(v.to_string(), "chr1:10-9 ->A");
    }

    #[test]
    fn mitochondrial_names() {
        assert!(SimpleVariant::new("chrM", 10, "A", "G").is_mitochondrial());
        assert!(SimpleVariant::new("MT", 10, "A", "G").is_mitochondrial());
        assert!(!SimpleVariant::new("chr1", 10, "A", "G").is_mitochondrial());
    }
}
