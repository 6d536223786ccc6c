//! Transcript biotypes that influence consequence assignment.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Sequence Ontology feature types recognized for annotated transcripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BioType {
    #[default]
    #[serde(rename = "mRNA")]
    MRna,
    #[serde(rename = "C_gene_segment")]
    CGeneSegment,
    #[serde(rename = "D_gene_segment")]
    DGeneSegment,
    #[serde(rename = "J_gene_segment")]
    JGeneSegment,
    #[serde(rename = "V_gene_segment")]
    VGeneSegment,
    #[serde(rename = "miRNA")]
    MiRna,
    #[serde(rename = "lnc_RNA")]
    LncRna,
    #[serde(rename = "ncRNA")]
    NcRna,
    #[serde(rename = "nonsense_mediated_decay")]
    NonsenseMediatedDecay,
    #[serde(rename = "processed_transcript")]
    ProcessedTranscript,
    #[serde(rename = "pseudogenic_transcript")]
    PseudogenicTranscript,
    #[serde(rename = "rRNA")]
    RRna,
    #[serde(rename = "snoRNA")]
    SnoRna,
    #[serde(rename = "snRNA")]
    SnRna,
    #[serde(rename = "tRNA")]
    TRna,
    #[serde(rename = "transcript")]
    Transcript,
}

impl BioType {
    /// Returns true for coding transcript biotypes (mRNA + immunoglobulin gene segments).
    #[must_use]
    pub fn is_coding(self) -> bool {
        matches!(
            self,
            Self::MRna
                | Self::CGeneSegment
                | Self::DGeneSegment
                | Self::JGeneSegment
                | Self::VGeneSegment
                | Self::NonsenseMediatedDecay
        )
    }

    #[must_use]
    pub fn is_mirna(self) -> bool {
        self == Self::MiRna
    }

    #[must_use]
    pub fn is_nonsense_mediated_decay(self) -> bool {
        self == Self::NonsenseMediatedDecay
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MRna => "mRNA",
            Self::CGeneSegment => "C_gene_segment",
            Self::DGeneSegment => "D_gene_segment",
            Self::JGeneSegment => "J_gene_segment",
            Self::VGeneSegment => "V_gene_segment",
            Self::MiRna => "miRNA",
            Self::LncRna => "lnc_RNA",
            Self::NcRna => "ncRNA",
            Self::NonsenseMediatedDecay => "nonsense_mediated_decay",
            Self::ProcessedTranscript => "processed_transcript",
            Self::PseudogenicTranscript => "pseudogenic_transcript",
            Self::RRna => "rRNA",
            Self::SnoRna => "snoRNA",
            Self::SnRna => "snRNA",
            Self::TRna => "tRNA",
            Self::Transcript => "transcript",
        }
    }
}

impl std::str::FromStr for BioType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mRNA" | "protein_coding" => Ok(Self::MRna),
            "C_gene_segment" => Ok(Self::CGeneSegment),
            "D_gene_segment" => Ok(Self::DGeneSegment),
            "J_gene_segment" => Ok(Self::JGeneSegment),
            "V_gene_segment" => Ok(Self::VGeneSegment),
            "miRNA" => Ok(Self::MiRna),
            "lnc_RNA" | "lncRNA" | "lincRNA" => Ok(Self::LncRna),
            "ncRNA" => Ok(Self::NcRna),
            "nonsense_mediated_decay" | "NMD_transcript_variant" => {
                Ok(Self::NonsenseMediatedDecay)
            }
            "processed_transcript" => Ok(Self::ProcessedTranscript),
            "pseudogenic_transcript" => Ok(Self::PseudogenicTranscript),
            "rRNA" => Ok(Self::RRna),
            "snoRNA" => Ok(Self::SnoRna),
            "snRNA" => Ok(Self::SnRna),
            "tRNA" => Ok(Self::TRna),
            "transcript" => Ok(Self::Transcript),
            _ => Err(Error::Parse(format!("unknown biotype: {s}"))),
        }
    }
}

impl fmt::Display for BioType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
