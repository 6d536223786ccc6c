//! Amino acid translation with residue overrides and three-letter abbreviations.

use crate::codon::{CodonTable, GeneticCode};
use crate::error::Error;
use crate::transcript::AminoAcidEdit;

pub const STOP: char = '*';

/// Translates codon strings using one genetic code.
#[derive(Debug, Clone, Copy)]
pub struct AminoAcids {
    table: &'static CodonTable,
}

impl AminoAcids {
    #[must_use]
    pub fn new(code: GeneticCode) -> Self {
        Self { table: code.table() }
    }

    /// Translates reference and alternate codons.
    ///
    /// Both are empty when there are no codons or when either holds an `N`. `protein_offset`
    /// is the zero-based protein position of the first codon and positions `edits`.
    #[must_use]
    pub fn translate(
        &self,
        reference_codons: &str,
        alternate_codons: &str,
        edits: &[AminoAcidEdit],
        protein_offset: i32,
    ) -> (String, String) {
        if reference_codons.is_empty() && alternate_codons.is_empty() {
            return (String::new(), String::new());
        }
        if reference_codons.contains('N') || alternate_codons.contains('N') {
            return (String::new(), String::new());
        }

        (
            self.translate_bases(reference_codons, edits, protein_offset, false),
            self.translate_bases(alternate_codons, edits, protein_offset, false),
        )
    }

    /// Translates consecutive triplets of `bases`.
    ///
    /// A trailing partial codon appends `X` unless `force_non_triplet` is set, in which case it
    /// is dropped. Edits whose position falls outside the translated range are ignored.
    #[must_use]
    pub fn translate_bases(
        &self,
        bases: &str,
        edits: &[AminoAcidEdit],
        protein_offset: i32,
        force_non_triplet: bool,
    ) -> String {
        let bytes = bases.as_bytes();
        let mut amino_acids: Vec<u8> = bytes
            .chunks_exact(3)
            .map(|codon| self.table.translate_codon(codon))
            .collect();

        apply_edits(&mut amino_acids, edits, protein_offset);

        let translated = String::from_utf8_lossy(&amino_acids).into_owned();
        let non_triplet = !force_non_triplet && bytes.len() % 3 != 0;
        if non_triplet {
            add_unknown_amino_acid(&translated)
        } else {
            translated
        }
    }
}

fn apply_edits(amino_acids: &mut [u8], edits: &[AminoAcidEdit], protein_offset: i32) {
    let end = i64::from(protein_offset) + amino_acids.len() as i64;
    for edit in edits {
        let position = i64::from(edit.position) - 1;
        if position < i64::from(protein_offset) || position >= end {
            continue;
        }
        amino_acids[(position - i64::from(protein_offset)) as usize] = edit.amino_acid;
    }
}

/// Appends `X` for a partial codon; a translation already ending in a stop is not extended.
#[must_use]
pub fn add_unknown_amino_acid(amino_acids: &str) -> String {
    if amino_acids.ends_with(STOP) {
        amino_acids.to_string()
    } else {
        format!("{amino_acids}X")
    }
}

/// Three-letter abbreviation of a one-letter amino acid code.
pub fn abbreviation(amino_acid: char) -> Result<&'static str, Error> {
    let abbreviation = match amino_acid {
        'A' => "Ala",
        'B' => "Asx",
        'C' => "Cys",
        'D' => "Asp",
        'E' => "Glu",
        'F' => "Phe",
        'G' => "Gly",
        'H' => "His",
        'I' => "Ile",
        'K' => "Lys",
        'L' => "Leu",
        'M' => "Met",
        'N' => "Asn",
        'P' => "Pro",
        'Q' => "Gln",
        'R' => "Arg",
        'S' => "Ser",
        'T' => "Thr",
        'V' => "Val",
        'W' => "Trp",
        'Y' => "Tyr",
        'Z' => "Glx",
        // Ter is the recommended HGVS spelling for both
        'X' | '*' => "Ter",
        'U' => "Sec",
        'O' => "Pyl",
        'J' => "Xle",
        // deletion at the end of an incomplete transcript
        '?' => "_?_",
        other => return Err(Error::UnsupportedAminoAcid(other)),
    };
    Ok(abbreviation)
}

/// Concatenated three-letter abbreviations of a one-letter amino acid string.
pub fn abbreviations(amino_acids: &str) -> Result<String, Error> {
    amino_acids.chars().map(abbreviation).collect()
}
