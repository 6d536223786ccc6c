//! Codon translation tables (standard and mitochondrial) and codon assembly.

use serde::{Deserialize, Serialize};

/// Lookup table for translating codons to amino acids.
///
/// Indexed by 6-bit codon encoding: A=0, C=1, G=2, T/U=3.
/// Index = first*16 + second*4 + third.
#[derive(Debug)]
pub struct CodonTable {
    table: [u8; 64],
}

// Amino acids indexed by codon encoding (A=0, C=1, G=2, T=3)
#[rustfmt::skip]
const STANDARD_TABLE: [u8; 64] = [
    b'K', b'N', b'K', b'N',  // AA*: AAA=K, AAC=N, AAG=K, AAT=N
    b'T', b'T', b'T', b'T',  // AC*
    b'R', b'S', b'R', b'S',  // AG*: AGA=R, AGC=S, AGG=R, AGT=S
    b'I', b'I', b'M', b'I',  // AT*: ATA=I, ATC=I, ATG=M, ATT=I
    b'Q', b'H', b'Q', b'H',  // CA*
    b'P', b'P', b'P', b'P',  // CC*
    b'R', b'R', b'R', b'R',  // CG*
    b'L', b'L', b'L', b'L',  // CT*
    b'E', b'D', b'E', b'D',  // GA*
    b'A', b'A', b'A', b'A',  // GC*
    b'G', b'G', b'G', b'G',  // GG*
    b'V', b'V', b'V', b'V',  // GT*
    b'*', b'Y', b'*', b'Y',  // TA*: TAA=*, TAC=Y, TAG=*, TAT=Y
    b'S', b'S', b'S', b'S',  // TC*
    b'*', b'C', b'W', b'C',  // TG*: TGA=*, TGC=C, TGG=W, TGT=C
    b'L', b'F', b'L', b'F',  // TT*
];

/// Vertebrate mitochondrial code: TGA→W, AGA→*, AGG→*, ATA→M.
const fn mitochondrial_table() -> [u8; 64] {
    let mut table = STANDARD_TABLE;
    table[56] = b'W'; // TGA = 3*16 + 2*4 + 0
    table[8] = b'*'; // AGA = 0*16 + 2*4 + 0
    table[10] = b'*'; // AGG = 0*16 + 2*4 + 2
    table[12] = b'M'; // ATA = 0*16 + 3*4 + 0
    table
}

/// NCBI translation table 1.
pub static STANDARD: CodonTable = CodonTable {
    table: STANDARD_TABLE,
};

/// NCBI translation table 2.
pub static VERTEBRATE_MITOCHONDRIAL: CodonTable = CodonTable {
    table: mitochondrial_table(),
};

/// Genetic code selector carried by each transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GeneticCode {
    #[default]
    Standard,
    VertebrateMitochondrial,
}

impl GeneticCode {
    #[must_use]
    pub fn table(self) -> &'static CodonTable {
        match self {
            Self::Standard => &STANDARD,
            Self::VertebrateMitochondrial => &VERTEBRATE_MITOCHONDRIAL,
        }
    }
}

fn base_to_index(b: u8) -> Option<usize> {
    match b {
        b'A' | b'a' => Some(0),
        b'C' | b'c' => Some(1),
        b'G' | b'g' => Some(2),
        b'T' | b't' | b'U' | b'u' => Some(3),
        _ => None,
    }
}

impl CodonTable {
    /// Translate a single codon (3 bytes) to an amino acid; `X` when ambiguous.
    #[must_use]
    pub fn translate_codon(&self, codon: &[u8]) -> u8 {
        if codon.len() < 3 {
            return b'X';
        }
        match (
            base_to_index(codon[0]),
            base_to_index(codon[1]),
            base_to_index(codon[2]),
        ) {
            (Some(a), Some(b), Some(c)) => self.table[a * 16 + b * 4 + c],
            _ => b'X',
        }
    }
}

/// True when a length is a whole number of codons.
#[must_use]
pub fn is_triplet(length: i32) -> bool {
    length % 3 == 0
}

/// Reference and alternate codons: the allele flanked by lowercase context bases.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Codons {
    pub reference: String,
    pub alternate: String,
}

impl Codons {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reference.is_empty() && self.alternate.is_empty()
    }
}

/// Assembles codons for a variant covering `[cds_start, cds_end]` of `coding_sequence`.
///
/// The prefix runs from the first base of the codon at `protein_start` to `cds_start`; the
/// suffix from `cds_end` to the last base of the codon at `protein_end`, clipped at the end of
/// the coding sequence. The reference allele is read from the coding sequence itself.
#[must_use]
pub fn get_codons(
    transcript_alt_allele: &str,
    cds_start: Option<i32>,
    cds_end: Option<i32>,
    protein_start: Option<i32>,
    protein_end: Option<i32>,
    coding_sequence: Option<&str>,
) -> Codons {
    let (Some(cds_start), Some(cds_end), Some(protein_start), Some(protein_end), Some(sequence)) =
        (cds_start, cds_end, protein_start, protein_end, coding_sequence)
    else {
        return Codons::default();
    };

    let coding_length = sequence.len() as i32;
    let codon_start = protein_start * 3 - 2;
    let codon_end = protein_end * 3;

    let prefix_length = (cds_start - codon_start).max(0);
    let suffix_start = cds_end.max(0);
    let suffix_length = (codon_end - cds_end).min(coding_length - suffix_start).max(0);

    let prefix = slice(sequence, codon_start - 1, prefix_length).to_ascii_lowercase();
    let suffix = slice(sequence, suffix_start, suffix_length).to_ascii_lowercase();
    let reference_allele = slice(sequence, cds_start - 1, cds_end - cds_start + 1);

    Codons {
        reference: format!("{prefix}{reference_allele}{suffix}"),
        alternate: format!("{prefix}{transcript_alt_allele}{suffix}"),
    }
}

/// Substring by zero-based offset and length, clamped to the string bounds.
fn slice(s: &str, offset: i32, length: i32) -> &str {
    let len = s.len() as i32;
    let start = offset.clamp(0, len);
    let end = (offset + length.max(0)).clamp(start, len);
    &s[start as usize..end as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_start_and_stop_codons() {
        assert_eq!(STANDARD.translate_codon(b"ATG"), b'M');
        assert_eq!(STANDARD.translate_codon(b"TAA"), b'*');
        assert_eq!(STANDARD.translate_codon(b"TAG"), b'*');
        assert_eq!(STANDARD.translate_codon(b"TGA"), b'*');
        assert_eq!(STANDARD.translate_codon(b"aga"), b'R');
    }

    #[test]
    fn mitochondrial_differences() {
        let table = GeneticCode::VertebrateMitochondrial.table();
        assert_eq!(table.translate_codon(b"TGA"), b'W');
        assert_eq!(table.translate_codon(b"AGA"), b'*');
        assert_eq!(table.translate_codon(b"AGG"), b'*');
        assert_eq!(table.translate_codon(b"ATA"), b'M');
        assert_eq!(table.translate_codon(b"ATG"), b'M');
    }

    #[test]
    fn ambiguous_base() {
        assert_eq!(STANDARD.translate_codon(b"NNN"), b'X');
        assert_eq!(STANDARD.translate_codon(b"ATN"), b'X');
        assert_eq!(STANDARD.translate_codon(b"AT"), b'X');
    }

    #[test]
    fn triplets() {
        assert!(is_triplet(0));
        assert!(is_triplet(6));
        assert!(is_triplet(-3));
        assert!(!is_triplet(4));
        assert!(!is_triplet(-1));
    }

    #[test]
    fn snv_codons_with_prefix() {
        // CDS position 24 is the third base of codon 8; the codon's first two bases are "CA"
        let mut cds = "A".repeat(21);
        cds.push_str("CAAGGG");
        let codons = get_codons("G", Some(24), Some(24), Some(8), Some(8), Some(&cds));
        assert_eq!(codons.reference, "caA");
        assert_eq!(codons.alternate, "caG");
    }

    #[test]
    fn snv_codons_with_suffix() {
        let cds = "ATGGCATGCTAA";
        let codons = get_codons("T", Some(4), Some(4), Some(2), Some(2), Some(cds));
        assert_eq!(codons.reference, "Gca");
        assert_eq!(codons.alternate, "Tca");
    }

    #[test]
    fn insertion_between_codons_has_no_context() {
        let cds = "ATGGACGACTCG";
        let codons = get_codons("TTC", Some(7), Some(6), Some(3), Some(2), Some(cds));
        assert_eq!(codons.reference, "");
        assert_eq!(codons.alternate, "TTC");
    }

    #[test]
    fn suffix_clipped_at_sequence_end() {
        // a trailing partial codon: the sequence ends one base into codon 3
        let cds = "ATGGCAT";
        let codons = get_codons("C", Some(7), Some(7), Some(3), Some(3), Some(cds));
        assert_eq!(codons.reference, "T");
        assert_eq!(codons.alternate, "C");
    }

    #[test]
    fn undefined_positions_give_empty_codons() {
        assert!(get_codons("A", None, Some(4), Some(2), Some(2), Some("ATGGCA")).is_empty());
        assert!(get_codons("A", Some(4), Some(4), Some(2), Some(2), None).is_empty());
    }
}
