//! Protein-level HGVS (`p.`).

use tracing::trace;

use crate::amino_acid::{AminoAcids, STOP, abbreviation, abbreviations};
use crate::codon::is_triplet;
use crate::error::Error;
use crate::sequence::{bidirectional_trim, has_only_canonical_bases};
use crate::transcript::{AminoAcidEdit, Transcript};

/// The translated change at one protein position, as produced by codon assembly.
#[derive(Debug, Clone, Copy)]
pub struct ProteinChange<'a> {
    /// Untrimmed amino acids of the affected codons.
    pub ref_amino_acids: &'a str,
    pub alt_amino_acids: &'a str,
    /// Protein position of the first affected codon.
    pub protein_start: Option<i32>,
    pub cds_start: Option<i32>,
    pub cds_end: Option<i32>,
    /// Alternate allele in transcript orientation.
    pub transcript_alt_allele: &'a str,
    pub is_reference_call: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProteinCategory {
    StartLost,
    Extension,
    Frameshift,
    Substitution,
    Insertion,
    Duplication,
    Deletion,
    DelIns,
}

/// Residues after the change, normalized for description.
#[derive(Debug, Clone, PartialEq, Eq)]
struct NormalizedChange {
    start: i32,
    end: i32,
    ref_amino_acids: String,
    alt_amino_acids: String,
}

/// HGVS protein description, or `None` when the change has no protein description.
///
/// `hgvs_coding` wraps silent changes; `extended_cds` is the coding sequence continued into the
/// 3' UTR, used to find the new stop after frameshifts and stop losses.
pub fn hgvs_protein(
    transcript: &Transcript,
    change: &ProteinChange<'_>,
    hgvs_coding: Option<&str>,
    extended_cds: Option<&str>,
    amino_acids: &AminoAcids,
) -> Result<Option<String>, Error> {
    let Some(coding) = &transcript.coding_region else {
        return Ok(None);
    };
    let Some(hgvs_coding) = hgvs_coding.filter(|h| !h.is_empty()) else {
        return Ok(None);
    };
    let (Some(cds_start), Some(cds_end), Some(protein_start)) =
        (change.cds_start, change.cds_end, change.protein_start)
    else {
        return Ok(None);
    };
    if change.is_reference_call || !has_only_canonical_bases(change.transcript_alt_allele) {
        return Ok(None);
    }

    let peptide = coding.protein_seq.as_bytes();
    let normalized = normalize(
        protein_start,
        change.ref_amino_acids,
        change.alt_amino_acids,
        peptide,
    );
    let NormalizedChange {
        start,
        end,
        ref_amino_acids: ref_aa,
        alt_amino_acids: alt_aa,
    } = &normalized;
    let (start, end) = (*start, *end);

    let mut ref_char = first_residue(ref_aa);
    let alt_char = first_residue(alt_aa);

    let alt_length = change.transcript_alt_allele.len() as i32;
    let has_frameshift = !is_triplet(alt_length - (cds_end - cds_start + 1));

    let mut category = categorize(start, ref_aa, alt_aa, peptide, has_frameshift);
    if matches!(
        category,
        ProteinCategory::Insertion | ProteinCategory::Duplication | ProteinCategory::DelIns
    ) && alt_char == STOP
    {
        if category != ProteinCategory::DelIns {
            ref_char = residue(peptide, end + 1);
        }
        category = ProteinCategory::Substitution;
    }

    let protein_id = coding.protein_id.as_str();
    let hgvs = match category {
        ProteinCategory::StartLost => format!("{protein_id}:p.{}{start}?", abbreviation(ref_char)?),
        _ if ref_aa == alt_aa || (category == ProteinCategory::Insertion && start == 1) => {
            silent(hgvs_coding, ref_char, start)?
        }
        ProteinCategory::Substitution => format!(
            "{protein_id}:p.({}{start}{})",
            abbreviation(ref_char)?,
            abbreviation(alt_char)?
        ),
        ProteinCategory::Deletion => {
            let first = abbreviation(ref_char)?;
            if start == end {
                format!("{protein_id}:p.({first}{start}del)")
            } else {
                format!("{protein_id}:p.({first}{start}_{}{end}del)", abbreviation(last_residue(ref_aa))?)
            }
        }
        ProteinCategory::Insertion => format!(
            "{protein_id}:p.({}{end}_{}{start}ins{})",
            abbreviation(residue(peptide, end))?,
            abbreviation(residue(peptide, start))?,
            abbreviations(alt_aa)?
        ),
        ProteinCategory::Duplication => {
            let first = start - alt_aa.len() as i32;
            let first_residue = abbreviation(alt_char)?;
            if first == end {
                format!("{protein_id}:p.({first_residue}{first}dup)")
            } else {
                format!(
                    "{protein_id}:p.({first_residue}{first}_{}{end}dup)",
                    abbreviation(last_residue(alt_aa))?
                )
            }
        }
        ProteinCategory::DelIns => {
            let first = abbreviation(ref_char)?;
            let inserted = abbreviations(alt_aa)?;
            if start == end {
                format!("{protein_id}:p.({first}{start}delins{inserted})")
            } else {
                format!(
                    "{protein_id}:p.({first}{start}_{}{end}delins{inserted})",
                    abbreviation(last_residue(ref_aa))?
                )
            }
        }
        ProteinCategory::Frameshift | ProteinCategory::Extension => {
            let Some(extended_cds) = extended_cds else {
                trace!(transcript = %transcript.id, "no extended coding sequence for frameshift");
                return Ok(None);
            };
            let alt_peptide = alternate_peptide(
                extended_cds,
                change.transcript_alt_allele,
                cds_start,
                cds_end,
                amino_acids,
                &coding.amino_acid_edits,
            );
            read_through(
                protein_id,
                hgvs_coding,
                start,
                category,
                peptide,
                alt_peptide.as_bytes(),
            )?
        }
    };

    Ok(Some(hgvs))
}

/// Cuts both alleles after their first stop, trims shared residues and shifts pure insertions
/// and deletions to their most C-terminal position.
fn normalize(start: i32, ref_amino_acids: &str, alt_amino_acids: &str, peptide: &[u8]) -> NormalizedChange {
    let (mut start, mut ref_aa, mut alt_aa) =
        bidirectional_trim(start, cut_after_stop(ref_amino_acids), cut_after_stop(alt_amino_acids));

    let is_insertion = ref_aa.is_empty() && !alt_aa.is_empty();
    let is_deletion = !ref_aa.is_empty() && alt_aa.is_empty();
    if is_insertion || is_deletion {
        let allele = if is_insertion { &alt_aa } else { &ref_aa };
        if let Some((shift, rotated)) = rotate_right(start, ref_aa.len(), allele, peptide) {
            start += shift;
            if is_insertion {
                alt_aa = rotated;
            } else {
                ref_aa = rotated;
            }
        }
    }

    let end = (start + ref_aa.len() as i32 - 1).min(peptide.len() as i32 - 1);
    NormalizedChange {
        start,
        end,
        ref_amino_acids: ref_aa,
        alt_amino_acids: alt_aa,
    }
}

fn cut_after_stop(amino_acids: &str) -> &str {
    match amino_acids.find(STOP) {
        Some(stop) => &amino_acids[..=stop],
        None => amino_acids,
    }
}

/// Shift of `allele` through the downstream peptide, and the allele at its new position.
fn rotate_right(start: i32, ref_length: usize, allele: &str, peptide: &[u8]) -> Option<(i32, String)> {
    let length = allele.len();
    let end = (start + ref_length as i32 - 1).max(0) as usize;
    let downstream: &[u8] = if end >= peptide.len() { &[] } else { &peptide[end..] };

    let mut combined = allele.as_bytes().to_vec();
    combined.extend_from_slice(downstream);

    let shift = (length..combined.len())
        .take_while(|&i| combined[i] == combined[i - length])
        .count();
    if shift == 0 {
        return None;
    }
    let rotated = String::from_utf8_lossy(&combined[shift..shift + length]).into_owned();
    Some((shift as i32, rotated))
}

fn categorize(start: i32, ref_aa: &str, alt_aa: &str, peptide: &[u8], has_frameshift: bool) -> ProteinCategory {
    if start == 1 && !ref_aa.is_empty() && !alt_aa.is_empty() && ref_aa.as_bytes()[0] != alt_aa.as_bytes()[0] {
        return ProteinCategory::StartLost;
    }
    if ref_aa.contains(STOP) && !alt_aa.contains(STOP) {
        return ProteinCategory::Extension;
    }
    if has_frameshift && !is_truncated_by_stop(ref_aa, alt_aa) {
        return ProteinCategory::Frameshift;
    }
    if ref_aa.len() == 1 && alt_aa.len() == 1 {
        return ProteinCategory::Substitution;
    }
    if ref_aa.is_empty() && !alt_aa.is_empty() {
        return if is_duplicate(start, alt_aa, peptide) {
            ProteinCategory::Duplication
        } else {
            ProteinCategory::Insertion
        };
    }
    if !ref_aa.is_empty() && alt_aa.is_empty() {
        return ProteinCategory::Deletion;
    }
    ProteinCategory::DelIns
}

/// The alternate residues end in a stop before diverging from the reference.
fn is_truncated_by_stop(ref_aa: &str, alt_aa: &str) -> bool {
    match alt_aa.find(STOP) {
        Some(0) => true,
        Some(stop) => ref_aa.starts_with(&alt_aa[..stop]),
        None => false,
    }
}

/// The inserted residues repeat the residues immediately before the insertion.
fn is_duplicate(start: i32, alt_aa: &str, peptide: &[u8]) -> bool {
    let length = alt_aa.len();
    let Ok(test_start) = usize::try_from(start - length as i32 - 1) else {
        return false;
    };
    peptide
        .get(test_start..test_start + length)
        .is_some_and(|preceding| preceding == alt_aa.as_bytes())
}

/// Residue at a one-based position; positions past the peptide read as the stop.
fn residue(peptide: &[u8], position: i32) -> char {
    usize::try_from(position - 1)
        .ok()
        .and_then(|index| peptide.get(index))
        .map_or(STOP, |&aa| aa as char)
}

fn first_residue(amino_acids: &str) -> char {
    amino_acids.chars().next().unwrap_or('X')
}

fn last_residue(amino_acids: &str) -> char {
    amino_acids.chars().last().unwrap_or('X')
}

fn silent(hgvs_coding: &str, residue: char, position: i32) -> Result<String, Error> {
    Ok(format!("{hgvs_coding}(p.({}{position}=))", abbreviation(residue)?))
}

/// Translation of the extended coding sequence with the variant applied.
fn alternate_peptide(
    extended_cds: &str,
    transcript_alt_allele: &str,
    cds_start: i32,
    cds_end: i32,
    amino_acids: &AminoAcids,
    edits: &[AminoAcidEdit],
) -> String {
    let length = extended_cds.len();
    let before_end = usize::try_from(cds_start - 1).unwrap_or(0).min(length);
    let after_start = usize::try_from(cds_end).unwrap_or(0).clamp(before_end, length);

    let mut bases = String::with_capacity(length + transcript_alt_allele.len());
    bases.push_str(&extended_cds[..before_end]);
    bases.push_str(transcript_alt_allele);
    bases.push_str(&extended_cds[after_start..]);
    amino_acids.translate_bases(&bases, edits, 0, false)
}

/// Describes a frameshift or stop loss from the first residue where the alternate peptide
/// departs from the reference.
fn read_through(
    protein_id: &str,
    hgvs_coding: &str,
    mut start: i32,
    mut category: ProteinCategory,
    peptide: &[u8],
    alt_peptide: &[u8],
) -> Result<String, Error> {
    let at = |sequence: &[u8], position: i32| -> char {
        if position < sequence.len() as i32 {
            usize::try_from(position - 1)
                .ok()
                .and_then(|index| sequence.get(index))
                .map_or('X', |&aa| aa as char)
        } else {
            'X'
        }
    };
    let mut ref_char = at(peptide, start);
    let mut alt_char = at(alt_peptide, start);

    let compared = peptide.len().min(alt_peptide.len()) as i32;
    while start >= 1 && start <= compared {
        ref_char = peptide[(start - 1) as usize] as char;
        alt_char = alt_peptide[(start - 1) as usize] as char;
        if (ref_char == STOP && alt_char == STOP) || ref_char != alt_char {
            break;
        }
        start += 1;
    }

    if alt_char == STOP {
        if ref_char == STOP {
            return silent(hgvs_coding, ref_char, start);
        }
        return Ok(format!(
            "{protein_id}:p.({}{start}{})",
            abbreviation(ref_char)?,
            abbreviation(alt_char)?
        ));
    }

    if ref_char == STOP {
        category = ProteinCategory::Extension;
    }

    if category == ProteinCategory::Extension {
        let distance = stop_distance(alt_peptide, start - 1);
        return Ok(format!(
            "{protein_id}:p.(Ter{start}{}extTer{distance})",
            abbreviation(alt_char)?
        ));
    }

    let distance = stop_distance(alt_peptide, start - 2);
    Ok(format!(
        "{protein_id}:p.({}{start}{}fsTer{distance})",
        abbreviation(ref_char)?,
        abbreviation(alt_char)?
    ))
}

/// Residues from `from` (zero-based) to the next stop: empty when the stop is at `from`, `?`
/// when no stop follows.
fn stop_distance(alt_peptide: &[u8], from: i32) -> String {
    let from = usize::try_from(from).unwrap_or(0).min(alt_peptide.len());
    match alt_peptide[from..].iter().position(|&aa| aa as char == STOP) {
        Some(0) => String::new(),
        Some(distance) => distance.to_string(),
        None => "?".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PEPTIDE: &[u8] = b"MDDSETGFNLK";

    #[test]
    fn cut_keeps_first_stop() {
        assert_eq!(cut_after_stop("K*E*"), "K*");
        assert_eq!(cut_after_stop("KE"), "KE");
    }

    #[test]
    fn insertion_rotates_through_repeat() {
        // D inserted before D3 moves past both aspartates
        let normalized = normalize(2, "", "D", PEPTIDE);
        assert_eq!(normalized.start, 4);
        assert_eq!(normalized.alt_amino_acids, "D");
        assert_eq!(normalized.end, 3);
    }

    #[test]
    fn deletion_rotates_through_repeat() {
        let normalized = normalize(2, "D", "", PEPTIDE);
        assert_eq!((normalized.start, normalized.end), (3, 3));
        assert_eq!(normalized.ref_amino_acids, "D");
    }

    #[test]
    fn trimming_precedes_rotation() {
        let normalized = normalize(4, "SE", "SEE", PEPTIDE);
        assert_eq!(normalized.start, 6);
        assert_eq!(normalized.ref_amino_acids, "");
        assert_eq!(normalized.alt_amino_acids, "E");
    }

    #[test]
    fn duplicates_look_back() {
        assert!(is_duplicate(4, "D", PEPTIDE));
        assert!(is_duplicate(4, "DD", PEPTIDE));
        assert!(!is_duplicate(4, "S", PEPTIDE));
        assert!(!is_duplicate(1, "M", PEPTIDE));
    }

    #[test]
    fn categories() {
        assert_eq!(categorize(1, "M", "V", PEPTIDE, false), ProteinCategory::StartLost);
        assert_eq!(categorize(11, "K*", "KE", PEPTIDE, false), ProteinCategory::Extension);
        assert_eq!(categorize(5, "E", "X", PEPTIDE, true), ProteinCategory::Frameshift);
        assert_eq!(categorize(5, "E", "*", PEPTIDE, true), ProteinCategory::Substitution);
        assert_eq!(categorize(5, "E", "K", PEPTIDE, false), ProteinCategory::Substitution);
        assert_eq!(categorize(4, "", "D", PEPTIDE, false), ProteinCategory::Duplication);
        assert_eq!(categorize(4, "", "W", PEPTIDE, false), ProteinCategory::Insertion);
        assert_eq!(categorize(4, "SE", "", PEPTIDE, false), ProteinCategory::Deletion);
        assert_eq!(categorize(4, "SE", "W", PEPTIDE, false), ProteinCategory::DelIns);
    }

    #[test]
    fn truncation_by_stop() {
        assert!(is_truncated_by_stop("E", "*"));
        assert!(is_truncated_by_stop("EK", "E*"));
        assert!(!is_truncated_by_stop("EK", "W*"));
        assert!(!is_truncated_by_stop("EK", "W"));
    }

    #[test]
    fn residues_past_the_end_are_stops() {
        assert_eq!(residue(PEPTIDE, 1), 'M');
        assert_eq!(residue(PEPTIDE, 12), '*');
        assert_eq!(residue(PEPTIDE, 0), '*');
    }

    #[test]
    fn distance_to_next_stop() {
        assert_eq!(stop_distance(b"MKE*", 1), "2");
        assert_eq!(stop_distance(b"MKE*", 3), "");
        assert_eq!(stop_distance(b"MKE", 0), "?");
    }
}
