//! Allele trimming, indel left alignment and 3' rotation.

use tracing::trace;

use crate::error::Error;
use crate::sequence::{ReferenceSequence, bidirectional_trim};
use crate::variant::{SimpleVariant, VariantType};

/// Upstream bases examined when left aligning.
pub const MAX_UPSTREAM_LENGTH: usize = 500;

/// Downstream bases examined when rotating towards 3'.
pub const MAX_DOWNSTREAM_LENGTH: i32 = 500;

/// Trims the alleles and, for pure insertions and deletions, shifts the variant to its leftmost
/// equivalent position. Other variants are returned trimmed.
pub fn normalize<S: ReferenceSequence + ?Sized>(
    position: i32,
    ref_allele: &str,
    alt_allele: &str,
    reference: &S,
) -> Result<(i32, String, String), Error> {
    normalize_with_window(position, ref_allele, alt_allele, reference, MAX_UPSTREAM_LENGTH)
}

/// [`normalize`] with an explicit upstream window.
pub fn normalize_with_window<S: ReferenceSequence + ?Sized>(
    position: i32,
    ref_allele: &str,
    alt_allele: &str,
    reference: &S,
    window: usize,
) -> Result<(i32, String, String), Error> {
    match left_align(position, ref_allele, alt_allele, reference, window)? {
        Some(aligned) => Ok(aligned),
        None => Ok(bidirectional_trim(position, ref_allele, alt_allele)),
    }
}

/// Left aligns an insertion or deletion by rotating its repeat unit through upstream reference.
///
/// Returns `None` when the trimmed variant is not a pure insertion or deletion.
pub fn left_align<S: ReferenceSequence + ?Sized>(
    position: i32,
    ref_allele: &str,
    alt_allele: &str,
    reference: &S,
    window: usize,
) -> Result<Option<(i32, String, String)>, Error> {
    let (mut position, ref_allele, alt_allele) = bidirectional_trim(position, ref_allele, alt_allele);

    let is_deletion = alt_allele.is_empty() && !ref_allele.is_empty();
    let is_insertion = ref_allele.is_empty() && !alt_allele.is_empty();
    if !is_deletion && !is_insertion {
        return Ok(None);
    }

    let upstream_length = window.min((position - 1).max(0) as usize);
    let upstream = reference.bases(i64::from(position) - 1 - upstream_length as i64, upstream_length)?;

    let unit = if is_deletion { &ref_allele } else { &alt_allele };
    let repeat_length = unit.len();
    let combined = format!("{upstream}{unit}").into_bytes();

    let original = position;
    let mut i = combined.len() - 1;
    while i >= repeat_length && combined[i] == combined[i - repeat_length] {
        i -= 1;
        position -= 1;
    }
    let rotated = String::from_utf8_lossy(&combined[i + 1 - repeat_length..=i]).into_owned();

    if position != original {
        trace!(from = original, to = position, allele = %rotated, "left aligned indel");
    }

    Ok(Some(if is_deletion {
        (position, rotated, String::new())
    } else {
        (position, String::new(), rotated)
    }))
}

/// Rotates an insertion or deletion to its most 3' position in transcript orientation, staying
/// within `[region_start, region_end]`.
///
/// Forward-strand variants move right, reverse-strand variants move left. Returns `None` when
/// the variant is not an indel, starts outside the region, or cannot move.
pub fn rotate_three_prime<S: ReferenceSequence + ?Sized>(
    variant: &SimpleVariant,
    region_start: i32,
    region_end: i32,
    reference: &S,
    on_reverse_strand: bool,
) -> Result<Option<SimpleVariant>, Error> {
    let is_insertion = variant.variant_type == VariantType::Insertion;
    if !is_insertion && variant.variant_type != VariantType::Deletion {
        return Ok(None);
    }

    let starts_outside = if on_reverse_strand {
        variant.end >= region_end
    } else {
        variant.start <= region_start
    };
    if starts_outside {
        return Ok(None);
    }

    let downstream_length = if on_reverse_strand {
        variant.start - region_start
    } else {
        region_end - variant.end
    }
    .min(MAX_DOWNSTREAM_LENGTH);
    if downstream_length <= 0 {
        return Ok(None);
    }

    let allele = if is_insertion {
        &variant.alt_allele
    } else {
        &variant.ref_allele
    };
    if allele.is_empty() {
        return Ok(None);
    }

    let (rotating, flank) = if on_reverse_strand {
        let upstream = reference.bases(
            i64::from(variant.start - downstream_length - 1),
            downstream_length as usize,
        )?;
        (reversed(allele), reversed(&upstream))
    } else {
        let downstream = reference.bases(i64::from(variant.end), downstream_length as usize)?;
        (allele.to_string(), downstream)
    };

    let combined = format!("{rotating}{flank}").into_bytes();
    let length = rotating.len();
    let shift = (length..combined.len())
        .take_while(|&i| combined[i] == combined[i - length])
        .count();
    if shift == 0 {
        return Ok(None);
    }

    let mut new_allele = String::from_utf8_lossy(&combined[shift..shift + length]).into_owned();
    if on_reverse_strand {
        new_allele = reversed(&new_allele);
    }

    let offset = if on_reverse_strand { -(shift as i32) } else { shift as i32 };
    let mut rotated = variant.clone();
    rotated.start += offset;
    rotated.end += offset;
    if is_insertion {
        rotated.alt_allele = new_allele;
    } else {
        rotated.ref_allele = new_allele;
    }

    trace!(variant = %variant, shift = offset, "rotated towards 3'");
    Ok(Some(rotated))
}

fn reversed(s: &str) -> String {
    s.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::SimpleSequence;

    fn left_align_reference() -> SimpleSequence {
        let mut bases = "A".repeat(MAX_UPSTREAM_LENGTH);
        bases.push_str("ATGTGTTGTTATTCTGTGTGCAT");
        SimpleSequence::new(bases.into_bytes(), 0)
    }

    #[test]
    fn left_align_deletions() {
        let reference = left_align_reference();
        for (position, allele, expected_position, expected_allele) in [
            (519, "TG", 515, "TG"),
            (511, "ATT", 509, "TTA"),
            (508, "GTT", 504, "TGT"),
        ] {
            let (p, r, a) = normalize(position, allele, "", &reference).unwrap();
            assert_eq!((p, r.as_str(), a.as_str()), (expected_position, expected_allele, ""));
        }
    }

    #[test]
    fn left_align_insertions() {
        let reference = left_align_reference();
        for (position, allele, expected_position, expected_allele) in [
            (519, "TG", 515, "TG"),
            (511, "ATT", 509, "TTA"),
            (508, "GTT", 504, "TGT"),
        ] {
            let (p, r, a) = normalize(position, "", allele, &reference).unwrap();
            assert_eq!((p, r.as_str(), a.as_str()), (expected_position, "", expected_allele));
        }
    }

    #[test]
    fn vcf_style_padding_is_trimmed_before_alignment() {
        // position 518 holds the padding base G; the deleted TG is the 519-520 copy of the repeat
        let reference = left_align_reference();
        let (p, r, a) = normalize(518, "GTG", "G", &reference).unwrap();
        assert_eq!((p, r.as_str(), a.as_str()), (515, "TG", ""));
    }

    #[test]
    fn substitutions_are_only_trimmed() {
        let reference = left_align_reference();
        assert!(left_align(510, "TA", "TC", &reference, 500).unwrap().is_none());
        let (p, r, a) = normalize(510, "TA", "TC", &reference).unwrap();
        assert_eq!((p, r.as_str(), a.as_str()), (511, "A", "C"));
    }

    #[test]
    fn stops_at_sequence_start() {
        let reference = SimpleSequence::new(b"TGTGTGCC".to_vec(), 0);
        let (p, r, _) = normalize(5, "TG", "", &reference).unwrap();
        assert_eq!((p, r.as_str()), (1, "TG"));
    }

    #[test]
    fn missing_reference_is_an_error() {
        let reference = SimpleSequence::new(b"ACGT".to_vec(), 1000);
        assert!(matches!(
            normalize(600, "TG", "", &reference),
            Err(Error::Sequence(_))
        ));
    }

    #[test]
    fn normalize_is_idempotent() {
        let reference = left_align_reference();
        let once = normalize(519, "TG", "", &reference).unwrap();
        let twice = normalize(once.0, &once.1, &once.2, &reference).unwrap();
        assert_eq!(once, twice);
    }

    fn rotation_reference() -> SimpleSequence {
        let mut bases = "A".repeat(500);
        bases.push_str("ATGTGTGTGTGCAGT");
        bases.push_str(&"A".repeat(500));
        SimpleSequence::new(bases.into_bytes(), 965891)
    }

    fn deletion(start: i32, end: i32, allele: &str) -> SimpleVariant {
        SimpleVariant {
            end,
            ..SimpleVariant::new("chr1", start, allele, "")
        }
    }

    #[test]
    fn rotate_deletion_forward() {
        let variant = deletion(966392, 966394, "TG");
        let rotated = rotate_three_prime(&variant, 966300, 966405, &rotation_reference(), false)
            .unwrap()
            .unwrap();
        assert_eq!(rotated.start, 966400);
        assert_eq!(rotated.ref_allele, "TG");
    }

    #[test]
    fn rotate_deletion_reverse() {
        let variant = deletion(966399, 966401, "TG");
        let rotated = rotate_three_prime(&variant, 966300, 966405, &rotation_reference(), true)
            .unwrap()
            .unwrap();
        assert_eq!(rotated.start, 966393);
        assert_eq!(rotated.ref_allele, "TG");
    }

    #[test]
    fn rotate_insertion_forward() {
        let variant = SimpleVariant::new("chr1", 966397, "", "TG");
        let rotated = rotate_three_prime(&variant, 966300, 966405, &rotation_reference(), false)
            .unwrap()
            .unwrap();
        assert_eq!(rotated.start, 966403);
        assert_eq!(rotated.end, 966402);
        assert_eq!(rotated.alt_allele, "TG");
    }

    #[test]
    fn no_rotation_for_snv() {
        let variant = SimpleVariant::new("chr1", 966392, "T", "A");
        assert!(
            rotate_three_prime(&variant, 966300, 966405, &rotation_reference(), false)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn no_rotation_when_variant_starts_before_region() {
        let reference = rotation_reference();
        let variant = deletion(966392, 966394, "TG");
        assert!(rotate_three_prime(&variant, 966397, 966405, &reference, false).unwrap().is_none());
        assert!(rotate_three_prime(&variant, 966380, 966390, &reference, true).unwrap().is_none());

        let insertion = SimpleVariant::new("chr1", 966397, "", "TG");
        assert!(rotate_three_prime(&insertion, 966380, 966392, &reference, false).unwrap().is_none());
    }

    #[test]
    fn no_rotation_without_repeat() {
        let mut bases = "A".repeat(500);
        bases.push_str("GAGAGTTAGGTA");
        bases.push_str(&"A".repeat(500));
        let reference = SimpleSequence::new(bases.into_bytes(), 965891);
        let variant = deletion(966392, 966394, "TG");
        assert!(rotate_three_prime(&variant, 966300, 966405, &reference, false).unwrap().is_none());
    }
}
