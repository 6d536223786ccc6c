//! Transcript-level HGVS (`c.` for coding transcripts, `n.` otherwise).

use tracing::trace;

use super::{
    GenomicChange, PositionOffset, cds_string, duplicated_interval, format_dna_notation, genomic_change,
    position_offset,
};
use crate::mapping::find_region;
use crate::sequence::{ReferenceSequence, has_only_canonical_bases, reverse_complement};
use crate::transcript::Transcript;
use crate::variant::SimpleVariant;

/// HGVS description of `variant` on `transcript`.
///
/// The variant is expected in its 3'-most representation. Returns `None` for reference calls,
/// alleles with ambiguous bases, and variants whose endpoints cannot be placed on the transcript.
pub fn hgvs_coding<S: ReferenceSequence + ?Sized>(
    transcript: &Transcript,
    variant: &SimpleVariant,
    reference: &S,
) -> Option<String> {
    if variant.is_reference_call() || !has_only_canonical_bases(&variant.alt_allele) {
        return None;
    }

    let is_insertion = variant.is_insertion();
    let duplicate = if is_insertion {
        duplicated_interval(transcript, variant.start, &variant.alt_allele, reference)
    } else {
        None
    };

    let change = genomic_change(
        variant.start,
        variant.end,
        &variant.ref_allele,
        &variant.alt_allele,
        duplicate.is_some(),
    );

    let (start, end) = match (change, duplicate) {
        (GenomicChange::Duplication, Some(interval)) => interval,
        (GenomicChange::Insertion, _) => (variant.end, variant.start),
        _ => (variant.start, variant.end),
    };

    let regions = &transcript.regions;
    let mut start_offset = position_offset(transcript, start, find_region(regions, start));
    let mut end_offset = position_offset(transcript, end, find_region(regions, end));
    if transcript.on_reverse_strand() {
        std::mem::swap(&mut start_offset, &mut end_offset);
    }

    if change == GenomicChange::Insertion {
        (start_offset, end_offset) = infer_missing_side(transcript, start_offset, end_offset);
    }

    let (Some(start_offset), Some(end_offset)) = (start_offset, end_offset) else {
        trace!(transcript = %transcript.id, variant = %variant, "HGVS c. endpoints outside transcript");
        return None;
    };

    let (ref_allele, alt_allele) = if transcript.on_reverse_strand() {
        (reverse_complement(&variant.ref_allele), reverse_complement(&variant.alt_allele))
    } else {
        (variant.ref_allele.clone(), variant.alt_allele.clone())
    };

    Some(format_dna_notation(
        transcript,
        &start_offset.value,
        &end_offset.value,
        change,
        &ref_allele,
        &alt_allele,
    ))
}

/// An insertion just past either end of the transcript keeps the side that lies inside it and
/// takes the adjacent cDNA position for the other.
fn infer_missing_side(
    transcript: &Transcript,
    start: Option<PositionOffset>,
    end: Option<PositionOffset>,
) -> (Option<PositionOffset>, Option<PositionOffset>) {
    match (start, end) {
        (Some(start), None) => {
            let cdna = start.cdna + 1;
            let end = PositionOffset {
                cdna,
                offset: 0,
                value: cds_string(transcript, cdna, 0),
            };
            (Some(start), Some(end))
        }
        (None, Some(end)) if end.cdna > 1 => {
            let cdna = end.cdna - 1;
            let start = PositionOffset {
                cdna,
                offset: 0,
                value: cds_string(transcript, cdna, 0),
            };
            (Some(start), Some(end))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::sequence::SimpleSequence;
    use crate::variant::VariantType;

    fn forward(start: i32, ref_allele: &str, alt_allele: &str) -> Option<String> {
        let t = fixtures::enst00000343938();
        let reference = fixtures::enst00000343938_reference();
        hgvs_coding(&t, &SimpleVariant::new("chr1", start, ref_allele, alt_allele), &reference)
    }

    fn reverse(start: i32, ref_allele: &str, alt_allele: &str) -> Option<String> {
        let t = fixtures::enst00000423372();
        let reference = SimpleSequence::new(Vec::new(), 0);
        hgvs_coding(&t, &SimpleVariant::new("chr1", start, ref_allele, alt_allele), &reference)
    }

    #[test]
    fn substitutions() {
        assert_eq!(forward(1262295, "A", "C").unwrap(), "ENST00000343938.4:c.5A>C");
        assert_eq!(forward(1260247, "A", "G").unwrap(), "ENST00000343938.4:c.-311A>G");
        assert_eq!(forward(1262210, "C", "G").unwrap(), "ENST00000343938.4:c.-75-6C>G");
    }

    #[test]
    fn insertion_or_duplication_by_preceding_bases() {
        assert_eq!(forward(1263159, "", "G").unwrap(), "ENST00000343938.4:c.*15dup");
        assert_eq!(forward(1263159, "", "T").unwrap(), "ENST00000343938.4:c.*15_*16insT");
        assert_eq!(forward(1262629, "", "G").unwrap(), "ENST00000343938.4:c.130_131insG");
        assert_eq!(forward(1262629, "", "GA").unwrap(), "ENST00000343938.4:c.129_130dup");
    }

    #[test]
    fn across_exon_intron_boundary() {
        assert_eq!(
            forward(1262410, "ATGTC", "TG").unwrap(),
            "ENST00000343938.4:c.120_122+2delinsTG"
        );
        assert_eq!(
            forward(1262410, "ATGTC", "GACAT").unwrap(),
            "ENST00000343938.4:c.120_122+2inv"
        );
    }

    #[test]
    fn coding_deletion() {
        assert_eq!(forward(1262300, "TCG", "").unwrap(), "ENST00000343938.4:c.10_12del");
    }

    #[test]
    fn reverse_strand_alleles_are_complemented() {
        assert_eq!(reverse(136000, "A", "G").unwrap(), "ENST00000423372.3:c.*910-198T>C");
        assert_eq!(reverse(138529, "A", "G").unwrap(), "ENST00000423372.3:c.*1T>C");
    }

    #[test]
    fn reverse_strand_deletion_into_intron() {
        let deleted = "A".repeat((137619 - 135802 + 1) as usize);
        assert_eq!(reverse(135802, &deleted, "").unwrap(), "ENST00000423372.3:c.*909+2_*910del");
    }

    #[test]
    fn insertion_after_transcript_end() {
        let t = fixtures::enst00000579622();

        let reference = SimpleSequence::new(b"TATATATATATA".to_vec(), 70361144);
        let variant = SimpleVariant::new("chrX", 70361157, "", "ACACCAGCAGCA");
        assert_eq!(
            hgvs_coding(&t, &variant, &reference).unwrap(),
            "ENST00000579622.1:n.122_123insACACCAGCAGCA"
        );

        let reference = SimpleSequence::new(b"ACAC".to_vec(), 70361152);
        let variant = SimpleVariant::new("chrX", 70361157, "", "ACAC");
        assert_eq!(hgvs_coding(&t, &variant, &reference).unwrap(), "ENST00000579622.1:n.119_122dup");
    }

    #[test]
    fn suppressed_changes() {
        assert!(forward(1262295, "A", "N").is_none());
        assert!(forward(1262295, "A", "A").is_none());
        assert!(forward(1260100, "A", "G").is_none());

        let t = fixtures::enst00000343938();
        let reference = fixtures::enst00000343938_reference();
        let structural = SimpleVariant::structural("chr1", 1260000, 1270000, VariantType::Deletion);
        assert!(hgvs_coding(&t, &structural, &reference).is_none());
    }
}
