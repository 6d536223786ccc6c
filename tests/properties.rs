use proptest::prelude::*;

use clarus_annotate::biotype::BioType;
use clarus_annotate::mapping::{cdna_position, find_region, map_position, protein_position};
use clarus_annotate::normalize::normalize;
use clarus_annotate::sequence::SimpleSequence;
use clarus_annotate::strand::Strand;
use clarus_annotate::transcript::Transcript;
use clarus_annotate::transcript::construction::build_transcript_regions;

fn dna(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(prop_oneof![Just(b'A'), Just(b'C'), Just(b'G'), Just(b'T')], 1..=max_len)
}

fn strand() -> impl Strategy<Value = Strand> {
    prop_oneof![Just(Strand::Forward), Just(Strand::Reverse)]
}

/// Exon bounds built from (exon length, following intron length) pairs.
fn exons() -> impl Strategy<Value = Vec<(i32, i32)>> {
    (1000..50_000i32, proptest::collection::vec((1..150i32, 1..400i32), 1..6)).prop_map(|(start, lengths)| {
        let mut exons = Vec::with_capacity(lengths.len());
        let mut position = start;
        for (exon_length, intron_length) in lengths {
            exons.push((position, position + exon_length - 1));
            position += exon_length + intron_length;
        }
        exons
    })
}

fn transcript(exons: &[(i32, i32)], strand: Strand) -> Transcript {
    let regions = build_transcript_regions(exons, strand).unwrap();
    Transcript::new("ENST00000000001.1", "chr1", BioType::LncRna, strand, 0, regions, None, 0).unwrap()
}

/// Either a deletion of reference bases or an insertion of new bases, at a valid position.
fn indel() -> impl Strategy<Value = (Vec<u8>, i32, String, String)> {
    (dna(120), dna(6), any::<bool>(), any::<prop::sample::Index>()).prop_map(
        |(reference, inserted, is_deletion, index)| {
            if is_deletion {
                let length = inserted.len().min(reference.len());
                let offset = index.index(reference.len() - length + 1);
                let deleted = String::from_utf8(reference[offset..offset + length].to_vec()).unwrap();
                (reference, offset as i32 + 1, deleted, String::new())
            } else {
                let position = index.index(reference.len() + 1) as i32 + 1;
                (reference, position, String::new(), String::from_utf8(inserted).unwrap())
            }
        },
    )
}

proptest! {
    #[test]
    fn normalize_is_idempotent((bases, position, ref_allele, alt_allele) in indel()) {
        let reference = SimpleSequence::new(bases, 0);
        let first = normalize(position, &ref_allele, &alt_allele, &reference).unwrap();
        let second = normalize(first.0, &first.1, &first.2, &reference).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert!(first.0 <= position);
    }

    #[test]
    fn protein_position_is_codon_ceiling(cds in 1..1_000_000i32) {
        let protein = protein_position(cds);
        prop_assert!(3 * (protein - 1) < cds);
        prop_assert!(cds <= 3 * protein);
    }

    #[test]
    fn cdna_follows_transcript_orientation(exons in exons(), strand in strand()) {
        let t = transcript(&exons, strand);
        let on_reverse_strand = strand == Strand::Reverse;

        let mut cdna = Vec::new();
        for &(start, end) in &exons {
            for position in start..=end {
                let region = find_region(&t.regions, position).region(&t.regions);
                cdna.push(cdna_position(region, position, on_reverse_strand).unwrap());
            }
        }
        if on_reverse_strand {
            cdna.reverse();
        }

        let expected: Vec<i32> = (1..=cdna.len() as i32).collect();
        prop_assert_eq!(cdna, expected);
    }

    #[test]
    fn exon_boundary_insertions_keep_a_cdna_position(exons in exons(), strand in strand()) {
        let t = transcript(&exons, strand);
        for &(start, end) in &exons {
            // before the first base and after the last base of each exon
            for (insert_start, insert_end) in [(start, start - 1), (end + 1, end)] {
                let position = map_position(&t, insert_start, insert_end, true);
                prop_assert!(
                    position.cdna_start.is_some() || position.cdna_end.is_some(),
                    "insertion {}-{} lost both cDNA positions",
                    insert_start,
                    insert_end
                );
            }
        }
    }
}
