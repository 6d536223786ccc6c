//! Shared test models built from real transcript data.

use crate::biotype::BioType;
use crate::sequence::SimpleSequence;
use crate::strand::Strand;
use crate::transcript::Transcript;
use crate::transcript::construction::{build_transcript_regions, detect_coding_region};

// GRCh37 chr1:1260147-1264277
const ENST00000343938_BASES: &str = include_str!("../tests/data/ENST00000343938.txt");

pub const ENSP00000343864: &str = "MDDSETGFNLKVVLVSFKQCLDEKEEVLLDPYIASWKGLVRFLNSLGTIFSFISKDVVSKLRIMERLRGGPQSEHYRSLQAMVAHELSNRLVDLERRSHHPESGCRTVLRLHRALHWLQLFLEGLRTSPEDARTSALCADSYNASLAAYHPWVVRRAVTVAFCTLPTREVFLEAMNVGPPEQAVQMLGEALPFIQRVYNVSQKLYAEHSLLDLP";

/// ENST00000343938.4: forward strand, three exons, coding 1262291-1263143.
pub fn enst00000343938() -> Transcript {
    let exons = [(1260147, 1260482), (1262216, 1262412), (1262621, 1264277)];
    let regions = build_transcript_regions(&exons, Strand::Forward).unwrap();
    let coding = detect_coding_region(
        1262291,
        1263143,
        &regions,
        Strand::Forward,
        "ENSP00000343864.2",
        ENSP00000343864,
        vec![],
    )
    .unwrap();
    Transcript::new(
        "ENST00000343938.4",
        "chr1",
        BioType::MRna,
        Strand::Forward,
        0,
        regions,
        Some(coding),
        0,
    )
    .unwrap()
}

pub fn enst00000343938_reference() -> SimpleSequence {
    SimpleSequence::new(ENST00000343938_BASES.trim().as_bytes().to_vec(), 1260146)
}

/// ENST00000423372.3: reverse strand, two exons, coding 138530-139309.
pub fn enst00000423372() -> Transcript {
    let exons = [(134901, 135802), (137621, 139379)];
    let regions = build_transcript_regions(&exons, Strand::Reverse).unwrap();
    let coding =
        detect_coding_region(138530, 139309, &regions, Strand::Reverse, "ENSP00000473460.1", "", vec![])
            .unwrap();
    Transcript::new(
        "ENST00000423372.3",
        "chr1",
        BioType::MRna,
        Strand::Reverse,
        0,
        regions,
        Some(coding),
        0,
    )
    .unwrap()
}

/// ENST00000579622.1: single-exon miRNA on chrX.
pub fn enst00000579622() -> Transcript {
    let regions = build_transcript_regions(&[(70361035, 70361156)], Strand::Forward).unwrap();
    Transcript::new(
        "ENST00000579622.1",
        "chrX",
        BioType::MiRna,
        Strand::Forward,
        0,
        regions,
        None,
        0,
    )
    .unwrap()
}
