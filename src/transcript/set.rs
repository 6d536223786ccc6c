//! Arena of genes and transcripts loaded from JSON transcript models.

use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use serde::Deserialize;
use tracing::debug;

use crate::biotype::BioType;
use crate::codon::GeneticCode;
use crate::error::Error;
use crate::mirna::MirnaRegion;
use crate::strand::Strand;

use super::construction::{ExonBounds, build_transcript_regions, detect_coding_region};
use super::types::{AminoAcidEdit, Gene, Transcript};

/// Coding region as stored in the JSON model: genomic bounds plus translation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodingRecord {
    pub genomic_start: i32,
    pub genomic_end: i32,
    pub protein_id: String,
    #[serde(default)]
    pub protein_seq: String,
    #[serde(default)]
    pub amino_acid_edits: Vec<AminoAcidEdit>,
}

/// A transcript as stored in the JSON model.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptRecord {
    pub id: String,
    pub chromosome: String,
    #[serde(default)]
    pub biotype: BioType,
    pub strand: Strand,
    pub gene_index: usize,
    pub exons: Vec<ExonBounds>,
    #[serde(default)]
    pub coding_region: Option<CodingRecord>,
    #[serde(default)]
    pub start_exon_phase: u8,
    #[serde(default)]
    pub mirnas: Vec<MirnaRegion>,
    #[serde(default)]
    pub genetic_code: Option<GeneticCode>,
}

#[derive(Debug, Deserialize)]
struct TranscriptFile {
    genes: Vec<Gene>,
    transcripts: Vec<TranscriptRecord>,
}

/// Genes and transcripts stored in flat vectors; transcripts point to genes by index.
#[derive(Debug, Default)]
pub struct TranscriptSet {
    pub genes: Vec<Gene>,
    pub transcripts: Vec<Transcript>,
}

impl TranscriptSet {
    /// Builds the arena, validating gene indices and transcript structure.
    pub fn from_records(genes: Vec<Gene>, records: Vec<TranscriptRecord>) -> Result<Self, Error> {
        let mut transcripts = Vec::with_capacity(records.len());
        for record in records {
            if record.gene_index >= genes.len() {
                return Err(Error::InvalidTranscript {
                    id: record.id,
                    reason: format!("gene index {} out of range", record.gene_index),
                });
            }
            transcripts.push(build_transcript(record)?);
        }
        transcripts.sort_by(|a, b| (&a.chromosome, a.start).cmp(&(&b.chromosome, b.start)));
        debug!(genes = genes.len(), transcripts = transcripts.len(), "built transcript set");
        Ok(Self { genes, transcripts })
    }

    /// Reads a JSON transcript file; `.gz` files are decompressed on the fly.
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let file = std::fs::File::open(path)?;
        if path.extension().is_some_and(|ext| ext == "gz") {
            Self::from_reader(GzDecoder::new(file))
        } else {
            Self::from_reader(file)
        }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, Error> {
        let file: TranscriptFile = serde_json::from_reader(BufReader::new(reader))?;
        Self::from_records(file.genes, file.transcripts)
    }

    #[must_use]
    pub fn gene(&self, transcript: &Transcript) -> Option<&Gene> {
        self.genes.get(transcript.gene_index)
    }

    /// Transcripts on `chromosome` whose span, widened by `flanking` bases, overlaps `[start, end]`.
    pub fn overlapping<'a>(
        &'a self,
        chromosome: &'a str,
        start: i32,
        end: i32,
        flanking: i32,
    ) -> impl Iterator<Item = &'a Transcript> + 'a {
        let (lo, hi) = (start.min(end), start.max(end));
        self.transcripts.iter().filter(move |t| {
            t.chromosome == chromosome && t.start - flanking <= hi && t.end + flanking >= lo
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.transcripts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transcripts.is_empty()
    }
}

fn build_transcript(record: TranscriptRecord) -> Result<Transcript, Error> {
    let regions = build_transcript_regions(&record.exons, record.strand).map_err(|e| {
        Error::InvalidTranscript {
            id: record.id.clone(),
            reason: e.to_string(),
        }
    })?;

    let coding_region = record
        .coding_region
        .map(|c| {
            detect_coding_region(
                c.genomic_start,
                c.genomic_end,
                &regions,
                record.strand,
                &c.protein_id,
                &c.protein_seq,
                c.amino_acid_edits,
            )
        })
        .transpose()
        .map_err(|e| Error::InvalidTranscript {
            id: record.id.clone(),
            reason: e.to_string(),
        })?;

    let mut transcript = Transcript::new(
        &record.id,
        &record.chromosome,
        record.biotype,
        record.strand,
        record.gene_index,
        regions,
        coding_region,
        record.start_exon_phase,
    )?
    .with_mirnas(record.mirnas);

    if let Some(code) = record.genetic_code {
        transcript = transcript.with_genetic_code(code);
    }
    Ok(transcript)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    const JSON: &str = r#"{
        "genes": [ { "symbol": "ACAP3", "hgncId": 16754 } ],
        "transcripts": [
            {
                "id": "ENST00000343938.4",
                "chromosome": "chr1",
                "biotype": "mRNA",
                "strand": "+",
                "geneIndex": 0,
                "exons": [[1260147, 1260482], [1262216, 1262412], [1262621, 1264277]],
                "codingRegion": {
                    "genomicStart": 1262291,
                    "genomicEnd": 1263143,
                    "proteinId": "ENSP00000339381.5",
                    "proteinSeq": "MDD"
                }
            }
        ]
    }"#;

    #[test]
    fn load_json() {
        let set = TranscriptSet::from_reader(JSON.as_bytes()).unwrap();
        assert_eq!(set.len(), 1);
        let t = &set.transcripts[0];
        assert_eq!(t.regions.len(), 5);
        assert_eq!(t.total_exon_length, 2190);
        let coding = t.coding_region.as_ref().unwrap();
        assert_eq!((coding.cdna_start, coding.cdna_end), (412, 1056));
        assert_eq!(set.gene(t).unwrap().symbol, "ACAP3");
    }

    #[test]
    fn load_gzipped_file() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::fast());
        encoder.write_all(JSON.as_bytes()).unwrap();
        let compressed = encoder.finish().unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcripts.json.gz");
        std::fs::write(&path, compressed).unwrap();

        let set = TranscriptSet::from_path(&path).unwrap();
        assert_eq!(set.transcripts[0].id, "ENST00000343938.4");
    }

    #[test]
    fn gene_index_out_of_range() {
        let json = JSON.replace("\"geneIndex\": 0", "\"geneIndex\": 3");
        let err = TranscriptSet::from_reader(json.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("gene index 3 out of range"));
    }

    #[test]
    fn overlapping_with_flanking() {
        let set = TranscriptSet::from_reader(JSON.as_bytes()).unwrap();
        assert_eq!(set.overlapping("chr1", 1262300, 1262300, 0).count(), 1);
        assert_eq!(set.overlapping("chr1", 1264300, 1264300, 0).count(), 0);
        assert_eq!(set.overlapping("chr1", 1264300, 1264300, 5000).count(), 1);
        assert_eq!(set.overlapping("chr2", 1262300, 1262300, 0).count(), 0);
    }
}
