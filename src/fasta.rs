//! FASTA reference loading. Plain and gzip-compressed files are both accepted.

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use tracing::debug;

use crate::error::Error;
use crate::sequence::SimpleSequence;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Chromosome sequences keyed by the FASTA record name.
#[derive(Debug, Default)]
pub struct ReferenceGenome {
    chromosomes: HashMap<String, SimpleSequence>,
}

impl ReferenceGenome {
    /// Loads every record in the file. Gzip input is detected from its magic bytes.
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let mut reader = BufReader::new(std::fs::File::open(path)?);
        let is_gzip = reader.fill_buf()?.starts_with(&GZIP_MAGIC);
        let records = if is_gzip {
            parse_fasta(BufReader::new(MultiGzDecoder::new(reader)))?
        } else {
            parse_fasta(reader)?
        };
        Ok(Self::from_records(records))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, Error> {
        Ok(Self::from_records(parse_fasta(BufReader::new(reader))?))
    }

    fn from_records(records: Vec<(String, Vec<u8>)>) -> Self {
        let chromosomes = records
            .into_iter()
            .map(|(name, bases)| {
                debug!(chromosome = %name, length = bases.len(), "loaded reference sequence");
                (name, SimpleSequence::new(bases, 0))
            })
            .collect();
        Self { chromosomes }
    }

    /// Looks a chromosome up by name, also trying the name with or without a `chr` prefix.
    #[must_use]
    pub fn get(&self, chromosome: &str) -> Option<&SimpleSequence> {
        self.chromosomes.get(chromosome).or_else(|| {
            let alternate = match chromosome.strip_prefix("chr") {
                Some(bare) => bare.to_string(),
                None => format!("chr{chromosome}"),
            };
            self.chromosomes.get(&alternate)
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.chromosomes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chromosomes.is_empty()
    }
}

/// Reads FASTA records as (name, sequence) pairs. Sequence bases are uppercased.
fn parse_fasta<R: BufRead>(reader: R) -> Result<Vec<(String, Vec<u8>)>, Error> {
    let mut results: Vec<(String, Vec<u8>)> = Vec::new();
    let mut current_name: Option<String> = None;
    let mut current_sequence: Vec<u8> = Vec::new();

    for line in reader.lines() {
        let line = line?;
        if let Some(header) = line.strip_prefix('>') {
            if let Some(name) = current_name.take() {
                results.push((name, std::mem::take(&mut current_sequence)));
            }
            current_name = Some(record_name(header)?);
        } else if current_name.is_some() {
            let trimmed = line.trim();
            let start = current_sequence.len();
            current_sequence.extend_from_slice(trimmed.as_bytes());
            current_sequence[start..].make_ascii_uppercase();
        } else if !line.trim().is_empty() {
            return Err(Error::Parse("sequence data before the first FASTA header".to_string()));
        }
    }

    if let Some(name) = current_name {
        results.push((name, current_sequence));
    }

    Ok(results)
}

/// First whitespace-delimited token of a header line.
fn record_name(header: &str) -> Result<String, Error> {
    header
        .split_whitespace()
        .next()
        .map(str::to_string)
        .ok_or_else(|| Error::Parse(format!("empty FASTA header: >{header}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::ReferenceSequence;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    fn make_gz(content: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::fast());
        encoder.write_all(content).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn parse_multiple_records() {
        let fasta = b">chr1 GRCh37\nACGT\n>chr2\nTTTT\nAAAA\n>chr3\nGGG";
        let results = parse_fasta(std::io::Cursor::new(fasta)).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].0, "chr1");
        assert_eq!(results[0].1, b"ACGT");
        assert_eq!(results[1].1, b"TTTTAAAA");
        assert_eq!(results[2].1, b"GGG");
    }

    #[test]
    fn bases_are_uppercased() {
        let results = parse_fasta(std::io::Cursor::new(b">seq1\nacgtACGTnN\n")).unwrap();
        assert_eq!(results[0].1, b"ACGTACGTNN");
    }

    #[test]
    fn rejects_headerless_sequence() {
        assert!(parse_fasta(std::io::Cursor::new(b"ACGT\n>chr1\nA\n")).is_err());
        assert!(parse_fasta(std::io::Cursor::new(b">\nA\n")).is_err());
    }

    #[test]
    fn gzip_detected_from_content() {
        let mut plain = tempfile::NamedTempFile::new().unwrap();
        plain.write_all(b">1\nGATTACA\n").unwrap();
        let mut gz = tempfile::NamedTempFile::new().unwrap();
        gz.write_all(&make_gz(b">1\nGATTACA\n")).unwrap();

        for file in [&plain, &gz] {
            let genome = ReferenceGenome::from_path(file.path()).unwrap();
            assert_eq!(genome.len(), 1);
            let chr1 = genome.get("chr1").unwrap();
            assert!(chr1.validate(1, 7, "GATTACA"));
        }
    }

    #[test]
    fn chr_prefix_is_optional() {
        let genome = ReferenceGenome::from_reader(&b">chrX\nACGT\n"[..]).unwrap();
        assert!(genome.get("chrX").is_some());
        assert!(genome.get("X").is_some());
        assert!(genome.get("Y").is_none());
    }
}
