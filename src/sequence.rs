//! Reference sequence access and allele-level sequence helpers.

use crate::error::Error;

/// Random access to reference bases for one chromosome.
///
/// Offsets are zero-based; genomic positions elsewhere in the crate are one-based.
pub trait ReferenceSequence {
    /// Returns `length` bases starting at `offset`, clipped at the end of the sequence.
    /// `None` when the offset falls outside the stored bases.
    fn substring(&self, offset: i64, length: usize) -> Option<&[u8]>;

    /// Number of addressable bases (including any leading offset).
    fn len(&self) -> i64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks that the one-based interval `[start, end]` holds `expected`.
    fn validate(&self, start: i32, end: i32, expected: &str) -> bool {
        if end < start {
            return expected.is_empty();
        }
        let length = (end - start + 1) as usize;
        self.substring(i64::from(start) - 1, length)
            .is_some_and(|bases| bases.len() == length && bases.eq_ignore_ascii_case(expected.as_bytes()))
    }

    /// Like [`substring`](Self::substring) but returns an owned string and fails when no
    /// bases are available.
    fn bases(&self, offset: i64, length: usize) -> Result<String, Error> {
        if length == 0 {
            return Ok(String::new());
        }
        self.substring(offset, length)
            .map(|b| String::from_utf8_lossy(b).into_owned())
            .ok_or_else(|| {
                Error::Sequence(format!(
                    "no bases available at offset {offset} (length {length})"
                ))
            })
    }
}

/// A reference sequence held in memory, optionally starting at a genomic offset.
#[derive(Debug, Clone)]
pub struct SimpleSequence {
    sequence: Vec<u8>,
    offset: i64,
}

impl SimpleSequence {
    /// Bases are uppercased on construction.
    #[must_use]
    pub fn new(mut sequence: Vec<u8>, offset: i64) -> Self {
        sequence.make_ascii_uppercase();
        Self { sequence, offset }
    }
}

impl ReferenceSequence for SimpleSequence {
    fn substring(&self, offset: i64, length: usize) -> Option<&[u8]> {
        let adjusted = offset - self.offset;
        let num_bases = self.sequence.len() as i64;

        if adjusted < 0 || length < 1 || adjusted >= num_bases {
            return None;
        }

        let start = adjusted as usize;
        let end = (start + length).min(self.sequence.len());
        Some(&self.sequence[start..end])
    }

    fn len(&self) -> i64 {
        self.offset + self.sequence.len() as i64
    }
}

#[must_use]
pub fn complement(base: u8) -> u8 {
    match base {
        b'A' => b'T',
        b'C' => b'G',
        b'G' => b'C',
        b'T' => b'A',
        b'a' => b't',
        b'c' => b'g',
        b'g' => b'c',
        b't' => b'a',
        other => other,
    }
}

#[must_use]
pub fn reverse_complement(bases: &str) -> String {
    bases.bytes().rev().map(|b| complement(b) as char).collect()
}

/// True when every base is one of A, C, G or T.
#[must_use]
pub fn has_only_canonical_bases(bases: &str) -> bool {
    bases
        .bytes()
        .all(|b| matches!(b.to_ascii_uppercase(), b'A' | b'C' | b'G' | b'T'))
}

/// Removes the shared prefix and then the shared suffix of two alleles.
///
/// The start position advances by the prefix length. Identical alleles are returned as is.
#[must_use]
pub fn bidirectional_trim(start: i32, ref_allele: &str, alt_allele: &str) -> (i32, String, String) {
    if ref_allele == alt_allele {
        return (start, ref_allele.to_string(), alt_allele.to_string());
    }

    let (r, a) = (ref_allele.as_bytes(), alt_allele.as_bytes());
    let prefix = r.iter().zip(a).take_while(|(x, y)| x == y).count();
    let (r, a) = (&r[prefix..], &a[prefix..]);
    let suffix = r
        .iter()
        .rev()
        .zip(a.iter().rev())
        .take_while(|(x, y)| x == y)
        .count();

    (
        start + prefix as i32,
        String::from_utf8_lossy(&r[..r.len() - suffix]).into_owned(),
        String::from_utf8_lossy(&a[..a.len() - suffix]).into_owned(),
    )
}
