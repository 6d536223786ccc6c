//! Error types for the annotation library.

use thiserror::Error;

/// Errors that can occur while loading inputs or annotating variants.
#[derive(Debug, Error)]
pub enum Error {
    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Transcript or variant JSON could not be decoded.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// A parse error occurred while reading input data.
    #[error("{0}")]
    Parse(String),

    /// A validation constraint was violated.
    #[error("{0}")]
    Validation(String),

    /// The reference sequence could not supply the requested bases.
    #[error("reference sequence: {0}")]
    Sequence(String),

    /// An amino acid code with no three-letter abbreviation.
    #[error("unsupported amino acid: '{0}'")]
    UnsupportedAminoAcid(char),

    /// Transcript data that violates the model's invariants.
    #[error("invalid transcript {id}: {reason}")]
    InvalidTranscript { id: String, reason: String },
}
