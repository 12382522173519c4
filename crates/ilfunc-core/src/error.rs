/// Everything that can go wrong while decoding or splicing one marker.
///
/// Offsets are byte offsets into the original disassembly text, indices are
/// positions inside the recovered attribute blob.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SpliceError {
    #[error("attribute argument list opened after offset {start} is never closed")]
    MalformedBlob { start: usize },

    #[error("reserved packed length prefix 0x{byte:02X} at blob index {index}")]
    InvalidLengthEncoding { byte: u8, index: usize },

    #[error("blob needs {needed} bytes from index {index} but only {available} remain")]
    TruncatedPayload {
        index: usize,
        needed: usize,
        available: usize,
    },

    #[error("expected `{anchor}` after offset {offset}")]
    StructuralMismatch { anchor: &'static str, offset: usize },

    #[error("payload is not valid UTF-8 (first bad byte at payload index {index})")]
    InvalidUtf8 { index: usize },

    #[error("edit at offset {start} {reason}")]
    InvalidEdit { start: usize, reason: &'static str },
}

impl SpliceError {
    /// Short stable name of the failure class, suitable for reports.
    pub fn kind(&self) -> &'static str {
        match self {
            SpliceError::MalformedBlob { .. } => "malformed-blob",
            SpliceError::InvalidLengthEncoding { .. } => "invalid-length-encoding",
            SpliceError::TruncatedPayload { .. } => "truncated-payload",
            SpliceError::StructuralMismatch { .. } => "structural-mismatch",
            SpliceError::InvalidUtf8 { .. } => "invalid-utf8",
            SpliceError::InvalidEdit { .. } => "invalid-edit",
        }
    }
}

/// A failed rewrite pass. Nothing of the input has been modified when this is returned.
#[derive(thiserror::Error, Debug)]
pub enum RewriteError {
    #[error("marker #{occurrence} at offset {offset}: {source}")]
    Marker {
        occurrence: usize,
        offset: usize,
        #[source]
        source: SpliceError,
    },

    #[error("applying edits: {0}")]
    Apply(#[source] SpliceError),

    #[error("invalid marker attribute name {name:?}: {source}")]
    MarkerPattern {
        name: String,
        #[source]
        source: regex::Error,
    },
}

impl RewriteError {
    /// The underlying splice failure, if the error came from the text itself.
    pub fn splice_error(&self) -> Option<&SpliceError> {
        match self {
            RewriteError::Marker { source, .. } => Some(source),
            RewriteError::Apply(source) => Some(source),
            RewriteError::MarkerPattern { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SpliceError>;
