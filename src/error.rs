use thiserror::Error;

/// Errors the builder core can fail with.
///
/// Per the error taxonomy this crate follows: a build never fails just
/// because some subdivision didn't find a good split (that degrades to a
/// leaf); it only fails when the input itself is structurally impossible
/// to build a hierarchy over.
#[derive(Error, Debug)]
pub enum BvhError {
    /// Fewer than one triangle, or a triangle references a vertex index
    /// outside the supplied vertex buffer.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The cache file's node/triangle counts overflow `usize`, or the
    /// file is shorter than its header claims.
    #[error("corrupt cache file: {0}")]
    CorruptCache(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BvhError>;
