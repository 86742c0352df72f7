//! Error types for the accumulation stages.
//!
//! Only launch-level failures are reported, such as mismatched buffers or
//! an empty merge. The per-pixel bodies never return errors.

use accum_core::Size;
use thiserror::Error;

/// Error type for stage launches and the post-processing driver.
#[derive(Error, Debug)]
pub enum OpsError {
    /// A buffer could not be bound to its image domain.
    #[error(transparent)]
    Core(#[from] accum_core::Error),

    /// Source and destination of one stage cover different domains.
    #[error("size mismatch: destination {dst}, source {src}")]
    SizeMismatch {
        /// Destination domain
        dst: Size,
        /// Source domain
        src: Size,
    },

    /// Both inputs of a mean merge carry zero passes.
    #[error("cannot merge buffers with zero combined passes")]
    ZeroPasses,

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Worker pool could not be created.
    #[error("thread pool: {0}")]
    ThreadPool(String),

    /// Configuration text could not be parsed or written.
    #[error("config: {0}")]
    Config(#[from] serde_yaml::Error),
}

impl OpsError {
    /// Creates an [`OpsError::SizeMismatch`] error.
    #[inline]
    pub fn size_mismatch(dst: Size, src: Size) -> Self {
        Self::SizeMismatch { dst, src }
    }
}

/// Result type for stage launches.
pub type OpsResult<T> = Result<T, OpsError>;

/// Fails with [`OpsError::SizeMismatch`] unless both domains are equal.
#[inline]
pub(crate) fn ensure_same_size(dst: Size, src: Size) -> OpsResult<()> {
    if dst != src {
        return Err(OpsError::size_mismatch(dst, src));
    }
    Ok(())
}
