//! Unified error types for Longan.
//!
//! Every fallible operation in the crate returns this error, whether it comes
//! from the lifecycle controller, the worksheet stream writer or the packaging
//! step.
use thiserror::Error;

/// Main error type for Longan operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP archive error raised while assembling the package
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// A style could not be turned into its canonical serialized form
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A row or sheet operation was attempted before `open`
    #[error("The writer must be opened before performing this action")]
    NotOpened,

    /// A configuration change was attempted after `open`
    #[error("The writer has already been opened; this option can no longer be changed")]
    AlreadyOpened,

    /// The writer was closed and cannot be reopened
    #[error("The writer has been closed and cannot be reused")]
    WriterClosed,

    /// Unsupported cell value, oversized text or otherwise invalid input
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Row outline level outside `[0, 7]`
    #[error("Invalid outline level {0}: must be between 0 and 7")]
    InvalidOutlineLevel(u8),

    /// Sheet name rejected by the naming rules
    #[error("Invalid sheet name: {0}")]
    InvalidSheetName(String),

    /// No sheet at the given index
    #[error("Sheet not found at index {0}")]
    SheetNotFound(usize),

    /// The sheet body header was already emitted
    #[error("Sheet data already started: {0}")]
    SheetDataStarted(String),

    /// The current sheet is full and automatic sheet creation is disabled
    #[error("Row limit of {0} reached on the current sheet")]
    RowLimitReached(u32),
}

/// Result type for Longan operations.
pub type Result<T> = std::result::Result<T, Error>;
