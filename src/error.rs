use crate::block::BlockError;
use std::path::PathBuf;
use thiserror::Error;

/// Failures confined to one category. The sweep records them and moves on.
#[derive(Debug, Error)]
pub enum CategoryError {
    #[error("no source file found for {0}")]
    FileNotFound(String),
    #[error("{}: {source}", .path.display())]
    Block {
        path: PathBuf,
        #[source]
        source: BlockError,
    },
    #[error("{}: block boundaries could not be re-located at write time", .path.display())]
    Structural { path: PathBuf },
    #[error("{action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CategoryError {
    /// Stable identifier for the run summary.
    pub fn kind(&self) -> &'static str {
        match self {
            CategoryError::FileNotFound(_) => "file_not_found",
            CategoryError::Block {
                source: BlockError::HeaderNotFound(_),
                ..
            } => "block_not_found",
            CategoryError::Block {
                source: BlockError::Unterminated(_),
                ..
            } => "block_unterminated",
            CategoryError::Block {
                source: BlockError::NoConstants,
                ..
            } => "no_constants",
            CategoryError::Block {
                source: BlockError::UnparsedLines(_),
                ..
            } => "unparsed_lines",
            CategoryError::Structural { .. } => "structural",
            CategoryError::Io { .. } => "io",
        }
    }

    /// Write-time failures are errors; everything else means "no data".
    pub fn is_write_failure(&self) -> bool {
        matches!(
            self,
            CategoryError::Structural { .. } | CategoryError::Io { action: "write", .. }
        )
    }
}
