use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures opening PGN inputs. Problems inside a single game never surface
/// here; they end up in `GameRecord::parse_error` instead.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("Failed to open file '{}': {source}", path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error("Failed to initialize zstd decoder for '{}': {source}", path.display())]
    Zstd { path: PathBuf, source: io::Error },

    #[error("Invalid path pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        source: glob::PatternError,
    },

    #[error("No PGN files match '{0}'")]
    NoInputs(String),

    #[error("Invalid compression value '{0}'. Supported values: 'zstd' or omitted.")]
    Compression(String),
}

/// Header conversion problems of the game being read. A game without any
/// keeps `GameRecord::parse_error` at `None`.
#[derive(Debug, Clone, Default)]
pub struct ErrorAccumulator(Option<String>);

impl ErrorAccumulator {
    /// Add one diagnostic, after a `"; "` separator if others came first.
    pub fn push(&mut self, msg: &str) {
        if let Some(existing) = &mut self.0 {
            existing.push_str("; ");
            existing.push_str(msg);
        } else {
            self.0 = Some(msg.to_owned());
        }
    }

    /// Hand the joined message to the finished record and start over.
    pub fn take(&mut self) -> Option<String> {
        self.0.take()
    }
}
