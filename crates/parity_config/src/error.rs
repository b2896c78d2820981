//! Errors raised while reading or checking `parity.toml`.

use std::path::PathBuf;

/// A `parity.toml` that cannot drive a run.
///
/// Every variant is a setup failure: it is reported before the first clock
/// edge and aborts the whole run.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        /// File that was opened.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The document is not TOML, or a key has the wrong type or is unknown.
    #[error("malformed parity.toml: {0}")]
    Syntax(String),

    /// A value in one of the `[fixed_point]`, `[timing]`, `[stimulus]` or
    /// `[memory]` tables is out of range.
    #[error("invalid [{section}] setting: {reason}")]
    Invalid {
        /// Table holding the offending key.
        section: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// A `[[butterfly.directed]]` entry cannot be turned into a vector.
    #[error("directed vector '{name}': {reason}")]
    Directed {
        /// Name of the entry, possibly empty.
        name: String,
        /// What is wrong with it.
        reason: String,
    },
}

impl ConfigError {
    /// The table a validation failure belongs to, if any.
    pub fn section(&self) -> Option<&'static str> {
        match self {
            ConfigError::Invalid { section, .. } => Some(section),
            ConfigError::Directed { .. } => Some("butterfly.directed"),
            ConfigError::Read { .. } | ConfigError::Syntax(_) => None,
        }
    }
}
