//! User-facing error definitions.
//!
//! This module defines the error taxonomy for the simulator's outer surface.
//! It provides:
//! 1. **Configuration Errors:** Missing or malformed config files, unknown
//!    standards, organizations, speed bins, and option values.
//! 2. **Trace Errors:** Unreadable or malformed trace files.
//! 3. **Argument Errors:** Invalid command-line combinations.
//!
//! Only failures caused by user input are represented here. Internal
//! invariant violations (an undecodable command, a timing check that passed
//! but an update that did not) are programming errors and abort via
//! `panic!`/`assert!` instead; a simulation run is deterministic from its
//! inputs, so there is nothing to recover.

use thiserror::Error;

/// Errors reported to the user before or during a simulation run.
///
/// Every variant terminates the run with a non-zero exit code. Queue
/// back-pressure is not an error and never appears here; producers hold the
/// rejected request and retry on the next tick.
#[derive(Debug, Error)]
pub enum SimError {
    /// A configuration or trace file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that failed to open or read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A config file line did not parse as `key = value`.
    #[error("{path}:{line}: malformed entry `{text}` (expected key = value)")]
    MalformedConfig {
        /// Config file path.
        path: String,
        /// 1-based line number.
        line: usize,
        /// The offending line, comment stripped.
        text: String,
    },

    /// The config file deserialized into no valid configuration.
    ///
    /// Covers unknown keys, unknown enum values (standard, scheduler,
    /// mapping), and type mismatches.
    #[error("invalid configuration in {path}: {reason}")]
    InvalidConfig {
        /// Config file path.
        path: String,
        /// Human-readable reason from the deserializer.
        reason: String,
    },

    /// The named organization preset does not exist for this standard.
    #[error("unknown organization preset `{org}` for {standard}")]
    UnknownOrg {
        /// DRAM standard name.
        standard: String,
        /// Requested preset name.
        org: String,
    },

    /// The named speed bin does not exist for this standard.
    #[error("unknown speed bin `{speed}` for {standard}")]
    UnknownSpeed {
        /// DRAM standard name.
        standard: String,
        /// Requested speed bin name.
        speed: String,
    },

    /// A trace line did not parse as a request record.
    #[error("{path}:{line}: malformed trace record `{text}`")]
    MalformedTrace {
        /// Trace file path.
        path: String,
        /// 1-based line number.
        line: usize,
        /// The offending line.
        text: String,
    },

    /// Invalid command-line usage that clap cannot express.
    #[error("{0}")]
    Usage(String),
}

impl SimError {
    /// Wraps an I/O error with the path that produced it.
    pub fn io(path: &str, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_string(),
            source,
        }
    }
}
