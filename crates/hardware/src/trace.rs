//! Trace file readers.
//!
//! Two ASCII formats drive the simulator:
//! 1. **DRAM traces:** one request per line, `address R|W`; addresses are
//!    decimal or `0x`-prefixed hexadecimal.
//! 2. **CPU traces:** one record per line, `bubbles read-addr
//!    [writeback-addr]`; the bubble count is the number of non-memory
//!    instructions preceding the access.
//!
//! DRAM traces stream; CPU traces load fully so that instruction-budget
//! runs can wrap around to the beginning.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};

use crate::common::SimError;
use crate::request::RequestKind;

/// Streaming reader for a DRAM request trace.
#[derive(Debug)]
pub struct DramTrace {
    path: String,
    lines: Lines<BufReader<File>>,
    line_no: usize,
}

impl DramTrace {
    /// Opens a trace file.
    ///
    /// # Errors
    ///
    /// [`SimError::Io`] when the file cannot be opened.
    pub fn open(path: &str) -> Result<Self, SimError> {
        let file = File::open(path).map_err(|e| SimError::io(path, e))?;
        Ok(Self {
            path: path.to_string(),
            lines: BufReader::new(file).lines(),
            line_no: 0,
        })
    }

    /// Reads the next request, or `None` at end of trace.
    ///
    /// Blank lines are skipped.
    ///
    /// # Errors
    ///
    /// [`SimError::Io`] on read failure, [`SimError::MalformedTrace`] on a
    /// line that is not `address R|W`.
    pub fn next(&mut self) -> Result<Option<(u64, RequestKind)>, SimError> {
        loop {
            let Some(line) = self.lines.next() else {
                return Ok(None);
            };
            self.line_no += 1;
            let line = line.map_err(|e| SimError::io(&self.path, e))?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let mut fields = trimmed.split_whitespace();
            let parsed = match (fields.next(), fields.next(), fields.next()) {
                (Some(addr), Some(kind), None) => {
                    parse_addr(addr).zip(parse_kind(kind))
                }
                _ => None,
            };
            let Some((addr, kind)) = parsed else {
                return Err(SimError::MalformedTrace {
                    path: self.path.clone(),
                    line: self.line_no,
                    text: trimmed.to_string(),
                });
            };
            return Ok(Some((addr, kind)));
        }
    }
}

/// One CPU trace record: a burst of non-memory instructions followed by a
/// read, with an optional writeback the read displaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CpuRecord {
    /// Non-memory instructions preceding the access.
    pub bubbles: u64,
    /// Read address.
    pub addr: u64,
    /// Dirty line written back by this access, if any.
    pub writeback: Option<u64>,
}

/// Fully-loaded reader for one core's CPU trace.
#[derive(Debug)]
pub struct CpuTrace {
    records: Vec<CpuRecord>,
    pos: usize,
    wrap: bool,
}

impl CpuTrace {
    /// Loads a trace file.
    ///
    /// With `wrap`, the trace restarts from the beginning after the last
    /// record, for instruction-budget runs.
    ///
    /// # Errors
    ///
    /// [`SimError::Io`] on read failure, [`SimError::MalformedTrace`] on a
    /// record that is not `bubbles addr [writeback]`.
    pub fn load(path: &str, wrap: bool) -> Result<Self, SimError> {
        let file = File::open(path).map_err(|e| SimError::io(path, e))?;
        let mut records = Vec::new();
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| SimError::io(path, e))?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let mut fields = trimmed.split_whitespace();
            let parsed = match (fields.next(), fields.next(), fields.next(), fields.next()) {
                (Some(bubbles), Some(addr), wb, None) => {
                    let wb = match wb {
                        None => Some(None),
                        Some(text) => parse_addr(text).map(Some),
                    };
                    match (bubbles.parse::<u64>().ok(), parse_addr(addr), wb) {
                        (Some(bubbles), Some(addr), Some(writeback)) => Some(CpuRecord {
                            bubbles,
                            addr,
                            writeback,
                        }),
                        _ => None,
                    }
                }
                _ => None,
            };
            let Some(record) = parsed else {
                return Err(SimError::MalformedTrace {
                    path: path.to_string(),
                    line: idx + 1,
                    text: trimmed.to_string(),
                });
            };
            records.push(record);
        }
        Ok(Self {
            records,
            pos: 0,
            wrap,
        })
    }

    /// Builds a trace from in-memory records; used by the test suite.
    pub fn from_records(records: Vec<CpuRecord>, wrap: bool) -> Self {
        Self {
            records,
            pos: 0,
            wrap,
        }
    }

    /// Next record, wrapping if configured. An empty trace yields nothing.
    pub fn next(&mut self) -> Option<CpuRecord> {
        if self.records.is_empty() {
            return None;
        }
        if self.pos >= self.records.len() {
            if !self.wrap {
                return None;
            }
            self.pos = 0;
        }
        let record = self.records[self.pos];
        self.pos += 1;
        Some(record)
    }

    /// Number of records in one pass of the trace.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the trace holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn parse_addr(text: &str) -> Option<u64> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).ok()
    } else {
        text.parse::<u64>().ok()
    }
}

fn parse_kind(text: &str) -> Option<RequestKind> {
    match text {
        "R" | "r" => Some(RequestKind::Read),
        "W" | "w" => Some(RequestKind::Write),
        _ => None,
    }
}
