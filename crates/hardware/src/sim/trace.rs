//! Access trace parsing.
//!
//! A trace is plain text with one access per line:
//!
//! ```text
//! # core op address
//! 0 W 0x1000
//! 1 r 4100
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. Any other line must
//! hold exactly three fields; a malformed line ends the run with a
//! [`SimError::TraceFormat`] naming its line number.

use std::io::BufRead;
use std::str::FromStr;

use crate::common::{AccessType, CoreId, Result, SimError, TraceFormatKind};

/// One access of the trace.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraceRecord {
    /// Issuing core.
    pub core: CoreId,
    /// Read or write.
    pub op: AccessType,
    /// Byte address.
    pub addr: u64,
}

impl TraceRecord {
    /// Parses one raw trace line.
    ///
    /// # Returns
    ///
    /// `Ok(None)` for blank and comment lines.
    ///
    /// # Errors
    ///
    /// The [`TraceFormatKind`] describing why the record is malformed.
    pub fn parse_line(line: &str) -> std::result::Result<Option<Self>, TraceFormatKind> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(None);
        }
        trimmed.parse().map(Some)
    }
}

impl FromStr for TraceRecord {
    type Err = TraceFormatKind;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split_whitespace().collect();
        let &[core, op, addr] = fields.as_slice() else {
            return Err(TraceFormatKind::WrongTokenCount(fields.len()));
        };

        let core = core
            .parse::<CoreId>()
            .map_err(|_| TraceFormatKind::InvalidCore(core.to_string()))?;
        let op = AccessType::from_token(op)
            .ok_or_else(|| TraceFormatKind::InvalidOperation(op.to_string()))?;
        let addr = parse_address(addr).ok_or_else(|| TraceFormatKind::InvalidAddress(addr.to_string()))?;

        Ok(Self { core, op, addr })
    }
}

/// Parses a decimal or `0x`-prefixed hexadecimal address.
///
/// Signs are rejected in both forms, so `+5` and `0x+5` are malformed.
pub fn parse_address(token: &str) -> Option<u64> {
    let (digits, radix) = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .map_or((token, 10), |hex| (hex, 16));
    if digits.starts_with(['+', '-']) {
        return None;
    }
    u64::from_str_radix(digits, radix).ok()
}

/// Iterator over the records of a trace source.
///
/// Yields records in order, skipping blank and comment lines. After the
/// first error the iterator is fused and yields nothing more.
#[derive(Debug)]
pub struct TraceReader<R> {
    source: R,
    buf: String,
    line_no: usize,
    done: bool,
}

impl<R: BufRead> TraceReader<R> {
    /// Wraps a buffered trace source.
    pub const fn new(source: R) -> Self {
        Self {
            source,
            buf: String::new(),
            line_no: 0,
            done: false,
        }
    }

    /// Number of lines consumed so far, including skipped ones.
    pub const fn line_no(&self) -> usize {
        self.line_no
    }

    fn next_record(&mut self) -> Result<Option<TraceRecord>> {
        loop {
            self.buf.clear();
            let read = self
                .source
                .read_line(&mut self.buf)
                .map_err(|e| SimError::io(format!("reading trace line {}", self.line_no + 1), e))?;
            if read == 0 {
                return Ok(None);
            }
            self.line_no += 1;
            match TraceRecord::parse_line(&self.buf) {
                Ok(Some(record)) => return Ok(Some(record)),
                Ok(None) => {}
                Err(kind) => {
                    return Err(SimError::TraceFormat {
                        line: self.line_no,
                        text: self.buf.trim().to_string(),
                        kind,
                    });
                }
            }
        }
    }
}

impl<R: BufRead> Iterator for TraceReader<R> {
    type Item = Result<TraceRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
