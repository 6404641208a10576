//! Reading values from text
//!
//! One value per line: the first whitespace-separated token of each line is
//! parsed as an `f64`. Lines without a number are skipped, so headers,
//! blank lines and comments can stay in the input.
//!
//! # Example
//!
//! ```
//! use std::io::Cursor;
//!
//! use descstats::dataset::Dataset;
//! use descstats::input;
//!
//! let text = "value\n4.3\n9.4\n\n2.1 # comment\n";
//! let mut dataset = Dataset::new();
//!
//! let ingested = input::read_into(&mut dataset, Cursor::new(text)).unwrap();
//! assert_eq!(ingested, 3);
//! assert_eq!(dataset.max(), 9.4);
//! ```

use std::io::BufRead;

use snafu::{ResultExt, Snafu};
use tracing::{debug, warn};

use crate::dataset::Dataset;
use crate::error::StatsError;

/// Error while reading values into a dataset
#[derive(Debug, Snafu)]
pub enum InputError {
    /// The source could not be read
    #[snafu(display("failed to read input: {source}"))]
    Io { source: std::io::Error },

    /// The dataset refused a value
    #[snafu(display("failed to ingest value: {source}"))]
    Ingest { source: StatsError },
}

/// Iterator over the values of a line-oriented text source
///
/// Yields an error at most once, when the source itself fails; iteration
/// then ends.
#[derive(Debug)]
pub struct ValueReader<R> {
    reader: R,
    line: Vec<u8>,
    line_number: u64,
    failed: bool,
}

impl<R: BufRead> ValueReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: Vec::new(),
            line_number: 0,
            failed: false,
        }
    }

    /// Number of lines consumed so far
    pub fn line_number(&self) -> u64 {
        self.line_number
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: BufRead> Iterator for ValueReader<R> {
    type Item = Result<f64, InputError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            self.line.clear();
            match self.reader.read_until(b'\n', &mut self.line).context(IoSnafu) {
                Ok(0) => return None,
                Ok(_) => self.line_number += 1,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }

            if let Some(value) = parse_line(&self.line, self.line_number) {
                return Some(Ok(value));
            }
        }
    }
}

/// Parse the first token of a line, logging why a line is skipped
fn parse_line(line: &[u8], line_number: u64) -> Option<f64> {
    let Ok(text) = std::str::from_utf8(line) else {
        debug!(line_number, "Skipping line that is not valid UTF-8.");
        return None;
    };

    let token = text.split_whitespace().next()?;
    let value = match token.parse::<f64>() {
        Ok(value) => value,
        Err(_) => {
            debug!(line_number, token, "Skipping line without a number.");
            return None;
        }
    };

    if value.is_nan() {
        debug!(line_number, token, "Skipping NaN literal.");
        return None;
    }
    if value.is_infinite() && !is_infinity_literal(token) {
        warn!(line_number, token, "Numeric overflow while parsing value.");
    } else if value == 0.0 && has_nonzero_mantissa(token) {
        warn!(line_number, token, "Numeric underflow while parsing value.");
    }

    Some(value)
}

fn is_infinity_literal(token: &str) -> bool {
    let unsigned = token.trim_start_matches(['+', '-']);
    unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity")
}

fn has_nonzero_mantissa(token: &str) -> bool {
    token
        .split(['e', 'E'])
        .next()
        .is_some_and(|mantissa| mantissa.bytes().any(|b| matches!(b, b'1'..=b'9')))
}

/// Ingest every value of `reader` into `dataset`
///
/// Returns the number of values read. NaN literals are skipped, so the
/// count matches what the dataset ingested.
pub fn read_into<R: BufRead>(dataset: &mut Dataset, reader: R) -> Result<u64, InputError> {
    let mut ingested = 0;
    for value in ValueReader::new(reader) {
        dataset.ingest(value?).context(IngestSnafu)?;
        ingested += 1;
    }
    debug!(ingested, "Finished reading input.");
    Ok(ingested)
}
