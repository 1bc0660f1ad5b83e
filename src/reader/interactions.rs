use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, warn};

use super::{ReadOutcome, ReaderOptions};
use crate::errors::{PipelineError, Result};
use crate::types::{CompoundId, InteractionRecord, Score};

/// Column names of the header line shipped with the STRING link files.
const RAW_HEADER: [&str; 3] = ["protein1", "protein2", "combined_score"];

/// Streaming reader over `<source> <target> <score>` lines.
///
/// Yields one `Result` per record. Blank lines are ignored and a leading
/// `protein1 protein2 combined_score` header is skipped. In lenient mode
/// malformed lines are logged, counted and skipped; otherwise they surface as
/// `MalformedRecord` errors carrying the 1-based line number.
pub struct InteractionReader<R> {
    reader: R,
    label: String,
    options: ReaderOptions,
    line_no: u64,
    seen_content: bool,
    parse_errors: usize,
    buf: Vec<u8>,
}

impl InteractionReader<BufReader<File>> {
    /// Opens `path` for streaming.
    pub fn open(path: &Path, options: ReaderOptions) -> Result<Self> {
        let file = File::open(path).map_err(|e| PipelineError::File {
            message: format!("failed to open interaction file: {e}"),
            path: path.display().to_string(),
        })?;
        Ok(Self::new(
            BufReader::new(file),
            &path.display().to_string(),
            options,
        ))
    }
}

impl<R: BufRead> InteractionReader<R> {
    /// Wraps any buffered reader; `label` names the source in errors.
    pub fn new(reader: R, label: &str, options: ReaderOptions) -> Self {
        Self {
            reader,
            label: label.to_string(),
            options,
            line_no: 0,
            seen_content: false,
            parse_errors: 0,
            buf: Vec::new(),
        }
    }

    /// Malformed lines skipped so far (lenient mode only).
    pub fn parse_errors(&self) -> usize {
        self.parse_errors
    }

    fn is_header(&self, line: &str) -> bool {
        let fields = split_fields(line, self.options.field_separator);
        fields.len() == RAW_HEADER.len()
            && fields.iter().zip(RAW_HEADER.iter()).all(|(a, b)| a == b)
    }
}

impl<R: BufRead> Iterator for InteractionReader<R> {
    type Item = Result<InteractionRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => {
                    return Some(Err(PipelineError::File {
                        message: format!("failed to read line {}: {e}", self.line_no + 1),
                        path: self.label.clone(),
                    }))
                }
            }
            self.line_no += 1;

            let parsed = match std::str::from_utf8(&self.buf) {
                Ok(text) => {
                    let line = text.trim();
                    if line.is_empty() {
                        continue;
                    }
                    if !self.seen_content {
                        self.seen_content = true;
                        if self.is_header(line) {
                            debug!(path = %self.label, "skipping header line");
                            continue;
                        }
                    }
                    parse_line(line, &self.options)
                }
                Err(e) => {
                    self.seen_content = true;
                    Err(PipelineError::malformed(format!(
                        "invalid UTF-8 after byte {}",
                        e.valid_up_to()
                    )))
                }
            };

            match parsed {
                Ok(record) => return Some(Ok(record)),
                Err(e) if self.options.skip_malformed && e.is_malformed() => {
                    self.parse_errors += 1;
                    warn!(
                        path = %self.label,
                        line = self.line_no,
                        error = %e,
                        "skipping malformed line"
                    );
                }
                Err(e) => return Some(Err(e.at(&self.label, self.line_no))),
            }
        }
    }
}

fn split_fields(line: &str, separator: Option<char>) -> Vec<&str> {
    match separator {
        Some(sep) => line.split(sep).map(str::trim).collect(),
        None => line.split_whitespace().collect(),
    }
}

/// Parses one raw interaction line.
///
/// Exactly three fields are required; the score must be an integer within
/// `0..=MAX_SCORE` and both identifiers must have a non-empty local part.
pub fn parse_line(line: &str, options: &ReaderOptions) -> Result<InteractionRecord> {
    let fields = split_fields(line.trim(), options.field_separator);
    let [source, target, score] = fields.as_slice() else {
        return Err(PipelineError::malformed(format!(
            "expected 3 fields, found {}",
            fields.len()
        )));
    };

    Ok(InteractionRecord {
        source_id: CompoundId::parse_with(source, options.namespace_separator)?,
        target_id: CompoundId::parse_with(target, options.namespace_separator)?,
        raw_score: Score::parse(score)?,
    })
}

/// Reads the whole interaction file into memory.
///
/// Normalization needs the global score distribution, so every record must be
/// observed before any output can be produced.
pub fn read_interactions(
    path: &Path,
    options: &ReaderOptions,
) -> Result<ReadOutcome<InteractionRecord>> {
    let mut reader = InteractionReader::open(path, options.clone())?;
    let records = reader.by_ref().collect::<Result<Vec<_>>>()?;
    let parse_errors = reader.parse_errors();

    debug!(
        path = %path.display(),
        records = records.len(),
        parse_errors,
        "interaction file read"
    );

    Ok(ReadOutcome {
        records,
        parse_errors,
    })
}
