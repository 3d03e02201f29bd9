use crate::{
    buffer::BufferedReader,
    error::{DemuxError, Result},
    record::{OwnedRecord, Record},
};
use std::io::Read;

/// Parses four-line FASTQ records out of an in-memory byte slice.
pub struct Parser<'a> {
    pub(crate) data: &'a [u8],
    pub(crate) pos: usize,
    line: usize,
}

impl<'a> Parser<'a> {
    #[inline]
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_line(data, 1)
    }

    /// Starts parsing with `line` as the number of the first line in `data`,
    /// so errors from a window into a larger stream report absolute lines.
    #[inline]
    pub fn with_line(data: &'a [u8], line: usize) -> Self {
        Parser { data, pos: 0, line }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn line(&self) -> usize {
        self.line
    }

    #[inline]
    fn read_line(&mut self) -> Result<&'a [u8]> {
        let start = self.pos;

        if let Some(offset) = memchr::memchr(b'\n', &self.data[start..]) {
            let end = start + offset;
            self.pos = end + 1;
            self.line += 1;

            let mut line_end = end;
            if line_end > start && self.data[line_end - 1] == b'\r' {
                line_end -= 1;
            }

            Ok(&self.data[start..line_end])
        } else if self.pos < self.data.len() {
            let end = self.data.len();
            self.pos = end;
            let mut line_end = end;
            if line_end > start && self.data[line_end - 1] == b'\r' {
                line_end -= 1;
            }
            Ok(&self.data[start..line_end])
        } else {
            Err(DemuxError::UnexpectedEof)
        }
    }

    fn skip_blank(&mut self) {
        while self.pos < self.data.len() && self.data[self.pos].is_ascii_whitespace() {
            if self.data[self.pos] == b'\n' {
                self.line += 1;
            }
            self.pos += 1;
        }
    }

    pub fn parse_record(&mut self) -> Result<Option<Record<'a>>> {
        self.skip_blank();

        if self.pos >= self.data.len() {
            return Ok(None);
        }

        let header_line = self.read_line()?;
        if header_line.first() != Some(&b'@') {
            return Err(DemuxError::InvalidHeader { line: self.line - 1 });
        }
        let (id, desc) = Self::parse_header(&header_line[1..]);
        if id.is_empty() {
            return Err(DemuxError::InvalidFormat {
                line: self.line - 1,
                msg: "empty read name".to_string(),
            });
        }

        let seq = self.read_line()?;

        let sep_line = self.read_line()?;
        if sep_line.first() != Some(&b'+') {
            return Err(DemuxError::InvalidSeparator { line: self.line - 1 });
        }

        let qual = self.read_line()?;
        if seq.len() != qual.len() {
            return Err(DemuxError::LengthMismatch {
                seq_len: seq.len(),
                qual_len: qual.len(),
            });
        }

        Ok(Some(Record::new(id, desc, seq, qual)))
    }

    #[inline]
    fn parse_header(header: &[u8]) -> (&[u8], Option<&[u8]>) {
        if let Some(split) = memchr::memchr2(b' ', b'\t', header) {
            (&header[..split], Some(&header[split + 1..]))
        } else {
            (header, None)
        }
    }
}

impl<'a> Iterator for Parser<'a> {
    type Item = Result<Record<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.parse_record().transpose()
    }
}

/// Length of the first complete four-line record at the start of `data`,
/// including its final newline, or `None` if more input is needed.
#[inline]
fn complete_record_len(data: &[u8]) -> Option<usize> {
    memchr::memchr_iter(b'\n', data).nth(3).map(|nl| nl + 1)
}

/// Parses records incrementally from any [`Read`] source.
pub struct StreamingParser<R: Read> {
    reader: BufferedReader<R>,
    line: usize,
    failed: bool,
}

impl<R: Read> StreamingParser<R> {
    pub fn new(reader: R) -> Self {
        StreamingParser {
            reader: BufferedReader::new(reader),
            line: 1,
            failed: false,
        }
    }

    pub fn with_capacity(capacity: usize, reader: R) -> Self {
        StreamingParser {
            reader: BufferedReader::with_capacity(capacity, reader),
            line: 1,
            failed: false,
        }
    }

    fn skip_blank(&mut self) -> Result<()> {
        loop {
            let buffer = self.reader.consumed();
            let blank = buffer
                .iter()
                .take_while(|b| b.is_ascii_whitespace())
                .count();
            self.line += buffer[..blank].iter().filter(|&&b| b == b'\n').count();
            self.reader.consume(blank);
            if self.reader.available() > 0 || self.reader.is_eof() {
                return Ok(());
            }
            self.reader.fill_buffer()?;
        }
    }

    pub fn parse_next(&mut self) -> Result<Option<OwnedRecord>> {
        self.skip_blank()?;

        loop {
            let buffer = self.reader.consumed();
            let window = match complete_record_len(buffer) {
                Some(len) => len,
                None if self.reader.is_eof() => buffer.len(),
                None => {
                    self.reader.fill_buffer()?;
                    continue;
                }
            };

            if window == 0 {
                return Ok(None);
            }

            let mut parser = Parser::with_line(&buffer[..window], self.line);
            return match parser.parse_record()? {
                Some(record) => {
                    let owned = OwnedRecord::from_record(&record);
                    self.line = parser.line();
                    let consumed = parser.position();
                    self.reader.consume(consumed);
                    Ok(Some(owned))
                }
                None => Ok(None),
            };
        }
    }
}

impl<R: Read> Iterator for StreamingParser<R> {
    type Item = Result<OwnedRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let item = self.parse_next().transpose();
        self.failed = matches!(item, Some(Err(_)));
        item
    }
}
