use crate::{
    error::Result,
    parser::{Parser, StreamingParser},
    record::OwnedRecord,
};
use flate2::read::MultiGzDecoder;
use memmap2::{Mmap, MmapOptions};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

pub type RecordIter = Box<dyn Iterator<Item = Result<OwnedRecord>> + Send>;

/// A FASTQ source. Plain files are memory-mapped; gzip files (by `.gz`
/// extension) and arbitrary readers are parsed as a stream.
pub enum FastqReader {
    Mmap(MmapReader),
    Streaming(RecordIter),
}

impl FastqReader {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.extension().and_then(|s| s.to_str()) == Some("gz") {
            Self::from_gzip_file(path)
        } else {
            Self::from_file(path)
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        if file.metadata()?.len() == 0 {
            return Ok(Self::from_reader(file));
        }
        let mmap = unsafe { MmapOptions::new().map(&file)? };
        Ok(FastqReader::Mmap(MmapReader::new(mmap)))
    }

    pub fn from_gzip_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let decoder = MultiGzDecoder::new(BufReader::new(file));
        Ok(Self::from_reader(decoder))
    }

    pub fn from_reader<R: Read + Send + 'static>(reader: R) -> Self {
        FastqReader::Streaming(Box::new(StreamingParser::new(reader)))
    }

    pub fn into_records(self) -> RecordIter {
        match self {
            FastqReader::Mmap(reader) => Box::new(reader.into_records()),
            FastqReader::Streaming(iter) => iter,
        }
    }
}

pub struct MmapReader {
    mmap: Mmap,
}

impl MmapReader {
    pub fn new(mmap: Mmap) -> Self {
        MmapReader { mmap }
    }

    pub fn into_records(self) -> MmapRecords {
        MmapRecords {
            mmap: self.mmap,
            pos: 0,
            line: 1,
            failed: false,
        }
    }
}

/// Owns the mapping and re-enters it at the saved offset for every record.
pub struct MmapRecords {
    mmap: Mmap,
    pos: usize,
    line: usize,
    failed: bool,
}

impl Iterator for MmapRecords {
    type Item = Result<OwnedRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let mut parser = Parser::with_line(&self.mmap[self.pos..], self.line);
        match parser.parse_record() {
            Ok(Some(record)) => {
                let owned = OwnedRecord::from_record(&record);
                self.pos += parser.position();
                self.line = parser.line();
                Some(Ok(owned))
            }
            Ok(None) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
