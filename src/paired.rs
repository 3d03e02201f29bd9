use crate::{
    error::{DemuxError, Result},
    reader::{FastqReader, RecordIter},
    record::OwnedRecord,
};
use std::path::Path;

pub struct PairedEndReader {
    r1_reader: FastqReader,
    r2_reader: FastqReader,
}

impl PairedEndReader {
    pub fn new(r1_reader: FastqReader, r2_reader: FastqReader) -> Self {
        PairedEndReader {
            r1_reader,
            r2_reader,
        }
    }

    pub fn from_paths<P: AsRef<Path>>(r1_path: P, r2_path: P) -> Result<Self> {
        let r1_reader = FastqReader::from_path(r1_path)?;
        let r2_reader = FastqReader::from_path(r2_path)?;

        Ok(Self::new(r1_reader, r2_reader))
    }

    pub fn into_paired_records(self) -> PairedRecordIterator {
        PairedRecordIterator {
            r1_iter: self.r1_reader.into_records(),
            r2_iter: self.r2_reader.into_records(),
            strict_pairing: true,
            done: false,
        }
    }
}

/// Yields `(R1, R2)` records in lockstep. A count or name mismatch between
/// the two streams is reported once, after which iteration ends.
pub struct PairedRecordIterator {
    r1_iter: RecordIter,
    r2_iter: RecordIter,
    strict_pairing: bool,
    done: bool,
}

impl PairedRecordIterator {
    pub fn strict_pairing(mut self, strict: bool) -> Self {
        self.strict_pairing = strict;
        self
    }

    fn next_pair(&mut self) -> Option<Result<(OwnedRecord, OwnedRecord)>> {
        match (self.r1_iter.next(), self.r2_iter.next()) {
            (Some(Ok(r1)), Some(Ok(r2))) => {
                if self.strict_pairing {
                    let id1 = r1.as_record().base_id();
                    let id2 = r2.as_record().base_id();

                    if id1 != id2 {
                        return Some(Err(DemuxError::PairedEndMismatch {
                            r1_id: String::from_utf8_lossy(&r1.id).into_owned(),
                            r2_id: String::from_utf8_lossy(&r2.id).into_owned(),
                        }));
                    }
                }
                Some(Ok((r1, r2)))
            }
            (Some(Err(e)), _) | (_, Some(Err(e))) => Some(Err(e)),
            (None, None) => None,
            (Some(_), None) | (None, Some(_)) => Some(Err(DemuxError::PairedEndLengthMismatch)),
        }
    }
}

impl Iterator for PairedRecordIterator {
    type Item = Result<(OwnedRecord, OwnedRecord)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.next_pair();
        if !matches!(item, Some(Ok(_))) {
            self.done = true;
        }
        item
    }
}
