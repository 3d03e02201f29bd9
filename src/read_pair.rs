//! iCELL8 read pairs: read 1 starts with the inline well barcode followed by
//! the UMI, read 2 carries the transcript.

use crate::{
    error::{DemuxError, Result},
    paired::{PairedEndReader, PairedRecordIterator},
    record::OwnedRecord,
};
use std::path::{Path, PathBuf};

pub const INLINE_BARCODE_LENGTH: usize = 11;
pub const UMI_LENGTH: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadLayout {
    pub barcode_start: usize,
    pub barcode_length: usize,
    pub umi_start: usize,
    pub umi_length: usize,
}

impl Default for ReadLayout {
    fn default() -> Self {
        ReadLayout {
            barcode_start: 0,
            barcode_length: INLINE_BARCODE_LENGTH,
            umi_start: INLINE_BARCODE_LENGTH,
            umi_length: UMI_LENGTH,
        }
    }
}

impl ReadLayout {
    pub fn new(barcode_start: usize, barcode_length: usize) -> Self {
        ReadLayout {
            barcode_start,
            barcode_length,
            umi_start: barcode_start + barcode_length,
            umi_length: 0,
        }
    }

    pub fn with_umi(mut self, start: usize, length: usize) -> Self {
        self.umi_start = start;
        self.umi_length = length;
        self
    }

    pub fn required_length(&self) -> usize {
        (self.barcode_start + self.barcode_length).max(self.umi_start + self.umi_length)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadPair {
    pub r1: OwnedRecord,
    pub r2: OwnedRecord,
    pub barcode: String,
    pub barcode_quality: String,
    pub umi: String,
    pub umi_quality: String,
}

impl ReadPair {
    pub fn from_records(r1: OwnedRecord, r2: OwnedRecord, layout: &ReadLayout) -> Result<Self> {
        let required = layout.required_length();
        if r1.seq.len() < required {
            return Err(DemuxError::ReadTooShort {
                id: String::from_utf8_lossy(&r1.id).into_owned(),
                len: r1.seq.len(),
                required,
            });
        }

        let barcode_range = layout.barcode_start..layout.barcode_start + layout.barcode_length;
        let umi_range = layout.umi_start..layout.umi_start + layout.umi_length;

        let barcode = String::from_utf8_lossy(&r1.seq[barcode_range.clone()]).into_owned();
        let barcode_quality = String::from_utf8_lossy(&r1.qual[barcode_range]).into_owned();
        let umi = String::from_utf8_lossy(&r1.seq[umi_range.clone()]).into_owned();
        let umi_quality = String::from_utf8_lossy(&r1.qual[umi_range]).into_owned();

        Ok(ReadPair {
            r1,
            r2,
            barcode,
            barcode_quality,
            umi,
            umi_quality,
        })
    }

    pub fn min_barcode_quality(&self) -> Option<char> {
        self.barcode_quality.chars().min()
    }

    pub fn min_umi_quality(&self) -> Option<char> {
        self.umi_quality.chars().min()
    }
}

/// Iteration stops after the first error.
pub struct ReadPairSource {
    pairs: std::vec::IntoIter<(PathBuf, PathBuf)>,
    current: Option<PairedRecordIterator>,
    layout: ReadLayout,
    failed: bool,
}

impl ReadPairSource {
    pub fn new(pairs: Vec<(PathBuf, PathBuf)>, layout: ReadLayout) -> Self {
        ReadPairSource {
            pairs: pairs.into_iter(),
            current: None,
            layout,
            failed: false,
        }
    }

    pub fn for_pair<P: AsRef<Path>>(r1: P, r2: P, layout: ReadLayout) -> Self {
        Self::new(
            vec![(r1.as_ref().to_path_buf(), r2.as_ref().to_path_buf())],
            layout,
        )
    }

    fn fail(&mut self, err: DemuxError) -> Option<Result<ReadPair>> {
        self.failed = true;
        self.current = None;
        Some(Err(err))
    }
}

impl Iterator for ReadPairSource {
    type Item = Result<ReadPair>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            if let Some(current) = self.current.as_mut() {
                match current.next() {
                    Some(Ok((r1, r2))) => {
                        return match ReadPair::from_records(r1, r2, &self.layout) {
                            Ok(pair) => Some(Ok(pair)),
                            Err(e) => self.fail(e),
                        };
                    }
                    Some(Err(e)) => return self.fail(e),
                    None => self.current = None,
                }
            }

            let (r1_path, r2_path) = self.pairs.next()?;
            match PairedEndReader::from_paths(&r1_path, &r2_path) {
                Ok(reader) => self.current = Some(reader.into_paired_records()),
                Err(e) => return self.fail(e),
            }
        }
    }
}
