use crate::{
    error::{DemuxError, Result},
    output::{BUFSIZE, MAX_OPEN_FILES},
    quality::QualityFilter,
    read_pair::ReadLayout,
};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_BATCH_SIZE: usize = 5_000_000;
pub const DEFAULT_BASENAME: &str = "icell8";

/// How reads that pass filtering are spread over output files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplitMode {
    /// One file pair per barcode.
    #[default]
    Barcodes,
    /// Fixed-size batches in arrival order, `B000`, `B001`, ...
    Batch,
    /// A single `filtered` file pair.
    None,
}

impl SplitMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SplitMode::Barcodes => "barcodes",
            SplitMode::Batch => "batch",
            SplitMode::None => "none",
        }
    }
}

impl FromStr for SplitMode {
    type Err = DemuxError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "barcodes" => Ok(SplitMode::Barcodes),
            "batch" => Ok(SplitMode::Batch),
            "none" => Ok(SplitMode::None),
            other => Err(DemuxError::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for SplitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct DemuxConfig {
    pub mode: SplitMode,
    pub batch_size: usize,
    pub basename: String,
    pub outdir: PathBuf,
    pub filter: bool,
    pub quality: QualityFilter,
    pub layout: ReadLayout,
    pub bufsize: usize,
    pub max_open_files: usize,
    pub max_reads: Option<u64>,
}

impl Default for DemuxConfig {
    fn default() -> Self {
        DemuxConfig {
            mode: SplitMode::Barcodes,
            batch_size: DEFAULT_BATCH_SIZE,
            basename: DEFAULT_BASENAME.to_string(),
            outdir: PathBuf::from("."),
            filter: true,
            quality: QualityFilter::default(),
            layout: ReadLayout::default(),
            bufsize: BUFSIZE,
            max_open_files: MAX_OPEN_FILES,
            max_reads: None,
        }
    }
}

impl DemuxConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(mut self, mode: SplitMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    pub fn basename<S: Into<String>>(mut self, basename: S) -> Self {
        self.basename = basename.into();
        self
    }

    pub fn outdir<P: AsRef<Path>>(mut self, outdir: P) -> Self {
        self.outdir = outdir.as_ref().to_path_buf();
        self
    }

    pub fn filter(mut self, filter: bool) -> Self {
        self.filter = filter;
        self
    }

    pub fn quality(mut self, quality: QualityFilter) -> Self {
        self.quality = quality;
        self
    }

    pub fn layout(mut self, layout: ReadLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn bufsize(mut self, size: usize) -> Self {
        self.bufsize = size;
        self
    }

    pub fn max_open_files(mut self, max_open: usize) -> Self {
        self.max_open_files = max_open;
        self
    }

    pub fn max_reads(mut self, max_reads: Option<u64>) -> Self {
        self.max_reads = max_reads;
        self
    }

    /// Rejects settings that would make a run meaningless, before any input
    /// is touched.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(DemuxError::InvalidBatchSize(self.batch_size));
        }
        if self.basename.is_empty() || self.basename.contains(std::path::is_separator) {
            return Err(DemuxError::InvalidConfig(format!(
                "basename '{}' must be a non-empty file name prefix",
                self.basename
            )));
        }
        if self.bufsize == 0 {
            return Err(DemuxError::InvalidConfig(
                "buffer size must be greater than zero".to_string(),
            ));
        }
        if self.max_open_files == 0 {
            return Err(DemuxError::InvalidConfig(
                "maximum number of open files must be greater than zero".to_string(),
            ));
        }
        if self.layout.barcode_length == 0 {
            return Err(DemuxError::InvalidConfig(
                "barcode length must be greater than zero".to_string(),
            ));
        }
        if self.max_reads == Some(0) {
            return Err(DemuxError::InvalidConfig(
                "maximum number of reads must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
