use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Broad category of a [`DemuxError`]. Every category is fatal to a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Resource,
    Format,
    Config,
    Io,
}

#[derive(Error, Debug)]
pub enum DemuxError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid FASTQ format at line {line}: {msg}")]
    InvalidFormat { line: usize, msg: String },

    #[error("Sequence and quality lengths don't match (seq: {seq_len}, qual: {qual_len})")]
    LengthMismatch { seq_len: usize, qual_len: usize },

    #[error("Invalid header: expected '@' at line {line}")]
    InvalidHeader { line: usize },

    #[error("Invalid separator: expected '+' at line {line}")]
    InvalidSeparator { line: usize },

    #[error("Unexpected end of file")]
    UnexpectedEof,

    #[error("Read IDs don't match between R1 and R2 (R1: {r1_id}, R2: {r2_id})")]
    PairedEndMismatch { r1_id: String, r2_id: String },

    #[error("R1 and R2 files contain different numbers of records")]
    PairedEndLengthMismatch,

    #[error("Read {id} is too short to hold barcode and UMI ({len} < {required} bases)")]
    ReadTooShort {
        id: String,
        len: usize,
        required: usize,
    },

    #[error("Cannot read well list {path:?}: {msg}")]
    WellList { path: PathBuf, msg: String },

    #[error("Well list {path:?} contains no barcodes")]
    EmptyWellList { path: PathBuf },

    #[error("Invalid batch size {0}: must be greater than zero")]
    InvalidBatchSize(usize),

    #[error("Invalid splitting mode '{0}': expected one of barcodes, batch, none")]
    InvalidMode(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("No R1/R2 partner found for FASTQ {path:?}")]
    UnpairedFastq { path: PathBuf },

    #[error("No input FASTQ pairs supplied")]
    NoInput,
}

impl DemuxError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DemuxError::Io(_) => ErrorKind::Io,
            DemuxError::InvalidFormat { .. }
            | DemuxError::LengthMismatch { .. }
            | DemuxError::InvalidHeader { .. }
            | DemuxError::InvalidSeparator { .. }
            | DemuxError::UnexpectedEof
            | DemuxError::PairedEndMismatch { .. }
            | DemuxError::PairedEndLengthMismatch
            | DemuxError::ReadTooShort { .. } => ErrorKind::Format,
            DemuxError::WellList { .. } | DemuxError::EmptyWellList { .. } => ErrorKind::Resource,
            DemuxError::InvalidBatchSize(_)
            | DemuxError::InvalidMode(_)
            | DemuxError::InvalidConfig(_)
            | DemuxError::UnpairedFastq { .. }
            | DemuxError::NoInput => ErrorKind::Config,
        }
    }
}

pub type Result<T> = std::result::Result<T, DemuxError>;
