use crate::{
    config::{DemuxConfig, SplitMode},
    error::Result,
    output::BufferedOutputFiles,
    read_pair::{ReadPair, ReadPairSource},
    well_list::ExpectedBarcodes,
};
use log::{debug, info, warn};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

const PROGRESS_INTERVAL: u64 = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Unassigned,
    FailedBarcode,
    FailedUmi,
    Filtered,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OutputTarget {
    Barcode(String),
    Batch(u64),
    Filtered,
    Unassigned,
    FailedBarcode,
    FailedUmi,
}

impl OutputTarget {
    pub fn label(&self) -> String {
        self.to_string()
    }

    pub fn file_name(&self, basename: &str, read: u8) -> String {
        format!("{}.{}.r{}.fastq", basename, self, read)
    }
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputTarget::Barcode(barcode) => f.write_str(barcode),
            OutputTarget::Batch(index) => write!(f, "B{:03}", index),
            OutputTarget::Filtered => f.write_str("filtered"),
            OutputTarget::Unassigned => f.write_str("unassigned"),
            OutputTarget::FailedBarcode => f.write_str("failed_barcode"),
            OutputTarget::FailedUmi => f.write_str("failed_umi"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub classification: Classification,
    pub target: OutputTarget,
}

#[derive(Debug, Clone, Default)]
pub struct DemuxCounters {
    pub total: u64,
    pub assigned: u64,
    pub unassigned: u64,
    pub filtered: u64,
    pub barcode_counts: BTreeMap<String, u64>,
    pub barcodes_seen: HashSet<String>,
}

impl DemuxCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of filtered pairs so far, including this one.
    pub fn record(&mut self, barcode: &str, classification: Classification) -> u64 {
        self.total += 1;
        if !self.barcodes_seen.contains(barcode) {
            self.barcodes_seen.insert(barcode.to_string());
        }

        match classification {
            Classification::Unassigned => self.unassigned += 1,
            Classification::FailedBarcode | Classification::FailedUmi => self.assigned += 1,
            Classification::Filtered => {
                self.assigned += 1;
                self.filtered += 1;
                *self.barcode_counts.entry(barcode.to_string()).or_insert(0) += 1;
            }
        }

        self.filtered
    }
}

pub struct Demultiplexer {
    config: DemuxConfig,
    expected: ExpectedBarcodes,
}

impl Demultiplexer {
    pub fn new(config: DemuxConfig, expected: ExpectedBarcodes) -> Result<Self> {
        config.validate()?;
        Ok(Demultiplexer { config, expected })
    }

    pub fn config(&self) -> &DemuxConfig {
        &self.config
    }

    pub fn expected(&self) -> &ExpectedBarcodes {
        &self.expected
    }

    pub fn classify(&self, pair: &ReadPair) -> Classification {
        if !self.config.filter {
            return Classification::Filtered;
        }
        if !self.expected.contains(&pair.barcode) {
            Classification::Unassigned
        } else if !self.config.quality.barcode_passes(pair.barcode_quality.as_bytes()) {
            Classification::FailedBarcode
        } else if !self.config.quality.umi_passes(pair.umi_quality.as_bytes()) {
            Classification::FailedUmi
        } else {
            Classification::Filtered
        }
    }

    /// Output target for a classified pair. `filtered_count` is the global
    /// number of filtered pairs up to and including this one.
    pub fn target(
        &self,
        classification: Classification,
        barcode: &str,
        filtered_count: u64,
    ) -> OutputTarget {
        match classification {
            Classification::Unassigned => OutputTarget::Unassigned,
            Classification::FailedBarcode => OutputTarget::FailedBarcode,
            Classification::FailedUmi => OutputTarget::FailedUmi,
            Classification::Filtered => match self.config.mode {
                SplitMode::Barcodes => OutputTarget::Barcode(barcode.to_string()),
                SplitMode::Batch => {
                    let batch_size = self.config.batch_size as u64;
                    OutputTarget::Batch(filtered_count.saturating_sub(1) / batch_size)
                }
                SplitMode::None => OutputTarget::Filtered,
            },
        }
    }

    pub fn assign(&self, pair: &ReadPair, counters: &mut DemuxCounters) -> Assignment {
        let classification = self.classify(pair);
        let filtered_count = counters.record(&pair.barcode, classification);
        let target = self.target(classification, &pair.barcode, filtered_count);
        Assignment {
            classification,
            target,
        }
    }

    fn dispatch(
        &self,
        pair: &ReadPair,
        target: &OutputTarget,
        output: &mut BufferedOutputFiles,
    ) -> Result<()> {
        let label = target.label();
        for (read, record) in [(1u8, &pair.r1), (2u8, &pair.r2)] {
            let name = format!("{}_R{}", label, read);
            if !output.is_registered(&name) {
                output.open(&name, target.file_name(&self.config.basename, read), false)?;
            }
            output.write(&name, &record.to_bytes())?;
        }
        Ok(())
    }

    pub fn demultiplex<I>(
        &self,
        pairs: I,
        output: &mut BufferedOutputFiles,
        counters: &mut DemuxCounters,
    ) -> Result<bool>
    where
        I: Iterator<Item = Result<ReadPair>>,
    {
        for (i, pair) in pairs.enumerate() {
            if let Some(max_reads) = self.config.max_reads {
                if counters.total >= max_reads {
                    warn!("Stopping after {} read pairs (read limit reached)", counters.total);
                    return Ok(false);
                }
            }

            let pair = pair?;
            let assignment = self.assign(&pair, counters);
            debug!(
                "{}\t{}\t{}\t{}\t{}",
                assignment.target,
                pair.barcode,
                pair.umi,
                pair.min_barcode_quality().unwrap_or(' '),
                pair.min_umi_quality().unwrap_or(' ')
            );
            self.dispatch(&pair, &assignment.target, output)?;

            let examined = i as u64 + 1;
            if examined % PROGRESS_INTERVAL == 0 {
                info!("Examining read pair #{}", examined);
            }
        }
        Ok(true)
    }

    pub fn run(&self, fastq_pairs: &[(PathBuf, PathBuf)]) -> Result<DemuxSummary> {
        fs::create_dir_all(&self.config.outdir)?;
        let mut output = BufferedOutputFiles::new(Some(&self.config.outdir))
            .bufsize(self.config.bufsize)
            .max_open_files(self.config.max_open_files);
        let mut counters = DemuxCounters::new();

        let result = self.run_pairs(fastq_pairs, &mut output, &mut counters);
        let closed = output.close_all();
        result?;
        closed?;

        info!(
            "Wrote {} output files (at most {} open at once)",
            output.names().count(),
            output.peak_open_descriptors()
        );
        Ok(DemuxSummary::new(&counters, &self.expected))
    }

    fn run_pairs(
        &self,
        fastq_pairs: &[(PathBuf, PathBuf)],
        output: &mut BufferedOutputFiles,
        counters: &mut DemuxCounters,
    ) -> Result<()> {
        for (r1, r2) in fastq_pairs {
            info!("-- {}", r1.display());
            info!("   {}", r2.display());
            let start = Instant::now();
            let source = ReadPairSource::for_pair(r1, r2, self.config.layout);
            let keep_going = self.demultiplex(source, output, counters)?;
            info!("   (Took {:.0}s)", start.elapsed().as_secs_f64());
            if !keep_going {
                break;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemuxSummary {
    pub barcodes_seen: usize,
    pub expected_barcodes_seen: usize,
    pub expected_barcodes: usize,
    pub total_reads: u64,
    pub assigned_reads: u64,
    pub filtered_reads: u64,
    pub unassigned_reads: u64,
    pub barcode_counts: BTreeMap<String, u64>,
}

impl DemuxSummary {
    pub fn new(counters: &DemuxCounters, expected: &ExpectedBarcodes) -> Self {
        DemuxSummary {
            barcodes_seen: counters.barcodes_seen.len(),
            expected_barcodes_seen: counters
                .barcode_counts
                .keys()
                .filter(|barcode| expected.contains(barcode))
                .count(),
            expected_barcodes: expected.len(),
            total_reads: counters.total,
            assigned_reads: counters.assigned,
            filtered_reads: counters.filtered,
            unassigned_reads: counters.unassigned,
            barcode_counts: counters.barcode_counts.clone(),
        }
    }

    pub fn print_summary(&self) {
        println!("Summary:");
        println!("--------");
        println!("Number of barcodes         : {}", self.barcodes_seen);
        println!(
            "Number of expected barcodes: {}/{}",
            self.expected_barcodes_seen, self.expected_barcodes
        );
        println!("Total reads                : {}", self.total_reads);
        println!("Total reads (assigned)     : {}", self.assigned_reads);
        println!("Total reads (filtered)     : {}", self.filtered_reads);
        println!("Unassigned reads           : {}", self.unassigned_reads);
    }
}
