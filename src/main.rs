use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Builder;
use icell8_demux::{
    config::{DEFAULT_BASENAME, DEFAULT_BATCH_SIZE},
    output::MAX_OPEN_FILES,
    input_pairs,
    quality::{INLINE_BARCODE_QUALITY_CUTOFF, UMI_QUALITY_CUTOFF},
    DemuxConfig, Demultiplexer, ExpectedBarcodes, QualityFilter, SplitMode,
};
use log::{info, LevelFilter};
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

/// Split FASTQ pairs from an iCELL8 run into per-barcode, per-batch or
/// filtered FASTQ pairs, using the inline barcode and UMI in read 1.
#[derive(Parser, Debug)]
#[command(name = "split_icell8_fastqs", version)]
struct Args {
    /// R1 FASTQ file
    #[arg(value_name = "FQ_R1")]
    fq_r1: PathBuf,

    /// Matching R2 FASTQ file
    #[arg(value_name = "FQ_R2")]
    fq_r2: PathBuf,

    /// Additional FASTQ file pairs
    #[arg(value_name = "FQ")]
    fq: Vec<PathBuf>,

    /// iCELL8 'well list' file
    #[arg(short = 'w', long = "well-list")]
    well_list: Option<PathBuf>,

    /// How to split the input FASTQs: 'barcodes' (one FASTQ pair per
    /// barcode), 'batch' (FASTQ pairs of at most SIZE reads) or 'none'
    /// (all reads in a single FASTQ pair)
    #[arg(short = 'm', long = "mode", default_value = "barcodes", value_parser = parse_mode)]
    mode: SplitMode,

    /// Number of reads per batch in 'batch' mode
    #[arg(short = 's', long = "size", default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Basename for output FASTQ files
    #[arg(short = 'b', long, default_value = DEFAULT_BASENAME)]
    basename: String,

    /// Directory to write output FASTQ files to (default: current directory)
    #[arg(short = 'o', long = "outdir")]
    outdir: Option<PathBuf>,

    /// Don't filter reads by barcode and UMI quality
    #[arg(short = 'n', long = "no-filter", action)]
    no_filter: bool,

    /// Minimum Phred score for every inline barcode base
    #[arg(long, default_value_t = INLINE_BARCODE_QUALITY_CUTOFF)]
    barcode_quality: u8,

    /// Minimum Phred score for every UMI base
    #[arg(long, default_value_t = UMI_QUALITY_CUTOFF)]
    umi_quality: u8,

    /// Maximum number of output files held open at once
    #[arg(long, default_value_t = MAX_OPEN_FILES)]
    max_open_files: usize,

    /// Stop after this many read pairs (for debugging)
    #[arg(long)]
    max_reads: Option<u64>,

    #[arg(short = 'v', long = "verbose", action)]
    verbose: bool,
}

fn parse_mode(s: &str) -> std::result::Result<SplitMode, String> {
    s.parse::<SplitMode>().map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    Builder::new()
        .filter_level(log_level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {}: {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();

    let start = Instant::now();

    let outdir = match args.outdir {
        Some(dir) => dir,
        None => std::env::current_dir().context("cannot determine current directory")?,
    };

    let config = DemuxConfig::new()
        .mode(args.mode)
        .batch_size(args.batch_size)
        .basename(args.basename)
        .outdir(&outdir)
        .filter(!args.no_filter)
        .quality(
            QualityFilter::new()
                .barcode_quality(args.barcode_quality)
                .umi_quality(args.umi_quality),
        )
        .max_open_files(args.max_open_files)
        .max_reads(args.max_reads);
    config.validate().context("invalid options")?;

    let expected = ExpectedBarcodes::load(args.well_list.as_deref())
        .context("failed to load expected barcodes")?;
    info!("{} expected barcodes", expected.len());

    let fastq_pairs =
        input_pairs(args.fq_r1, args.fq_r2, &args.fq).context("failed to pair input FASTQs")?;

    let demultiplexer = Demultiplexer::new(config, expected)?;
    let summary = demultiplexer
        .run(&fastq_pairs)
        .with_context(|| format!("demultiplexing into {} failed", outdir.display()))?;

    summary.print_summary();
    info!("Finished in {:.1}s", start.elapsed().as_secs_f64());

    Ok(())
}
