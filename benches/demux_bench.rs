use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use icell8_demux::{DemuxConfig, Demultiplexer, ExpectedBarcodes, Parser, SplitMode};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

const BASES: &[u8; 4] = b"ACGT";

fn barcode(i: usize) -> String {
    (0..11).map(|k| BASES[(i >> (2 * k)) & 3] as char).collect()
}

fn generate_r1(num_records: usize, num_barcodes: usize) -> Vec<u8> {
    let mut data = Vec::new();
    for i in 0..num_records {
        writeln!(data, "@SEQ_{} 1:N:0:1", i).unwrap();
        writeln!(data, "{}TTTTTTTTTTTTTTGATTACAGATTACA", barcode(i % num_barcodes)).unwrap();
        writeln!(data, "+").unwrap();
        let qual = if i % 10 == 0 { b'#' } else { b'I' };
        data.extend(std::iter::repeat(qual).take(11 + 14 + 14));
        data.push(b'\n');
    }
    data
}

fn generate_r2(num_records: usize) -> Vec<u8> {
    let mut data = Vec::new();
    for i in 0..num_records {
        writeln!(data, "@SEQ_{} 2:N:0:1\n{}\n+\n{}", i, "ACGT".repeat(25), "I".repeat(100))
            .unwrap();
    }
    data
}

fn bench_parser(c: &mut Criterion) {
    let data = generate_r1(10_000, 96);
    let mut group = c.benchmark_group("parser");
    group.throughput(Throughput::Bytes(data.len() as u64));

    group.bench_function("parse_10k_records", |b| {
        b.iter(|| black_box(Parser::new(&data).count()));
    });

    group.finish();
}

fn bench_demultiplex(c: &mut Criterion) {
    let num_records = 20_000;
    let num_barcodes = 400;
    let input = TempDir::new().unwrap();
    let r1 = input.path().join("bench_R1.fastq");
    let r2 = input.path().join("bench_R2.fastq");
    fs::write(&r1, generate_r1(num_records, num_barcodes)).unwrap();
    fs::write(&r2, generate_r2(num_records)).unwrap();
    let pairs: Vec<(PathBuf, PathBuf)> = vec![(r1, r2)];

    let expected: ExpectedBarcodes = (0..num_barcodes).map(barcode).collect();

    let mut group = c.benchmark_group("demultiplex");
    group.throughput(Throughput::Elements(num_records as u64));
    group.sample_size(10);

    for (label, mode, max_open) in [
        ("barcodes_100_open", SplitMode::Barcodes, 100),
        ("barcodes_1000_open", SplitMode::Barcodes, 1000),
        ("batch", SplitMode::Batch, 100),
    ] {
        group.bench_function(label, |b| {
            b.iter(|| {
                let out = TempDir::new().unwrap();
                let config = DemuxConfig::new()
                    .outdir(out.path())
                    .mode(mode)
                    .batch_size(5_000)
                    .max_open_files(max_open);
                let demux = Demultiplexer::new(config, expected.clone()).unwrap();
                black_box(demux.run(&pairs).unwrap())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parser, bench_demultiplex);
criterion_main!(benches);
