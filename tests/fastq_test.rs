use flate2::write::GzEncoder;
use flate2::Compression;
use icell8_demux::{
    pair_fastqs, DemuxError, ErrorKind, FastqReader, PairedEndReader, Parser, ReadLayout,
    ReadPairSource, Result,
};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tempfile::{NamedTempFile, TempDir};

#[test]
fn test_basic_parsing() {
    let data = b"@SEQ_1\nACGT\n+\nIIII\n@SEQ_2\nTGCA\n+\nJJJJ\n";
    let records = Parser::new(data).collect::<Result<Vec<_>>>().unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id_str().unwrap(), "SEQ_1");
    assert_eq!(records[0].seq_str().unwrap(), "ACGT");
    assert_eq!(records[0].qual_str().unwrap(), "IIII");
    assert_eq!(records[1].id_str().unwrap(), "SEQ_2");
}

#[test]
fn test_windows_line_endings() {
    let data = b"@SEQ_1 1:N:0\r\nACGT\r\n+\r\nIIII\r\n";
    let record = Parser::new(data).next().unwrap().unwrap();

    assert_eq!(record.id_str().unwrap(), "SEQ_1");
    assert_eq!(record.desc_str().unwrap().unwrap(), "1:N:0");
    assert_eq!(record.qual_str().unwrap(), "IIII");
}

#[test]
fn test_invalid_header() {
    let data = b"SEQ_1\nACGT\n+\nIIII\n";
    match Parser::new(data).parse_record() {
        Err(DemuxError::InvalidHeader { line: 1 }) => {}
        other => panic!("Expected InvalidHeader error, got {:?}", other),
    }
}

#[test]
fn test_truncated_record_is_format_error() {
    let data = b"@SEQ_1\nACGT\n+\nIIII\n@SEQ_2\nACGT\n";
    let err = Parser::new(data)
        .collect::<Result<Vec<_>>>()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn test_file_reader() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"@SEQ_1\nACGT\n+\nIIII\n@SEQ_2\nTGCA\n+\nJJJJ\n")
        .unwrap();
    file.flush().unwrap();

    let reader = FastqReader::from_path(file.path()).unwrap();
    let records = reader.into_records().collect::<Result<Vec<_>>>().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].seq, b"TGCA");
}

#[test]
fn test_gzip_reader() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("reads_R1.fastq.gz");
    let mut encoder = GzEncoder::new(fs::File::create(&path).unwrap(), Compression::default());
    for i in 0..1000 {
        writeln!(encoder, "@SEQ_{}\nACGTACGT\n+\nIIIIIIII", i).unwrap();
    }
    encoder.finish().unwrap();

    let reader = FastqReader::from_path(&path).unwrap();
    let records = reader.into_records().collect::<Result<Vec<_>>>().unwrap();
    assert_eq!(records.len(), 1000);
    assert_eq!(records[999].id, b"SEQ_999");
}

#[test]
fn test_paired_end_reader() {
    let dir = TempDir::new().unwrap();
    let r1 = dir.path().join("s_R1.fastq");
    let r2 = dir.path().join("s_R2.fastq");
    fs::write(&r1, "@read1/1\nACGT\n+\nIIII\n@read2/1\nTGCA\n+\nIIII\n").unwrap();
    fs::write(&r2, "@read1/2\nTTTT\n+\nIIII\n@read2/2\nGGGG\n+\nIIII\n").unwrap();

    let pairs = PairedEndReader::from_paths(&r1, &r2)
        .unwrap()
        .into_paired_records()
        .collect::<Result<Vec<_>>>()
        .unwrap();
    assert_eq!(pairs.len(), 2);
    assert_eq!(pairs[1].0.seq, b"TGCA");
    assert_eq!(pairs[1].1.seq, b"GGGG");
}

#[test]
fn test_mismatched_read_names() {
    let dir = TempDir::new().unwrap();
    let r1 = dir.path().join("s_R1.fastq");
    let r2 = dir.path().join("s_R2.fastq");
    fs::write(&r1, "@read1\nACGT\n+\nIIII\n").unwrap();
    fs::write(&r2, "@read7\nTTTT\n+\nIIII\n").unwrap();

    let err = PairedEndReader::from_paths(&r1, &r2)
        .unwrap()
        .into_paired_records()
        .next()
        .unwrap()
        .unwrap_err();
    assert!(matches!(err, DemuxError::PairedEndMismatch { .. }));
}

#[test]
fn test_read_pair_source_spans_file_pairs() {
    let dir = TempDir::new().unwrap();
    let r1_seq = "AAAAAAAAAAATTTTTTTTTTTTTTACGT";
    let qual = "I".repeat(r1_seq.len());
    let mut pairs = Vec::new();
    for stem in ["a", "b"] {
        let r1 = dir.path().join(format!("{}_R1.fastq", stem));
        let r2 = dir.path().join(format!("{}_R2.fastq", stem));
        fs::write(&r1, format!("@{}\n{}\n+\n{}\n", stem, r1_seq, qual)).unwrap();
        fs::write(&r2, format!("@{}\nGG\n+\nII\n", stem)).unwrap();
        pairs.push((r1, r2));
    }

    let reads = ReadPairSource::new(pairs, ReadLayout::default())
        .collect::<Result<Vec<_>>>()
        .unwrap();
    assert_eq!(reads.len(), 2);
    assert_eq!(reads[0].r1.id, b"a");
    assert_eq!(reads[1].r1.id, b"b");
    assert_eq!(reads[1].barcode, "AAAAAAAAAAA");
    assert_eq!(reads[1].umi, "TTTTTTTTTTTTTT");
}

#[test]
fn test_short_read_1_is_format_error() {
    let dir = TempDir::new().unwrap();
    let r1 = dir.path().join("s_R1.fastq");
    let r2 = dir.path().join("s_R2.fastq");
    fs::write(&r1, "@r\nACGTACGTACGT\n+\nIIIIIIIIIIII\n").unwrap();
    fs::write(&r2, "@r\nACGT\n+\nIIII\n").unwrap();

    let mut source = ReadPairSource::for_pair(&r1, &r2, ReadLayout::default());
    let err = source.next().unwrap().unwrap_err();
    assert!(matches!(err, DemuxError::ReadTooShort { .. }));
    assert!(source.next().is_none());
}

#[test]
fn test_missing_input_is_io_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing_R1.fastq");
    let mut source = ReadPairSource::for_pair(&missing, &missing, ReadLayout::default());
    let err = source.next().unwrap().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn test_pair_fastqs_keeps_first_seen_order() {
    let fastqs = vec![
        PathBuf::from("run/S2_L001_R2_001.fastq.gz"),
        PathBuf::from("run/S1_L001_R1_001.fastq.gz"),
        PathBuf::from("run/S2_L001_R1_001.fastq.gz"),
        PathBuf::from("run/S1_L001_R2_001.fastq.gz"),
    ];
    let pairs = pair_fastqs(&fastqs).unwrap();
    assert_eq!(
        pairs,
        vec![
            (
                PathBuf::from("run/S2_L001_R1_001.fastq.gz"),
                PathBuf::from("run/S2_L001_R2_001.fastq.gz")
            ),
            (
                PathBuf::from("run/S1_L001_R1_001.fastq.gz"),
                PathBuf::from("run/S1_L001_R2_001.fastq.gz")
            ),
        ]
    );
}

#[test]
fn test_pair_fastqs_rejects_orphans() {
    let err = pair_fastqs(&["S1_R1.fastq", "S1_R2.fastq", "S2_R1.fastq"]).unwrap_err();
    assert!(matches!(err, DemuxError::UnpairedFastq { .. }));
    assert_eq!(err.kind(), ErrorKind::Config);
}
