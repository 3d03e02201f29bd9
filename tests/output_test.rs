use icell8_demux::quality::{self, PHRED_OFFSET};
use icell8_demux::{BufferedOutputFiles, QualityFilter};
use proptest::prelude::*;
use std::collections::HashMap;
use std::fs;
use tempfile::TempDir;

fn record_strategy() -> impl Strategy<Value = String> {
    "@[a-z]{1,6}\n[ACGT]{1,20}\n\\+\n[!-J]{1,20}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    // Whatever the buffer size and descriptor limit, each file ends up with
    // exactly its writes, in order.
    #[test]
    fn prop_file_contents_match_writes(
        writes in prop::collection::vec((0usize..12, record_strategy()), 1..200),
        bufsize in 1usize..256,
        max_open in 1usize..6,
    ) {
        let dir = TempDir::new().unwrap();
        let mut expected: HashMap<String, String> = HashMap::new();
        {
            let mut output = BufferedOutputFiles::new(Some(dir.path()))
                .bufsize(bufsize)
                .max_open_files(max_open);
            for (target, record) in &writes {
                let name = format!("t{}", target);
                if !output.is_registered(&name) {
                    output.open(&name, format!("{}.fastq", name), false).unwrap();
                }
                output.write(&name, record.as_bytes()).unwrap();
                prop_assert!(output.open_descriptors() <= max_open);

                let text = expected.entry(name).or_default();
                text.push_str(record);
                text.push('\n');
            }
            output.close_all().unwrap();
            prop_assert!(output.peak_open_descriptors() <= max_open);
        }

        for (name, text) in &expected {
            let written = fs::read_to_string(dir.path().join(format!("{}.fastq", name))).unwrap();
            prop_assert_eq!(&written, text);
        }
    }

    #[test]
    fn prop_quality_passes_iff_every_char_reaches_cutoff(
        scores in prop::collection::vec(0u8..42, 0..30),
        cutoff in 0u8..42,
    ) {
        let qual: Vec<u8> = scores.iter().map(|s| s + PHRED_OFFSET).collect();
        let expected = scores.iter().all(|&s| s >= cutoff);
        prop_assert_eq!(quality::passes(&qual, quality::cutoff_char(cutoff)), expected);

        let filter = QualityFilter::new().barcode_quality(cutoff).umi_quality(cutoff);
        prop_assert_eq!(filter.barcode_passes(&qual), expected);
        prop_assert_eq!(filter.umi_passes(&qual), expected);
    }
}

#[test]
fn test_reopen_after_eviction_appends() {
    let dir = TempDir::new().unwrap();
    let mut output = BufferedOutputFiles::new(Some(dir.path()))
        .bufsize(1)
        .max_open_files(1);
    output.open("a", "a.fastq", false).unwrap();
    output.open("b", "b.fastq", false).unwrap();

    output.write("a", b"one").unwrap();
    output.write("b", b"two").unwrap();
    output.write("a", b"three").unwrap();
    assert!(output.evictions() >= 2);
    output.close_all().unwrap();

    assert_eq!(
        fs::read_to_string(dir.path().join("a.fastq")).unwrap(),
        "one\nthree\n"
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("b.fastq")).unwrap(),
        "two\n"
    );
}
