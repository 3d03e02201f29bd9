pub mod error;
pub mod record;
pub mod buffer;
pub mod parser;
pub mod reader;
pub mod paired;
pub mod pairing;
pub mod read_pair;
pub mod quality;
pub mod well_list;
pub mod output;
pub mod config;
pub mod demux;

pub use error::{DemuxError, ErrorKind, Result};
pub use record::{Record, OwnedRecord};
pub use parser::{Parser, StreamingParser};
pub use reader::FastqReader;
pub use paired::{PairedEndReader, PairedRecordIterator};
pub use pairing::{input_pairs, pair_fastqs};
pub use read_pair::{ReadLayout, ReadPair, ReadPairSource};
pub use quality::QualityFilter;
pub use well_list::{ExpectedBarcodes, WellList};
pub use output::BufferedOutputFiles;
pub use config::{DemuxConfig, SplitMode};
pub use demux::{Assignment, Classification, DemuxCounters, DemuxSummary, Demultiplexer, OutputTarget};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_1_to_assignment() {
        let r1 = b"@r1 1:N:0\nAAAAAAAAAAATTTTTTTTTTTTTTGATTACA\n+\nIIIIIIIIIII??????????????#######\n";
        let r2 = b"@r1 2:N:0\nACGT\n+\nIIII\n";
        let parse = |data: &[u8]| {
            let record = Parser::new(data).next().unwrap().unwrap();
            OwnedRecord::from_record(&record)
        };
        let pair =
            ReadPair::from_records(parse(&r1[..]), parse(&r2[..]), &ReadLayout::default())
                .unwrap();

        let demux =
            Demultiplexer::new(DemuxConfig::new(), ["AAAAAAAAAAA"].into_iter().collect()).unwrap();
        let mut counters = DemuxCounters::new();
        let assignment = demux.assign(&pair, &mut counters);
        assert_eq!(assignment.classification, Classification::Filtered);
        assert_eq!(assignment.target.file_name("icell8", 2), "icell8.AAAAAAAAAAA.r2.fastq");
    }
}
