use crate::error::{DemuxError, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
struct WellRow {
    #[serde(rename = "Barcode")]
    barcode: String,
    #[serde(rename = "Sample", default)]
    sample: Option<String>,
}

/// One dispensed well from an iCELL8 well list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Well {
    pub barcode: String,
    pub sample: Option<String>,
}

/// The tab-delimited iCELL8 well list; only the `Barcode` and `Sample`
/// columns are read.
#[derive(Debug, Clone)]
pub struct WellList {
    wells: Vec<Well>,
}

impl WellList {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| DemuxError::WellList {
            path: path.to_path_buf(),
            msg: e.to_string(),
        })?;
        Self::from_reader(file, path)
    }

    /// Parses a well list from `reader`; `source` is only used in errors.
    pub fn from_reader<R: Read>(reader: R, source: &Path) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut wells = Vec::new();
        for row in rdr.deserialize() {
            let row: WellRow = row.map_err(|e| DemuxError::WellList {
                path: source.to_path_buf(),
                msg: e.to_string(),
            })?;
            if row.barcode.is_empty() {
                continue;
            }
            wells.push(Well {
                barcode: row.barcode,
                sample: row.sample.filter(|s| !s.is_empty()),
            });
        }

        if wells.is_empty() {
            return Err(DemuxError::EmptyWellList {
                path: source.to_path_buf(),
            });
        }

        Ok(WellList { wells })
    }

    pub fn wells(&self) -> &[Well] {
        &self.wells
    }

    /// Barcodes in file order.
    pub fn barcodes(&self) -> impl Iterator<Item = &str> + '_ {
        self.wells.iter().map(|w| w.barcode.as_str())
    }

    pub fn samples(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.wells
            .iter()
            .filter_map(|w| w.sample.as_deref())
            .filter(|s| seen.insert(*s))
            .collect()
    }
}

/// Barcodes a run is expected to contain. Empty when no well list is given,
/// in which case every read is unassigned under filtering.
#[derive(Debug, Clone, Default)]
pub struct ExpectedBarcodes {
    barcodes: HashSet<String>,
}

impl ExpectedBarcodes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_well_list(well_list: &WellList) -> Self {
        well_list.barcodes().collect()
    }

    /// Loads the set from a well list file, or returns an empty set.
    pub fn load(well_list: Option<&Path>) -> Result<Self> {
        match well_list {
            Some(path) => Ok(Self::from_well_list(&WellList::from_path(path)?)),
            None => Ok(Self::new()),
        }
    }

    #[inline]
    pub fn contains(&self, barcode: &str) -> bool {
        self.barcodes.contains(barcode)
    }

    pub fn len(&self) -> usize {
        self.barcodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.barcodes.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for ExpectedBarcodes {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        ExpectedBarcodes {
            barcodes: iter.into_iter().map(str::to_string).collect(),
        }
    }
}

impl FromIterator<String> for ExpectedBarcodes {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        ExpectedBarcodes {
            barcodes: iter.into_iter().collect(),
        }
    }
}
