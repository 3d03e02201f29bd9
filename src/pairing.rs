use crate::error::{DemuxError, Result};
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static READ_NAME: OnceLock<Regex> = OnceLock::new();

fn read_name_regex() -> &'static Regex {
    READ_NAME.get_or_init(|| {
        Regex::new(r"^(?P<stem>.+)_R(?P<read>[12])(?P<tail>(?:_\d+)?\.f(?:ast)?q(?:\.gz)?)$")
            .expect("read name pattern is valid")
    })
}

/// Splits a FASTQ path into its pairing key (directory, name with the read
/// number removed) and read number, if it follows `<name>_R1[_001].fastq[.gz]`.
fn pairing_key(path: &Path) -> Option<((PathBuf, String), u8)> {
    let file_name = path.file_name()?.to_str()?;
    let caps = read_name_regex().captures(file_name)?;
    let read = if &caps["read"] == "1" { 1 } else { 2 };
    let key = format!("{}_R?{}", &caps["stem"], &caps["tail"]);
    let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    Some(((dir, key), read))
}

/// Groups FASTQ paths into `(R1, R2)` pairs by their Illumina-style names,
/// keeping the order in which each pair was first seen.
pub fn pair_fastqs<P: AsRef<Path>>(fastqs: &[P]) -> Result<Vec<(PathBuf, PathBuf)>> {
    if fastqs.is_empty() {
        return Err(DemuxError::NoInput);
    }

    let mut index: HashMap<(PathBuf, String), usize> = HashMap::new();
    let mut groups: Vec<(Option<PathBuf>, Option<PathBuf>)> = Vec::new();

    for fastq in fastqs {
        let path = fastq.as_ref();
        let (key, read) = pairing_key(path).ok_or_else(|| DemuxError::UnpairedFastq {
            path: path.to_path_buf(),
        })?;
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push((None, None));
            groups.len() - 1
        });
        let slot = &mut groups[slot];
        let target = if read == 1 { &mut slot.0 } else { &mut slot.1 };
        if target.is_some() {
            return Err(DemuxError::InvalidConfig(format!(
                "FASTQ {:?} supplied more than once",
                path
            )));
        }
        *target = Some(path.to_path_buf());
    }

    let mut pairs = Vec::with_capacity(groups.len());
    for group in groups {
        match group {
            (Some(r1), Some(r2)) => pairs.push((r1, r2)),
            (Some(path), None) | (None, Some(path)) => {
                return Err(DemuxError::UnpairedFastq { path })
            }
            (None, None) => {}
        }
    }
    Ok(pairs)
}

/// Input pairs for a run: `fq_r1`/`fq_r2` as given, whatever their names,
/// followed by any further FASTQs paired with [`pair_fastqs`].
pub fn input_pairs<P: AsRef<Path>>(
    fq_r1: P,
    fq_r2: P,
    extra: &[P],
) -> Result<Vec<(PathBuf, PathBuf)>> {
    let mut pairs = vec![(fq_r1.as_ref().to_path_buf(), fq_r2.as_ref().to_path_buf())];
    if !extra.is_empty() {
        pairs.extend(pair_fastqs(extra)?);
    }
    Ok(pairs)
}
