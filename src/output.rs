use crate::error::{DemuxError, Result};
use log::debug;
use lru::LruCache;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub const MAX_OPEN_FILES: usize = 100;
pub const BUFSIZE: usize = 8192;

#[derive(Debug)]
struct OutputFile {
    path: PathBuf,
    append: bool,
    buffer: Vec<u8>,
}

/// Named output files multiplexed onto at most `max_open` descriptors; the least
/// recently used one is closed first and later reopened in append mode.
pub struct BufferedOutputFiles {
    base_dir: Option<PathBuf>,
    files: HashMap<String, OutputFile>,
    open: LruCache<String, File>,
    bufsize: usize,
    max_open: usize,
    peak_open: usize,
    flushes: u64,
    evictions: u64,
}

impl Default for BufferedOutputFiles {
    fn default() -> Self {
        Self::new(None::<PathBuf>)
    }
}

impl BufferedOutputFiles {
    pub fn new<P: AsRef<Path>>(base_dir: Option<P>) -> Self {
        BufferedOutputFiles {
            base_dir: base_dir.map(|d| d.as_ref().to_path_buf()),
            files: HashMap::new(),
            open: LruCache::unbounded(),
            bufsize: BUFSIZE,
            max_open: MAX_OPEN_FILES,
            peak_open: 0,
            flushes: 0,
            evictions: 0,
        }
    }

    pub fn bufsize(mut self, size: usize) -> Self {
        self.bufsize = size;
        self
    }

    pub fn max_open_files(mut self, max_open: usize) -> Self {
        self.max_open = max_open.max(1);
        self
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }

    pub fn open<P: AsRef<Path>>(&mut self, name: &str, path: P, append: bool) -> Result<()> {
        if self.open.contains(name) {
            self.close(name)?;
        }
        let path = self.resolve(path.as_ref());
        let entry = self
            .files
            .entry(name.to_string())
            .or_insert_with(|| OutputFile {
                path: PathBuf::new(),
                append,
                buffer: Vec::new(),
            });
        entry.path = path;
        entry.append = append;
        Ok(())
    }

    pub fn write(&mut self, name: &str, record: &[u8]) -> Result<()> {
        let entry = self.files.get_mut(name).ok_or_else(|| unregistered(name))?;
        entry.buffer.extend_from_slice(record);
        entry.buffer.push(b'\n');
        if entry.buffer.len() >= self.bufsize {
            self.dump_buffer(name)?;
        }
        Ok(())
    }

    fn dump_buffer(&mut self, name: &str) -> Result<()> {
        let buffer = match self.files.get_mut(name) {
            Some(entry) if !entry.buffer.is_empty() => std::mem::take(&mut entry.buffer),
            Some(_) => return Ok(()),
            None => return Err(unregistered(name)),
        };

        let result = self
            .fp(name)
            .and_then(|fp| fp.write_all(&buffer).map_err(DemuxError::from));
        self.flushes += 1;

        // Keep the allocation for the next batch of writes.
        if let Some(entry) = self.files.get_mut(name) {
            let mut buffer = buffer;
            buffer.clear();
            entry.buffer = buffer;
        }
        result
    }

    fn fp(&mut self, name: &str) -> Result<&mut File> {
        if !self.open.contains(name) {
            if self.open.len() >= self.max_open {
                self.evict_one()?;
            }

            let entry = self.files.get_mut(name).ok_or_else(|| unregistered(name))?;
            let file = if entry.append {
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&entry.path)?
            } else {
                File::create(&entry.path)?
            };
            // Any later reopen must not clobber what is already on disk.
            entry.append = true;

            self.open.put(name.to_string(), file);
            self.peak_open = self.peak_open.max(self.open.len());
        }
        self.open.get_mut(name).ok_or_else(|| unregistered(name))
    }

    fn evict_one(&mut self) -> Result<()> {
        if let Some((victim, mut fp)) = self.open.pop_lru() {
            debug!("Closing {} to stay within {} open files", victim, self.max_open);
            if let Some(entry) = self.files.get_mut(&victim) {
                if !entry.buffer.is_empty() {
                    fp.write_all(&entry.buffer)?;
                    entry.buffer.clear();
                    self.flushes += 1;
                }
            }
            fp.flush()?;
            self.evictions += 1;
        }
        Ok(())
    }

    pub fn close(&mut self, name: &str) -> Result<()> {
        if self.files.contains_key(name) {
            self.dump_buffer(name)?;
        }
        if let Some(mut fp) = self.open.pop(name) {
            fp.flush()?;
        }
        Ok(())
    }

    pub fn close_all(&mut self) -> Result<()> {
        let mut names: Vec<String> = self.files.keys().cloned().collect();
        names.sort();
        let mut first_err = None;
        for name in names {
            if let Err(e) = self.close(&name) {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    pub fn is_open(&self, name: &str) -> bool {
        self.open.contains(name)
    }

    pub fn path(&self, name: &str) -> Option<&Path> {
        self.files.get(name).map(|f| f.path.as_path())
    }

    pub fn buffered(&self, name: &str) -> usize {
        self.files.get(name).map_or(0, |f| f.buffer.len())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.files.keys().map(String::as_str)
    }

    pub fn open_descriptors(&self) -> usize {
        self.open.len()
    }

    pub fn peak_open_descriptors(&self) -> usize {
        self.peak_open
    }

    pub fn max_open(&self) -> usize {
        self.max_open
    }

    pub fn flushes(&self) -> u64 {
        self.flushes
    }

    pub fn evictions(&self) -> u64 {
        self.evictions
    }
}

impl Drop for BufferedOutputFiles {
    fn drop(&mut self) {
        let _ = self.close_all();
    }
}

fn unregistered(name: &str) -> DemuxError {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("no output file registered as '{}'", name),
    )
    .into()
}
