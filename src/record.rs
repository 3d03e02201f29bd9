use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record<'a> {
    pub id: &'a [u8],
    pub desc: Option<&'a [u8]>,
    pub seq: &'a [u8],
    pub qual: &'a [u8],
}

impl<'a> Record<'a> {
    #[inline]
    pub fn new(id: &'a [u8], desc: Option<&'a [u8]>, seq: &'a [u8], qual: &'a [u8]) -> Self {
        Record {
            id,
            desc,
            seq,
            qual,
        }
    }

    #[inline]
    pub fn id(&self) -> &[u8] {
        self.id
    }

    #[inline]
    pub fn id_str(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(self.id)
    }

    #[inline]
    pub fn desc(&self) -> Option<&[u8]> {
        self.desc
    }

    #[inline]
    pub fn desc_str(&self) -> Option<Result<&str, std::str::Utf8Error>> {
        self.desc.map(std::str::from_utf8)
    }

    #[inline]
    pub fn seq(&self) -> &[u8] {
        self.seq
    }

    #[inline]
    pub fn seq_str(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(self.seq)
    }

    #[inline]
    pub fn qual(&self) -> &[u8] {
        self.qual
    }

    #[inline]
    pub fn qual_str(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(self.qual)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.seq.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    /// Read name with any description and `/1`, `/2` mate suffix removed, so
    /// that the two mates of a pair compare equal.
    pub fn base_id(&self) -> &'a [u8] {
        let id = self.id;
        if let Some(slash_pos) = memchr::memchr(b'/', id) {
            &id[..slash_pos]
        } else {
            id
        }
    }

    /// Appends the four FASTQ lines of this record to `out`, without a
    /// trailing newline.
    pub fn append_to(&self, out: &mut Vec<u8>) {
        out.reserve(self.id.len() + self.seq.len() * 2 + 8);
        out.push(b'@');
        out.extend_from_slice(self.id);
        if let Some(desc) = self.desc {
            out.push(b' ');
            out.extend_from_slice(desc);
        }
        out.push(b'\n');
        out.extend_from_slice(self.seq);
        out.extend_from_slice(b"\n+\n");
        out.extend_from_slice(self.qual);
    }
}

impl<'a> fmt::Display for Record<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@")?;
        f.write_str(self.id_str().map_err(|_| fmt::Error)?)?;
        if let Some(desc) = self.desc_str() {
            write!(f, " {}", desc.map_err(|_| fmt::Error)?)?;
        }
        writeln!(f)?;
        f.write_str(self.seq_str().map_err(|_| fmt::Error)?)?;
        write!(f, "\n+\n")?;
        f.write_str(self.qual_str().map_err(|_| fmt::Error)?)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedRecord {
    pub id: Vec<u8>,
    pub desc: Option<Vec<u8>>,
    pub seq: Vec<u8>,
    pub qual: Vec<u8>,
}

impl OwnedRecord {
    pub fn from_record(record: &Record) -> Self {
        OwnedRecord {
            id: record.id.to_vec(),
            desc: record.desc.map(|d| d.to_vec()),
            seq: record.seq.to_vec(),
            qual: record.qual.to_vec(),
        }
    }

    pub fn as_record(&self) -> Record<'_> {
        Record {
            id: &self.id,
            desc: self.desc.as_deref(),
            seq: &self.seq,
            qual: &self.qual,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.as_record().append_to(&mut out);
        out
    }
}

impl fmt::Display for OwnedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_record().fmt(f)
    }
}
