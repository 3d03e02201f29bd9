pub const PHRED_OFFSET: u8 = 33;
pub const INLINE_BARCODE_QUALITY_CUTOFF: u8 = 10;
pub const UMI_QUALITY_CUTOFF: u8 = 30;

#[inline]
pub fn cutoff_char(score: u8) -> u8 {
    score.saturating_add(PHRED_OFFSET)
}

#[inline]
pub fn passes(quality: &[u8], cutoff: u8) -> bool {
    quality.iter().all(|&q| q >= cutoff)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityFilter {
    barcode_cutoff: u8,
    umi_cutoff: u8,
}

impl Default for QualityFilter {
    fn default() -> Self {
        QualityFilter {
            barcode_cutoff: cutoff_char(INLINE_BARCODE_QUALITY_CUTOFF),
            umi_cutoff: cutoff_char(UMI_QUALITY_CUTOFF),
        }
    }
}

impl QualityFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the barcode cutoff as a Phred score.
    pub fn barcode_quality(mut self, score: u8) -> Self {
        self.barcode_cutoff = cutoff_char(score);
        self
    }

    pub fn umi_quality(mut self, score: u8) -> Self {
        self.umi_cutoff = cutoff_char(score);
        self
    }

    pub fn barcode_cutoff(&self) -> u8 {
        self.barcode_cutoff
    }

    pub fn umi_cutoff(&self) -> u8 {
        self.umi_cutoff
    }

    #[inline]
    pub fn barcode_passes(&self, quality: &[u8]) -> bool {
        passes(quality, self.barcode_cutoff)
    }

    #[inline]
    pub fn umi_passes(&self, quality: &[u8]) -> bool {
        passes(quality, self.umi_cutoff)
    }
}
