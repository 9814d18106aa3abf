//! Owned 16-bit portal image as produced by the external decoder.
use super::traits::ImageView;
use crate::error::AnalysisError;

/// Raw detector intensities, row-major, `w * h` samples.
///
/// Fields are public so decoders can hand over their buffers without a copy;
/// [`RawImage::validate`] is the single place that checks the shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawImage {
    pub w: usize,
    pub h: usize,
    pub data: Vec<u16>,
}

impl RawImage {
    pub fn new(w: usize, h: usize, data: Vec<u16>) -> Self {
        Self { w, h, data }
    }

    /// Build from nested rows, rejecting empty or ragged input.
    pub fn from_rows(rows: &[Vec<u16>]) -> Result<Self, AnalysisError> {
        let h = rows.len();
        let w = rows.first().map_or(0, Vec::len);
        if let Some((y, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != w) {
            return Err(AnalysisError::InvalidImage(format!(
                "row {y} has {} columns, expected {w}",
                row.len()
            )));
        }
        let image = Self::new(w, h, rows.concat());
        image.validate()?;
        Ok(image)
    }

    /// Check that the image is non-empty and the buffer matches `w × h`.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.w == 0 || self.h == 0 {
            return Err(AnalysisError::InvalidImage(format!(
                "empty image ({}x{})",
                self.w, self.h
            )));
        }
        let expected = self.w.checked_mul(self.h).ok_or_else(|| {
            AnalysisError::InvalidImage(format!("dimensions overflow ({}x{})", self.w, self.h))
        })?;
        if self.data.len() != expected {
            return Err(AnalysisError::InvalidImage(format!(
                "buffer holds {} samples, {}x{} requires {expected}",
                self.data.len(),
                self.w,
                self.h
            )));
        }
        Ok(())
    }

    /// Minimum and maximum intensity, `None` when the buffer is empty.
    pub fn min_max(&self) -> Option<(u16, u16)> {
        let mut iter = self.data.iter().copied();
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }
}

impl ImageView for RawImage {
    type Pixel = u16;

    #[inline]
    fn width(&self) -> usize {
        self.w
    }
    #[inline]
    fn height(&self) -> usize {
        self.h
    }
    #[inline]
    fn row(&self, y: usize) -> &[u16] {
        let start = y * self.w;
        &self.data[start..start + self.w]
    }
}
