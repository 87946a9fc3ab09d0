use crate::color::Rgb;
use crate::error::RunError;
use std::path::Path;

/// Packed 24-bit pixels, filled column by column.
///
/// Columns at or beyond `columns_written` hold no defined color; `get`
/// returns `None` for them so a stopped run can't pass for a dark image.
#[derive(Clone, Debug)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    px: Vec<u32>,
    columns_written: u32,
}

impl PixelBuffer {
    /// Reserve a `width * height` buffer, reporting allocation failure
    /// instead of aborting.
    pub fn try_new(width: u32, height: u32) -> Result<Self, RunError> {
        let n = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| {
                RunError::ResourceExhaustion(format!("{width}x{height} pixels overflow"))
            })?;
        let mut px = Vec::new();
        px.try_reserve_exact(n).map_err(|e| {
            RunError::ResourceExhaustion(format!("pixel buffer {width}x{height}: {e}"))
        })?;
        px.resize(n, 0);
        Ok(Self {
            width,
            height,
            px,
            columns_written: 0,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn idx(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }

    /// Write one column top to bottom and mark it defined. Columns must
    /// arrive in order.
    pub fn push_column(&mut self, column: impl IntoIterator<Item = Rgb>) {
        let x = self.columns_written;
        if x >= self.width {
            return;
        }
        for (y, c) in column.into_iter().take(self.height as usize).enumerate() {
            let i = self.idx(x, y as u32);
            self.px[i] = c.packed();
        }
        self.columns_written += 1;
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.columns_written || y >= self.height {
            return None;
        }
        Some(Rgb::from_packed(self.px[self.idx(x, y)]))
    }

    pub fn columns_written(&self) -> u32 {
        self.columns_written
    }

    pub fn is_complete(&self) -> bool {
        self.columns_written == self.width
    }

    /// Row-major packed pixels. Undefined columns read as 0.
    pub fn packed(&self) -> &[u32] {
        &self.px
    }

    /// Undefined columns come out black; check [`is_complete`] first when
    /// that matters.
    ///
    /// [`is_complete`]: PixelBuffer::is_complete
    pub fn to_image(&self) -> image::RgbImage {
        image::RgbImage::from_fn(self.width, self.height, |x, y| {
            let c = self.get(x, y).unwrap_or(Rgb::BLACK);
            image::Rgb([c.r, c.g, c.b])
        })
    }

    pub fn save_png(&self, path: &Path) -> Result<(), RunError> {
        if !self.is_complete() {
            log::warn!(
                "saving incomplete image ({}/{} columns) to {}",
                self.columns_written,
                self.width,
                path.display()
            );
        }
        self.to_image()
            .save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwritten_columns_are_undefined() {
        let mut b = PixelBuffer::try_new(4, 2).unwrap();
        assert_eq!(b.get(0, 0), None);
        b.push_column([Rgb::new(1, 2, 3), Rgb::new(4, 5, 6)]);
        assert_eq!(b.get(0, 0), Some(Rgb::new(1, 2, 3)));
        assert_eq!(b.get(0, 1), Some(Rgb::new(4, 5, 6)));
        assert_eq!(b.get(1, 0), None);
        assert_eq!(b.columns_written(), 1);
        assert!(!b.is_complete());
    }

    #[test]
    fn complete_after_all_columns() {
        let mut b = PixelBuffer::try_new(3, 1).unwrap();
        for x in 0..3u8 {
            b.push_column([Rgb::gray(x)]);
        }
        assert!(b.is_complete());
        // extra columns are ignored
        b.push_column([Rgb::gray(9)]);
        assert_eq!(b.packed(), &[0x000000, 0x010101, 0x020202]);
    }

    #[test]
    fn oversized_buffer_is_resource_exhaustion() {
        let err = PixelBuffer::try_new(u32::MAX, u32::MAX).unwrap_err();
        assert!(matches!(err, RunError::ResourceExhaustion(_)), "{err}");
    }

    #[test]
    fn image_blacks_out_undefined_columns() {
        let mut b = PixelBuffer::try_new(2, 1).unwrap();
        b.push_column([Rgb::new(255, 0, 0)]);
        let img = b.to_image();
        assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0]);
        assert_eq!(img.get_pixel(1, 0).0, [0, 0, 0]);
    }
}
