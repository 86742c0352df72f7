//! Packing stage: float color to display-ready 8-bit RGB.
//!
//! Each channel is clamped to `[0, 1]`, scaled by 255 and narrowed with a
//! truncating float-to-integer conversion:
//!
//! ```text
//! pixel = u8(255 * clamp(color, 0, 1))
//! ```
//!
//! Truncation means 0.5 packs to 127 and only exactly 1.0 (or more) packs to
//! 255. NaN packs to 0. There is no error path: every input is absorbed by
//! the clamp.

use accum_core::{CHANNELS, Color, ColorView, Pixel8, PixelViewMut, Pos};
#[allow(unused_imports)]
use tracing::{debug, trace};

use crate::dispatch::{Launch, for_each_pixel};
use crate::error::{OpsResult, ensure_same_size};

/// Quantizes one float color to 8 bits per channel.
///
/// ```rust
/// use accum_ops::pack::quantize;
///
/// assert_eq!(quantize([1.5, -0.5, 0.5]), [255, 0, 127]);
/// ```
#[inline]
pub fn quantize(color: Color) -> Pixel8 {
    color.map(|v| (255.0 * v.clamp(0.0, 1.0)) as u8)
}

/// Maps an 8-bit pixel back to `[0, 1]` floats.
///
/// For any input already in `[0, 1]`, `unpack(quantize(c))` lies within one
/// quantization step (1/255) below `c`.
#[inline]
pub fn unpack(pixel: Pixel8) -> Color {
    pixel.map(|v| v as f32 / 255.0)
}

/// Packs the pixel at `pos` of `src` into `image`.
#[inline]
pub fn pack_pixel(pos: Pos, image: &mut PixelViewMut<'_>, src: &ColorView<'_>) {
    image.set_pixel(pos, quantize(src.color(pos)));
}

/// Runs the packing stage over the whole image.
///
/// # Errors
///
/// Returns [`OpsError::SizeMismatch`](crate::OpsError::SizeMismatch) if the
/// image and the source cover different domains.
pub fn pack(launch: Launch, image: &mut PixelViewMut<'_>, src: &ColorView<'_>) -> OpsResult<()> {
    let size = image.size();
    ensure_same_size(size, src.size())?;
    trace!(width = size.width, height = size.height, "pack");

    let data = src.as_slice();
    for_each_pixel(launch, size, image.as_mut_slice(), |pos, cell| {
        let o = size.index(pos) * CHANNELS;
        cell.copy_from_slice(&quantize([data[o], data[o + 1], data[o + 2]]));
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use accum_core::{ColorBuffer, PackedImage, Size, color::gray};

    #[test]
    fn test_clamp_boundaries() {
        assert_eq!(quantize(gray(1.5)), [255; 3]);
        assert_eq!(quantize(gray(-0.5)), [0; 3]);
        assert_eq!(quantize(gray(1.0)), [255; 3]);
        assert_eq!(quantize(gray(0.0)), [0; 3]);
        assert_eq!(quantize(gray(f32::INFINITY)), [255; 3]);
        assert_eq!(quantize(gray(f32::NEG_INFINITY)), [0; 3]);
    }

    #[test]
    fn test_half_truncates() {
        assert_eq!(quantize(gray(0.5)), [127; 3]);
        assert_eq!(quantize(gray(254.99 / 255.0)), [254; 3]);
    }

    #[test]
    fn test_nan_packs_to_zero() {
        assert_eq!(quantize([f32::NAN, 0.5, 1.0]), [0, 127, 255]);
    }

    #[test]
    fn test_round_trip_within_one_step() {
        let step = 1.0 / 255.0;
        for i in 0..=1000 {
            let v = i as f32 / 1000.0;
            let back = unpack(quantize(gray(v)))[0];
            assert!(back <= v + 1e-6, "{v} -> {back}");
            assert!(v - back <= step + 1e-6, "{v} -> {back}");
        }
    }

    #[test]
    fn test_pack_sweep() {
        let size = Size::new(3, 2);
        let data = vec![
            0.0, 0.5, 1.0, -1.0, 2.0, 0.25, 0.1, 0.2, 0.3,
            1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.999, 0.004, 0.5,
        ];
        let src = ColorBuffer::from_data(size, data, 1).unwrap();
        let mut image = PackedImage::new(size);
        pack(Launch::Parallel, &mut image.view_mut(), &src.view()).unwrap();

        for pos in size.positions() {
            assert_eq!(image.pixel(pos), quantize(src.view().color(pos)));
        }
        assert_eq!(image.pixel(Pos::new(1, 0)), [0, 255, 63]);

        let mut single = PackedImage::new(size);
        let mut view = single.view_mut();
        for pos in size.positions() {
            pack_pixel(pos, &mut view, &src.view());
        }
        assert_eq!(single, image);
    }

    #[test]
    fn test_size_mismatch() {
        let src = ColorBuffer::new(Size::new(2, 2));
        let mut image = PackedImage::new(Size::new(4, 1));
        assert!(pack(Launch::Serial, &mut image.view_mut(), &src.view()).is_err());
    }
}
