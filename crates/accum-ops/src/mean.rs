//! Mean accumulation stage: pass-count weighted running average.
//!
//! Each buffer carries the number of passes already averaged into it. Two
//! such buffers merge as
//!
//! ```text
//! dst' = (dst * n_dst + src * n_src) / (n_dst + n_src)
//! ```
//!
//! which is exact for buffers of unequal history, e.g. per-tile partial
//! averages or a single fresh pass merged into a long-running mean. The
//! stage does not own the counters; the caller supplies both and keeps the
//! returned total for the next merge.
//!
//! No clamping happens here. Negative and HDR values pass through.
//!
//! # Example
//!
//! ```rust
//! use accum_core::{ColorBuffer, Pos, Size};
//! use accum_ops::dispatch::Launch;
//! use accum_ops::mean::mean;
//!
//! let size = Size::new(2, 2);
//! let mut acc = ColorBuffer::filled(size, [1.0; 3], 2);
//! let pass = ColorBuffer::filled(size, [4.0; 3], 1);
//!
//! let total = mean(Launch::Serial, &mut acc.view_mut(), 2, &pass.view(), 1).unwrap();
//! assert_eq!(total, 3);
//! assert_eq!(acc.view().color(Pos::new(1, 1)), [2.0; 3]);
//! ```

use accum_core::{CHANNELS, Color, ColorBuffer, ColorView, ColorViewMut, Pos};
#[allow(unused_imports)]
use tracing::{debug, trace};

use crate::dispatch::{Launch, for_each_pixel};
use crate::error::{OpsError, OpsResult, ensure_same_size};

/// Weighted mean of two colors.
///
/// Computed in `f64`, so the result is symmetric in its two weighted
/// inputs and merging equal colors returns that color unchanged.
/// `dst_passes + src_passes` must be non-zero.
///
/// A side with zero passes holds no data and is never read: the other side
/// is returned as is, even if the empty side holds NaN or infinities.
#[inline]
pub fn merge(dst: Color, dst_passes: u32, src: Color, src_passes: u32) -> Color {
    debug_assert!(
        dst_passes as u64 + src_passes as u64 > 0,
        "merge with zero combined passes"
    );
    if dst_passes == 0 {
        return src;
    }
    if src_passes == 0 {
        return dst;
    }
    let dn = dst_passes as f64;
    let sn = src_passes as f64;
    let total = dn + sn;
    std::array::from_fn(|c| ((dst[c] as f64 * dn + src[c] as f64 * sn) / total) as f32)
}

/// Merges the pixel at `pos` of `src` into `dst`.
#[inline]
pub fn mean_pixel(
    pos: Pos,
    dst: &mut ColorViewMut<'_>,
    dst_passes: u32,
    src: &ColorView<'_>,
    src_passes: u32,
) {
    let merged = merge(dst.color(pos), dst_passes, src.color(pos), src_passes);
    dst.set_color(pos, merged);
}

/// Runs the mean stage over the whole image, in place on `dst`.
///
/// Returns the pass count of the merged buffer, `dst_passes + src_passes`.
///
/// # Errors
///
/// - [`OpsError::SizeMismatch`] if the views cover different domains
/// - [`OpsError::ZeroPasses`] if both counts are zero
/// - [`OpsError::InvalidParameter`] if the total overflows `u32`
pub fn mean(
    launch: Launch,
    dst: &mut ColorViewMut<'_>,
    dst_passes: u32,
    src: &ColorView<'_>,
    src_passes: u32,
) -> OpsResult<u32> {
    let size = dst.size();
    ensure_same_size(size, src.size())?;
    let total = dst_passes
        .checked_add(src_passes)
        .ok_or_else(|| OpsError::InvalidParameter("pass count overflows u32".into()))?;
    if total == 0 {
        return Err(OpsError::ZeroPasses);
    }
    trace!(width = size.width, height = size.height, dst_passes, src_passes, "mean");

    let data = src.as_slice();
    for_each_pixel(launch, size, dst.as_mut_slice(), |pos, cell| {
        let o = size.index(pos) * CHANNELS;
        let d = [cell[0], cell[1], cell[2]];
        let s = [data[o], data[o + 1], data[o + 2]];
        cell.copy_from_slice(&merge(d, dst_passes, s, src_passes));
    });
    Ok(total)
}

/// Merges `src` into `dst` and updates `dst`'s pass counter.
///
/// A source holding zero passes carries no data and is skipped, leaving
/// `dst` untouched.
///
/// # Errors
///
/// Same as [`mean`].
pub fn accumulate(launch: Launch, dst: &mut ColorBuffer, src: &ColorBuffer) -> OpsResult<()> {
    if !src.is_valid() {
        trace!("skipping source with zero passes");
        return Ok(());
    }
    let dst_passes = dst.passes();
    let total = mean(launch, &mut dst.view_mut(), dst_passes, &src.view(), src.passes())?;
    dst.set_passes(total);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use accum_core::{Size, color::gray};
    use approx::assert_relative_eq;

    #[test]
    fn test_weighted_example() {
        assert_eq!(merge(gray(1.0), 2, gray(4.0), 1), gray(2.0));
    }

    #[test]
    fn test_symmetry() {
        let a = [0.1, -3.7, 12.5];
        let b = [0.9, 0.33, -1e3];
        for (n1, n2) in [(1, 1), (3, 7), (0, 5), (1000, 1)] {
            assert_eq!(merge(a, n1, b, n2), merge(b, n2, a, n1));
        }
    }

    #[test]
    fn test_identical_inputs_unchanged() {
        for c in [[0.1f32, 0.2, 0.3], [1e-7, 123.456, -0.5]] {
            for n in [1, 2, 17, 4096] {
                assert_eq!(merge(c, n, c, n), c);
            }
        }
    }

    #[test]
    fn test_empty_destination_takes_source() {
        let src = [0.25, 0.5, 8.0];
        assert_eq!(merge([99.0; 3], 0, src, 3), src);
    }

    #[test]
    fn test_empty_side_never_read() {
        let stale = [f32::INFINITY, f32::NAN, 5.0];
        let src = [0.25; 3];
        assert_eq!(merge(stale, 0, src, 1), src);
        assert_eq!(merge(src, 1, stale, 0), src);
    }

    #[test]
    fn test_accumulate_into_stale_empty_buffer() {
        // A reused buffer reset to zero passes without clearing its contents.
        let size = Size::new(2, 1);
        let mut dst = ColorBuffer::filled(size, [f32::INFINITY, f32::NAN, 5.0], 0);
        accumulate(Launch::Serial, &mut dst, &ColorBuffer::filled(size, gray(0.25), 1)).unwrap();
        assert_eq!(dst.passes(), 1);
        assert_eq!(dst.data(), &[0.25; 6]);
    }

    #[test]
    fn test_no_clamping() {
        let m = merge([-1.0; 3], 1, [3.0; 3], 1);
        assert_eq!(m, [1.0; 3]);
        assert_eq!(merge([5.0; 3], 1, [7.0; 3], 1), [6.0; 3]);
    }

    #[test]
    fn test_mean_pixel_matches_sweep() {
        let size = Size::new(5, 3);
        let src_data: Vec<f32> = (0..size.float_len()).map(|i| i as f32 * 0.1).collect();
        let src = ColorBuffer::from_data(size, src_data, 2).unwrap();

        let mut swept = ColorBuffer::filled(size, [0.5, 1.5, -0.5], 3);
        let mut single = swept.clone();

        mean(Launch::Parallel, &mut swept.view_mut(), 3, &src.view(), 2).unwrap();
        let mut view = single.view_mut();
        for pos in size.positions() {
            mean_pixel(pos, &mut view, 3, &src.view(), 2);
        }
        assert_eq!(swept.data(), single.data());
    }

    #[test]
    fn test_progressive_average() {
        // Averaging passes one at a time equals the plain mean of all of them.
        let size = Size::new(3, 2);
        let values = [0.2f32, 0.9, 0.4, 0.0, 0.75];
        let mut acc = ColorBuffer::new(size);
        for &v in &values {
            accumulate(Launch::Serial, &mut acc, &ColorBuffer::filled(size, gray(v), 1)).unwrap();
        }
        assert_eq!(acc.passes(), values.len() as u32);
        let expected = values.iter().sum::<f32>() / values.len() as f32;
        for &v in acc.data() {
            assert_relative_eq!(v, expected, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_accumulate_skips_empty_source() {
        let size = Size::new(2, 2);
        let mut acc = ColorBuffer::filled(size, gray(0.5), 4);
        let empty = ColorBuffer::filled(size, gray(f32::NAN), 0);
        accumulate(Launch::Serial, &mut acc, &empty).unwrap();
        assert_eq!(acc.passes(), 4);
        assert!(acc.data().iter().all(|&v| v == 0.5));
    }

    #[test]
    fn test_zero_passes_rejected() {
        let size = Size::new(1, 1);
        let mut dst = ColorBuffer::new(size);
        let src = ColorBuffer::new(size);
        let err = mean(Launch::Serial, &mut dst.view_mut(), 0, &src.view(), 0).unwrap_err();
        assert!(matches!(err, OpsError::ZeroPasses));
    }

    #[test]
    fn test_pass_overflow_rejected() {
        let size = Size::new(1, 1);
        let mut dst = ColorBuffer::new(size);
        let src = ColorBuffer::new(size);
        let err = mean(Launch::Serial, &mut dst.view_mut(), u32::MAX, &src.view(), 1).unwrap_err();
        assert!(matches!(err, OpsError::InvalidParameter(_)));
    }

    #[test]
    fn test_size_mismatch() {
        let mut dst = ColorBuffer::new(Size::new(2, 1));
        let src = ColorBuffer::new(Size::new(1, 2));
        let err = mean(Launch::Serial, &mut dst.view_mut(), 1, &src.view(), 1).unwrap_err();
        assert!(matches!(err, OpsError::SizeMismatch { .. }));
    }
}
