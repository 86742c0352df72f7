//! Filter stage: one statically selected color transform per pixel.
//!
//! A filter variant is a type implementing [`Filter`]. The variant and the
//! shape of its parameter bundle are fixed where the stage is instantiated:
//! [`filter`] is monomorphized for each `F`, so the per-pixel loop calls
//! `F::apply` directly with no dynamic dispatch. Adding a variant never
//! touches the call sites, only the type argument and the parameters.
//!
//! # Variants
//!
//! - [`IdentityFilter`] - Passes the accumulated color through unchanged
//! - [`ExposureFilter`] - Scales by `2^stops`
//! - [`BoxFilter`] - Mean of a square neighbourhood, edges clamped
//!
//! # Example
//!
//! ```rust
//! use accum_core::{ColorBuffer, Pos, Size};
//! use accum_ops::dispatch::Launch;
//! use accum_ops::filter::{filter, ExposureFilter, ExposureParams};
//!
//! let size = Size::new(4, 4);
//! let src = ColorBuffer::filled(size, [0.25, 0.5, 1.0], 1);
//! let mut dst = ColorBuffer::new(size);
//!
//! filter::<ExposureFilter>(
//!     Launch::Serial,
//!     &mut dst.view_mut(),
//!     &src.view(),
//!     &ExposureParams { stops: 1.0 },
//! )
//! .unwrap();
//! assert_eq!(dst.view().color(Pos::new(2, 3)), [0.5, 1.0, 2.0]);
//! ```

use std::fmt::Debug;

use accum_core::{CHANNELS, Color, ColorView, ColorViewMut, Pos, Size};
use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use tracing::{debug, trace};

use crate::dispatch::{Launch, for_each_pixel};
use crate::error::{OpsError, OpsResult, ensure_same_size};

/// A per-pixel color transform bound into the filter stage at compile time.
///
/// `apply` must be a pure function of its arguments. It may read any pixel
/// of `src`, but `pos` is always inside `size` and `src` always covers
/// `size`.
pub trait Filter: 'static {
    /// Extra arguments passed to every invocation. Read-only during a sweep.
    type Params: Debug + Clone + Send + Sync;

    /// Name used in logs.
    const NAME: &'static str;

    /// Computes the filtered color of the pixel at `pos`.
    fn apply(pos: Pos, size: Size, src: &ColorView<'_>, params: &Self::Params) -> Color;

    /// Checks `params` against the image domain once per launch.
    fn validate(_size: Size, _params: &Self::Params) -> OpsResult<()> {
        Ok(())
    }
}

/// Returns the source pixel unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityFilter;

impl Filter for IdentityFilter {
    type Params = ();

    const NAME: &'static str = "identity_filter";

    #[inline]
    fn apply(pos: Pos, size: Size, src: &ColorView<'_>, _: &()) -> Color {
        src.color_at(size.index(pos))
    }
}

/// Parameters of [`ExposureFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ExposureParams {
    /// Exposure adjustment in stops. 0 leaves the image unchanged.
    pub stops: f32,
}

/// Multiplies every channel by `2^stops`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExposureFilter;

impl Filter for ExposureFilter {
    type Params = ExposureParams;

    const NAME: &'static str = "exposure_filter";

    #[inline]
    fn apply(pos: Pos, size: Size, src: &ColorView<'_>, params: &ExposureParams) -> Color {
        let gain = params.stops.exp2();
        src.color_at(size.index(pos)).map(|v| v * gain)
    }
}

/// Parameters of [`BoxFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoxParams {
    /// Half-size of the window. The window is `2 * radius + 1` pixels wide.
    ///
    /// Each pixel costs `(2 * radius + 1)^2` samples. Launches reject a
    /// radius larger than the longest image side.
    pub radius: u32,
}

/// Averages the `(2r+1) x (2r+1)` neighbourhood of each pixel.
///
/// Samples outside the image are clamped to the nearest edge pixel, so a
/// constant image stays constant. Radius 0 is the identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoxFilter;

impl Filter for BoxFilter {
    type Params = BoxParams;

    const NAME: &'static str = "box_filter";

    fn validate(size: Size, params: &BoxParams) -> OpsResult<()> {
        let limit = size.width.max(size.height);
        if params.radius > limit {
            return Err(OpsError::InvalidParameter(format!(
                "box radius {} exceeds image side {limit}",
                params.radius
            )));
        }
        Ok(())
    }

    fn apply(pos: Pos, size: Size, src: &ColorView<'_>, params: &BoxParams) -> Color {
        let r = params.radius as i64;
        let max_x = size.width as i64 - 1;
        let max_y = size.height as i64 - 1;

        let mut sum = [0.0f32; CHANNELS];
        for dy in -r..=r {
            let sy = (pos.y as i64 + dy).clamp(0, max_y) as u32;
            for dx in -r..=r {
                let sx = (pos.x as i64 + dx).clamp(0, max_x) as u32;
                let c = src.color(Pos::new(sx, sy));
                for ch in 0..CHANNELS {
                    sum[ch] += c[ch];
                }
            }
        }

        let side = (2 * r + 1) as f32;
        let inv = 1.0 / (side * side);
        sum.map(|v| v * inv)
    }
}

/// Filters the single pixel at `pos` from `src` into `dst`.
///
/// This is the outer kernel body: it evaluates the bound variant and is the
/// only place that writes the destination for this stage.
#[inline]
pub fn filter_pixel<F: Filter>(
    pos: Pos,
    dst: &mut ColorViewMut<'_>,
    src: &ColorView<'_>,
    params: &F::Params,
) {
    let color = F::apply(pos, src.size(), src, params);
    dst.set_color(pos, color);
}

/// Runs the filter stage over the whole image.
///
/// # Errors
///
/// - [`OpsError::SizeMismatch`] if the two views cover different domains
/// - [`OpsError::InvalidParameter`] if `params` are rejected by
///   [`Filter::validate`]
pub fn filter<F: Filter>(
    launch: Launch,
    dst: &mut ColorViewMut<'_>,
    src: &ColorView<'_>,
    params: &F::Params,
) -> OpsResult<()> {
    let size = dst.size();
    ensure_same_size(size, src.size())?;
    F::validate(size, params)?;
    trace!(width = size.width, height = size.height, filter = F::NAME, ?params, "filter");

    for_each_pixel(launch, size, dst.as_mut_slice(), |pos, cell| {
        cell.copy_from_slice(&F::apply(pos, size, src, params));
    });
    Ok(())
}
