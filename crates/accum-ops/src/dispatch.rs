//! Per-pixel launch over a 2-D image domain.
//!
//! Each stage defines a body that computes one pixel. [`for_each_pixel`]
//! plays the part of the compute-device scheduler: it invokes the body
//! exactly once for every coordinate of the domain, supplies the coordinate
//! explicitly, and hands the body exclusive access to that pixel's
//! destination cell and nothing else. Tasks never see each other's writes.
//!
//! The call returns only once every pixel has been written, which is the
//! barrier between consecutive stages.
//!
//! # Example
//!
//! ```rust
//! use accum_core::Size;
//! use accum_ops::dispatch::{for_each_pixel, Launch};
//!
//! let size = Size::new(4, 2);
//! let mut dst = vec![0.0f32; size.float_len()];
//! for_each_pixel(Launch::Parallel, size, &mut dst, |pos, cell| {
//!     cell.fill((pos.x + pos.y * 4) as f32);
//! });
//! assert_eq!(dst[3 * 5], 5.0);
//! ```

use accum_core::{CHANNELS, Pos, Size};
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// How a stage sweep is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Launch {
    /// Row-major loop on the calling thread.
    Serial,
    /// One rayon task per row. Falls back to [`Launch::Serial`] when the
    /// `parallel` feature is disabled.
    #[default]
    Parallel,
}

impl Launch {
    /// Returns `true` if this launch will actually use worker threads.
    pub const fn is_parallel(self) -> bool {
        cfg!(feature = "parallel") && matches!(self, Self::Parallel)
    }
}

/// Invokes `body` once per pixel of `size`.
///
/// `dst` is the stage's destination buffer with [`CHANNELS`] elements per
/// pixel; `body` receives the pixel coordinate and its cell.
///
/// # Panics
///
/// Panics if `dst` is shorter than `size` requires. Stage entry points
/// validate lengths before calling this.
pub fn for_each_pixel<T, B>(launch: Launch, size: Size, dst: &mut [T], body: B)
where
    T: Send,
    B: Fn(Pos, &mut [T]) + Send + Sync,
{
    if size.is_empty() {
        return;
    }
    let row_len = size.width as usize * CHANNELS;
    let dst = &mut dst[..size.pixel_count() * CHANNELS];

    let row = |(y, cells): (usize, &mut [T])| {
        for (x, cell) in cells.chunks_exact_mut(CHANNELS).enumerate() {
            body(Pos::new(x as u32, y as u32), cell);
        }
    };

    match launch {
        #[cfg(feature = "parallel")]
        Launch::Parallel => dst.par_chunks_mut(row_len).enumerate().for_each(row),
        _ => dst.chunks_mut(row_len).enumerate().for_each(row),
    }
}
