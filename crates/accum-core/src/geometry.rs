//! Image domain and pixel coordinate types.
//!
//! - [`Size`] - Width and height of the 2-D launch domain
//! - [`Pos`] - Integer pixel coordinate inside that domain
//!
//! # Coordinate System
//!
//! Origin (0, 0) is the top-left pixel, X grows to the right and Y grows
//! downward. Pixels are stored row-major, so the linear index of a pixel is
//! `x + y * width`:
//!
//! ```text
//! (0,0) ────────► X
//!   │  idx 0  idx 1  idx 2
//!   │  idx 3  idx 4  idx 5
//!   ▼
//!   Y
//! ```
//!
//! # Usage
//!
//! ```rust
//! use accum_core::{Pos, Size};
//!
//! let size = Size::new(3, 2);
//! assert_eq!(size.index(Pos::new(1, 1)), 4);
//! assert_eq!(size.pos(4), Pos::new(1, 1));
//! assert_eq!(size.positions().count(), 6);
//! ```

use crate::color::CHANNELS;
use crate::{Error, Result};

/// Integer pixel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pos {
    /// Column, `0 <= x < width`
    pub x: u32,
    /// Row, `0 <= y < height`
    pub y: u32,
}

impl Pos {
    /// Creates a new coordinate.
    #[inline]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl From<(u32, u32)> for Pos {
    #[inline]
    fn from((x, y): (u32, u32)) -> Self {
        Self::new(x, y)
    }
}

/// Dimensions of an image domain in pixels.
///
/// A size with zero width or height is empty: every sweep over it is a
/// no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Size {
    /// Creates a new size.
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns the size as a `(width, height)` tuple.
    #[inline]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns `true` if the domain contains no pixels.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Number of pixels in the domain, saturating at `usize::MAX`.
    #[inline]
    pub const fn pixel_count(&self) -> usize {
        (self.width as usize).saturating_mul(self.height as usize)
    }

    /// Number of `f32` elements in an RGB float buffer for this domain.
    ///
    /// Saturates at `usize::MAX`, so an overflowing domain can never size a
    /// buffer shorter than `3 * width * height`. Use
    /// [`checked_len`](Self::checked_len) to detect that case.
    #[inline]
    pub const fn float_len(&self) -> usize {
        self.pixel_count().saturating_mul(CHANNELS)
    }

    /// Number of bytes in an interleaved 8-bit RGB image for this domain.
    /// Saturates like [`float_len`](Self::float_len).
    #[inline]
    pub const fn byte_len(&self) -> usize {
        self.pixel_count().saturating_mul(CHANNELS)
    }

    /// Element count of a 3-channel buffer, checked for overflow.
    ///
    /// Host code should call this once before allocating.
    pub fn checked_len(&self) -> Result<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|v| v.checked_mul(CHANNELS))
            .ok_or_else(|| {
                Error::invalid_dimensions(self.width, self.height, "buffer length overflows usize")
            })
    }

    /// Returns `true` if `pos` lies inside the domain.
    #[inline]
    pub const fn contains(&self, pos: Pos) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    /// Linear pixel index `x + y * width`.
    ///
    /// The position is not bounds checked in release builds.
    #[inline]
    pub fn index(&self, pos: Pos) -> usize {
        debug_assert!(self.contains(pos), "{pos:?} outside {self:?}");
        pos.x as usize + pos.y as usize * self.width as usize
    }

    /// Bounds-checked variant of [`index`](Self::index).
    pub fn try_index(&self, pos: Pos) -> Result<usize> {
        if self.contains(pos) {
            Ok(self.index(pos))
        } else {
            Err(Error::out_of_bounds(pos.x, pos.y, self.width, self.height))
        }
    }

    /// Inverse of [`index`](Self::index).
    #[inline]
    pub fn pos(&self, idx: usize) -> Pos {
        debug_assert!(self.width > 0);
        let w = self.width as usize;
        Pos::new((idx % w) as u32, (idx / w) as u32)
    }

    /// Iterates every coordinate of the domain in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Pos> + use<> {
        let Size { width, height } = *self;
        (0..height).flat_map(move |y| (0..width).map(move |x| Pos::new(x, y)))
    }
}

impl From<(u32, u32)> for Size {
    #[inline]
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width, height)
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
