//! # accum-core
//!
//! Core types for progressive image accumulation.
//!
//! A renderer produces a stream of noisy passes. Each pass is an RGB float
//! buffer tagged with the number of samples it represents. This crate
//! provides the data model shared by the stages in `accum-ops`:
//!
//! - [`Size`], [`Pos`] - Image domain and pixel coordinates
//! - [`Color`], [`Pixel8`] - Float and 8-bit RGB values
//! - [`ColorView`], [`ColorViewMut`], [`PixelViewMut`] - Borrowed, length-checked views
//! - [`ColorBuffer`], [`PackedImage`] - Owned host-side buffers
//!
//! ## Design Philosophy
//!
//! Buffers are addressed by a linear index `x + y * width`. Every view is
//! bound to its [`Size`] at construction, so length errors surface once at
//! the host boundary and never inside a per-pixel kernel. Read and write
//! capabilities are separate types, which lets a stage hold any number of
//! source views while owning exactly one destination.
//!
//! ```rust
//! use accum_core::prelude::*;
//!
//! let size = Size::new(2, 1);
//! let pass = ColorBuffer::from_data(size, vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0], 1)?;
//! assert_eq!(pass.view().color(Pos::new(1, 0)), [1.0, 1.0, 1.0]);
//! # Ok::<(), accum_core::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` - Serialize/deserialize [`Size`] and [`Pos`]

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod buffer;
pub mod color;
pub mod error;
pub mod geometry;

pub use buffer::{ColorBuffer, ColorView, ColorViewMut, PackedImage, PixelViewMut};
pub use color::{CHANNELS, Color, Pixel8};
pub use error::{Error, Result};
pub use geometry::{Pos, Size};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::buffer::{ColorBuffer, ColorView, ColorViewMut, PackedImage, PixelViewMut};
    pub use crate::color::{CHANNELS, Color, Pixel8};
    pub use crate::error::{Error, Result};
    pub use crate::geometry::{Pos, Size};
}
