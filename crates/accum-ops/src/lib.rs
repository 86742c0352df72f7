//! # accum-ops
//!
//! The three per-pixel stages of progressive image accumulation.
//!
//! Data flows strictly filter -> mean -> pack:
//!
//! - [`filter`] - Applies one compile-time selected color transform to a pass
//! - [`mean`] - Merges the filtered pass into a running, pass-count weighted mean
//! - [`pack`] - Clamps and quantizes the mean to 8-bit RGB
//!
//! Each stage has a per-pixel body (`*_pixel`, or a pure function such as
//! [`mean::merge`] and [`pack::quantize`]) and a sweep entry point that runs
//! the body for every pixel through [`dispatch::for_each_pixel`]. Sweeps
//! validate their buffers once and then never fail.
//!
//! [`postproc::Postproc`] ties the stages together for a host renderer.
//!
//! # Example
//!
//! ```rust
//! use accum_core::{ColorBuffer, PackedImage, Pos, Size};
//! use accum_ops::dispatch::Launch;
//! use accum_ops::filter::{filter, IdentityFilter};
//! use accum_ops::{mean, pack};
//!
//! let size = Size::new(2, 1);
//! let mut acc = ColorBuffer::from_data(size, vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0], 1)?;
//! let pass = ColorBuffer::from_data(size, vec![1.0, 1.0, 1.0, 0.0, 0.0, 0.0], 1)?;
//!
//! let mut filtered = ColorBuffer::new(size);
//! filter::<IdentityFilter>(Launch::Parallel, &mut filtered.view_mut(), &pass.view(), &())?;
//! filtered.set_passes(pass.passes());
//! mean::accumulate(Launch::Parallel, &mut acc, &filtered)?;
//! assert_eq!(acc.view().color(Pos::new(1, 0)), [0.5; 3]);
//!
//! let mut image = PackedImage::new(size);
//! pack::pack(Launch::Parallel, &mut image.view_mut(), &acc.view())?;
//! assert_eq!(image.bytes(), &[127; 6]);
//! # Ok::<(), accum_ops::OpsError>(())
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod dispatch;
pub mod filter;
pub mod mean;
pub mod pack;
pub mod postproc;

pub use dispatch::Launch;
pub use error::{OpsError, OpsResult};
pub use filter::{BoxFilter, ExposureFilter, Filter, IdentityFilter};
pub use postproc::{Postproc, PostprocBuilder, PostprocConfig};
