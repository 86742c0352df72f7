//! Color buffers and borrowed views over them.
//!
//! - [`ColorView`] - Read-only view of an RGB float buffer
//! - [`ColorViewMut`] - Exclusive-write view of an RGB float buffer
//! - [`PixelViewMut`] - Exclusive-write view of an 8-bit RGB image
//! - [`ColorBuffer`] - Owned RGB float buffer with a pass counter
//! - [`PackedImage`] - Owned 8-bit RGB image
//!
//! # Memory Layout
//!
//! All buffers are row-major and interleaved, three elements per pixel:
//!
//! ```text
//! Memory: [R G B R G B R G B ...]  <- Row 0
//!         [R G B R G B R G B ...]  <- Row 1
//! ```
//!
//! # Ownership
//!
//! Stage kernels only ever see views. A view is bound to a [`Size`] when it
//! is created and the slice length is checked once, so the per-pixel code
//! can index without further validation. Read access and write access are
//! distinct types: a stage reads its sources through [`ColorView`] and
//! writes its single destination through a `*Mut` view.
//!
//! Owned buffers exist for the host side that schedules the stages.
//!
//! ```rust
//! use accum_core::{ColorBuffer, Pos, Size};
//!
//! let mut buf = ColorBuffer::new(Size::new(2, 2));
//! buf.view_mut().set_color(Pos::new(1, 0), [1.0, 0.5, 0.25]);
//! buf.set_passes(1);
//!
//! assert_eq!(buf.view().color(Pos::new(1, 0)), [1.0, 0.5, 0.25]);
//! assert!(buf.is_valid());
//! ```

use crate::color::{self, CHANNELS, Color, Pixel8};
use crate::{Error, Pos, Result, Size};

fn check_len(size: Size, actual: usize) -> Result<()> {
    let expected = size.checked_len()?;
    if actual != expected {
        return Err(Error::buffer_size(expected, actual));
    }
    Ok(())
}

/// Read-only view of an RGB float buffer bound to an image domain.
#[derive(Debug, Clone, Copy)]
pub struct ColorView<'a> {
    size: Size,
    data: &'a [f32],
}

impl<'a> ColorView<'a> {
    /// Binds `data` to `size`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferSize`] unless `data.len() == 3 * width * height`.
    pub fn new(size: Size, data: &'a [f32]) -> Result<Self> {
        check_len(size, data.len())?;
        Ok(Self { size, data })
    }

    /// Domain of the view.
    #[inline]
    pub fn size(&self) -> Size {
        self.size
    }

    /// Underlying flat data.
    #[inline]
    pub fn as_slice(&self) -> &'a [f32] {
        self.data
    }

    /// Color at `pos`.
    #[inline]
    pub fn color(&self, pos: Pos) -> Color {
        color::load(self.data, self.size.index(pos))
    }

    /// Color at linear index `idx`.
    #[inline]
    pub fn color_at(&self, idx: usize) -> Color {
        color::load(self.data, idx)
    }
}

/// Exclusive-write view of an RGB float buffer bound to an image domain.
#[derive(Debug)]
pub struct ColorViewMut<'a> {
    size: Size,
    data: &'a mut [f32],
}

impl<'a> ColorViewMut<'a> {
    /// Binds `data` to `size`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferSize`] unless `data.len() == 3 * width * height`.
    pub fn new(size: Size, data: &'a mut [f32]) -> Result<Self> {
        check_len(size, data.len())?;
        Ok(Self { size, data })
    }

    /// Domain of the view.
    #[inline]
    pub fn size(&self) -> Size {
        self.size
    }

    /// Reborrows as a read-only view.
    #[inline]
    pub fn as_view(&self) -> ColorView<'_> {
        ColorView {
            size: self.size,
            data: &*self.data,
        }
    }

    /// Underlying flat data.
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &*self.data
    }

    /// Underlying flat data, writable.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut *self.data
    }

    /// Color currently stored at `pos`.
    #[inline]
    pub fn color(&self, pos: Pos) -> Color {
        color::load(&*self.data, self.size.index(pos))
    }

    /// Overwrites the color at `pos`.
    #[inline]
    pub fn set_color(&mut self, pos: Pos, c: Color) {
        let idx = self.size.index(pos);
        color::store(self.data, idx, c);
    }
}

/// Exclusive-write view of an interleaved 8-bit RGB image.
#[derive(Debug)]
pub struct PixelViewMut<'a> {
    size: Size,
    data: &'a mut [u8],
}

impl<'a> PixelViewMut<'a> {
    /// Binds `data` to `size`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferSize`] unless `data.len() == 3 * width * height`.
    pub fn new(size: Size, data: &'a mut [u8]) -> Result<Self> {
        check_len(size, data.len())?;
        Ok(Self { size, data })
    }

    /// Domain of the view.
    #[inline]
    pub fn size(&self) -> Size {
        self.size
    }

    /// Underlying bytes.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &*self.data
    }

    /// Underlying bytes, writable.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut *self.data
    }

    /// Pixel currently stored at `pos`.
    #[inline]
    pub fn pixel(&self, pos: Pos) -> Pixel8 {
        let o = self.size.index(pos) * CHANNELS;
        [self.data[o], self.data[o + 1], self.data[o + 2]]
    }

    /// Overwrites the pixel at `pos`.
    #[inline]
    pub fn set_pixel(&mut self, pos: Pos, p: Pixel8) {
        let o = self.size.index(pos) * CHANNELS;
        self.data[o..o + CHANNELS].copy_from_slice(&p);
    }
}

/// Owned RGB float buffer together with the number of passes merged into it.
///
/// A pass count of zero means the contents are not valid data yet and the
/// buffer must not be used as a weighted input.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorBuffer {
    size: Size,
    data: Vec<f32>,
    passes: u32,
}

impl ColorBuffer {
    /// Creates a black buffer with zero passes.
    ///
    /// # Panics
    ///
    /// Panics with a capacity overflow if the element count overflows
    /// `usize`. Validate untrusted sizes with [`Size::checked_len`] first.
    pub fn new(size: Size) -> Self {
        Self {
            size,
            data: vec![0.0; size.float_len()],
            passes: 0,
        }
    }

    /// Wraps existing pixel data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferSize`] if `data` does not cover `size` exactly.
    ///
    /// ```rust
    /// use accum_core::{ColorBuffer, Size};
    ///
    /// let buf = ColorBuffer::from_data(Size::new(1, 1), vec![0.25; 3], 4).unwrap();
    /// assert_eq!(buf.passes(), 4);
    /// assert!(ColorBuffer::from_data(Size::new(2, 1), vec![0.0; 3], 1).is_err());
    /// ```
    pub fn from_data(size: Size, data: Vec<f32>, passes: u32) -> Result<Self> {
        check_len(size, data.len())?;
        Ok(Self { size, data, passes })
    }

    /// Creates a buffer with every pixel set to `color`.
    ///
    /// # Panics
    ///
    /// Same as [`ColorBuffer::new`].
    pub fn filled(size: Size, color: Color, passes: u32) -> Self {
        let mut data = Vec::with_capacity(size.float_len());
        for _ in 0..size.pixel_count() {
            data.extend_from_slice(&color);
        }
        Self { size, data, passes }
    }

    /// Domain of the buffer.
    #[inline]
    pub fn size(&self) -> Size {
        self.size
    }

    /// Number of passes merged into the current contents.
    #[inline]
    pub fn passes(&self) -> u32 {
        self.passes
    }

    /// Records how many passes the contents represent.
    #[inline]
    pub fn set_passes(&mut self, passes: u32) {
        self.passes = passes;
    }

    /// Returns `true` if the buffer holds at least one pass.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.passes > 0
    }

    /// Read-only view.
    #[inline]
    pub fn view(&self) -> ColorView<'_> {
        ColorView {
            size: self.size,
            data: &self.data,
        }
    }

    /// Exclusive-write view.
    #[inline]
    pub fn view_mut(&mut self) -> ColorViewMut<'_> {
        ColorViewMut {
            size: self.size,
            data: &mut self.data,
        }
    }

    /// Underlying flat data.
    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Consumes the buffer and returns its data.
    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    /// Resets every pixel to black and the pass count to zero.
    pub fn clear(&mut self) {
        self.data.fill(0.0);
        self.passes = 0;
    }

    /// Reallocates for a new domain. Contents are cleared.
    pub fn resize(&mut self, size: Size) -> Result<()> {
        let len = size.checked_len()?;
        self.data.clear();
        self.data.resize(len, 0.0);
        self.size = size;
        self.passes = 0;
        Ok(())
    }
}

/// Owned interleaved 8-bit RGB image, the final output of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedImage {
    size: Size,
    data: Vec<u8>,
}

impl PackedImage {
    /// Creates a black image.
    ///
    /// # Panics
    ///
    /// Panics with a capacity overflow if the byte count overflows `usize`.
    pub fn new(size: Size) -> Self {
        Self {
            size,
            data: vec![0; size.byte_len()],
        }
    }

    /// Domain of the image.
    #[inline]
    pub fn size(&self) -> Size {
        self.size
    }

    /// Raw RGB bytes, 3 per pixel.
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the image and returns its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Pixel at `pos`.
    #[inline]
    pub fn pixel(&self, pos: Pos) -> Pixel8 {
        let o = self.size.index(pos) * CHANNELS;
        [self.data[o], self.data[o + 1], self.data[o + 2]]
    }

    /// Exclusive-write view.
    #[inline]
    pub fn view_mut(&mut self) -> PixelViewMut<'_> {
        PixelViewMut {
            size: self.size,
            data: &mut self.data,
        }
    }

    /// Reallocates for a new domain. Contents are cleared.
    pub fn resize(&mut self, size: Size) -> Result<()> {
        let len = size.checked_len()?;
        self.data.clear();
        self.data.resize(len, 0);
        self.size = size;
        Ok(())
    }
}
