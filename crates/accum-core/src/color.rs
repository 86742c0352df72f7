//! Per-pixel color value types.
//!
//! Intermediate stages carry linear floating-point RGB ([`Color`]); the
//! final stage emits 8-bit RGB ([`Pixel8`]). Channel order is always
//! R, G, B. There is no alpha channel.

/// Number of channels stored per pixel.
pub const CHANNELS: usize = 3;

/// Linear floating-point RGB color. Values are unbounded.
pub type Color = [f32; CHANNELS];

/// Display-ready 8-bit RGB pixel.
pub type Pixel8 = [u8; CHANNELS];

/// Black, the value of a freshly allocated float buffer.
pub const BLACK: Color = [0.0; CHANNELS];

/// Builds a color with the same value in every channel.
#[inline]
pub const fn gray(v: f32) -> Color {
    [v, v, v]
}

/// Reads the color stored at linear pixel index `idx`.
///
/// Equivalent of a `vload3` from a flat RGB float array.
#[inline]
pub fn load(data: &[f32], idx: usize) -> Color {
    let o = idx * CHANNELS;
    [data[o], data[o + 1], data[o + 2]]
}

/// Writes `color` at linear pixel index `idx`.
#[inline]
pub fn store(data: &mut [f32], idx: usize, color: Color) {
    let o = idx * CHANNELS;
    data[o..o + CHANNELS].copy_from_slice(&color);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_store() {
        let mut data = vec![0.0f32; 3 * CHANNELS];
        store(&mut data, 1, [0.1, 0.2, 0.3]);
        assert_eq!(load(&data, 1), [0.1, 0.2, 0.3]);
        assert_eq!(load(&data, 0), BLACK);
        assert_eq!(&data[3..6], &[0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_gray() {
        assert_eq!(gray(0.5), [0.5, 0.5, 0.5]);
    }
}
