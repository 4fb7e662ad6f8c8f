#![forbid(unsafe_code)]

//! Packed RGBA pixels for the tick background.

/// A straight-alpha color packed as `0xRRGGBBAA`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Rgba(pub u32);

impl Rgba {
    /// Fully transparent (alpha = 0).
    pub const TRANSPARENT: Self = Self(0);

    /// Neutral gray used for tick lines.
    pub const TICK_GRAY: Self = Self::rgb(128, 136, 144);

    /// Create an opaque RGB color (alpha = 255).
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Create an RGBA color with explicit alpha.
    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | (a as u32))
    }

    /// Build from an `[r, g, b]` triple and an alpha.
    #[inline]
    pub const fn from_rgb_array(rgb: [u8; 3], a: u8) -> Self {
        Self::rgba(rgb[0], rgb[1], rgb[2], a)
    }

    #[inline]
    pub const fn r(self) -> u8 {
        (self.0 >> 24) as u8
    }

    #[inline]
    pub const fn g(self) -> u8 {
        (self.0 >> 16) as u8
    }

    #[inline]
    pub const fn b(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    pub const fn a(self) -> u8 {
        self.0 as u8
    }

    /// Same color with a different alpha.
    #[inline]
    #[must_use]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self((self.0 & 0xFFFF_FF00) | a as u32)
    }

    /// Bytes in `R, G, B, A` order, as image buffers expect.
    #[inline]
    pub const fn to_bytes(self) -> [u8; 4] {
        [self.r(), self.g(), self.b(), self.a()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channels_unpack() {
        let c = Rgba::rgba(1, 2, 3, 4);
        assert_eq!((c.r(), c.g(), c.b(), c.a()), (1, 2, 3, 4));
        assert_eq!(c.to_bytes(), [1, 2, 3, 4]);
    }

    #[test]
    fn with_alpha_keeps_rgb() {
        let c = Rgba::TICK_GRAY.with_alpha(32);
        assert_eq!(c, Rgba::rgba(128, 136, 144, 32));
        assert_eq!(Rgba::from_rgb_array([128, 136, 144], 32), c);
    }

    #[test]
    fn default_is_transparent() {
        assert_eq!(Rgba::default(), Rgba::TRANSPARENT);
        assert_eq!(Rgba::rgb(0, 0, 0).a(), 255);
    }
}
