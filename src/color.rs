//! RGBA color with the packed 32-bit form used by the GPU buffers.
//!
//! Components live in `[0,1]` as floats on the CPU side and are quantized
//! to 8 bits per channel when packed into vertex/instance data.

/// Floating point RGBA color, components in `[0,1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };

    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from RGB components.
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Pack into `0xAABBGGRR`.
    ///
    /// Channels are quantized by truncation, not rounding, to match the
    /// packed format the shaders expect. Out-of-range components are
    /// clamped first.
    pub fn pack(&self) -> u32 {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0) as u32;
        q(self.r) | (q(self.g) << 8) | (q(self.b) << 16) | (q(self.a) << 24)
    }

    /// Inverse of [`pack`](Self::pack), up to quantization error (≤ 1/255).
    pub fn unpack(packed: u32) -> Self {
        Self {
            r: (packed & 0xff) as f32 / 255.0,
            g: ((packed >> 8) & 0xff) as f32 / 255.0,
            b: ((packed >> 16) & 0xff) as f32 / 255.0,
            a: ((packed >> 24) & 0xff) as f32 / 255.0,
        }
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::WHITE
    }
}
