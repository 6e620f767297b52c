//! 26.6 fixed point: the coordinate space of scaled outlines
//!
//! Device-space coordinates are stored as whole 1/64ths of a pixel. Integer
//! storage keeps scaling, grid fitting and flattening bit-for-bit repeatable,
//! which floating point cannot promise across platforms.

use std::ops::{Add, AddAssign, Sub};

const SHIFT: u32 = 6;
const MASK: i32 = (1 << SHIFT) - 1;

/// A device-pixel coordinate with 6 fractional bits
///
/// ```rust
/// use glyphscale_raster::fixed::F26Dot6;
///
/// let x = F26Dot6::from_int(5);
/// let y = F26Dot6::from_float(5.5);
/// assert_eq!((y - x).raw(), 32);
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct F26Dot6(i32);

impl F26Dot6 {
    pub const ZERO: F26Dot6 = F26Dot6(0);
    /// One whole pixel
    pub const ONE: F26Dot6 = F26Dot6(1 << SHIFT);
    pub const HALF: F26Dot6 = F26Dot6(1 << (SHIFT - 1));

    #[inline]
    pub const fn from_int(px: i32) -> Self {
        F26Dot6(px << SHIFT)
    }

    /// Nearest 1/64th, halves rounded away from zero.
    #[inline]
    pub fn from_float(px: f32) -> Self {
        F26Dot6((px * 64.0).round() as i32)
    }

    #[inline]
    pub const fn from_raw(raw: i32) -> Self {
        F26Dot6(raw)
    }

    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    #[inline]
    pub fn to_float(self) -> f32 {
        self.0 as f32 / 64.0
    }

    /// Pixel row or column containing the value (floor).
    #[inline]
    pub const fn to_int(self) -> i32 {
        self.0 >> SHIFT
    }

    /// First whole pixel at or past the value (ceil).
    #[inline]
    pub const fn to_int_ceil(self) -> i32 {
        (self.0 + MASK) >> SHIFT
    }

    /// Distance past the last pixel boundary, in 1/64ths.
    #[inline]
    pub const fn frac(self) -> i32 {
        self.0 & MASK
    }

    /// Snap to the nearest pixel boundary; ties go up.
    #[inline]
    pub const fn round(self) -> F26Dot6 {
        F26Dot6((self.0 + Self::HALF.0) & !MASK)
    }

    /// Halfway point, rounded toward negative infinity.
    #[inline]
    pub const fn midpoint(self, other: F26Dot6) -> F26Dot6 {
        F26Dot6(((self.0 as i64 + other.0 as i64) >> 1) as i32)
    }
}

impl Add for F26Dot6 {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        F26Dot6(self.0 + other.0)
    }
}

impl AddAssign for F26Dot6 {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for F26Dot6 {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        F26Dot6(self.0 - other.0)
    }
}
