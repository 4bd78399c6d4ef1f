//! RGB and CIE L*a*b* color representations
//!
//! Matching is done in L*a*b* (D65 white point) with plain Euclidean distance
//! (CIE76). This is an approximation of perceptual difference, not CIEDE2000.

use serde::Serialize;
use utoipa::ToSchema;

/// D65 reference white
const WHITE_X: f64 = 0.95047;
const WHITE_Z: f64 = 1.08883;

/// CIE nonlinear transform threshold, (6/29)^3
const LAB_EPSILON: f64 = 0.008856;

/// 8-bit sRGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from floating channel values, rounding and clamping to [0, 255]
    pub fn from_f64_clamped(r: f64, g: f64, b: f64) -> Self {
        #[inline]
        fn channel(c: f64) -> u8 {
            if c.is_nan() {
                0
            } else {
                c.round().clamp(0.0, 255.0) as u8
            }
        }
        Self::new(channel(r), channel(g), channel(b))
    }

    /// Convert to CIE L*a*b*
    pub fn to_lab(&self) -> Lab {
        Lab::from_rgb(*self)
    }

    /// `#rrggbb` form, used by swatch consumers
    pub fn hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// CIE L*a*b* color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lab {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

impl Lab {
    /// Convert sRGB byte to linear
    #[inline]
    fn srgb_to_linear(c: u8) -> f64 {
        let c = c as f64 / 255.0;
        if c > 0.04045 {
            ((c + 0.055) / 1.055).powf(2.4)
        } else {
            c / 12.92
        }
    }

    #[inline]
    fn lab_f(t: f64) -> f64 {
        if t > LAB_EPSILON {
            t.cbrt()
        } else {
            7.787 * t + 16.0 / 116.0
        }
    }

    /// sRGB -> linear RGB -> XYZ (D65) -> L*a*b*
    pub fn from_rgb(rgb: Rgb) -> Self {
        let r = Self::srgb_to_linear(rgb.r);
        let g = Self::srgb_to_linear(rgb.g);
        let b = Self::srgb_to_linear(rgb.b);

        let x = (r * 0.4124564 + g * 0.3575761 + b * 0.1804375) / WHITE_X;
        let y = r * 0.2126729 + g * 0.7151522 + b * 0.0721750;
        let z = (r * 0.0193339 + g * 0.1191920 + b * 0.9503041) / WHITE_Z;

        let fx = Self::lab_f(x);
        let fy = Self::lab_f(y);
        let fz = Self::lab_f(z);

        Self {
            l: 116.0 * fy - 16.0,
            a: 500.0 * (fx - fy),
            b: 200.0 * (fy - fz),
        }
    }

    /// Euclidean distance to another color (CIE76 delta E)
    #[inline]
    pub fn distance(&self, other: &Lab) -> f64 {
        let dl = self.l - other.l;
        let da = self.a - other.a;
        let db = self.b - other.b;
        (dl * dl + da * da + db * db).sqrt()
    }
}

impl From<Rgb> for Lab {
    fn from(rgb: Rgb) -> Self {
        Lab::from_rgb(rgb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected} +/- {tolerance}, got {actual}"
        );
    }

    #[test]
    fn test_black_and_white() {
        let black = Rgb::new(0, 0, 0).to_lab();
        assert_close(black.l, 0.0, 1e-9);
        assert_close(black.a, 0.0, 1e-9);
        assert_close(black.b, 0.0, 1e-9);

        let white = Rgb::new(255, 255, 255).to_lab();
        assert_close(white.l, 100.0, 1e-3);
        assert_close(white.a, 0.0, 1e-2);
        assert_close(white.b, 0.0, 1e-2);
    }

    #[test]
    fn test_known_red() {
        // Reference sRGB red in D65 Lab is roughly (53.24, 80.09, 67.20)
        let red = Rgb::new(255, 0, 0).to_lab();
        assert_close(red.l, 53.24, 0.05);
        assert_close(red.a, 80.09, 0.1);
        assert_close(red.b, 67.20, 0.1);
    }

    #[test]
    fn test_lab_ranges_over_cube() {
        for r in (0..=255u16).step_by(15) {
            for g in (0..=255u16).step_by(15) {
                for b in (0..=255u16).step_by(15) {
                    let rgb = Rgb::new(r as u8, g as u8, b as u8);
                    let lab = rgb.to_lab();
                    assert!(lab.l.is_finite() && lab.a.is_finite() && lab.b.is_finite());
                    assert!(lab.l >= -1e-9 && lab.l <= 100.0 + 1e-3, "L out of range for {rgb:?}");
                    assert!(lab.a >= -128.0 && lab.a <= 128.0, "a out of range for {rgb:?}");
                    assert!(lab.b >= -128.0 && lab.b <= 128.0, "b out of range for {rgb:?}");
                    assert_eq!(lab, rgb.to_lab());
                }
            }
        }
    }

    #[test]
    fn test_distance_properties() {
        let a = Rgb::new(150, 75, 0).to_lab();
        let b = Rgb::new(218, 165, 32).to_lab();
        assert_eq!(a.distance(&a), 0.0);
        assert_eq!(a.distance(&b), b.distance(&a));
        assert!(a.distance(&b) > 0.0);
    }

    #[test]
    fn test_from_f64_clamped() {
        assert_eq!(Rgb::from_f64_clamped(-4.0, 127.5, 300.0), Rgb::new(0, 128, 255));
        assert_eq!(Rgb::from_f64_clamped(f64::NAN, 1.4, 1.6), Rgb::new(0, 1, 2));
    }

    #[test]
    fn test_hex() {
        assert_eq!(Rgb::new(143, 0, 255).hex(), "#8F00FF");
    }
}
