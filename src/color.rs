//! Colour breakpoints, scroll-fraction interpolation and hue shifting.

use std::fmt;

use crate::error::{PortfolioError, Result};

/// Largest fraction the interpolator samples; keeps a "next" breakpoint in
/// range for every input.
const FRACTION_CEILING: f64 = 100.0 - 1e-9;

const SATURATION_BOOST: f64 = 1.8;
const LIGHTNESS_BOOST: f64 = 1.15;
const LIGHTNESS_CAP: f64 = 0.65;

/// An RGB color.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// A fixed (position, color) interpolation anchor. `position` is in `[0, 100]`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ColorBreakpoint {
    pub position: f64,
    pub color: Rgb,
}

/// Spread the first `sections` palette colors evenly over `[0, 100]`.
pub fn build_breakpoints(palette: &[Rgb], sections: usize) -> Result<Vec<ColorBreakpoint>> {
    if sections < 2 {
        return Err(PortfolioError::TooFewBreakpoints(sections));
    }
    if palette.len() < sections {
        return Err(PortfolioError::PaletteTooShort {
            colors: palette.len(),
            sections,
        });
    }

    let spacing = 100.0 / (sections - 1) as f64;
    Ok(palette[..sections]
        .iter()
        .enumerate()
        .map(|(i, &color)| ColorBreakpoint {
            position: i as f64 * spacing,
            color,
        })
        .collect())
}

/// How local progress inside a segment is shaped before mixing.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum Easing {
    #[default]
    Linear,
    /// `t < 0.5 ? 2t² : 1 − (−2t + 2)² / 2`
    SmoothStep,
}

impl Easing {
    pub fn apply(self, t: f64) -> f64 {
        match self {
            Easing::Linear => t,
            Easing::SmoothStep => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
        }
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn mix_channel(from: u8, to: u8, t: f64) -> u8 {
    lerp(from as f64, to as f64, t).round().clamp(0.0, 255.0) as u8
}

/// Piecewise-linear color ramp over evenly spaced breakpoints.
#[derive(Debug, Clone)]
pub struct Gradient {
    stops: Vec<ColorBreakpoint>,
    easing: Easing,
}

impl Gradient {
    pub fn new(palette: &[Rgb], sections: usize) -> Result<Self> {
        Ok(Self {
            stops: build_breakpoints(palette, sections)?,
            easing: Easing::Linear,
        })
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn breakpoints(&self) -> &[ColorBreakpoint] {
        &self.stops
    }

    pub fn easing(&self) -> Easing {
        self.easing
    }

    fn segment_width(&self) -> f64 {
        100.0 / (self.stops.len() - 1) as f64
    }

    /// Splits a fraction in `[0, 100]` into `(segment index, local progress)`.
    pub fn locate(&self, fraction: f64) -> (usize, f64) {
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, FRACTION_CEILING)
        } else {
            0.0
        };
        let width = self.segment_width();
        let last_segment = self.stops.len() - 2;
        let segment = ((fraction / width).floor() as usize).min(last_segment);
        let t = ((fraction - segment as f64 * width) / width).clamp(0.0, 1.0);
        (segment, t)
    }

    /// Color at `fraction` percent of the page.
    pub fn interpolate(&self, fraction: f64) -> Rgb {
        let (segment, t) = self.locate(fraction);
        let t = self.easing.apply(t);
        let from = self.stops[segment].color;
        let to = self.stops[segment + 1].color;
        Rgb {
            r: mix_channel(from.r, to.r, t),
            g: mix_channel(from.g, to.g, t),
            b: mix_channel(from.b, to.b, t),
        }
    }
}

/// HSL with hue in degrees `[0, 360)`, saturation and lightness in `[0, 1]`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

impl From<Rgb> for Hsl {
    fn from(Rgb { r, g, b }: Rgb) -> Hsl {
        let r = r as f64 / 255.0;
        let g = g as f64 / 255.0;
        let b = b as f64 / 255.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;

        let l = (max + min) / 2.0;
        if delta == 0.0 {
            return Hsl { h: 0.0, s: 0.0, l };
        }

        let s = delta / (1.0 - (2.0 * l - 1.0).abs());
        let h = if max == r {
            60.0 * ((g - b) / delta).rem_euclid(6.0)
        } else if max == g {
            60.0 * ((b - r) / delta + 2.0)
        } else {
            60.0 * ((r - g) / delta + 4.0)
        };
        Hsl { h, s, l }
    }
}

impl From<Hsl> for Rgb {
    fn from(Hsl { h, s, l }: Hsl) -> Rgb {
        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
        let m = l - c / 2.0;

        let (r, g, b) = match h {
            h if h < 60.0 => (c, x, 0.0),
            h if h < 120.0 => (x, c, 0.0),
            h if h < 180.0 => (0.0, c, x),
            h if h < 240.0 => (0.0, x, c),
            h if h < 300.0 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };

        let to_u8 = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Rgb {
            r: to_u8(r),
            g: to_u8(g),
            b: to_u8(b),
        }
    }
}

/// Rotates the hue by `hue_delta` degrees and boosts saturation and lightness,
/// producing the decorative companion colors for the background orbs.
pub fn shift_hue(color: Rgb, hue_delta: f64) -> Rgb {
    let mut hsl = Hsl::from(color);
    hsl.h = (hsl.h + hue_delta).rem_euclid(360.0);
    hsl.s = (hsl.s * SATURATION_BOOST).min(1.0);
    hsl.l = (hsl.l * LIGHTNESS_BOOST).min(LIGHTNESS_CAP);
    Rgb::from(hsl)
}
