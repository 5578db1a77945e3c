//! Sequential AQI color scale.
//!
//! A clamped yellow-orange-red ramp over the standard 0-300 AQI display
//! range. The same scale instance backs both the legend gradient and every
//! feature fill, so the two can never disagree.

/// An 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// CSS hex form, e.g. `#fd8d3c`.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Fill used for features with no aggregate value. Absent values are never
/// passed to the scale; callers substitute this instead.
pub const NO_DATA: Rgb = Rgb {
    r: 0xee,
    g: 0xee,
    b: 0xee,
};

/// The 9-class yellow-orange-red ramp, light to dark.
const STOPS: [Rgb; 9] = [
    Rgb { r: 0xff, g: 0xff, b: 0xcc },
    Rgb { r: 0xff, g: 0xed, b: 0xa0 },
    Rgb { r: 0xfe, g: 0xd9, b: 0x76 },
    Rgb { r: 0xfe, g: 0xb2, b: 0x4c },
    Rgb { r: 0xfd, g: 0x8d, b: 0x3c },
    Rgb { r: 0xfc, g: 0x4e, b: 0x2a },
    Rgb { r: 0xe3, g: 0x1a, b: 0x1c },
    Rgb { r: 0xbd, g: 0x00, b: 0x26 },
    Rgb { r: 0x80, g: 0x00, b: 0x26 },
];

/// Standard AQI display range lower bound.
pub const AQI_MIN: f64 = 0.0;
/// Standard AQI display range upper bound.
pub const AQI_MAX: f64 = 300.0;

/// Continuous, clamped sequential scale from AQI value to fill color.
#[derive(Debug, Clone, Copy)]
pub struct ColorScale {
    min: f64,
    max: f64,
}

impl Default for ColorScale {
    fn default() -> Self {
        Self::new(AQI_MIN, AQI_MAX)
    }
}

impl ColorScale {
    /// Builds a scale over a fixed `[min, max]` domain.
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Maps a value to a color, clamping outside the domain to the
    /// endpoint colors.
    #[must_use]
    pub fn color(&self, value: f64) -> Rgb {
        let t = ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0);
        Self::ramp(t)
    }

    /// Evenly spaced gradient stops for a legend, as (offset, color)
    /// pairs with offsets in `[0, 1]`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn legend_stops(&self, count: usize) -> Vec<(f64, Rgb)> {
        if count < 2 {
            return vec![(0.0, self.color(self.min))];
        }
        (0..count)
            .map(|i| {
                let offset = i as f64 / (count - 1) as f64;
                let value = self.min + offset * (self.max - self.min);
                (offset, self.color(value))
            })
            .collect()
    }

    /// Piecewise-linear interpolation over the ramp stops, `t` in `[0, 1]`.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn ramp(t: f64) -> Rgb {
        let x = t * (STOPS.len() - 1) as f64;
        let i = (x.floor() as usize).min(STOPS.len() - 2);
        let f = x - i as f64;

        let lo = STOPS[i];
        let hi = STOPS[i + 1];
        Rgb {
            r: lerp(lo.r, hi.r, f),
            g: lerp(lo.g, hi.g, f),
            b: lerp(lo.b, hi.b, f),
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lerp(a: u8, b: u8, f: f64) -> u8 {
    f64::from(a).mul_add(1.0 - f, f64::from(b) * f).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_hit_ramp_extremes() {
        let scale = ColorScale::default();
        assert_eq!(scale.color(0.0), STOPS[0]);
        assert_eq!(scale.color(300.0), STOPS[8]);
    }

    #[test]
    fn clamps_outside_domain() {
        let scale = ColorScale::default();
        assert_eq!(scale.color(-50.0), scale.color(0.0));
        assert_eq!(scale.color(500.0), scale.color(300.0));
    }

    #[test]
    fn midpoint_is_interior_stop() {
        // 150 of 300 is exactly the middle stop of the 9-stop ramp.
        let scale = ColorScale::default();
        assert_eq!(scale.color(150.0), STOPS[4]);
    }

    #[test]
    fn hex_formatting() {
        assert_eq!(NO_DATA.to_hex(), "#eeeeee");
        assert_eq!(STOPS[4].to_hex(), "#fd8d3c");
    }

    #[test]
    fn legend_stops_span_domain() {
        let scale = ColorScale::default();
        let stops = scale.legend_stops(10);
        assert_eq!(stops.len(), 10);
        assert!((stops[0].0 - 0.0).abs() < f64::EPSILON);
        assert!((stops[9].0 - 1.0).abs() < f64::EPSILON);
        assert_eq!(stops[0].1, STOPS[0]);
        assert_eq!(stops[9].1, STOPS[8]);
    }
}
