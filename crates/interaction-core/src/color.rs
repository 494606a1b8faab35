//! CSS color parsing and the "darker" transform used for hover highlights

use std::fmt;
use std::str::FromStr;

use palette::{FromColor, Hsl, Srgb};

const DARKER: f64 = 0.7;

/// An sRGB color with unclamped channels, like d3's `rgb`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub opacity: f64,
}

impl From<Srgb<u8>> for Rgb {
    fn from(color: Srgb<u8>) -> Self {
        Self::new(
            f64::from(color.red),
            f64::from(color.green),
            f64::from(color.blue),
            1.0,
        )
    }
}

impl Rgb {
    pub fn new(r: f64, g: f64, b: f64, opacity: f64) -> Self {
        Self { r, g, b, opacity }
    }

    /// Parse a CSS color: `#rgb`, `#rrggbb`, `rgb()`/`rgba()` with numbers
    /// or percentages, `hsl()`/`hsla()`, and the CSS named colors
    pub fn parse(input: &str) -> Option<Self> {
        let s = input.trim().to_ascii_lowercase();

        if s.starts_with('#') {
            return Srgb::<u8>::from_str(&s).ok().map(Self::from);
        }

        if let Some((function, args)) = split_function(&s) {
            return match function {
                "rgb" | "rgba" => Self::from_rgb_args(&args),
                "hsl" | "hsla" => Self::from_hsl_args(&args),
                _ => None,
            };
        }

        palette::named::from_str(&s).map(Self::from)
    }

    fn from_rgb_args(args: &[&str]) -> Option<Self> {
        let (channels, alpha) = match args {
            [r, g, b] => ([r, g, b], None),
            [r, g, b, a] => ([r, g, b], Some(a)),
            _ => return None,
        };
        let [r, g, b] = channels.map(|c| rgb_channel(c));
        Some(Self::new(r?, g?, b?, opacity(alpha)?))
    }

    fn from_hsl_args(args: &[&str]) -> Option<Self> {
        let (h, s, l, alpha) = match args {
            [h, s, l] => (h, s, l, None),
            [h, s, l, a] => (h, s, l, Some(a)),
            _ => return None,
        };
        let hue: f64 = h.trim_end_matches("deg").parse().ok()?;
        let hsl: Hsl<palette::encoding::Srgb, f64> = Hsl::new(hue, percentage(s)?, percentage(l)?);
        let rgb = Srgb::<f64>::from_color(hsl);
        Some(Self::new(
            rgb.red * 255.0,
            rgb.green * 255.0,
            rgb.blue * 255.0,
            opacity(alpha)?,
        ))
    }

    /// Darken by `k` steps, each scaling the channels by 0.7
    pub fn darker(&self, k: f64) -> Self {
        let factor = DARKER.powf(k);
        Self::new(self.r * factor, self.g * factor, self.b * factor, self.opacity)
    }
}

/// `rgb(10, 20, 30)`, `rgba(10 20 30 / 0.5)` and the like as a name and
/// its arguments
fn split_function(s: &str) -> Option<(&str, Vec<&str>)> {
    let (name, rest) = s.split_once('(')?;
    let body = rest.strip_suffix(')')?;
    let args = body
        .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
        .filter(|arg| !arg.is_empty())
        .collect();
    Some((name.trim(), args))
}

fn percentage(arg: &str) -> Option<f64> {
    arg.strip_suffix('%')?.parse::<f64>().ok().map(|p| p / 100.0)
}

fn rgb_channel(arg: &str) -> Option<f64> {
    match arg.strip_suffix('%') {
        Some(p) => p.parse::<f64>().ok().map(|p| p * 255.0 / 100.0),
        None => arg.parse().ok(),
    }
}

fn opacity(arg: Option<&&str>) -> Option<f64> {
    match arg {
        None => Some(1.0),
        Some(a) => percentage(a).or_else(|| a.parse().ok()),
    }
}

fn channel(value: f64) -> u8 {
    if value.is_nan() {
        0
    } else {
        value.round().clamp(0.0, 255.0) as u8
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (r, g, b) = (channel(self.r), channel(self.g), channel(self.b));
        let a = if self.opacity.is_nan() {
            1.0
        } else {
            self.opacity.clamp(0.0, 1.0)
        };
        if a == 1.0 {
            write!(f, "rgb({r}, {g}, {b})")
        } else {
            write!(f, "rgba({r}, {g}, {b}, {a})")
        }
    }
}

/// Darkened CSS string for `fill`, or `None` when the color is not parseable
pub fn darken_fill(fill: &str, k: f64) -> Option<String> {
    Rgb::parse(fill).map(|c| c.darker(k).to_string())
}
