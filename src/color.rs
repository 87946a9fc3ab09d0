use crate::error::ConfigError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Largest packed 24-bit color.
pub const RGB_MAX: f64 = 16_777_215.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn gray(v: u8) -> Self {
        Self { r: v, g: v, b: v }
    }

    pub fn from_packed(v: u32) -> Self {
        Self {
            r: ((v >> 16) & 0xFF) as u8,
            g: ((v >> 8) & 0xFF) as u8,
            b: (v & 0xFF) as u8,
        }
    }

    pub fn packed(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    pub fn average(self) -> u8 {
        ((self.r as u32 + self.g as u32 + self.b as u32) / 3) as u8
    }

    /// Channels multiplied by `k` in `[0, 1)` and truncated.
    pub fn scaled(self, k: f64) -> Self {
        Self {
            r: (self.r as f64 * k) as u8,
            g: (self.g as f64 * k) as u8,
            b: (self.b as f64 * k) as u8,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorModel {
    #[default]
    #[serde(rename = "RGB")]
    Rgb,
    #[serde(rename = "Monochrome")]
    Monochrome,
    #[serde(rename = "Monochrome Noise")]
    MonochromeNoise,
    #[serde(rename = "RGB White Noise")]
    RgbWhiteNoise,
    #[serde(rename = "Preview All")]
    PreviewAll,
}

impl ColorModel {
    pub const ALL: [ColorModel; 5] = [
        ColorModel::Rgb,
        ColorModel::Monochrome,
        ColorModel::MonochromeNoise,
        ColorModel::RgbWhiteNoise,
        ColorModel::PreviewAll,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ColorModel::Rgb => "RGB",
            ColorModel::Monochrome => "Monochrome",
            ColorModel::MonochromeNoise => "Monochrome Noise",
            ColorModel::RgbWhiteNoise => "RGB White Noise",
            ColorModel::PreviewAll => "Preview All",
        }
    }

    /// Whether two runs with the same seed produce the same pixels.
    pub fn is_reproducible(self) -> bool {
        matches!(self, ColorModel::Rgb | ColorModel::Monochrome)
    }

    /// The model actually applied at column `x`. Only `PreviewAll` varies by
    /// column: four vertical bands, edges inclusive on the right.
    pub fn resolve(self, x: u32, width: u32) -> ColorModel {
        if self != ColorModel::PreviewAll {
            return self;
        }
        let x = x as f64;
        let w = width as f64;
        if x <= w * 0.25 {
            ColorModel::Monochrome
        } else if x <= w * 0.5 {
            ColorModel::MonochromeNoise
        } else if x <= w * 0.75 {
            ColorModel::Rgb
        } else {
            ColorModel::RgbWhiteNoise
        }
    }

    /// Post-process a quantized color. `noise` is only drawn from by the
    /// noise models.
    pub fn apply<R: Rng + ?Sized>(self, c: Rgb, x: u32, width: u32, noise: &mut R) -> Rgb {
        match self.resolve(x, width) {
            ColorModel::Rgb => c,
            ColorModel::Monochrome => Rgb::gray(c.average()),
            ColorModel::MonochromeNoise => {
                let k: f64 = noise.gen();
                Rgb::gray((c.average() as f64 * k) as u8)
            }
            ColorModel::RgbWhiteNoise => c.scaled(noise.gen()),
            // resolve never yields PreviewAll
            ColorModel::PreviewAll => c,
        }
    }
}

impl fmt::Display for ColorModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColorModel {
    type Err = ConfigError;

    /// Accepts the display names, case-insensitively, with spaces, dashes or
    /// underscores between words.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();
        ColorModel::ALL
            .into_iter()
            .find(|m| m.name().replace(' ', "").to_lowercase() == key)
            .ok_or_else(|| ConfigError::UnknownColorModel(s.to_string()))
    }
}

/// Clamp into `[0, 1]`. NaN maps to 0.
pub fn normalize(v: f64) -> f64 {
    if v.is_nan() {
        return 0.0;
    }
    v.clamp(0.0, 1.0)
}

/// `round(v * 0xFFFFFF)` for `v` in `[0, 1]`.
pub fn quantize(v: f64) -> u32 {
    (normalize(v) * RGB_MAX).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn normalize_clamps_and_is_idempotent() {
        assert_eq!(normalize(-3.0), 0.0);
        assert_eq!(normalize(7.5), 1.0);
        assert_eq!(normalize(f64::NAN), 0.0);
        for v in [0.0, 0.05, 0.5, 0.999, 1.0] {
            assert_eq!(normalize(v), v);
            assert_eq!(normalize(normalize(v)), normalize(v));
        }
    }

    #[test]
    fn quantize_rounds() {
        assert_eq!(quantize(0.05), 838_861);
        assert_eq!(quantize(0.0), 0);
        assert_eq!(quantize(1.0), 0xFF_FFFF);
        assert_eq!(quantize(2.0), 0xFF_FFFF);
    }

    #[test]
    fn packed_decomposition() {
        let c = Rgb::from_packed(838_861);
        assert_eq!(c, Rgb::new(0x0C, 0xCC, 0xCD));
        assert_eq!(c.packed(), 838_861);
    }

    #[test]
    fn monochrome_uses_integer_average() {
        let mut rng = StdRng::seed_from_u64(1);
        let c = Rgb::new(10, 20, 31);
        assert_eq!(ColorModel::Monochrome.apply(c, 0, 10, &mut rng), Rgb::gray(20));
        assert_eq!(ColorModel::Rgb.apply(c, 0, 10, &mut rng), c);
    }

    #[test]
    fn noise_models_never_brighten() {
        let mut rng = StdRng::seed_from_u64(9);
        let c = Rgb::new(200, 100, 50);
        for _ in 0..500 {
            let m = ColorModel::MonochromeNoise.apply(c, 0, 10, &mut rng);
            assert!(m.r == m.g && m.g == m.b && m.r <= c.average());
            let w = ColorModel::RgbWhiteNoise.apply(c, 0, 10, &mut rng);
            assert!(w.r <= c.r && w.g <= c.g && w.b <= c.b);
        }
    }

    #[test]
    fn white_noise_scales_channels_together() {
        // one draw per pixel shared by all channels
        let mut a = StdRng::seed_from_u64(5);
        let mut b = StdRng::seed_from_u64(5);
        let k: f64 = b.gen();
        let c = Rgb::new(255, 128, 64);
        assert_eq!(ColorModel::RgbWhiteNoise.apply(c, 0, 1, &mut a), c.scaled(k));
    }

    #[test]
    fn monochrome_noise_scales_the_average() {
        let mut a = StdRng::seed_from_u64(11);
        let mut b = StdRng::seed_from_u64(11);
        let c = Rgb::new(200, 100, 51);
        for _ in 0..20 {
            let k: f64 = b.gen();
            let expect = (c.average() as f64 * k) as u8;
            assert_eq!(ColorModel::MonochromeNoise.apply(c, 0, 1, &mut a), Rgb::gray(expect));
        }
    }

    #[test]
    fn preview_all_bands() {
        let w = 400;
        assert_eq!(ColorModel::PreviewAll.resolve(50, w), ColorModel::Monochrome);
        assert_eq!(ColorModel::PreviewAll.resolve(100, w), ColorModel::Monochrome);
        assert_eq!(ColorModel::PreviewAll.resolve(101, w), ColorModel::MonochromeNoise);
        assert_eq!(ColorModel::PreviewAll.resolve(250, w), ColorModel::Rgb);
        assert_eq!(ColorModel::PreviewAll.resolve(350, w), ColorModel::RgbWhiteNoise);
        assert_eq!(ColorModel::Monochrome.resolve(350, w), ColorModel::Monochrome);

        let mut rng = StdRng::seed_from_u64(3);
        let c = Rgb::new(90, 30, 60);
        assert_eq!(ColorModel::PreviewAll.apply(c, 50, w, &mut rng), Rgb::gray(60));
        assert_eq!(ColorModel::PreviewAll.apply(c, 250, w, &mut rng), c);
    }

    #[test]
    fn parses_display_names() {
        for m in ColorModel::ALL {
            assert_eq!(m.name().parse::<ColorModel>(), Ok(m));
            assert_eq!(m.to_string().parse::<ColorModel>(), Ok(m));
        }
        assert_eq!("rgb-white-noise".parse(), Ok(ColorModel::RgbWhiteNoise));
        assert_eq!("preview_all".parse(), Ok(ColorModel::PreviewAll));
        assert!(matches!(
            "sepia".parse::<ColorModel>(),
            Err(ConfigError::UnknownColorModel(_))
        ));
    }

    #[test]
    fn serde_uses_display_names() {
        let s = serde_json::to_string(&ColorModel::MonochromeNoise).unwrap();
        assert_eq!(s, "\"Monochrome Noise\"");
        let back: ColorModel = serde_json::from_str(&s).unwrap();
        assert_eq!(back, ColorModel::MonochromeNoise);
    }
}
