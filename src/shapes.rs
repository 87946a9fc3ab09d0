use crate::buffer::PixelBuffer;
use crate::color::Rgb;
use crate::control::RunContext;
use crate::error::{ConfigError, RunError};
use crate::generator::{paint_columns, Generator, Rendered};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

pub const NAME: &str = "TestShapes";

/// Inset of the rectangle shapes from every canvas edge.
const INSET: f64 = 5.0;
/// Corner arc diameter of `RoundRectangle`.
const ARC: f64 = 25.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shape {
    #[default]
    Circle,
    Ellipse,
    Rectangle,
    RoundRectangle,
}

impl Shape {
    pub const ALL: [Shape; 4] = [
        Shape::Circle,
        Shape::Ellipse,
        Shape::Rectangle,
        Shape::RoundRectangle,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Shape::Circle => "Circle",
            Shape::Ellipse => "Ellipse",
            Shape::Rectangle => "Rectangle",
            Shape::RoundRectangle => "RoundRectangle",
        }
    }

    /// Whether the center of pixel `(x, y)` lies inside the shape on a
    /// `w` by `h` canvas.
    pub fn covers(self, x: u32, y: u32, w: u32, h: u32) -> bool {
        let (px, py) = (x as f64 + 0.5, y as f64 + 0.5);
        let (w, h) = (w as f64, h as f64);
        match self {
            Shape::Circle => {
                let d = w.min(h);
                in_ellipse(px, py, 0.0, 0.0, d, d)
            }
            Shape::Ellipse => in_ellipse(px, py, 0.0, 0.0, w, h),
            Shape::Rectangle => in_rect(px, py, INSET, INSET, w - 2.0 * INSET, h - 2.0 * INSET),
            Shape::RoundRectangle => {
                let (x0, y0) = (INSET, INSET);
                let (rw, rh) = (w - 2.0 * INSET, h - 2.0 * INSET);
                if !in_rect(px, py, x0, y0, rw, rh) {
                    return false;
                }
                let r = (ARC / 2.0).min(rw / 2.0).min(rh / 2.0);
                // clamp into the inner rectangle; outside it only the corner arcs count
                let cx = px.clamp(x0 + r, x0 + rw - r);
                let cy = py.clamp(y0 + r, y0 + rh - r);
                let (dx, dy) = (px - cx, py - cy);
                dx * dx + dy * dy <= r * r
            }
        }
    }
}

fn in_rect(px: f64, py: f64, x0: f64, y0: f64, w: f64, h: f64) -> bool {
    w > 0.0 && h > 0.0 && px >= x0 && px < x0 + w && py >= y0 && py < y0 + h
}

fn in_ellipse(px: f64, py: f64, x0: f64, y0: f64, w: f64, h: f64) -> bool {
    if w <= 0.0 || h <= 0.0 {
        return false;
    }
    let (rx, ry) = (w / 2.0, h / 2.0);
    let dx = (px - (x0 + rx)) / rx;
    let dy = (py - (y0 + ry)) / ry;
    dx * dx + dy * dy <= 1.0
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Shape {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();
        Shape::ALL
            .into_iter()
            .find(|sh| sh.name().to_lowercase() == key)
            .ok_or_else(|| ConfigError::UnknownShape(s.to_string()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShapeConfig {
    pub width: u32,
    pub height: u32,
    pub shape: Shape,
    pub fg: Rgb,
    pub bg: Rgb,
}

impl Default for ShapeConfig {
    fn default() -> Self {
        Self {
            width: 300,
            height: 200,
            shape: Shape::Circle,
            fg: Rgb::new(0xCC, 0xF0, 0xCC),
            bg: Rgb::BLACK,
        }
    }
}

impl ShapeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 {
            return Err(ConfigError::ZeroWidth);
        }
        if self.height == 0 {
            return Err(ConfigError::ZeroHeight);
        }
        Ok(())
    }
}

/// Draws one flat shape. Handy for checking the display and save paths
/// without waiting on a tree render.
pub struct TestShapes {
    config: ShapeConfig,
}

impl TestShapes {
    pub fn new(config: ShapeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }
}

impl Generator for TestShapes {
    fn name(&self) -> &str {
        NAME
    }

    fn render(&mut self, ctx: &RunContext) -> Result<Rendered, RunError> {
        let ShapeConfig {
            width,
            height,
            shape,
            fg,
            bg,
        } = self.config;
        let mut buffer = PixelBuffer::try_new(width, height)?;
        paint_columns(ctx, &mut buffer, |x, y| {
            if shape.covers(x, y, width, height) {
                fg
            } else {
                bg
            }
        });
        Ok(Rendered { buffer, seed: None })
    }
}
