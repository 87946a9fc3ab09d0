//! Random tree art: a seeded tree of trigonometric formulas, evaluated once
//! per pixel and pushed through a color model.

pub mod art;
pub mod buffer;
pub mod color;
pub mod config;
pub mod control;
pub mod draw;
pub mod error;
pub mod eval;
pub mod formula;
pub mod generator;
pub mod shapes;
pub mod tree;

pub use art::RandomTreeArt;
pub use buffer::PixelBuffer;
pub use color::{ColorModel, Rgb};
pub use config::{RunConfig, Settings};
pub use control::{Controls, RunState, Status, StatusBoard};
pub use error::{ConfigError, RunError};
pub use generator::{Generator, Rendered, RunOutcome, Runner};
pub use shapes::{Shape, ShapeConfig, TestShapes};
