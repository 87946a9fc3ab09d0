use thiserror::Error;

/// Rejected before a run starts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("width must be greater than zero")]
    ZeroWidth,
    #[error("height must be greater than zero")]
    ZeroHeight,
    #[error("seed {0} is outside 0..={max}", max = crate::draw::MAX_SEED)]
    SeedOutOfRange(u64),
    #[error("{requested} generations requested, at most {max} supported")]
    TooManyGenerations { requested: u32, max: u32 },
    #[error("frame cap must be greater than zero")]
    ZeroFrameCap,
    #[error("unknown color model '{0}' (expected RGB, Monochrome, Monochrome Noise, RGB White Noise or Preview All)")]
    UnknownColorModel(String),
    #[error("unknown shape '{0}' (expected Circle, Ellipse, Rectangle or RoundRectangle)")]
    UnknownShape(String),
}

/// Abandons the current run; the runner stays usable.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("out of memory: {0}")]
    ResourceExhaustion(String),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}
