use crate::buffer::PixelBuffer;
use crate::color::{quantize, ColorModel, Rgb};
use crate::config::RunConfig;
use crate::control::RunContext;
use crate::draw::{fresh_seed, noise_source};
use crate::error::{ConfigError, RunError};
use crate::eval::evaluate;
use crate::generator::{paint_columns, Generator, Rendered};
use crate::tree::{build, Node};
use rand::{rngs::StdRng, Rng, RngCore};

pub const NAME: &str = "RandomTree";

/// Random tree art: a fresh formula tree per run, evaluated at every pixel.
///
/// The tree comes only from `(seed, generations)`. The noise color models
/// draw from `noise`, a separate source that never touches the tree.
pub struct RandomTreeArt<R = StdRng> {
    config: RunConfig,
    noise: R,
}

impl RandomTreeArt<StdRng> {
    pub fn new(config: RunConfig) -> Result<Self, ConfigError> {
        Self::with_noise(config, noise_source())
    }
}

impl<R: RngCore + Send> RandomTreeArt<R> {
    pub fn with_noise(config: RunConfig, noise: R) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config, noise })
    }
}

/// Color of pixel `(x, y)`: evaluate, clamp, quantize, then post-process.
pub fn shade<R: Rng + ?Sized>(
    tree: &Node,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    model: ColorModel,
    noise: &mut R,
) -> Rgb {
    let v = evaluate(tree, x as f64, y as f64, width as f64, height as f64);
    let c = Rgb::from_packed(quantize(v));
    model.apply(c, x, width, noise)
}

impl<R: RngCore + Send> Generator for RandomTreeArt<R> {
    fn name(&self) -> &str {
        NAME
    }

    fn render(&mut self, ctx: &RunContext) -> Result<Rendered, RunError> {
        let RunConfig {
            width,
            height,
            generations,
            seed,
            color_model,
        } = self.config;
        let seed = seed.unwrap_or_else(fresh_seed);
        ctx.report_seed(seed);
        log::info!(
            "{NAME}: {width}x{height} seed={seed} generations={generations} model={color_model}"
        );

        let tree = build(seed, generations);
        let mut buffer = PixelBuffer::try_new(width, height)?;
        let noise = &mut self.noise;
        paint_columns(ctx, &mut buffer, |x, y| {
            shade(&tree, x, y, width, height, color_model, &mut *noise)
        });

        Ok(Rendered {
            buffer,
            seed: Some(seed),
        })
    }
}
