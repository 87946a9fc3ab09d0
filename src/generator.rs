use crate::buffer::PixelBuffer;
use crate::color::Rgb;
use crate::control::{CalcTimer, Controls, Flow, RunContext, RunState, StatusBoard};
use crate::error::RunError;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Something that paints a pixel buffer.
pub trait Generator: Send {
    fn name(&self) -> &str;

    /// Produce one image. Long renders call [`RunContext::checkpoint`]
    /// between columns and return early, with a partial buffer, on stop.
    fn render(&mut self, ctx: &RunContext) -> Result<Rendered, RunError>;
}

#[derive(Debug)]
pub struct Rendered {
    pub buffer: PixelBuffer,
    /// Seed the image was built from, when the generator uses one.
    pub seed: Option<u32>,
}

#[derive(Debug)]
pub enum RunOutcome {
    Finished(Rendered),
    /// Columns from `buffer.columns_written()` onward are undefined.
    Stopped(Rendered),
    Failed(RunError),
}

impl RunOutcome {
    pub fn state(&self) -> RunState {
        match self {
            RunOutcome::Finished(_) => RunState::Finished,
            RunOutcome::Stopped(_) => RunState::Stopped,
            RunOutcome::Failed(_) => RunState::Error,
        }
    }

    pub fn rendered(&self) -> Option<&Rendered> {
        match self {
            RunOutcome::Finished(r) | RunOutcome::Stopped(r) => Some(r),
            RunOutcome::Failed(_) => None,
        }
    }

    pub fn into_rendered(self) -> Option<Rendered> {
        match self {
            RunOutcome::Finished(r) | RunOutcome::Stopped(r) => Some(r),
            RunOutcome::Failed(_) => None,
        }
    }
}

/// Fill `buffer` column by column (x outer, y inner), checking pause/stop
/// before each column. Returns the number of columns written.
pub fn paint_columns(
    ctx: &RunContext,
    buffer: &mut PixelBuffer,
    mut shade: impl FnMut(u32, u32) -> Rgb,
) -> u32 {
    let (w, h) = (buffer.width(), buffer.height());
    for x in 0..w {
        if ctx.checkpoint() == Flow::Stop {
            break;
        }
        buffer.push_column((0..h).map(|y| shade(x, y)));
        ctx.column_done(x + 1, w);
    }
    buffer.columns_written()
}

/// Drives generators through the run state machine and publishes status.
#[derive(Clone)]
pub struct Runner {
    controls: Arc<Controls>,
    status: StatusBoard,
}

impl Runner {
    pub fn new(name: &str) -> Self {
        Self {
            controls: Controls::new(),
            status: StatusBoard::new(name),
        }
    }

    pub fn controls(&self) -> &Arc<Controls> {
        &self.controls
    }

    pub fn status(&self) -> &StatusBoard {
        &self.status
    }

    /// Run `generator` to a terminal state on the current thread.
    pub fn run(&self, generator: &mut dyn Generator) -> RunOutcome {
        self.status.update(|s| {
            s.generator = generator.name().to_string();
            s.message = None;
            s.columns_done = 0;
            s.columns_total = 0;
            s.seed = None;
            s.elapsed = None;
        });
        self.status.set_state(RunState::Calculating);
        let timer = CalcTimer::start();

        let ctx = RunContext::new(self.controls.clone(), self.status.clone());
        let outcome = match generator.render(&ctx) {
            Ok(r) if r.buffer.is_complete() => RunOutcome::Finished(r),
            Ok(r) => RunOutcome::Stopped(r),
            Err(e) => RunOutcome::Failed(e),
        };

        let elapsed = timer.elapsed();
        let message = match &outcome {
            RunOutcome::Finished(_) => None,
            RunOutcome::Stopped(r) => Some(format!(
                "stopped at column {} of {}",
                r.buffer.columns_written(),
                r.buffer.width()
            )),
            RunOutcome::Failed(e) => Some(e.to_string()),
        };
        match &outcome {
            RunOutcome::Finished(r) => log::info!(
                "{} finished in {:.2?} (seed {:?})",
                generator.name(),
                elapsed,
                r.seed
            ),
            RunOutcome::Stopped(_) => log::info!("{} stopped after {:.2?}", generator.name(), elapsed),
            RunOutcome::Failed(e) => log::error!("{} failed: {}", generator.name(), e),
        }

        self.status.update(|s| {
            s.message = message;
            s.elapsed = Some(elapsed);
        });
        self.status.set_state(outcome.state());
        outcome
    }

    /// Run on a dedicated worker thread. The generator comes back with the
    /// outcome so it can be run again.
    pub fn spawn(
        &self,
        mut generator: Box<dyn Generator>,
    ) -> std::io::Result<JoinHandle<(Box<dyn Generator>, RunOutcome)>> {
        let runner = self.clone();
        thread::Builder::new()
            .name("randomtree-worker".to_string())
            .spawn(move || {
                let outcome = runner.run(generator.as_mut());
                (generator, outcome)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Paints a gradient and raises stop while shading a chosen column.
    struct StopAt {
        width: u32,
        height: u32,
        stop_in_column: Option<u32>,
        controls: Arc<Controls>,
    }

    impl Generator for StopAt {
        fn name(&self) -> &str {
            "StopAt"
        }

        fn render(&mut self, ctx: &RunContext) -> Result<Rendered, RunError> {
            let mut buffer = PixelBuffer::try_new(self.width, self.height)?;
            let stop = self.stop_in_column;
            let controls = self.controls.clone();
            paint_columns(ctx, &mut buffer, |x, _| {
                if Some(x) == stop {
                    controls.stop();
                }
                Rgb::gray(x as u8)
            });
            Ok(Rendered { buffer, seed: None })
        }
    }

    struct Oom;

    impl Generator for Oom {
        fn name(&self) -> &str {
            "Oom"
        }

        fn render(&mut self, _ctx: &RunContext) -> Result<Rendered, RunError> {
            let buffer = PixelBuffer::try_new(u32::MAX, u32::MAX)?;
            Ok(Rendered { buffer, seed: None })
        }
    }

    #[test_log::test]
    fn finishes_and_reports() {
        let runner = Runner::new("StopAt");
        let mut g = StopAt {
            width: 10,
            height: 4,
            stop_in_column: None,
            controls: runner.controls().clone(),
        };
        let out = runner.run(&mut g);
        assert_eq!(out.state(), RunState::Finished);
        let s = runner.status().snapshot();
        assert_eq!(s.state, RunState::Finished);
        assert_eq!((s.columns_done, s.columns_total), (10, 10));
        assert!(s.elapsed.is_some());
        assert_eq!(s.message, None);
    }

    #[test_log::test]
    fn stop_mid_loop_leaves_tail_undefined() {
        let runner = Runner::new("StopAt");
        // stop raised while painting column 36 is seen before column 37
        let mut g = StopAt {
            width: 100,
            height: 3,
            stop_in_column: Some(36),
            controls: runner.controls().clone(),
        };
        let out = runner.run(&mut g);
        assert_eq!(out.state(), RunState::Stopped);
        let r = out.rendered().unwrap();
        assert_eq!(r.buffer.columns_written(), 37);
        assert!(!r.buffer.is_complete());
        for y in 0..3 {
            assert_eq!(r.buffer.get(36, y), Some(Rgb::gray(36)));
            assert_eq!(r.buffer.get(37, y), None);
            assert_eq!(r.buffer.get(99, y), None);
        }
        let s = runner.status().snapshot();
        assert_eq!(s.state, RunState::Stopped);
        assert_eq!(s.message.as_deref(), Some("stopped at column 37 of 100"));
    }

    #[test]
    fn allocation_failure_is_error_and_runner_recovers() {
        let runner = Runner::new("Oom");
        let out = runner.run(&mut Oom);
        assert!(matches!(out, RunOutcome::Failed(RunError::ResourceExhaustion(_))));
        let s = runner.status().snapshot();
        assert_eq!(s.state, RunState::Error);
        assert!(s.message.unwrap().starts_with("out of memory"));

        let mut g = StopAt {
            width: 2,
            height: 2,
            stop_in_column: None,
            controls: runner.controls().clone(),
        };
        assert_eq!(runner.run(&mut g).state(), RunState::Finished);
        assert_eq!(runner.status().snapshot().message, None);
    }

    #[test]
    fn spawn_returns_generator_and_outcome() {
        let runner = Runner::new("StopAt");
        let g = StopAt {
            width: 5,
            height: 5,
            stop_in_column: None,
            controls: runner.controls().clone(),
        };
        let handle = runner.spawn(Box::new(g)).unwrap();
        let (g, out) = handle.join().unwrap();
        assert_eq!(g.name(), "StopAt");
        assert_eq!(out.state(), RunState::Finished);
    }
}
