use crate::input::{collect_input_nonblocking, map_event_to_action, Action};
use crate::render::{blit_image, draw_text, Area, Terminal};
use crate::{Cli, GeneratorCmd};
use anyhow::{anyhow, Context, Result};
use crossterm::style::Color;
use randomtree::config::{check_seed, load_settings, project_paths, save_settings_atomic};
use randomtree::{
    ColorModel, Generator, RandomTreeArt, Rendered, RunOutcome, RunState, Runner, Settings,
    TestShapes,
};
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

const DEFAULT_SAVE_PATH: &str = "randomtree.png";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Kind {
    Tree,
    Shapes,
}

type Worker = JoinHandle<(Box<dyn Generator>, RunOutcome)>;

/// Apply command-line overrides on top of the stored settings.
fn resolve(cli: &Cli, mut settings: Settings) -> Result<(Settings, Kind, Option<u32>)> {
    if let Some(w) = cli.width {
        settings.width = w;
    }
    if let Some(h) = cli.height {
        settings.height = h;
    }

    match &cli.generator {
        None => Ok((settings, Kind::Tree, None)),
        Some(GeneratorCmd::Tree {
            generations,
            seed,
            color_model,
        }) => {
            if let Some(g) = generations {
                settings.generations = *g;
            }
            if let Some(m) = color_model {
                settings.color_model = *m;
            }
            let seed = seed.map(check_seed).transpose()?;
            Ok((settings, Kind::Tree, seed))
        }
        Some(GeneratorCmd::Shapes { shape }) => {
            if let Some(s) = shape {
                settings.shape = *s;
            }
            Ok((settings, Kind::Shapes, None))
        }
    }
}

fn make_generator(kind: Kind, settings: &Settings, seed: Option<u32>) -> Result<Box<dyn Generator>> {
    Ok(match kind {
        Kind::Tree => Box::new(RandomTreeArt::new(settings.run_config(seed))?),
        Kind::Shapes => Box::new(TestShapes::new(settings.shape_config())?),
    })
}

struct App {
    settings: Settings,
    term: Terminal,
    runner: Runner,
    generator: Option<Box<dyn Generator>>,
    worker: Option<Worker>,
    last: Option<Rendered>,
    save_path: PathBuf,
    notice: Option<String>,
    should_quit: bool,
}

impl App {
    fn init(settings: Settings, generator: Box<dyn Generator>, save_path: PathBuf) -> Result<Self> {
        let runner = Runner::new(generator.name());
        let term = Terminal::begin()?;
        Ok(Self {
            settings,
            term,
            runner,
            generator: Some(generator),
            worker: None,
            last: None,
            save_path,
            notice: None,
            should_quit: false,
        })
    }

    fn run(&mut self) -> Result<()> {
        let fps = self.settings.fps_cap.clamp(5, 120);
        let frame_dt = Duration::from_secs_f32(1.0 / fps as f32);

        self.start_run()?;
        while !self.should_quit {
            self.term.resize_if_needed()?;

            for ev in collect_input_nonblocking(frame_dt)? {
                if let Some(action) = map_event_to_action(&ev) {
                    self.apply(action)?;
                }
                if self.should_quit {
                    break;
                }
            }

            self.poll_worker()?;
            self.render_frame()?;
            spin_sleep(frame_dt, Instant::now());
        }

        self.finish_worker()
    }

    fn apply(&mut self, action: Action) -> Result<()> {
        let running = self.worker.is_some();
        match action {
            Action::TogglePause if running => {
                let paused = self.runner.controls().toggle_pause();
                log::debug!("pause toggled: {paused}");
            }
            Action::Stop if running => self.runner.controls().stop(),
            Action::TogglePause | Action::Stop => {}
            Action::Rerun if running => {
                self.notice = Some("still rendering, stop it first (x)".to_string());
            }
            Action::Rerun => {
                self.notice = None;
                self.start_run()?;
            }
            Action::Save => self.save(),
            Action::Quit => self.should_quit = true,
        }
        Ok(())
    }

    /// One run at a time; the generator travels to the worker and back.
    fn start_run(&mut self) -> Result<()> {
        if self.worker.is_some() {
            return Ok(());
        }
        let Some(generator) = self.generator.take() else {
            return Ok(());
        };
        self.runner.controls().reset();
        let handle = self
            .runner
            .spawn(generator)
            .context("could not start render thread")?;
        self.worker = Some(handle);
        Ok(())
    }

    fn poll_worker(&mut self) -> Result<()> {
        if !self.worker.as_ref().is_some_and(|w| w.is_finished()) {
            return Ok(());
        }
        self.collect_worker()
    }

    fn collect_worker(&mut self) -> Result<()> {
        let Some(handle) = self.worker.take() else {
            return Ok(());
        };
        let (generator, outcome) = handle
            .join()
            .map_err(|_| anyhow!("render thread panicked"))?;
        self.generator = Some(generator);
        // a failed run keeps the previous image on screen
        if let Some(r) = outcome.into_rendered() {
            self.last = Some(r);
        }
        Ok(())
    }

    fn finish_worker(&mut self) -> Result<()> {
        if self.worker.is_some() {
            self.runner.controls().stop();
            self.collect_worker()?;
        }
        Ok(())
    }

    fn save(&mut self) {
        let Some(r) = &self.last else {
            self.notice = Some("nothing to save yet".to_string());
            return;
        };
        self.notice = Some(match r.buffer.save_png(&self.save_path) {
            Ok(()) if r.buffer.is_complete() => format!("saved {}", self.save_path.display()),
            Ok(()) => format!("saved {} (incomplete)", self.save_path.display()),
            Err(e) => format!("save failed: {e}"),
        });
    }

    fn render_frame(&mut self) -> Result<()> {
        self.term.cur.clear();
        let cols = self.term.cols;
        let rows = self.term.rows;
        let image_rows = rows.saturating_sub(1);

        if let Some(r) = &self.last {
            let area = Area {
                x: 0,
                y: 0,
                w: cols,
                h: image_rows,
            };
            blit_image(&mut self.term.cur, &r.buffer, area);
        }

        let status = self.runner.status().snapshot();
        let mut hud = status.line();
        if status.state.is_active() {
            hud.push_str(&format!("  {:>3.0}%", status.progress() * 100.0));
        }
        if let Some(seed) = status.seed {
            hud.push_str(&format!("  seed {seed}"));
            hud.push_str(seed_note(self.settings.color_model));
        }
        if let (Some(e), true) = (status.elapsed, status.state.is_terminal()) {
            hud.push_str(&format!("  {:.2}s", e.as_secs_f32()));
        }
        if let Some(n) = &self.notice {
            hud.push_str("  | ");
            hud.push_str(n);
        }
        hud.push_str("  (space pause) (x stop) (r rerun) (s save) (q quit)");

        let fg = match status.state {
            RunState::Error => Color::Red,
            RunState::Paused => Color::Yellow,
            RunState::Finished => Color::Green,
            _ => Color::Grey,
        };
        draw_text(&mut self.term.cur, 0, image_rows, &hud, fg, Color::Reset);

        self.term.present()
    }
}

/// Noise models redraw per run, so the seed alone won't recreate the image.
fn seed_note(model: ColorModel) -> &'static str {
    if model.is_reproducible() {
        ""
    } else {
        " (+noise)"
    }
}

fn run_headless(mut generator: Box<dyn Generator>, save: Option<&Path>) -> Result<()> {
    let runner = Runner::new(generator.name());
    let outcome = runner.run(generator.as_mut());
    let status = runner.status().snapshot();

    println!("{}", status.line());
    if let Some(seed) = status.seed {
        println!("seed: {seed}");
    }
    if let Some(e) = status.elapsed {
        println!("elapsed: {:.2}s", e.as_secs_f32());
    }

    match outcome {
        RunOutcome::Failed(e) => Err(e).context("render failed"),
        RunOutcome::Finished(r) | RunOutcome::Stopped(r) => {
            if let Some(path) = save {
                r.buffer
                    .save_png(path)
                    .with_context(|| format!("could not save {}", path.display()))?;
                println!("saved {}", path.display());
            }
            Ok(())
        }
    }
}

pub(crate) fn run(cli: Cli) -> Result<()> {
    let paths = match project_paths() {
        Ok(p) => Some(p),
        Err(e) => {
            log::warn!("settings will not be kept: {e:#}");
            None
        }
    };
    let stored = paths
        .as_ref()
        .map(|p| load_settings(&p.settings_path))
        .unwrap_or_default();

    let (settings, kind, seed) = resolve(&cli, stored)?;
    let generator = make_generator(kind, &settings, seed)?;

    if cli.headless {
        run_headless(generator, cli.save.as_deref())?;
    } else {
        let save_path = cli
            .save
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SAVE_PATH));
        let mut app = App::init(settings.clone(), generator, save_path)?;
        let res = app.run();
        let end = app.term.end();
        res?;
        end?;
    }

    if let Some(p) = &paths {
        save_settings_atomic(&p.settings_path, &settings)?;
    }
    Ok(())
}

/* -----------------------------
   Frame pacing helper
------------------------------ */

fn spin_sleep(target: Duration, now: Instant) {
    let end = now + target;
    loop {
        let t = Instant::now();
        if t >= end {
            break;
        }
        let left = end - t;
        if left > Duration::from_millis(2) {
            std::thread::sleep(Duration::from_millis(1));
        } else {
            std::hint::spin_loop();
        }
    }
}
