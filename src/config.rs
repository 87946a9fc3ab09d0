use crate::color::ColorModel;
use crate::draw::MAX_SEED;
use crate::error::ConfigError;
use crate::shapes::{Shape, ShapeConfig};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// Upper bound on tree depth. A full binary tree of this depth is already
/// two million nodes.
pub const MAX_GENERATIONS: u32 = 20;

/// Inputs of one random tree run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunConfig {
    pub width: u32,
    pub height: u32,
    pub generations: u32,
    /// `None` draws a fresh seed per run.
    pub seed: Option<u32>,
    pub color_model: ColorModel,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            generations: 7,
            seed: None,
            color_model: ColorModel::Rgb,
        }
    }
}

impl RunConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 {
            return Err(ConfigError::ZeroWidth);
        }
        if self.height == 0 {
            return Err(ConfigError::ZeroHeight);
        }
        if self.generations > MAX_GENERATIONS {
            return Err(ConfigError::TooManyGenerations {
                requested: self.generations,
                max: MAX_GENERATIONS,
            });
        }
        if let Some(seed) = self.seed {
            check_seed(seed as u64)?;
        }
        Ok(())
    }
}

/// Narrow a user-supplied seed to the accepted range.
pub fn check_seed(seed: u64) -> Result<u32, ConfigError> {
    if seed > MAX_SEED as u64 {
        return Err(ConfigError::SeedOutOfRange(seed));
    }
    Ok(seed as u32)
}

/// Last-used values, kept between sessions. Seeds are per run and are not
/// remembered.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub width: u32,
    pub height: u32,
    pub generations: u32,
    pub color_model: ColorModel,
    pub shape: Shape,
    pub fps_cap: u32,
}

impl Default for Settings {
    fn default() -> Self {
        let run = RunConfig::default();
        Self {
            width: run.width,
            height: run.height,
            generations: run.generations,
            color_model: run.color_model,
            shape: Shape::Circle,
            fps_cap: 30,
        }
    }
}

impl Settings {
    pub fn run_config(&self, seed: Option<u32>) -> RunConfig {
        RunConfig {
            width: self.width,
            height: self.height,
            generations: self.generations,
            seed,
            color_model: self.color_model,
        }
    }

    /// Same checks a run would make, so a stored file can't wedge startup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.run_config(None).validate()?;
        if self.fps_cap == 0 {
            return Err(ConfigError::ZeroFrameCap);
        }
        Ok(())
    }

    pub fn shape_config(&self) -> ShapeConfig {
        ShapeConfig {
            width: self.width,
            height: self.height,
            shape: self.shape,
            ..ShapeConfig::default()
        }
    }
}

pub struct Paths {
    pub settings_path: PathBuf,
}

pub fn project_paths() -> Result<Paths> {
    let proj = ProjectDirs::from("com", "randomtree", "RandomTree")
        .context("could not resolve project directories")?;
    let dir = proj.config_dir().to_path_buf();
    fs::create_dir_all(&dir)
        .with_context(|| format!("could not create {}", dir.display()))?;
    Ok(Paths {
        settings_path: dir.join("settings.json"),
    })
}

/// Missing, unreadable or out-of-range settings fall back to defaults.
pub fn load_settings(path: &Path) -> Settings {
    let s = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Settings::default(),
        Err(e) => {
            log::warn!("could not read {}: {}", path.display(), e);
            return Settings::default();
        }
    };
    let settings = match serde_json::from_str::<Settings>(&s) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("ignoring {}: {}", path.display(), e);
            return Settings::default();
        }
    };
    match settings.validate() {
        Ok(()) => settings,
        Err(e) => {
            log::warn!("ignoring {}: {}", path.display(), e);
            Settings::default()
        }
    }
}

pub fn save_settings_atomic(path: &Path, s: &Settings) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(s)?;
    fs::write(&tmp, data).with_context(|| format!("writing {}", tmp.display()))?;
    atomic_rename(&tmp, path)?;
    Ok(())
}

fn atomic_rename(from: &Path, to: &Path) -> Result<()> {
    // rename over an existing file fails on Windows
    if cfg!(windows) && to.exists() {
        let _ = fs::remove_file(to);
    }
    fs::rename(from, to)
        .with_context(|| format!("renaming {} to {}", from.display(), to.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(RunConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_degenerate_configs() {
        let base = RunConfig::default();
        assert_eq!(
            RunConfig { width: 0, ..base.clone() }.validate(),
            Err(ConfigError::ZeroWidth)
        );
        assert_eq!(
            RunConfig { height: 0, ..base.clone() }.validate(),
            Err(ConfigError::ZeroHeight)
        );
        assert_eq!(
            RunConfig { generations: 21, ..base.clone() }.validate(),
            Err(ConfigError::TooManyGenerations { requested: 21, max: 20 })
        );
        assert_eq!(
            RunConfig { seed: Some(u32::MAX), ..base.clone() }.validate(),
            Err(ConfigError::SeedOutOfRange(u32::MAX as u64))
        );
        assert_eq!(
            RunConfig { seed: Some(i32::MAX as u32), ..base.clone() }.validate(),
            Ok(())
        );
        assert_eq!(RunConfig { generations: 0, ..base }.validate(), Ok(()));
    }

    #[test]
    fn seed_range() {
        assert_eq!(check_seed(0), Ok(0));
        assert_eq!(check_seed(1_142_650_635), Ok(1_142_650_635));
        assert_eq!(check_seed(2_147_483_646), Ok(2_147_483_646));
        assert_eq!(check_seed(2_147_483_647), Ok(2_147_483_647));
        assert_eq!(
            check_seed(2_147_483_648),
            Err(ConfigError::SeedOutOfRange(2_147_483_648))
        );
        assert!(check_seed(1 << 40).is_err());
    }

    #[test]
    fn settings_roundtrip_and_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        assert_eq!(load_settings(&path), Settings::default());

        let s = Settings {
            width: 320,
            generations: 3,
            color_model: ColorModel::PreviewAll,
            shape: Shape::RoundRectangle,
            ..Settings::default()
        };
        save_settings_atomic(&path, &s).unwrap();
        assert_eq!(load_settings(&path), s);
        save_settings_atomic(&path, &Settings::default()).unwrap();
        assert_eq!(load_settings(&path), Settings::default());

        fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_settings(&path), Settings::default());
    }

    #[test_log::test]
    fn out_of_range_settings_fall_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        fs::write(&path, r#"{"width": 0, "generations": 99}"#).unwrap();
        assert_eq!(load_settings(&path), Settings::default());

        fs::write(&path, r#"{"generations": 21}"#).unwrap();
        assert_eq!(load_settings(&path), Settings::default());

        fs::write(&path, r#"{"fps_cap": 0}"#).unwrap();
        assert_eq!(load_settings(&path), Settings::default());

        // the cap itself is still accepted
        fs::write(&path, r#"{"generations": 20}"#).unwrap();
        assert_eq!(load_settings(&path).generations, 20);
    }

    #[test]
    fn settings_validate() {
        assert_eq!(Settings::default().validate(), Ok(()));
        let s = Settings {
            height: 0,
            ..Settings::default()
        };
        assert_eq!(s.validate(), Err(ConfigError::ZeroHeight));
        let s = Settings {
            fps_cap: 0,
            ..Settings::default()
        };
        assert_eq!(s.validate(), Err(ConfigError::ZeroFrameCap));
    }

    #[test]
    fn unreadable_settings_fall_back() {
        // a directory in place of the file is a read error other than NotFound
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_settings(dir.path()), Settings::default());
    }

    #[test]
    fn settings_feed_run_config() {
        let s = Settings {
            generations: 4,
            ..Settings::default()
        };
        let cfg = s.run_config(Some(7));
        assert_eq!((cfg.width, cfg.height, cfg.generations, cfg.seed), (640, 480, 4, Some(7)));
        assert_eq!(s.run_config(None).validate(), Ok(()));
        assert_eq!(s.shape_config().shape, Shape::Circle);
    }

    #[test]
    fn partial_settings_fill_defaults() {
        let s: Settings = serde_json::from_str(r#"{"width": 100, "color_model": "Monochrome"}"#).unwrap();
        assert_eq!(s.width, 100);
        assert_eq!(s.color_model, ColorModel::Monochrome);
        assert_eq!(s.height, Settings::default().height);
    }
}
