//! Configuration capability of the Lorenz model.

use crate::config::{
    ConfigOverrides, ConfigValue, LorenzConfig, CLEANUP_FILE_NAME, CONFIG_FILE_NAME, LORENZ_PARAMS,
    LORENZ_STATES,
};
use crate::errors::{LorenzError, LorenzResult};
use crate::forcing::LorenzForcing;
use log::{debug, warn};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A configuration artifact that was already gone when cleaning up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupWarning {
    ConfigFileMissing(PathBuf),
    ConfigDirMissing(PathBuf),
}

impl fmt::Display for CleanupWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CleanupWarning::ConfigFileMissing(path) => {
                write!(f, "Config not found at {}, removed by user?", path.display())
            }
            CleanupWarning::ConfigDirMissing(path) => {
                write!(f, "Config folder not found at {}", path.display())
            }
        }
    }
}

/// Translates forcing and overrides into the configuration read by the model process
///
/// Parameters and states exposed here are the *initial* values written to the
/// configuration file, not the live values inside the running model.
#[derive(Debug, Clone)]
pub struct LorenzMethods {
    forcing: LorenzForcing,
    config: LorenzConfig,
    cfg_dir: Option<PathBuf>,
}

impl LorenzMethods {
    pub fn new(forcing: LorenzForcing) -> Self {
        Self {
            forcing,
            config: LorenzConfig::default(),
            cfg_dir: None,
        }
    }

    pub fn forcing(&self) -> &LorenzForcing {
        &self.forcing
    }

    pub fn config(&self) -> &LorenzConfig {
        &self.config
    }

    pub fn cfg_dir(&self) -> Option<&Path> {
        self.cfg_dir.as_deref()
    }

    /// Assign the working directory the configuration file is written to
    ///
    /// The directory is not created.
    pub fn set_cfg_dir(&mut self, cfg_dir: impl Into<PathBuf>) {
        self.cfg_dir = Some(cfg_dir.into());
    }

    /// Path of the configuration file inside the working directory
    pub fn config_file(&self) -> LorenzResult<PathBuf> {
        Ok(self.require_cfg_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Write the model configuration file
    ///
    /// `F` and `dt` always come from the forcing and the run period is expressed relative
    /// to the forcing start, in days. `overrides` are applied last, in order.
    /// A non-finite `F` or `dt` is rejected, as JSON has no representation for it.
    pub fn make_cfg_file(&mut self, overrides: &ConfigOverrides) -> LorenzResult<PathBuf> {
        let config_file = self.config_file()?;
        self.forcing.validate()?;
        let end_time = self.forcing.span_in_days()?;

        self.config.set("F", self.forcing.f);
        self.config.set("dt", self.forcing.dt);
        self.config.set("start_time", 0);
        self.config.set("end_time", end_time);
        self.config.apply(overrides);

        self.config.write(&config_file)?;
        debug!("Wrote Lorenz configuration to {}", config_file.display());
        Ok(config_file)
    }

    /// The initial parameters of the model (`J`, the number of variables)
    pub fn parameters(&self) -> Vec<(String, ConfigValue)> {
        self.config.view(&LORENZ_PARAMS)
    }

    /// The initial states of the model (`start_state`, the starting vector)
    pub fn states(&self) -> Vec<(String, ConfigValue)> {
        self.config.view(&LORENZ_STATES)
    }

    /// Remove [`CLEANUP_FILE_NAME`] and then the working directory
    ///
    /// Artifacts that no longer exist are reported as warnings. Any other failure,
    /// such as a directory that still holds other files, is returned as an error.
    /// The file written by [`LorenzMethods::make_cfg_file`] has a differently cased name,
    /// so on a case-sensitive filesystem it is left in place and removing the directory fails.
    pub fn remove_config_artifacts(&self) -> LorenzResult<Vec<CleanupWarning>> {
        let cfg_dir = self.require_cfg_dir()?;
        let config_file = cfg_dir.join(CLEANUP_FILE_NAME);
        let mut warnings = Vec::new();

        if is_missing(fs::remove_file(&config_file))? {
            warnings.push(CleanupWarning::ConfigFileMissing(config_file));
        }
        if is_missing(fs::remove_dir(cfg_dir))? {
            warnings.push(CleanupWarning::ConfigDirMissing(cfg_dir.to_path_buf()));
        }

        for warning in &warnings {
            warn!("{}", warning);
        }
        Ok(warnings)
    }

    fn require_cfg_dir(&self) -> LorenzResult<&Path> {
        self.cfg_dir.as_deref().ok_or(LorenzError::NotSetUp)
    }
}

/// Map a removal result to whether the target was already missing
fn is_missing(result: io::Result<()>) -> LorenzResult<bool> {
    match result {
        Ok(()) => Ok(false),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(true),
        Err(e) => Err(e.into()),
    }
}
