use std::path::Path;

use serde::Deserialize;

use crate::error::Error;

/// Sample capacity reserved per second of runtime, per CPU.
pub const SAMPLES_PER_SECOND: usize = 1 << 16;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Observation window in seconds.
    pub runtime: u64,
    /// Jitter threshold in nanoseconds; `None` means calibrate.
    pub threshold_ns: Option<u64>,
    /// Per-CPU sample capacity; `None` derives it from `runtime`.
    pub samples: Option<usize>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            runtime: 5,
            threshold_ns: None,
            samples: None,
        }
    }
}

impl RunConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if self.threshold_ns == Some(0) {
            return Err(Error::InvalidArgs(
                "threshold must be greater than 0 (0 would record every clock read as a hiccup)"
                    .into(),
            ));
        }
        Ok(())
    }

    pub fn sample_capacity(&self) -> usize {
        self.samples
            .unwrap_or_else(|| (self.runtime as usize).saturating_mul(SAMPLES_PER_SECOND))
    }

    pub fn runtime_ns(&self) -> u64 {
        self.runtime.saturating_mul(1_000_000_000)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub run: RunConfig,
}

/// Load configuration from a TOML file.
///
/// - If `explicit_path` is `Some` and the file is missing, returns `Error::ConfigNotFound`.
/// - A file that exists but cannot be read or parsed is `Error::InvalidArgs`.
/// - If `explicit_path` is `None`, tries `/etc/hiccups.toml`; if missing, returns defaults.
pub fn load_config(explicit_path: Option<&Path>) -> Result<Config, Error> {
    let path = match explicit_path {
        Some(p) => {
            if !p.exists() {
                return Err(Error::ConfigNotFound(p.to_path_buf()));
            }
            p.to_path_buf()
        }
        None => {
            let default = Path::new("/etc/hiccups.toml");
            if !default.exists() {
                return Ok(Config::default());
            }
            default.to_path_buf()
        }
    };

    let contents = std::fs::read_to_string(&path).map_err(|e| {
        Error::InvalidArgs(format!("failed to read config {}: {}", path.display(), e))
    })?;

    let config: Config = toml::from_str(&contents).map_err(|e| {
        Error::InvalidArgs(format!("failed to parse config {}: {}", path.display(), e))
    })?;

    Ok(config)
}
