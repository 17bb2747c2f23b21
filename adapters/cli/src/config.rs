//! Loading simulation settings from TOML and applying command-line overrides.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use pylon_defence_core::Viewport;
use pylon_defence_simulation::SimulationConfig;
use thiserror::Error;

/// Failures while turning a settings file into a [`SimulationConfig`].
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file {}", path.display())]
    Read {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The file is not a valid settings document.
    #[error("invalid config file contents")]
    Parse(#[from] toml::de::Error),
}

/// Reads and parses the settings file at `path`.
pub(crate) fn load(path: &Path) -> Result<SimulationConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&text)
}

/// Parses a settings document. Missing keys keep their defaults.
pub(crate) fn parse(text: &str) -> Result<SimulationConfig, ConfigError> {
    Ok(toml::from_str(text)?)
}

/// Values given on the command line that win over the settings file.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Overrides {
    pub(crate) seed: Option<u64>,
    pub(crate) width: Option<u32>,
    pub(crate) height: Option<u32>,
    pub(crate) spawn_interval_ms: Option<u64>,
}

impl Overrides {
    pub(crate) fn apply(self, config: &mut SimulationConfig) {
        if let Some(seed) = self.seed {
            config.rng_seed = seed;
        }
        if let Some(interval) = self.spawn_interval_ms {
            config.spawn_interval_ms = interval;
        }
        config.viewport = Viewport::new(
            self.width.unwrap_or(config.viewport.width()),
            self.height.unwrap_or(config.viewport.height()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = parse("").expect("empty config is valid");
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn partial_tables_keep_remaining_defaults() {
        let config = parse(
            r#"
            rng_seed = 7
            spawn_interval_ms = 250

            [viewport]
            width = 800

            [defender]
            range = 120.0
            "#,
        )
        .expect("valid config");

        assert_eq!(config.rng_seed, 7);
        assert_eq!(config.spawn_interval_ms, 250);
        assert_eq!(config.viewport, Viewport::new(800, 1_000));
        assert_eq!(config.defender.range, 120.0);
        assert_eq!(config.defender.damage, 10);
        assert_eq!(config.hostile.max_health, 100);
        assert!(config.spawning_enabled);
    }

    #[test]
    fn mistyped_values_are_rejected() {
        let error = parse("rng_seed = \"seven\"").expect_err("string seed must fail");
        assert!(matches!(error, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_its_path() {
        let path = Path::new("definitely/not/here/pylon-defence.toml");
        let error = load(path).expect_err("missing file must fail");

        let ConfigError::Read { path: reported, .. } = &error else {
            panic!("expected a read error, got {error:?}");
        };
        assert_eq!(reported, path);
        assert!(error.to_string().contains("pylon-defence.toml"));
    }

    #[test]
    fn overrides_win_over_file_values() {
        let source = "rng_seed = 7\n[viewport]\nwidth = 800\nheight = 600";
        let mut config = parse(source).expect("valid config");

        Overrides {
            seed: Some(42),
            height: Some(400),
            ..Overrides::default()
        }
        .apply(&mut config);

        assert_eq!(config.rng_seed, 42);
        assert_eq!(config.viewport, Viewport::new(800, 400));
        assert_eq!(config.spawn_interval_ms, 1_000);
    }
}
