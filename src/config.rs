use std::{fs::read_to_string, path::Path, path::PathBuf};

use anyhow::{anyhow, Context};
use serde::Deserialize;

pub const DEFAULT_INPUT_PATH: &str = "deserts.geojson";
pub const DEFAULT_OUTER_PATH: &str = "outer-deserts.geojson";
pub const DEFAULT_INNER_PATH: &str = "inner-deserts.geojson";
pub const DEFAULT_SCALE_DISTANCE_KM: f64 = 30.0;
/// Interpolation steps per quarter circle used when rounding buffered corners.
pub const DEFAULT_BUFFER_STEPS: u32 = 8;

/// Settings for one scaling run. Built once in `main` and handed to each stage.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub input_path: PathBuf,
    pub outer_path: PathBuf,
    pub inner_path: PathBuf,
    pub scale_distance_km: f64,
    pub buffer_steps: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT_PATH),
            outer_path: PathBuf::from(DEFAULT_OUTER_PATH),
            inner_path: PathBuf::from(DEFAULT_INNER_PATH),
            scale_distance_km: DEFAULT_SCALE_DISTANCE_KM,
            buffer_steps: DEFAULT_BUFFER_STEPS,
        }
    }
}

/// Values given on the command line. Each one that is set replaces the value from the config file.
#[derive(Debug, Default)]
pub struct ConfigOverrides {
    pub input_path: Option<PathBuf>,
    pub outer_path: Option<PathBuf>,
    pub inner_path: Option<PathBuf>,
    pub scale_distance_km: Option<f64>,
}

impl Config {
    pub fn from_yaml(contents: &str) -> anyhow::Result<Self> {
        // An empty document deserializes to unit, not to a map of defaults.
        if contents.trim().is_empty() {
            return Ok(Config::default());
        }
        let config: Config = serde_yaml::from_str(contents)?;
        Ok(config)
    }

    pub fn apply_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(input_path) = overrides.input_path {
            self.input_path = input_path;
        }
        if let Some(outer_path) = overrides.outer_path {
            self.outer_path = outer_path;
        }
        if let Some(inner_path) = overrides.inner_path {
            self.inner_path = inner_path;
        }
        if let Some(scale_distance_km) = overrides.scale_distance_km {
            self.scale_distance_km = scale_distance_km;
        }
        self
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.scale_distance_km.is_finite() || self.scale_distance_km <= 0.0 {
            return Err(anyhow!(
                "Scale distance must be a positive number of kilometers, got {}",
                self.scale_distance_km
            ));
        }
        if self.buffer_steps == 0 {
            return Err(anyhow!("Buffer steps must be at least 1"));
        }
        if self.outer_path == self.inner_path {
            return Err(anyhow!(
                "Outer and inner output paths must differ, both are {:?}",
                self.outer_path
            ));
        }
        Ok(())
    }
}

/// Build the run configuration from an optional YAML file plus command line overrides.
pub fn load_config(
    config_filepath: Option<&Path>,
    overrides: ConfigOverrides,
) -> anyhow::Result<Config> {
    let config = match config_filepath {
        Some(filepath) => {
            if !filepath.exists() {
                return Err(anyhow!("Config file {:?} not found", filepath));
            }
            let contents = read_to_string(filepath)
                .with_context(|| format!("Reading config file {:?}", filepath))?;
            Config::from_yaml(&contents)
                .with_context(|| format!("Parsing config file {:?}", filepath))?
        }
        None => Config::default(),
    };
    let config = config.apply_overrides(overrides);
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf};

    use rstest::rstest;
    use testdir::testdir;

    use super::{load_config, Config, ConfigOverrides};

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(PathBuf::from("deserts.geojson"), config.input_path);
        assert_eq!(PathBuf::from("outer-deserts.geojson"), config.outer_path);
        assert_eq!(PathBuf::from("inner-deserts.geojson"), config.inner_path);
        assert_eq!(30.0, config.scale_distance_km);
        assert_eq!(8, config.buffer_steps);
    }

    #[test]
    fn test_partial_yaml_falls_back_to_defaults() {
        let config = Config::from_yaml("input_path: data/sahara.geojson\nscale_distance_km: 12.5\n")
            .unwrap();
        assert_eq!(PathBuf::from("data/sahara.geojson"), config.input_path);
        assert_eq!(12.5, config.scale_distance_km);
        assert_eq!(Config::default().outer_path, config.outer_path);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        assert!(Config::from_yaml("scale_distance: 10\n").is_err());
    }

    #[rstest]
    #[case(0.0)]
    #[case(-30.0)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn test_invalid_distance_is_rejected(#[case] distance: f64) {
        let config = Config {
            scale_distance_km: distance,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_identical_output_paths_are_rejected() {
        let config = Config {
            inner_path: PathBuf::from("out.geojson"),
            outer_path: PathBuf::from("out.geojson"),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_config_applies_overrides_over_file() {
        let test_dir = testdir!();
        let config_filepath = test_dir.join("config.yaml");
        fs::write(
            &config_filepath,
            "outer_path: file-outer.geojson\nscale_distance_km: 5\n",
        )
        .unwrap();

        let config = load_config(
            Some(config_filepath.as_path()),
            ConfigOverrides {
                scale_distance_km: Some(50.0),
                ..ConfigOverrides::default()
            },
        )
        .unwrap();

        assert_eq!(PathBuf::from("file-outer.geojson"), config.outer_path);
        assert_eq!(50.0, config.scale_distance_km);
    }

    #[test]
    fn test_load_config_missing_file() {
        let test_dir = testdir!();
        let result = load_config(
            Some(test_dir.join("missing.yaml").as_path()),
            ConfigOverrides::default(),
        );
        assert!(result.is_err());
    }
}
