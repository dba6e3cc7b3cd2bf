use std::path::Path;

use anyhow::Context;
use log::debug;
use serde::{Deserialize, Serialize};
use walker::util::{Classifier, Palette};
use walker::SolverConfig;

/// Settings of the command line tool, read from an optional JSON file.
/// Any key left out keeps its default.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub solver: SolverConfig,
    pub palette: Palette,
    pub classifier: Classifier,
    /// Side of the pixel block one cell occupies in the input bitmap
    pub input_ratio: u32,
    /// Side of the pixel block one cell is drawn as in the output bitmap
    pub ratio: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            solver: SolverConfig::default(),
            palette: Palette::default(),
            classifier: Classifier::default(),
            input_ratio: 1,
            ratio: 1,
        }
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self, anyhow::Error> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        debug!("loading config from {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self, anyhow::Error> {
        let config: Config = serde_json::from_str(text)?;
        anyhow::ensure!(config.solver.workers > 0, "solver.workers must be at least 1");
        anyhow::ensure!(config.ratio > 0, "ratio must be at least 1");
        anyhow::ensure!(config.input_ratio > 0, "input_ratio must be at least 1");
        Ok(config)
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn test_empty_config() {
        assert_eq!(Config::from_json("{}").unwrap(), Config::default());
        assert_eq!(Config::default().solver.workers, 10);
    }

    #[test]
    fn test_partial_config() {
        let config = Config::from_json(
            r#"{
                "solver": { "workers": 3 },
                "palette": { "wall": [10, 20, 30] },
                "classifier": "threshold",
                "ratio": 4
            }"#,
        )
        .unwrap();

        assert_eq!(config.solver.workers, 3);
        assert_eq!(config.palette.wall, [10, 20, 30]);
        assert_eq!(config.palette.path, Palette::default().path);
        assert_eq!(config.classifier, Classifier::Threshold);
        assert_eq!(config.ratio, 4);
        assert_eq!(config.input_ratio, 1);
    }

    #[test]
    fn test_invalid_config() {
        assert!(Config::from_json(r#"{ "solver": { "workers": 0 } }"#).is_err());
        assert!(Config::from_json(r#"{ "ratio": 0 }"#).is_err());
        assert!(Config::from_json(r#"{ "classifier": "fuzzy" }"#).is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(Config::load(Some(Path::new("/nonexistent/maze-walker.json"))).is_err());
        assert_eq!(Config::load(None).unwrap(), Config::default());
    }
}
