use std::path::Path;

use config::{Config, Environment, File, FileFormat};
use serde_derive::{Deserialize, Serialize};

use crate::collage::DetectorOptions;
use crate::{Error, Result};

/// Knobs for cutting tiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollageConfig {
    /// Tiles cut from eyes, nose, mouth and cheeks.
    pub default_tiles: usize,
    /// Tiles cut from forehead, chin, jawline and temples.
    pub emphasized_tiles: usize,
    pub scale_min: f64,
    pub scale_span: f64,
    /// Width of the window, in pixels, that tiles are shifted within on each axis.
    pub jitter: f64,
    pub detector: DetectorOptions
}

impl Default for CollageConfig {
    fn default() -> Self {
        Self {
            default_tiles: 3,
            emphasized_tiles: 5,
            scale_min: 0.6,
            scale_span: 0.5,
            jitter: 40.0,
            detector: DetectorOptions::default()
        }
    }
}

impl CollageConfig {
    /// Load from an optional JSON file, then `COLLAGE_*` environment variables.
    ///
    /// Nested keys use `__`, e.g. `COLLAGE_DETECTOR__MAX_FACES=1`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Json).required(true));
        }

        let config: CollageConfig = builder
            .add_source(Environment::with_prefix("COLLAGE").prefix_separator("_").separator("__").try_parsing(true))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: CollageConfig = Config::builder()
            .add_source(File::from_str(json, FileFormat::Json))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|err| Error::InvalidConfig(err.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        let non_negative = |name: &str, value: f64| {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(Error::InvalidConfig(format!("{} must be a finite, non-negative number, got {}", name, value)))
            }
        };

        non_negative("scale_min", self.scale_min)?;
        non_negative("scale_span", self.scale_span)?;
        non_negative("jitter", self.jitter)?;

        if self.detector.max_faces == 0 {
            return Err(Error::InvalidConfig("detector.max_faces must be at least 1".into()));
        }

        for &(name, value) in &[
            ("detector.min_detection_confidence", self.detector.min_detection_confidence),
            ("detector.min_tracking_confidence", self.detector.min_tracking_confidence)
        ] {
            if !(0.0 ..= 1.0).contains(&value) {
                return Err(Error::InvalidConfig(format!("{} must be within [0, 1], got {}", name, value)));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = CollageConfig::default();
        assert_eq!(config.default_tiles, 3);
        assert_eq!(config.emphasized_tiles, 5);
        assert_eq!(config.jitter, 40.0);
        assert_eq!(config.detector.max_faces, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = CollageConfig::from_json(r#"{ "jitter": 10.0, "detector": { "refine_landmarks": false } }"#).unwrap();
        assert_eq!(config.jitter, 10.0);
        assert_eq!(config.scale_min, 0.6);
        assert!(!config.detector.refine_landmarks);
        assert_eq!(config.detector.min_detection_confidence, 0.5);
    }

    #[test]
    fn rejects_negative_jitter() {
        assert!(matches!(CollageConfig::from_json(r#"{ "jitter": -1.0 }"#), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn rejects_zero_faces() {
        let mut config = CollageConfig::default();
        config.detector.max_faces = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn json_round_trip() {
        let config = CollageConfig {
            emphasized_tiles: 8,
            ..CollageConfig::default()
        };
        assert_eq!(CollageConfig::from_json(&config.to_json().unwrap()).unwrap(), config);
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{ "default_tiles": 2 }}"#).unwrap();

        let config = CollageConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.default_tiles, 2);
        assert_eq!(config.emphasized_tiles, 5);
    }

    // The only test that touches COLLAGE_* variables; the keys it sets are not read elsewhere.
    #[test]
    fn environment_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{ "jitter": 10.0, "detector": {{ "max_faces": 1, "refine_landmarks": false }} }}"#).unwrap();

        std::env::set_var("COLLAGE_JITTER", "12.5");
        std::env::set_var("COLLAGE_DETECTOR__MAX_FACES", "2");
        let loaded = CollageConfig::load(Some(file.path()));
        std::env::remove_var("COLLAGE_JITTER");
        std::env::remove_var("COLLAGE_DETECTOR__MAX_FACES");

        let config = loaded.unwrap();
        assert_eq!(config.jitter, 12.5);
        assert_eq!(config.detector.max_faces, 2);
        assert!(!config.detector.refine_landmarks);
        assert_eq!(config.default_tiles, 3);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(CollageConfig::load(Some(dir.path().join("nope.json").as_path())).is_err());
    }
}
