use crate::error::{Result, ShowError};
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_TEXT: &str = "HAPPY BIRTHDAY";

/// Tunables for one show. Everything is optional in the TOML file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShowConfig {
    /// Text spelled out by the firework bursts, one glyph per particle.
    pub text: String,
    pub seed: Option<u64>,
    /// Interpret per-glyph burst angles as degrees fed to radian trig, like the old web version.
    pub legacy_burst_angles: bool,
    pub star_count: usize,
    pub initial_flowers: usize,
    pub launch: LaunchTrigger,
    pub flowers: FlowerTrigger,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LaunchTrigger {
    pub interval_ms: f64,
    pub probability: f32,
    pub super_probability: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FlowerTrigger {
    pub interval_ms: f64,
    pub probability: f32,
    pub ceiling: usize,
}

impl Default for ShowConfig {
    fn default() -> Self {
        Self {
            text: DEFAULT_TEXT.to_string(),
            seed: None,
            legacy_burst_angles: false,
            star_count: 50,
            initial_flowers: 10,
            launch: LaunchTrigger::default(),
            flowers: FlowerTrigger::default(),
        }
    }
}

impl Default for LaunchTrigger {
    fn default() -> Self {
        Self {
            interval_ms: 2000.0,
            probability: 0.4,
            super_probability: 0.2,
        }
    }
}

impl Default for FlowerTrigger {
    fn default() -> Self {
        Self {
            interval_ms: 3500.0,
            probability: 0.3,
            ceiling: 25,
        }
    }
}

impl ShowConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| ShowError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content)?;
        tracing::info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        check_probability("launch.probability", self.launch.probability)?;
        check_probability("launch.super_probability", self.launch.super_probability)?;
        check_probability("flowers.probability", self.flowers.probability)?;
        check_interval("launch.interval_ms", self.launch.interval_ms)?;
        check_interval("flowers.interval_ms", self.flowers.interval_ms)?;
        Ok(())
    }

    pub fn glyphs(&self) -> Vec<char> {
        self.text.chars().collect()
    }
}

fn check_probability(name: &str, value: f32) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ShowError::InvalidConfig(format!(
            "{name} must be within 0..=1, got {value}"
        )))
    }
}

fn check_interval(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ShowError::InvalidConfig(format!(
            "{name} must be a positive number of milliseconds, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = ShowConfig::from_toml("").unwrap();
        assert_eq!(config, ShowConfig::default());
        assert_eq!(config.flowers.ceiling, 25);
        assert_eq!(config.launch.interval_ms, 2000.0);
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let config = ShowConfig::from_toml(
            r#"
            text = "Hi"
            seed = 7

            [flowers]
            ceiling = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.text, "Hi");
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.flowers.ceiling, 3);
        assert_eq!(config.flowers.interval_ms, 3500.0);
        assert_eq!(config.launch, LaunchTrigger::default());
    }

    #[test]
    fn rejects_out_of_range_probability() {
        let err = ShowConfig::from_toml("[launch]\nprobability = 1.5").unwrap_err();
        assert!(matches!(err, ShowError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_zero_interval() {
        let err = ShowConfig::from_toml("[flowers]\ninterval_ms = 0.0").unwrap_err();
        assert!(matches!(err, ShowError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = ShowConfig::from_toml("colour = 3").unwrap_err();
        assert!(matches!(err, ShowError::ConfigParse(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let path = std::env::temp_dir().join("skyshow-does-not-exist.toml");
        let err = ShowConfig::load(&path).unwrap_err();
        assert!(matches!(err, ShowError::ConfigRead { .. }));
    }

    #[test]
    fn load_reads_file() {
        let path = std::env::temp_dir().join(format!("skyshow-config-{}.toml", std::process::id()));
        fs::write(&path, "star_count = 12\nlegacy_burst_angles = true\n").unwrap();
        let config = ShowConfig::load(&path).unwrap();
        fs::remove_file(&path).ok();
        assert_eq!(config.star_count, 12);
        assert!(config.legacy_burst_angles);
    }

    #[test]
    fn glyphs_split_on_chars() {
        let config = ShowConfig {
            text: "Ab 2".to_string(),
            ..ShowConfig::default()
        };
        assert_eq!(config.glyphs(), vec!['A', 'b', ' ', '2']);
    }
}
