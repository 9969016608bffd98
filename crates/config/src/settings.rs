// Application settings
// Loaded from --config, else ~/.config/moodgrid/config.toml, else defaults

use std::fs;
use std::path::{Path, PathBuf};

use moodgrid_analysis::{AnalysisPolicy, ColumnMapping, MomentFilter, SourcePolicy};
use moodgrid_io::workbook::{
    DEFAULT_FIRST_INDEX, DEFAULT_PARTICIPANTS, DEFAULT_QUESTIONNAIRE_SUFFIX,
};
use moodgrid_io::{SheetEntry, SheetLayout};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", .path.display())]
    Read { path: PathBuf, source: std::io::Error },
    #[error("config parse error: {0}")]
    Parse(String),
    #[error("config validation error: {0}")]
    Invalid(String),
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Sheet layout. `entries`, when present, replaces the participant pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetsConfig {
    pub participants: Vec<String>,
    pub first_index: usize,
    pub questionnaire_suffix: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entries: Option<Vec<SheetEntry>>,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            participants: DEFAULT_PARTICIPANTS.iter().map(|p| p.to_string()).collect(),
            first_index: DEFAULT_FIRST_INDEX,
            questionnaire_suffix: DEFAULT_QUESTIONNAIRE_SUFFIX.to_string(),
            entries: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Cause value counted as internal; exact match.
    pub internal_label: String,
    /// Drop moments with score <= 0 unless overridden on the command line.
    pub positive_only: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            internal_label: SourcePolicy::default().internal_label,
            positive_only: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sheets: SheetsConfig,
    pub columns: ColumnMapping,
    pub policy: PolicyConfig,
}

/// Where the effective config came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Explicit(PathBuf),
    UserDefault(PathBuf),
    BuiltIn,
}

impl Config {
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.policy.internal_label.is_empty() {
            return Err(ConfigError::Invalid("policy.internal_label must not be empty".into()));
        }

        let columns = [
            ("date", &self.columns.date),
            ("score", &self.columns.score),
            ("cause", &self.columns.cause),
            ("reason_and_word", &self.columns.reason_and_word),
        ];
        for (key, value) in columns {
            if value.is_empty() {
                return Err(ConfigError::Invalid(format!("columns.{key} must not be empty")));
            }
        }

        let layout = self.layout();
        if layout.sheets.is_empty() {
            return Err(ConfigError::Invalid("sheet layout names no sheets".into()));
        }
        for (i, entry) in layout.sheets.iter().enumerate() {
            if entry.name.is_empty() {
                return Err(ConfigError::Invalid(format!("sheet at index {} has an empty name", entry.index)));
            }
            if layout.sheets[..i].iter().any(|e| e.name == entry.name) {
                return Err(ConfigError::Invalid(format!("duplicate sheet name '{}'", entry.name)));
            }
        }

        Ok(())
    }

    /// Get the default config file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("moodgrid")
            .join("config.toml")
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    /// Explicit path (must exist), else the user default if present, else
    /// built-in defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<(Self, ConfigSource), ConfigError> {
        Self::resolve_with_default(explicit, &Self::config_path())
    }

    pub fn resolve_with_default(
        explicit: Option<&Path>,
        default_path: &Path,
    ) -> Result<(Self, ConfigSource), ConfigError> {
        if let Some(path) = explicit {
            debug!(path = %path.display(), "loading config");
            return Ok((Self::load(path)?, ConfigSource::Explicit(path.to_path_buf())));
        }
        if default_path.exists() {
            debug!(path = %default_path.display(), "loading user config");
            return Ok((Self::load(default_path)?, ConfigSource::UserDefault(default_path.to_path_buf())));
        }
        Ok((Self::default(), ConfigSource::BuiltIn))
    }

    pub fn layout(&self) -> SheetLayout {
        match &self.sheets.entries {
            Some(entries) => SheetLayout { sheets: entries.clone() },
            None => SheetLayout::paired(
                self.sheets.participants.as_slice(),
                self.sheets.first_index,
                &self.sheets.questionnaire_suffix,
            ),
        }
    }

    /// Policy with the configured filter; the CLI may override it.
    pub fn analysis_policy(&self) -> AnalysisPolicy {
        AnalysisPolicy {
            source: SourcePolicy { internal_label: self.policy.internal_label.clone() },
            filter: MomentFilter::from_positive_only(self.policy.positive_only),
            ..Default::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.layout(), SheetLayout::default());
        assert_eq!(config.analysis_policy(), AnalysisPolicy::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = Config::from_toml(
            r#"
[sheets]
participants = ["ana"]
first_index = 2

[policy]
internal_label = "Me"
positive_only = false
"#,
        )
        .unwrap();
        let names: Vec<_> = config.layout().sheets.into_iter().map(|s| (s.name, s.index)).collect();
        assert_eq!(names, vec![("ana".to_string(), 2), ("anaPANAS".to_string(), 3)]);
        assert_eq!(config.columns, ColumnMapping::default());
        let policy = config.analysis_policy();
        assert_eq!(policy.source.internal_label, "Me");
        assert_eq!(policy.filter, MomentFilter::All);
    }

    #[test]
    fn explicit_entries_replace_pairing() {
        let config = Config::from_toml(
            r#"
[[sheets.entries]]
name = "solo"
index = 0
"#,
        )
        .unwrap();
        assert_eq!(config.layout().sheets, vec![SheetEntry { name: "solo".into(), index: 0 }]);
    }

    #[test]
    fn custom_columns() {
        let config = Config::from_toml(
            r#"
[columns]
score = "Score"
"#,
        )
        .unwrap();
        assert_eq!(config.columns.score, "Score");
        assert_eq!(config.columns.date, "Date (dd/mm/yy)");
    }

    #[test]
    fn reject_duplicate_sheet_names() {
        let err = Config::from_toml(
            r#"
[[sheets.entries]]
name = "a"
index = 1
[[sheets.entries]]
name = "a"
index = 2
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate sheet name 'a'"));
    }

    #[test]
    fn reject_empty_label() {
        let err = Config::from_toml("[policy]\ninternal_label = \"\"\n").unwrap_err();
        assert!(err.to_string().contains("internal_label"));
    }

    #[test]
    fn reject_unknown_types() {
        let err = Config::from_toml("[sheets]\nfirst_index = \"one\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn toml_round_trip_of_defaults() {
        let text = Config::default().to_toml().unwrap();
        assert_eq!(Config::from_toml(&text).unwrap(), Config::default());
    }

    #[test]
    fn resolve_prefers_explicit_then_user_then_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let user = dir.path().join("config.toml");

        let (_, source) = Config::resolve_with_default(None, &user).unwrap();
        assert_eq!(source, ConfigSource::BuiltIn);

        fs::write(&user, "[policy]\ninternal_label = \"Me\"\n").unwrap();
        let (config, source) = Config::resolve_with_default(None, &user).unwrap();
        assert_eq!(source, ConfigSource::UserDefault(user.clone()));
        assert_eq!(config.policy.internal_label, "Me");

        let explicit = dir.path().join("other.toml");
        fs::write(&explicit, "").unwrap();
        let (config, source) = Config::resolve_with_default(Some(&explicit), &user).unwrap();
        assert_eq!(source, ConfigSource::Explicit(explicit.clone()));
        assert_eq!(config.policy.internal_label, "Self");

        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            Config::resolve_with_default(Some(&missing), &user),
            Err(ConfigError::Read { .. })
        ));
    }
}
