use serde::{Deserialize, Serialize};

use crate::error::ReconError;

pub const DEFAULT_FUZZY_THRESHOLD: u8 = 80;
pub const DEFAULT_DOMESTIC_NATIONALITY: &str = "BR";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Engine tunables. Every field has a default, so an empty TOML document is
/// a valid config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconConfig {
    /// Minimum fuzzy ratio (0–100) to accept a non-exact name match.
    pub fuzzy_threshold: u8,
    /// Nationality whose employees are assigned the language-B procedure code.
    pub domestic_nationality: String,
    /// Match requirements on the rayon pool. Output is identical either way.
    pub parallel: bool,
    pub columns: TeamColumns,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            domestic_nationality: DEFAULT_DOMESTIC_NATIONALITY.into(),
            parallel: true,
            columns: TeamColumns::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Team column headers
// ---------------------------------------------------------------------------

/// Header labels looked up by name in the team table. All other input
/// tables are read by position.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TeamColumns {
    /// Employee identifier (the e-learning login).
    pub identity: String,
    /// Combined "role A \n role B" label.
    pub position: String,
    pub nationality: String,
}

impl Default for TeamColumns {
    fn default() -> Self {
        Self {
            identity: "Unisea E-learning User".into(),
            position: "Position in Matrix".into(),
            nationality: "Nationality".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Layer a TOML document over `base`: keys the document sets win, every
    /// other key keeps `base`'s value. Unknown keys are still rejected.
    pub fn from_toml_over(base: &ReconConfig, input: &str) -> Result<Self, ReconError> {
        let parse = |e: toml::de::Error| ReconError::ConfigParse(e.to_string());
        let overrides: toml::Table = toml::from_str(input).map_err(parse)?;

        let mut merged = match toml::Value::try_from(base) {
            Ok(toml::Value::Table(table)) => table,
            Ok(_) => toml::Table::new(),
            Err(e) => return Err(ReconError::ConfigParse(e.to_string())),
        };
        merge_tables(&mut merged, overrides);

        let config: ReconConfig = toml::Value::Table(merged).try_into().map_err(parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.fuzzy_threshold > 100 {
            return Err(ReconError::ConfigValidation(format!(
                "fuzzy_threshold must be between 0 and 100, got {}",
                self.fuzzy_threshold
            )));
        }

        if self.domestic_nationality.trim().is_empty() {
            return Err(ReconError::ConfigValidation(
                "domestic_nationality must not be empty".into(),
            ));
        }

        for (field, value) in [
            ("identity", &self.columns.identity),
            ("position", &self.columns.position),
            ("nationality", &self.columns.nationality),
        ] {
            if value.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "columns.{field} must not be empty"
                )));
            }
        }

        Ok(())
    }

    /// True when `nationality` selects the language-B code.
    pub fn is_domestic(&self, nationality: Option<&str>) -> bool {
        nationality
            .map(|n| n.trim().eq_ignore_ascii_case(self.domestic_nationality.trim()))
            .unwrap_or(false)
    }
}

fn merge_tables(base: &mut toml::Table, overrides: toml::Table) {
    for (key, value) in overrides {
        if let (Some(toml::Value::Table(inner)), toml::Value::Table(nested)) =
            (base.get_mut(&key), &value)
        {
            merge_tables(inner, nested.clone());
            continue;
        }
        base.insert(key, value);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_defaults() {
        let config = ReconConfig::from_toml("").unwrap();
        assert_eq!(config.fuzzy_threshold, 80);
        assert_eq!(config.domestic_nationality, "BR");
        assert!(config.parallel);
        assert_eq!(config.columns.position, "Position in Matrix");
        assert_eq!(config.columns.identity, "Unisea E-learning User");
    }

    #[test]
    fn parse_overrides() {
        let input = r#"
fuzzy_threshold = 90
domestic_nationality = "PT"
parallel = false

[columns]
identity = "Login"
position = "Cargo"
"#;
        let config = ReconConfig::from_toml(input).unwrap();
        assert_eq!(config.fuzzy_threshold, 90);
        assert_eq!(config.domestic_nationality, "PT");
        assert!(!config.parallel);
        assert_eq!(config.columns.identity, "Login");
        assert_eq!(config.columns.position, "Cargo");
        assert_eq!(config.columns.nationality, "Nationality");
    }

    #[test]
    fn reject_threshold_above_100() {
        let err = ReconConfig::from_toml("fuzzy_threshold = 101").unwrap_err();
        assert!(err.to_string().contains("between 0 and 100"));
    }

    #[test]
    fn reject_negative_threshold() {
        let err = ReconConfig::from_toml("fuzzy_threshold = -1").unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }

    #[test]
    fn reject_blank_column() {
        let err = ReconConfig::from_toml("[columns]\nposition = \"  \"").unwrap_err();
        assert!(err.to_string().contains("columns.position"));
    }

    #[test]
    fn reject_unknown_key() {
        let err = ReconConfig::from_toml("fuzzy = 80").unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }

    #[test]
    fn layered_document_keeps_unset_base_keys() {
        let base = ReconConfig {
            fuzzy_threshold: 50,
            domestic_nationality: "PT".into(),
            ..Default::default()
        };

        let config = ReconConfig::from_toml_over(&base, "fuzzy_threshold = 95").unwrap();
        assert_eq!(config.fuzzy_threshold, 95);
        assert_eq!(config.domestic_nationality, "PT");

        let config = ReconConfig::from_toml_over(&base, "[columns]\nidentity = \"Login\"").unwrap();
        assert_eq!(config.fuzzy_threshold, 50);
        assert_eq!(config.columns.identity, "Login");
        assert_eq!(config.columns.position, "Position in Matrix");
    }

    #[test]
    fn layered_document_still_validates() {
        let base = ReconConfig::default();
        let err = ReconConfig::from_toml_over(&base, "fuzzy_threshold = 150").unwrap_err();
        assert!(matches!(err, ReconError::ConfigValidation(_)));
        let err = ReconConfig::from_toml_over(&base, "fuzzy = 80").unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }

    #[test]
    fn domestic_check_is_case_insensitive() {
        let config = ReconConfig::default();
        assert!(config.is_domestic(Some("br")));
        assert!(config.is_domestic(Some(" BR ")));
        assert!(!config.is_domestic(Some("US")));
        assert!(!config.is_domestic(None));
    }
}
