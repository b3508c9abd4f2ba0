use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Engine configuration: recognizer key aliases and gender canonicalization.
///
/// Every key source the normalizer will probe is enumerated here, so adding
/// support for a new provider spelling is a config change, not a code change.
/// The built-in defaults cover the known providers; a host may override any
/// table from TOML.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub aliases: AliasConfig,
    #[serde(default)]
    pub gender: GenderConfig,
}

// ---------------------------------------------------------------------------
// Alias tables
// ---------------------------------------------------------------------------

/// Per-target-field recognizer key aliases, tried in priority order.
/// First key present with a non-empty value wins.
#[derive(Debug, Clone, Deserialize)]
pub struct AliasConfig {
    #[serde(default = "d_last_name")]
    pub last_name: Vec<String>,
    #[serde(default = "d_first_name")]
    pub first_name: Vec<String>,
    #[serde(default = "d_middle_name")]
    pub middle_name: Vec<String>,
    #[serde(default = "d_birth_date")]
    pub birth_date: Vec<String>,
    #[serde(default = "d_gender")]
    pub gender: Vec<String>,
    /// `nationality` is listed after `citizenship` on purpose: it is the
    /// documented fallback key, not a peer.
    #[serde(default = "d_citizenship")]
    pub citizenship: Vec<String>,
    #[serde(default = "d_passport_series")]
    pub passport_series: Vec<String>,
    #[serde(default = "d_passport_number")]
    pub passport_number: Vec<String>,
    /// Keys under which providers report series+number as one digit string.
    #[serde(default = "d_passport_combined")]
    pub passport_combined: Vec<String>,
    #[serde(default = "d_passport_date")]
    pub passport_date: Vec<String>,
    #[serde(default = "d_passport_issuer")]
    pub passport_issuer: Vec<String>,
    #[serde(default = "d_passport_expiry_date")]
    pub passport_expiry_date: Vec<String>,
    #[serde(default = "d_patent_number")]
    pub patent_number: Vec<String>,
    #[serde(default = "d_patent_issue_date")]
    pub patent_issue_date: Vec<String>,
    #[serde(default = "d_kig")]
    pub kig: Vec<String>,
    #[serde(default = "d_kig_end_date")]
    pub kig_end_date: Vec<String>,
}

fn strings(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|k| k.to_string()).collect()
}

fn d_last_name() -> Vec<String> {
    strings(&["lastName", "last_name", "surname"])
}
fn d_first_name() -> Vec<String> {
    strings(&["firstName", "first_name", "givenName", "given_name"])
}
fn d_middle_name() -> Vec<String> {
    strings(&["middleName", "middle_name", "patronymic"])
}
fn d_birth_date() -> Vec<String> {
    strings(&["birthDate", "birth_date", "dateOfBirth", "dob"])
}
fn d_gender() -> Vec<String> {
    strings(&["gender", "sex"])
}
fn d_citizenship() -> Vec<String> {
    strings(&["citizenship", "nationality"])
}
fn d_passport_series() -> Vec<String> {
    strings(&["passportSeries", "passport_series", "series"])
}
fn d_passport_number() -> Vec<String> {
    strings(&["passportNumber", "passport_number", "number"])
}
fn d_passport_combined() -> Vec<String> {
    strings(&[
        "seriesAndNumber",
        "series_and_number",
        "passportSeriesNumber",
        "series_number",
    ])
}
fn d_passport_date() -> Vec<String> {
    strings(&["passportDate", "passport_date", "issueDate", "issue_date", "dateOfIssue"])
}
fn d_passport_issuer() -> Vec<String> {
    strings(&["passportIssuer", "passport_issuer", "issuedBy", "issued_by", "issuer"])
}
fn d_passport_expiry_date() -> Vec<String> {
    strings(&["passportExpiryDate", "passport_expiry_date", "expiryDate", "dateOfExpiry"])
}
fn d_patent_number() -> Vec<String> {
    strings(&["patentNumber", "patent_number"])
}
fn d_patent_issue_date() -> Vec<String> {
    strings(&["patentIssueDate", "patent_issue_date"])
}
fn d_kig() -> Vec<String> {
    strings(&["kig", "kigNumber", "kig_number"])
}
fn d_kig_end_date() -> Vec<String> {
    strings(&["kigEndDate", "kig_end_date", "kigExpiryDate"])
}

impl Default for AliasConfig {
    fn default() -> Self {
        Self {
            last_name: d_last_name(),
            first_name: d_first_name(),
            middle_name: d_middle_name(),
            birth_date: d_birth_date(),
            gender: d_gender(),
            citizenship: d_citizenship(),
            passport_series: d_passport_series(),
            passport_number: d_passport_number(),
            passport_combined: d_passport_combined(),
            passport_date: d_passport_date(),
            passport_issuer: d_passport_issuer(),
            passport_expiry_date: d_passport_expiry_date(),
            patent_number: d_patent_number(),
            patent_issue_date: d_patent_issue_date(),
            kig: d_kig(),
            kig_end_date: d_kig_end_date(),
        }
    }
}

impl AliasConfig {
    fn tables(&self) -> [(&'static str, &Vec<String>); 16] {
        [
            ("last_name", &self.last_name),
            ("first_name", &self.first_name),
            ("middle_name", &self.middle_name),
            ("birth_date", &self.birth_date),
            ("gender", &self.gender),
            ("citizenship", &self.citizenship),
            ("passport_series", &self.passport_series),
            ("passport_number", &self.passport_number),
            ("passport_combined", &self.passport_combined),
            ("passport_date", &self.passport_date),
            ("passport_issuer", &self.passport_issuer),
            ("passport_expiry_date", &self.passport_expiry_date),
            ("patent_number", &self.patent_number),
            ("patent_issue_date", &self.patent_issue_date),
            ("kig", &self.kig),
            ("kig_end_date", &self.kig_end_date),
        ]
    }
}

// ---------------------------------------------------------------------------
// Gender table
// ---------------------------------------------------------------------------

/// Spellings accepted for each canonical gender value.
#[derive(Debug, Clone, Deserialize)]
pub struct GenderConfig {
    #[serde(default = "d_male")]
    pub male: Vec<String>,
    #[serde(default = "d_female")]
    pub female: Vec<String>,
}

fn d_male() -> Vec<String> {
    strings(&["male", "m", "м", "муж", "мужской"])
}
fn d_female() -> Vec<String> {
    strings(&["female", "f", "ж", "жен", "женский"])
}

impl Default for GenderConfig {
    fn default() -> Self {
        Self {
            male: d_male(),
            female: d_female(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl EngineConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: EngineConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ReconError> {
        let input = std::fs::read_to_string(path)
            .map_err(|e| ReconError::Io(format!("{}: {e}", path.display())))?;
        Self::from_toml(&input)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        // Every field needs at least one key to probe
        for (name, keys) in self.aliases.tables() {
            if keys.is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "alias list for '{name}' is empty"
                )));
            }
        }

        // An alias may not map to two different target fields
        let mut seen: HashSet<(&str, &str)> = HashSet::new();
        let mut owners: HashSet<&str> = HashSet::new();
        for (name, keys) in self.aliases.tables() {
            for key in keys {
                if !seen.insert((name, key.as_str())) {
                    return Err(ReconError::ConfigValidation(format!(
                        "alias '{key}' listed twice for '{name}'"
                    )));
                }
                if !owners.insert(key.as_str()) {
                    return Err(ReconError::ConfigValidation(format!(
                        "alias '{key}' is mapped to more than one field"
                    )));
                }
            }
        }

        if self.gender.male.is_empty() || self.gender.female.is_empty() {
            return Err(ReconError::ConfigValidation(
                "gender tables must not be empty".into(),
            ));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        config.validate().unwrap();
        assert_eq!(config.aliases.passport_series[0], "passportSeries");
        assert_eq!(config.gender.male[0], "male");
    }

    #[test]
    fn parse_empty_toml_uses_defaults() {
        let config = EngineConfig::from_toml("").unwrap();
        assert_eq!(config.aliases.citizenship, vec!["citizenship", "nationality"]);
    }

    #[test]
    fn override_one_table_keeps_the_rest() {
        let config = EngineConfig::from_toml(
            r#"
[aliases]
passport_series = ["ser"]
"#,
        )
        .unwrap();
        assert_eq!(config.aliases.passport_series, vec!["ser"]);
        assert_eq!(config.aliases.last_name, vec!["lastName", "last_name", "surname"]);
    }

    #[test]
    fn reject_empty_alias_list() {
        let err = EngineConfig::from_toml(
            r#"
[aliases]
birth_date = []
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("birth_date"));
    }

    #[test]
    fn reject_alias_mapped_twice() {
        let err = EngineConfig::from_toml(
            r#"
[aliases]
patent_number = ["number"]
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("more than one field"));
    }

    #[test]
    fn reject_empty_gender_table() {
        let err = EngineConfig::from_toml(
            r#"
[gender]
female = []
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("gender"));
    }

    #[test]
    fn reject_bad_toml() {
        let err = EngineConfig::from_toml("aliases = 5").unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }
}
