use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use thiserror::Error;

/// Column holding the participant identifier.
pub const ID_COLUMN: &str = "ID участника";
/// Column holding the consent marker.
pub const CONSENT_COLUMN: &str = "Подано согласие";
/// Consent marker value meaning "no consent filed".
pub const NO_CONSENT_MARKER: &str = "—";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub student_id: String,
    pub data_directory: Option<String>,
    pub file_extension: Option<String>,
    pub history_file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            student_id: "".to_string(),
            data_directory: Some(".".to_string()),
            file_extension: Some("csv".to_string()),
            history_file: Some("history.json".to_string()),
        }
    }
}

impl Config {
    pub fn load_from_file(file_path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(file_path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, file_path: &str) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(file_path, content)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    #[error("ID must contain digits only")]
    NotDigits,
    #[error("ID must be 6 to 8 digits long (got {0})")]
    BadLength(usize),
}

/// A validated participant identifier: 6 to 8 ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentId(String);

impl StudentId {
    pub fn parse(raw: &str) -> Result<Self, IdError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Err(IdError::NotDigits);
        }
        if !(6..=8).contains(&trimmed.len()) {
            return Err(IdError::BadLength(trimmed.len()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One data row: column name -> raw cell value.
pub type Row = HashMap<String, String>;

/// One ranked list read from disk.
#[derive(Debug, Clone)]
pub struct Source {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl Source {
    /// Headers are taken from the columns the rows carry.
    pub fn new(name: impl Into<String>, rows: Vec<Row>) -> Self {
        let columns: BTreeSet<&String> = rows.iter().flat_map(|row| row.keys()).collect();
        let headers = columns.into_iter().cloned().collect();
        Self::with_headers(name, headers, rows)
    }

    pub fn with_headers(name: impl Into<String>, headers: Vec<String>, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows,
        }
    }

    /// Recognized columns absent from the header.
    pub fn missing_columns(&self) -> Vec<&'static str> {
        [ID_COLUMN, CONSENT_COLUMN]
            .into_iter()
            .filter(|column| !self.headers.iter().any(|header| header == column))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingFacts {
    pub absolute_rank: Option<u32>,
    pub filtered_rank: Option<u32>,
    pub filtered_count: u32,
}

/// Last persisted facts, keyed by source name.
pub type Snapshot = BTreeMap<String, RankingFacts>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn student_id_accepts_six_to_eight_digits() {
        assert_eq!(StudentId::parse("123456").unwrap().as_str(), "123456");
        assert_eq!(StudentId::parse(" 12345678 \n").unwrap().as_str(), "12345678");
    }

    #[test]
    fn student_id_rejects_bad_input() {
        assert_eq!(StudentId::parse("12a456"), Err(IdError::NotDigits));
        assert_eq!(StudentId::parse(""), Err(IdError::NotDigits));
        assert_eq!(StudentId::parse("12345"), Err(IdError::BadLength(5)));
        assert_eq!(StudentId::parse("123456789"), Err(IdError::BadLength(9)));
    }

    #[test]
    fn config_round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let path = path.to_str().unwrap();

        let mut config = Config::default();
        config.student_id = "7654321".to_string();
        config.save_to_file(path).unwrap();

        let loaded = Config::load_from_file(path).unwrap();
        assert_eq!(loaded.student_id, "7654321");
        assert_eq!(loaded.history_file.as_deref(), Some("history.json"));
    }

    #[test]
    fn config_without_student_id_defaults_to_empty() {
        let config: Config = toml::from_str("data_directory = \"lists\"\n").unwrap();
        assert!(config.student_id.is_empty());
        assert_eq!(config.data_directory.as_deref(), Some("lists"));
        assert!(config.history_file.is_none());
    }

    #[test]
    fn missing_columns_lists_absent_headers() {
        let mut row = Row::new();
        row.insert(ID_COLUMN.to_string(), "100001".to_string());
        let source = Source::new("list", vec![row]);
        assert_eq!(source.missing_columns(), vec![CONSENT_COLUMN]);
    }

    #[test]
    fn missing_columns_reads_header_not_rows() {
        let headers = vec![ID_COLUMN.to_string(), CONSENT_COLUMN.to_string()];
        let source = Source::with_headers("empty", headers, Vec::new());
        assert!(source.missing_columns().is_empty());

        let source = Source::with_headers("typo", vec!["ID".to_string()], Vec::new());
        assert_eq!(source.missing_columns(), vec![ID_COLUMN, CONSENT_COLUMN]);
    }
}
