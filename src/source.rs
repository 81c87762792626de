use crate::models::{Row, Source};
use anyhow::Context;
use regex::Regex;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to open {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed list {name}: {source}")]
    Csv {
        name: String,
        #[source]
        source: csv::Error,
    },
}

impl SourceError {
    pub fn name(&self) -> &str {
        match self {
            SourceError::Io { name, .. } | SourceError::Csv { name, .. } => name,
        }
    }
}

pub struct SourceReader {
    extension: String,
    stamp_regex: Regex,
}

impl SourceReader {
    pub fn new(extension: &str) -> Self {
        // Trailing date with an optional time, e.g. `_2024-07-15`, ` 15.07.2024 10-30`, `-20240715`.
        let stamp_regex = Regex::new(
            r"[\s_\-.]*(?:\d{4}[.\-]?\d{2}[.\-]?\d{2}|\d{2}[.\-]\d{2}[.\-]\d{2,4})(?:[\s_T]+\d{1,2}[.\-:h]\d{2}(?:[.\-:]\d{2})?)?$",
        )
        .unwrap();

        Self {
            extension: extension.trim_start_matches('.').to_lowercase(),
            stamp_regex,
        }
    }

    /// Files in `dir` carrying the configured extension, sorted by file name.
    /// An unreadable directory yields no files.
    pub fn discover(&self, dir: &Path) -> Vec<PathBuf> {
        let entries = match fs::read_dir(dir)
            .with_context(|| format!("Failed to read data directory: {}", dir.display()))
        {
            Ok(entries) => entries,
            Err(e) => {
                warn!("{:#}", e);
                return Vec::new();
            }
        };

        let mut files = Vec::new();
        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    warn!(dir = %dir.display(), "skipping unreadable entry: {}", e);
                    continue;
                }
            };
            let matches = path
                .extension()
                .and_then(|s| s.to_str())
                .map(|ext| ext.to_lowercase() == self.extension)
                .unwrap_or(false);
            if matches && path.is_file() {
                files.push(path);
            }
        }
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        debug!(count = files.len(), dir = %dir.display(), "discovered lists");
        files
    }

    /// File stem with trailing date stamps removed.
    pub fn source_name(&self, path: &Path) -> String {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut name = stem.trim().to_string();
        loop {
            let stripped = self.stamp_regex.replace(&name, "").trim().to_string();
            if stripped == name || stripped.is_empty() {
                break;
            }
            name = stripped;
        }
        if name.is_empty() {
            stem
        } else {
            name
        }
    }

    pub fn read_file(&self, path: &Path) -> Result<Source, SourceError> {
        let name = self.source_name(path);
        let file = fs::File::open(path).map_err(|source| SourceError::Io {
            name: name.clone(),
            source,
        })?;
        parse_rows(&name, file)
    }
}

/// Semicolon-delimited rows keyed by header; short rows lack the trailing columns.
pub fn parse_rows<R: Read>(name: &str, input: R) -> Result<Source, SourceError> {
    let csv_error = |source| SourceError::Csv {
        name: name.to_string(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .flexible(true)
        .from_reader(input);

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        let row: Row = headers
            .iter()
            .cloned()
            .zip(record.iter().map(|field| field.to_string()))
            .collect();
        rows.push(row);
    }

    Ok(Source::with_headers(name, headers, rows))
}
