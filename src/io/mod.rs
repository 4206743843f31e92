//! Payload documents read by and written from the CLI.
//!
//! `json` and `yaml` hold exactly one document, so a top-level array stays a
//! single payload. `jsonl` holds one document per non-blank line.

pub mod error;

use std::fmt;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;
use std::str::FromStr;

use serde_json::Value;

pub use error::IoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Jsonl,
    Yaml,
}

impl Format {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Jsonl => "jsonl",
            Self::Yaml => "yaml",
        }
    }

    fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_ascii_lowercase();
        ext.parse().ok()
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = IoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "jsonl" | "ndjson" => Ok(Self::Jsonl),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(IoError::UnsupportedFormat {
                format: other.to_string(),
            }),
        }
    }
}

/// Explicit format first, then the path extension, then `fallback`.
pub fn resolve_format(
    explicit: Option<Format>,
    path: Option<&Path>,
    fallback: Format,
) -> Result<Format, IoError> {
    if let Some(format) = explicit {
        return Ok(format);
    }
    match path {
        None => Ok(fallback),
        Some(path) => Format::from_path(path).ok_or_else(|| IoError::UnsupportedPathExtension {
            path: path.to_string_lossy().into_owned(),
        }),
    }
}

pub fn read_documents<R: Read>(reader: R, format: Format) -> Result<Vec<Value>, IoError> {
    match format {
        Format::Json => Ok(vec![serde_json::from_reader(reader)?]),
        Format::Yaml => {
            let document: serde_yaml::Value = serde_yaml::from_reader(reader)?;
            Ok(vec![serde_json::to_value(document)?])
        }
        Format::Jsonl => {
            let mut documents = Vec::new();
            for line in BufReader::new(reader).lines() {
                let line = line?;
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    documents.push(serde_json::from_str(trimmed)?);
                }
            }
            Ok(documents)
        }
    }
}

/// `json` and `yaml` write a lone document as is and several as an array.
pub fn write_documents<W: Write>(
    mut writer: W,
    format: Format,
    documents: &[Value],
) -> Result<(), IoError> {
    match (format, documents) {
        (Format::Jsonl, _) => {
            for document in documents {
                serde_json::to_writer(&mut writer, document)?;
                writer.write_all(b"\n")?;
            }
        }
        (Format::Json, [single]) => {
            serde_json::to_writer(&mut writer, single)?;
            writer.write_all(b"\n")?;
        }
        (Format::Json, _) => {
            serde_json::to_writer(&mut writer, documents)?;
            writer.write_all(b"\n")?;
        }
        (Format::Yaml, [single]) => serde_yaml::to_writer(&mut writer, single)?,
        (Format::Yaml, _) => serde_yaml::to_writer(&mut writer, documents)?,
    }
    Ok(())
}
