//! JSON file persistence shared by every on-disk document the editor writes.

mod atomic_io;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("encode json for '{path}': {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("parse '{path}'{}: {source}", format_json_path(.at))]
    Parse {
        path: PathBuf,
        at: String,
        #[source]
        source: serde_json::Error,
    },
}

fn format_json_path(at: &str) -> String {
    if at.is_empty() || at == "." {
        String::new()
    } else {
        format!(" at {at}")
    }
}

/// Writes `value` as pretty JSON through a temp file so a crash never leaves
/// a half-written document behind.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), PersistError> {
    let json = serde_json::to_string_pretty(value).map_err(|source| PersistError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    atomic_io::write_text_atomic(path, &json).map_err(|source| PersistError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads and decodes a JSON document. A missing file is `Ok(None)`.
pub fn read_json_if_exists<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, PersistError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(PersistError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    parse_json(path, &raw).map(Some)
}

fn parse_json<T: DeserializeOwned>(path: &Path, raw: &str) -> Result<T, PersistError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, T>(&mut deserializer).map_err(|error| {
        let at = error.path().to_string();
        PersistError::Parse {
            path: path.to_path_buf(),
            at,
            source: error.into_inner(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Doc {
        width: u32,
        cells: Vec<Option<[u8; 3]>>,
    }

    #[test]
    fn missing_file_reads_as_none() {
        let temp = TempDir::new().expect("temp");
        let loaded: Option<Doc> =
            read_json_if_exists(&temp.path().join("absent.json")).expect("read");
        assert!(loaded.is_none());
    }

    #[test]
    fn written_document_reads_back() {
        let temp = TempDir::new().expect("temp");
        let path = temp.path().join("doc.json");
        let doc = Doc {
            width: 2,
            cells: vec![Some([1, 2, 3]), None],
        };

        write_json_atomic(&path, &doc).expect("write");
        let loaded: Doc = read_json_if_exists(&path).expect("read").expect("present");
        assert_eq!(loaded, doc);
    }

    #[test]
    fn parse_error_reports_json_path() {
        let temp = TempDir::new().expect("temp");
        let path = temp.path().join("doc.json");
        fs::write(&path, r#"{"width": 2, "cells": [[1, 2, "x"]]}"#).expect("write");

        let error = read_json_if_exists::<Doc>(&path).expect_err("bad doc");
        match &error {
            PersistError::Parse { at, .. } => assert_eq!(at, "cells[0][2]"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(error.to_string().contains("at cells[0][2]"));
    }

    #[test]
    fn syntax_error_without_path_has_plain_message() {
        let temp = TempDir::new().expect("temp");
        let path = temp.path().join("doc.json");
        fs::write(&path, "not json").expect("write");

        let error = read_json_if_exists::<Doc>(&path).expect_err("bad doc");
        assert!(error.to_string().starts_with("parse '"));
    }
}
