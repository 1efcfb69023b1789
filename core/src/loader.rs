//! Reading catalogs from disk.

use crate::error::{EngineError, Result};
use crate::record::{record_from_value, records_from_value, RawRecord};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Load records from a `.json` file (an array of records), a `.jsonl` file
/// (one record per line), or a directory of such files visited in path order.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Vec<RawRecord>> {
    let path = path.as_ref();
    let mut records = Vec::new();
    for file in catalog_files(path)? {
        let before = records.len();
        if is_jsonl(&file) {
            load_jsonl(&file, &mut records)?;
        } else {
            load_json(&file, &mut records)?;
        }
        tracing::debug!(file = %file.display(), records = records.len() - before, "loaded catalog file");
    }
    Ok(records)
}

fn catalog_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        return Err(EngineError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("catalog path not found: {}", path.display()),
        )));
    }
    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file() && p.extension().and_then(|s| s.to_str()).is_some_and(|ext| matches!(ext, "json" | "jsonl")))
        .collect();
    files.sort();
    Ok(files)
}

fn is_jsonl(file: &Path) -> bool { file.extension().and_then(|s| s.to_str()) == Some("jsonl") }

fn load_json(file: &Path, out: &mut Vec<RawRecord>) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    let json: serde_json::Value = serde_json::from_reader(reader)?;
    let records = records_from_value(json).map_err(|e| at(e, file.display()))?;
    out.extend(records);
    Ok(())
}

fn load_jsonl(file: &Path, out: &mut Vec<RawRecord>) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let value: serde_json::Value = serde_json::from_str(&line)?;
        let record = record_from_value(value).map_err(|e| at(e, format!("{}:{}", file.display(), lineno + 1)))?;
        out.push(record);
    }
    Ok(())
}

fn at(err: EngineError, location: impl std::fmt::Display) -> EngineError {
    match err {
        EngineError::MalformedInput(msg) => EngineError::malformed(format!("{location}: {msg}")),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn loads_json_array() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("items.json");
        fs::write(&file, r#"[{"name":"Tee"},{"name":"Hoodie","price":"35"}]"#).unwrap();
        let records = load_catalog(&file).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].price, Some(35.0));
    }

    #[test]
    fn walks_directories_in_path_order() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.jsonl"), "{\"name\":\"second\"}\n\n{\"name\":\"third\"}\n").unwrap();
        fs::write(dir.path().join("a.json"), r#"[{"name":"first"}]"#).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        let names: Vec<_> = load_catalog(dir.path()).unwrap().into_iter().map(|r| r.name.unwrap()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn object_at_top_level_is_malformed() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("items.json");
        fs::write(&file, r#"{"name":"Tee"}"#).unwrap();
        assert!(matches!(load_catalog(&file), Err(EngineError::MalformedInput(_))));
    }

    #[test]
    fn missing_path_is_io_error() {
        let dir = tempdir().unwrap();
        assert!(matches!(load_catalog(dir.path().join("nope.json")), Err(EngineError::Io(_))));
    }
}
