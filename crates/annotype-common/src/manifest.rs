use std::path::{Path, PathBuf};

use serde::Deserialize;

pub const MANIFEST_FILE: &str = "Annotype.toml";

/// The parsed Annotype.toml settings.
#[derive(Debug, Clone, Default)]
pub struct AnnotypeManifest {
    pub batch: BatchSection,
    pub output: OutputSection,
    /// The directory containing the Annotype.toml file, if one was loaded.
    pub root_dir: Option<PathBuf>,
}

/// What a batch does with an annotation string that fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnError {
    /// Log the failure, drop the string and keep going.
    #[default]
    Skip,
    /// Stop the batch at the first failure.
    Abort,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchSection {
    #[serde(default)]
    pub on_error: OnError,
    /// Worker threads for batch parsing; 0 leaves the choice to rayon.
    #[serde(default)]
    pub jobs: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputSection {
    #[serde(default = "default_pretty")]
    pub pretty: bool,
    #[serde(default)]
    pub dedup: bool,
}

fn default_pretty() -> bool {
    true
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            pretty: default_pretty(),
            dedup: false,
        }
    }
}

/// Raw TOML structure for deserialization.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawManifest {
    #[serde(default)]
    batch: BatchSection,
    #[serde(default)]
    output: OutputSection,
}

/// Errors that can occur when loading a manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("no Annotype.toml found (searched from {0})")]
    NotFound(String),
    #[error("failed to read Annotype.toml: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("invalid Annotype.toml: {0}")]
    ParseError(String),
}

/// Walk up from `start_dir` looking for `Annotype.toml`.
pub fn find_manifest(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    loop {
        let candidate = current.join(MANIFEST_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Load an Annotype.toml manifest from a file path.
pub fn load_manifest(path: &Path) -> Result<AnnotypeManifest, ManifestError> {
    let content = std::fs::read_to_string(path)?;
    let root_dir = path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();
    parse_manifest(&content, Some(root_dir))
}

/// Parse an Annotype.toml manifest from a string.
pub fn parse_manifest(
    content: &str,
    root_dir: Option<PathBuf>,
) -> Result<AnnotypeManifest, ManifestError> {
    let raw: RawManifest =
        toml::from_str(content).map_err(|e| ManifestError::ParseError(e.to_string()))?;

    Ok(AnnotypeManifest {
        batch: raw.batch,
        output: raw.output,
        root_dir,
    })
}

/// Find and load the manifest governing `input_file`, walking up from its directory.
pub fn find_and_load_manifest(input_file: &Path) -> Result<AnnotypeManifest, ManifestError> {
    let start_dir = input_file.parent().unwrap_or_else(|| Path::new("."));
    let manifest_path = find_manifest(start_dir)
        .ok_or_else(|| ManifestError::NotFound(start_dir.display().to_string()))?;
    load_manifest(&manifest_path)
}

/// Like [`find_and_load_manifest`], but a missing manifest yields the defaults.
pub fn load_or_default(input_file: &Path) -> Result<AnnotypeManifest, ManifestError> {
    match find_and_load_manifest(input_file) {
        Err(ManifestError::NotFound(_)) => Ok(AnnotypeManifest::default()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_manifest_uses_defaults() {
        let manifest = parse_manifest("", None).unwrap();
        assert_eq!(manifest.batch.on_error, OnError::Skip);
        assert_eq!(manifest.batch.jobs, 0);
        assert!(manifest.output.pretty);
        assert!(!manifest.output.dedup);
    }

    #[test]
    fn parse_full_manifest() {
        let toml = r#"
[batch]
on_error = "abort"
jobs = 4

[output]
pretty = false
dedup = true
"#;
        let manifest = parse_manifest(toml, Some(PathBuf::from("."))).unwrap();
        assert_eq!(manifest.batch.on_error, OnError::Abort);
        assert_eq!(manifest.batch.jobs, 4);
        assert!(!manifest.output.pretty);
        assert!(manifest.output.dedup);
        assert_eq!(manifest.root_dir, Some(PathBuf::from(".")));
    }

    #[test]
    fn unknown_policy_fails() {
        let toml = r#"
[batch]
on_error = "retry"
"#;
        let err = parse_manifest(toml, None).unwrap_err().to_string();
        assert!(err.contains("invalid Annotype.toml"), "got: {}", err);
    }

    #[test]
    fn misspelled_key_fails() {
        let toml = r#"
[output]
prety = true
"#;
        assert!(parse_manifest(toml, None).is_err());
    }

    #[test]
    fn find_walks_up_from_input_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(MANIFEST_FILE), "[batch]\njobs = 2\n").unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let manifest = find_and_load_manifest(&nested.join("raw.json")).unwrap();
        assert_eq!(manifest.batch.jobs, 2);
        assert_eq!(manifest.root_dir.as_deref(), Some(dir.path()));
    }

    #[test]
    fn missing_manifest_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("raw.json");
        match find_and_load_manifest(&input) {
            Err(ManifestError::NotFound(_)) => {}
            // An Annotype.toml above the temp dir would be found first.
            Ok(_) => return,
            Err(e) => panic!("unexpected error: {}", e),
        }
        let manifest = load_or_default(&input).unwrap();
        assert!(manifest.root_dir.is_none());
    }
}
