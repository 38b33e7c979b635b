//! Loads extracted paper text from disk into [`Document`] values.
//!
//! Each `<stem>.txt` becomes one document; an optional `<stem>.json` sidecar
//! supplies metadata and section markers.
use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::sections::SectionDetector;
use crate::types::{Document, Meta, SectionLabel, SectionMarker};

#[derive(Default)]
pub struct DocumentLoader {
    detector: Option<SectionDetector>,
}

impl DocumentLoader {
    pub fn new() -> Self { Self::default() }

    /// Detect headings for documents whose sidecar carries no section markers.
    pub fn with_section_detection(mut self, detector: SectionDetector) -> Self {
        self.detector = Some(detector);
        self
    }

    pub fn load_directory(&self, data_dir: &Path) -> Result<Vec<Document>> {
        let files = self.list_txt_files(data_dir);
        self.load_files(data_dir, &files)
    }

    pub fn load_directory_limited(&self, data_dir: &Path, limit: usize) -> Result<Vec<Document>> {
        let mut files = self.list_txt_files(data_dir);
        if files.len() > limit {
            files.truncate(limit);
            info!(limit, "limited to first {} files", limit);
        }
        self.load_files(data_dir, &files)
    }

    pub fn load_file(&self, file_path: &Path) -> Result<Document> {
        let text = self.read_file_content(file_path)?;
        let id = self.extract_doc_id(file_path)?;
        let mut document = Document::new(id, text);
        let sidecar = file_path.with_extension("json");
        if sidecar.is_file() {
            let (metadata, sections) = read_sidecar(&sidecar)?;
            document.metadata = metadata;
            document.sections = sections;
        }
        if document.sections.is_empty() {
            if let Some(detector) = &self.detector {
                document.sections = detector.detect(&document.text);
                debug!(doc = %document.id, found = document.sections.len(), "detected sections");
            }
        }
        Ok(document)
    }

    fn load_files(&self, data_dir: &Path, files: &[PathBuf]) -> Result<Vec<Document>> {
        if files.is_empty() {
            warn!("No .txt files found under {}", data_dir.display());
            return Ok(vec![]);
        }
        let mut documents = Vec::with_capacity(files.len());
        for (file_index, file_path) in files.iter().enumerate() {
            debug!("Loading file {}/{}: {}", file_index + 1, files.len(), file_path.display());
            documents.push(self.load_file(file_path)?);
        }
        info!("Loaded {} documents from {}", documents.len(), data_dir.display());
        Ok(documents)
    }

    fn read_file_content(&self, file_path: &Path) -> Result<String> {
        match fs::read_to_string(file_path) {
            Ok(content) => Ok(content),
            Err(_) => {
                let bytes = fs::read(file_path).with_context(|| format!("reading {}", file_path.display()))?;
                Ok(String::from_utf8_lossy(&bytes).to_string())
            }
        }
    }

    fn extract_doc_id(&self, file_path: &Path) -> Result<String> {
        file_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .with_context(|| format!("no file stem in {}", file_path.display()))
    }

    fn list_txt_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut txt_files = Vec::new();
        for entry in walkdir::WalkDir::new(root).into_iter().filter_map(|e| e.ok()).filter(|e| e.file_type().is_file()) {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some("txt") { txt_files.push(path.to_path_buf()); }
        }
        txt_files.sort();
        txt_files
    }
}

/// Parse a metadata sidecar. `sections` may be `{name: offset}` or a list of markers;
/// other scalar fields become metadata strings and string lists are joined with "; ".
fn read_sidecar(path: &Path) -> Result<(Meta, Vec<SectionMarker>)> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let value: Value = serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
    let Value::Object(fields) = value else {
        anyhow::bail!("{} is not a JSON object", path.display());
    };
    let mut metadata = Meta::new();
    let mut sections = Vec::new();
    for (key, value) in fields {
        if key == "sections" {
            sections = parse_sections(value).with_context(|| format!("sections in {}", path.display()))?;
            continue;
        }
        match value {
            Value::String(s) => { metadata.insert(key, s); }
            Value::Number(n) => { metadata.insert(key, n.to_string()); }
            Value::Bool(b) => { metadata.insert(key, b.to_string()); }
            Value::Array(items) => {
                let strings: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
                if !strings.is_empty() && strings.len() == items.len() { metadata.insert(key, strings.join("; ")); }
            }
            Value::Null | Value::Object(_) => {}
        }
    }
    Ok((metadata, sections))
}

fn parse_sections(value: Value) -> Result<Vec<SectionMarker>> {
    match value {
        Value::Object(positions) => {
            let mut markers = Vec::with_capacity(positions.len());
            for (name, start) in positions {
                let start = start.as_u64().with_context(|| format!("section '{name}' needs a non-negative offset"))?;
                markers.push(SectionMarker::new(SectionLabel::parse(&name), usize::try_from(start)?));
            }
            markers.sort_by_key(|m| m.start);
            Ok(markers)
        }
        list @ Value::Array(_) => Ok(serde_json::from_value(list)?),
        Value::Null => Ok(vec![]),
        other => anyhow::bail!("unsupported sections value: {other}"),
    }
}
