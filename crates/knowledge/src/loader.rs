//! Dataset loading.
//!
//! Datasets are JSON files named `master_<category>_dataset.json`. A file
//! holds either `{"entries": [...]}` or a bare array of records. Each record is
//! validated on its own: a bad record is rejected into the [`LoadReport`]
//! without sinking the rest of its file, and an unreadable file is skipped
//! without sinking the rest of the directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::KnowledgeError;
use crate::types::{KnowledgeEntry, ParseEnumError, ServiceRecommendation, Severity, SpeciesScope};

const FILE_PREFIX: &str = "master_";
const FILE_SUFFIX: &str = "_dataset.json";

/// Outcome of loading a dataset directory.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Accepted entries in load order (file name order, then record order).
    pub entries: Vec<KnowledgeEntry>,
    /// Per-file accepted counts, keyed by category.
    pub categories: Vec<(String, usize)>,
    /// Records that failed validation.
    pub rejected: Vec<KnowledgeError>,
    /// Files that could not be read or parsed.
    pub skipped_files: Vec<KnowledgeError>,
}

impl LoadReport {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn absorb(&mut self, batch: DatasetBatch) {
        self.categories
            .push((batch.category.clone(), batch.entries.len()));
        self.entries.extend(batch.entries);
        self.rejected.extend(batch.rejected);
    }
}

/// Entries parsed from a single dataset document.
#[derive(Debug, Clone, Default)]
pub struct DatasetBatch {
    pub category: String,
    pub entries: Vec<KnowledgeEntry>,
    pub rejected: Vec<KnowledgeError>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DatasetDocument {
    Wrapped { entries: Vec<Value> },
    Bare(Vec<Value>),
}

/// Free-text fields sometimes arrive as a list of sentences.
#[derive(Deserialize)]
#[serde(untagged)]
enum TextField {
    Text(String),
    List(Vec<String>),
}

impl TextField {
    fn into_text(self) -> String {
        match self {
            TextField::Text(s) => s,
            TextField::List(items) => items.join("; "),
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawRecord {
    #[serde(alias = "symptom_title")]
    symptom: Option<String>,
    description: Option<String>,
    severity: Option<String>,
    #[serde(alias = "species_scope")]
    species: Option<String>,
    #[serde(alias = "home_care_advice")]
    home_care_india: Option<TextField>,
    #[serde(alias = "vet_escalation_criteria")]
    vet_triggers: Option<TextField>,
    service_recommendation: Option<String>,
    #[serde(alias = "climate_notes")]
    indian_climate_factors: Option<TextField>,
}

/// Extracts the category from a `master_<category>_dataset.json` file name.
///
/// ```rust
/// use knowledge::category_from_file_name;
///
/// assert_eq!(
///     category_from_file_name("master_skin_dataset.json").as_deref(),
///     Some("skin")
/// );
/// assert_eq!(category_from_file_name("notes.json"), None);
/// ```
pub fn category_from_file_name(file_name: &str) -> Option<String> {
    let category = file_name
        .strip_prefix(FILE_PREFIX)?
        .strip_suffix(FILE_SUFFIX)?;
    if category.is_empty() {
        None
    } else {
        Some(category.to_string())
    }
}

/// Loads every `master_*_dataset.json` file in `dir`, in file name order.
///
/// Fails only when the directory itself is missing. Unreadable files and
/// invalid records are reported in the returned [`LoadReport`].
pub fn load_dataset_dir(dir: impl AsRef<Path>) -> Result<LoadReport, KnowledgeError> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(KnowledgeError::DirectoryNotFound(dir.display().to_string()));
    }

    let listing = fs::read_dir(dir).map_err(|err| KnowledgeError::Io {
        path: dir.display().to_string(),
        message: err.to_string(),
    })?;

    let mut files: Vec<PathBuf> = listing
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .and_then(category_from_file_name)
                .is_some()
        })
        .collect();
    files.sort();

    let mut report = LoadReport::default();
    for path in files {
        match load_dataset_file(&path) {
            Ok(batch) => {
                info!(
                    category = %batch.category,
                    accepted = batch.entries.len(),
                    rejected = batch.rejected.len(),
                    "dataset_loaded"
                );
                for rejection in &batch.rejected {
                    warn!(error = %rejection, "dataset_record_rejected");
                }
                report.absorb(batch);
            }
            Err(err) => {
                warn!(error = %err, "dataset_file_skipped");
                report.skipped_files.push(err);
            }
        }
    }

    Ok(report)
}

/// Loads a single dataset file. The category is taken from the file name, or
/// from the file stem when the name does not follow the dataset convention.
pub fn load_dataset_file(path: impl AsRef<Path>) -> Result<DatasetBatch, KnowledgeError> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    let category = category_from_file_name(&file_name).unwrap_or_else(|| {
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("general")
            .to_string()
    });

    let bytes = fs::read(path).map_err(|err| KnowledgeError::Io {
        path: display.clone(),
        message: err.to_string(),
    })?;

    load_entries_from_slice(&category, &file_name, &bytes).map_err(|err| match err {
        KnowledgeError::Parse { message, .. } => KnowledgeError::Parse {
            path: display,
            message,
        },
        other => other,
    })
}

/// Parses one dataset document held in memory.
pub fn load_entries_from_slice(
    category: &str,
    source_name: &str,
    bytes: &[u8],
) -> Result<DatasetBatch, KnowledgeError> {
    let document: DatasetDocument =
        serde_json::from_slice(bytes).map_err(|err| KnowledgeError::Parse {
            path: source_name.to_string(),
            message: err.to_string(),
        })?;
    let records = match document {
        DatasetDocument::Wrapped { entries } => entries,
        DatasetDocument::Bare(entries) => entries,
    };

    let mut batch = DatasetBatch {
        category: category.to_string(),
        entries: Vec::with_capacity(records.len()),
        rejected: Vec::new(),
    };

    for (position, value) in records.into_iter().enumerate() {
        let reject = |reason: String| KnowledgeError::InvalidRecord {
            source_name: source_name.to_string(),
            position,
            reason,
        };
        let raw: RawRecord = match serde_json::from_value(value) {
            Ok(raw) => raw,
            Err(err) => {
                batch.rejected.push(reject(err.to_string()));
                continue;
            }
        };
        match validate_record(raw, category) {
            Ok(entry) => batch.entries.push(entry),
            Err(reason) => batch.rejected.push(reject(reason)),
        }
    }

    Ok(batch)
}

fn validate_record(raw: RawRecord, category: &str) -> Result<KnowledgeEntry, String> {
    let symptom_title = required_text("symptom", raw.symptom)?;
    let description = required_text("description", raw.description)?;

    let severity: Severity = required_text("severity", raw.severity)?
        .parse()
        .map_err(|err: ParseEnumError| err.to_string())?;
    let species_scope: SpeciesScope = required_text("species", raw.species)?
        .parse()
        .map_err(|err: ParseEnumError| err.to_string())?;

    let service_recommendation = match sanitize_text(raw.service_recommendation) {
        Some(value) => Some(
            value
                .parse::<ServiceRecommendation>()
                .map_err(|err| err.to_string())?,
        ),
        None => None,
    };

    Ok(KnowledgeEntry {
        symptom_title,
        description,
        severity,
        species_scope,
        home_care_advice: sanitize_text(raw.home_care_india.map(TextField::into_text))
            .unwrap_or_default(),
        vet_escalation_criteria: sanitize_text(raw.vet_triggers.map(TextField::into_text))
            .unwrap_or_default(),
        service_recommendation,
        climate_notes: sanitize_text(raw.indian_climate_factors.map(TextField::into_text)),
        category: category.to_string(),
    })
}

fn required_text(field: &str, value: Option<String>) -> Result<String, String> {
    sanitize_text(value).ok_or_else(|| format!("missing {field}"))
}

/// Strips control characters, collapses whitespace, and drops empty values.
fn sanitize_text(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let mut cleaned = String::with_capacity(raw.len());
        for segment in raw.split_whitespace() {
            let segment: String = segment.chars().filter(|c| !c.is_control()).collect();
            if segment.is_empty() {
                continue;
            }
            if !cleaned.is_empty() {
                cleaned.push(' ');
            }
            cleaned.push_str(&segment);
        }
        if cleaned.is_empty() {
            None
        } else {
            Some(cleaned)
        }
    })
}
