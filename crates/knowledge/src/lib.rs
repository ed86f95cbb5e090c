//! Veterinary knowledge model and dataset loading.
//!
//! This crate owns the vocabulary every other stage speaks:
//!
//! - [`KnowledgeEntry`]: one validated symptom record with its closed
//!   [`Severity`], [`SpeciesScope`] and optional [`ServiceRecommendation`]
//! - [`SubjectProfile`]: the pet a request is about, with
//!   [`Species::normalize`] mapping its free-text species to a known value
//! - [`load_dataset_dir`]: reads `master_<category>_dataset.json` files into a
//!   [`LoadReport`], rejecting invalid records instead of correcting them
//!
//! # Example
//!
//! ```rust
//! use knowledge::{load_entries_from_slice, Severity, Species, SubjectProfile};
//!
//! let json = br#"[{"symptom": "Vomiting", "description": "Repeated vomiting",
//!                  "severity": "urgent", "species": "dogs"}]"#;
//! let batch = load_entries_from_slice("digestive", "inline", json).unwrap();
//! assert_eq!(batch.entries[0].severity, Severity::Urgent);
//!
//! let pet = SubjectProfile::new("Bruno", "Dog").with_age("3 years");
//! assert_eq!(pet.normalized_species(), Some(Species::Dogs));
//! ```

mod error;
mod loader;
mod types;

pub use crate::error::KnowledgeError;
pub use crate::loader::{
    category_from_file_name, load_dataset_dir, load_dataset_file, load_entries_from_slice,
    DatasetBatch, LoadReport,
};
pub use crate::types::{
    KnowledgeEntry, ParseEnumError, ServiceRecommendation, Severity, Species, SpeciesScope,
    SubjectProfile,
};
