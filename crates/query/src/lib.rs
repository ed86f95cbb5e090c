//! Query-side text processing for symptom descriptions.
//!
//! Two independent, pure stages run on the raw query before it is embedded:
//!
//! - [`QueryExpander`] appends synonym phrases from a static lexicon so that a
//!   lay description ("throwing up", "won't eat") reaches entries written in
//!   clinical vocabulary.
//! - [`EmergencyDetector`] scans for critical-condition keywords and yields a
//!   single boolean that later stages use to foreground urgency.
//!
//! Both compare against a normalized matching form of the query (see
//! [`normalize_for_matching`]); neither ever alters the caller's text.

mod emergency;
mod expand;
pub mod lexicon;
mod normalize;

pub use crate::emergency::EmergencyDetector;
pub use crate::expand::{QueryExpander, SynonymRule};
pub use crate::normalize::{collapse_whitespace, normalize_for_matching};
