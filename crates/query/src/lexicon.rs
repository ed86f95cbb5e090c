//! Built-in lexicons.
//!
//! Both tables are fixed configuration. Order matters for the synonym table:
//! expansion appends phrases in exactly this order.

/// Lay term → clinical and colloquial phrasings.
pub const SYNONYMS: &[(&str, &[&str])] = &[
    ("vomit", &["vomiting", "throwing up", "emesis"]),
    ("diarrhea", &["loose stool", "loose motion", "watery stool"]),
    ("pee", &["urinate", "urine", "urination"]),
    ("poop", &["stool", "feces", "defecate"]),
    ("cough", &["coughing", "hacking"]),
    ("scratch", &["scratching", "itching", "itchy"]),
    ("limp", &["limping", "lame", "not walking"]),
    ("breath", &["breathing", "respiratory", "panting"]),
    ("eat", &["eating", "appetite", "food"]),
    ("blood", &["bleeding", "bloody"]),
];

/// Phrases that mark a query as a possible emergency.
pub const EMERGENCY_KEYWORDS: &[&str] = &[
    "bleeding",
    "blood",
    "seizure",
    "unconscious",
    "not breathing",
    "collapsed",
    "severe pain",
    "bloat",
    "poisoning",
    "trauma",
    "snake bite",
    "broken bone",
    "can't stand",
    "blue gums",
];
