//! Section-level change detection
//!
//! Each section is reduced to a SHA-256 digest of its key/value pairs sorted
//! by key, so reordering keys in the file never reports a change while any
//! value edit, key addition or key removal does.

use super::document::{ConfigDocument, Section};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Content hash of one section
pub fn fingerprint(section: &Section) -> String {
    let mut pairs: Vec<(&str, &str)> = section.entries().collect();
    pairs.sort_unstable();

    let mut hasher = Sha256::new();
    for (key, value) in pairs {
        // Length prefixes keep ("ab", "c") and ("a", "bc") apart
        hasher.update((key.len() as u64).to_le_bytes());
        hasher.update(key.as_bytes());
        hasher.update((value.len() as u64).to_le_bytes());
        hasher.update(value.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}

/// Fingerprints of the last document seen by one store
#[derive(Debug, Clone, Default)]
pub struct SectionFingerprints {
    hashes: HashMap<String, String>,
}

impl SectionFingerprints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fingerprints of every section of `document`
    pub fn of(document: &ConfigDocument) -> Self {
        let hashes = document
            .sections()
            .map(|section| (section.name().to_string(), fingerprint(section)))
            .collect();
        Self { hashes }
    }

    pub fn get(&self, section: &str) -> Option<&str> {
        self.hashes.get(section).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}

/// Computes which sections differ from the previous load
pub struct SectionChangeDetector;

impl SectionChangeDetector {
    /// Names of sections in `new_document` whose content changed
    ///
    /// Sections with no previous fingerprint count as changed. Sections that
    /// disappeared are not reported. `previous` is replaced by the
    /// fingerprints of `new_document`, so the next diff is relative to this
    /// load. Names come back in document order.
    pub fn diff(previous: &mut SectionFingerprints, new_document: &ConfigDocument) -> Vec<String> {
        let current = SectionFingerprints::of(new_document);

        let changed = new_document
            .sections()
            .map(Section::name)
            .filter(|name| previous.get(name) != current.get(name))
            .map(str::to_string)
            .collect();

        *previous = current;
        changed
    }

    /// Record `document` as the baseline without reporting anything
    pub fn baseline(previous: &mut SectionFingerprints, document: &ConfigDocument) {
        *previous = SectionFingerprints::of(document);
    }
}
