//! Section/key-value documents
//!
//! A [`ConfigDocument`] is the parsed form of an INI-style file:
//!
//! ```ini
//! ; comment
//! [Taskbar]
//! argb_color = #111111
//! active_widgets: clock, tray
//!
//! [Taskbar.Clock]
//! time_format = HH:mm
//! ```
//!
//! Section order and key order are preserved as written. Names are
//! case-sensitive. Only full-line comments are recognised so that color
//! values like `#111111` survive untouched.

use super::error::ParseError;

/// One `[name]` block and its entries in source order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    name: String,
    entries: Vec<(String, String)>,
}

impl Section {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Section name as written in the header
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a raw value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Entries in source order
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn set(&mut self, key: &str, value: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.entries.push((key.to_string(), value.to_string())),
        }
    }
}

/// Ordered mapping of section name to ordered key/value entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDocument {
    sections: Vec<Section>,
}

impl ConfigDocument {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse document text
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let mut doc = ConfigDocument::new();
        // Index of the current section and key, for continuation lines
        let mut current: Option<usize> = None;
        let mut last_key: Option<String> = None;

        for (idx, raw_line) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw_line.trim_end_matches('\r');
            let trimmed = line.trim();

            if trimmed.is_empty() {
                last_key = None;
                continue;
            }

            if trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            // Indented line continues the previous value
            if line.starts_with(char::is_whitespace) {
                if let (Some(section_idx), Some(key)) = (current, last_key.as_ref()) {
                    let section = &mut doc.sections[section_idx];
                    if let Some((_, value)) = section.entries.iter_mut().find(|(k, _)| k == key) {
                        value.push('\n');
                        value.push_str(trimmed);
                        continue;
                    }
                }
            }

            // Text after the last `]` of a header is ignored
            if let Some(header) = trimmed.strip_prefix('[') {
                let Some(name) = header.rfind(']').map(|end| &header[..end]) else {
                    return Err(ParseError::MalformedLine {
                        line: line_no,
                        content: trimmed.to_string(),
                    });
                };
                let name = name.trim();
                if name.is_empty() {
                    return Err(ParseError::EmptySectionName { line: line_no });
                }
                if doc.has_section(name) {
                    return Err(ParseError::DuplicateSection {
                        line: line_no,
                        name: name.to_string(),
                    });
                }
                doc.sections.push(Section::new(name));
                current = Some(doc.sections.len() - 1);
                last_key = None;
                continue;
            }

            let Some(section_idx) = current else {
                return Err(ParseError::MissingSectionHeader { line: line_no });
            };

            let Some(split_at) = trimmed.find(['=', ':']) else {
                return Err(ParseError::MalformedLine {
                    line: line_no,
                    content: trimmed.to_string(),
                });
            };
            let key = trimmed[..split_at].trim();
            let value = trimmed[split_at + 1..].trim();
            if key.is_empty() {
                return Err(ParseError::EmptyKey { line: line_no });
            }

            let section = &mut doc.sections[section_idx];
            if section.get(key).is_some() {
                return Err(ParseError::DuplicateKey {
                    line: line_no,
                    section: section.name.clone(),
                    key: key.to_string(),
                });
            }
            section.entries.push((key.to_string(), value.to_string()));
            last_key = Some(key.to_string());
        }

        Ok(doc)
    }

    /// Look up a raw value
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section).and_then(|s| s.get(key))
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.section(name).is_some()
    }

    /// Sections in source order
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    /// Section names in source order
    pub fn section_names(&self) -> Vec<String> {
        self.sections.iter().map(|s| s.name.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Set a value, creating the section if needed
    ///
    /// Only used when preparing a document to be written back to disk.
    /// Documents held by a live store are never edited in place.
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        match self.sections.iter_mut().find(|s| s.name == section) {
            Some(existing) => existing.set(key, value),
            None => {
                let mut new_section = Section::new(section);
                new_section.set(key, value);
                self.sections.push(new_section);
            }
        }
    }

    /// Serialize back to INI text
    ///
    /// Multi-line values are written with indented continuation lines so the
    /// output parses back to the same document.
    pub fn to_ini_string(&self) -> String {
        let mut out = String::new();
        for (idx, section) in self.sections.iter().enumerate() {
            if idx > 0 {
                out.push('\n');
            }
            out.push_str(&format!("[{}]\n", section.name));
            for (key, value) in &section.entries {
                let mut lines = value.split('\n');
                out.push_str(&format!("{} = {}\n", key, lines.next().unwrap_or_default()));
                for continuation in lines {
                    out.push_str(&format!("    {}\n", continuation));
                }
            }
        }
        out
    }
}
