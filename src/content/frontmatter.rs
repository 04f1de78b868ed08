//! Front-matter parsing
//!
//! A front-matter block sits at the very start of an imported file, between
//! two `---` marker lines. Each line inside is a flat `key: value` pair; there
//! is no nesting and no YAML typing, every value stays a string.

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// `---` line, block, `---` line, body. Both `\n` and `\r\n` are accepted.
    static ref FRONT_MATTER_RE: Regex =
        Regex::new(r"(?s)\A---\r?\n(.*?)\r?\n---(?:\r?\n(.*))?\z").expect("valid front-matter pattern");
}

/// Key-lowercased front-matter fields, in file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontMatter {
    fields: IndexMap<String, String>,
}

impl FrontMatter {
    /// Split text into its front-matter block and the remaining body.
    ///
    /// Returns `None` when the text does not open with a delimited block, in
    /// which case the whole text is body.
    pub fn split(text: &str) -> Option<(Self, &str)> {
        let captures = FRONT_MATTER_RE.captures(text)?;
        let block = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
        let body = captures.get(2).map(|m| m.as_str()).unwrap_or_default();
        Some((Self::parse_block(block), body))
    }

    /// Parse the lines between the markers
    pub fn parse_block(block: &str) -> Self {
        let mut fields = IndexMap::new();

        for line in block.lines() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim().to_lowercase();
            let value = strip_quotes(value.trim());
            fields.insert(key, value.to_string());
        }

        Self { fields }
    }

    /// Look up a value by its lower-cased key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// First key in `keys` that is present
    pub fn get_any(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| self.get(key))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Remove one layer of matching single or double quotes
fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
