//! Word list loading.
//!
//! The document is either a bare JSON array of entries or an object wrapping
//! that array under `list`. Entries that do not have the expected shape are
//! skipped one by one rather than failing the whole load.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("dictionary is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("dictionary must be a list or an object with a `list` array")]
    Shape,
}

/// A definition or context: one text, or alternatives picked at random.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TextChoice {
    One(String),
    Many(Vec<String>),
}

impl Default for TextChoice {
    fn default() -> Self {
        TextChoice::One(String::new())
    }
}

impl TextChoice {
    /// Resolve to a concrete text. An empty alternative list resolves to "".
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        match self {
            TextChoice::One(text) => text.clone(),
            TextChoice::Many(options) => options.choose(rng).cloned().unwrap_or_default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct DictionaryEntry {
    #[serde(default)]
    pub word: Option<String>,
    #[serde(default)]
    pub definition: Option<TextChoice>,
    #[serde(default)]
    pub context: Option<TextChoice>,
}

impl DictionaryEntry {
    pub fn new(word: &str, definition: &str) -> Self {
        Self {
            word: Some(word.to_string()),
            definition: Some(TextChoice::One(definition.to_string())),
            context: None,
        }
    }

    pub fn with_context(mut self, context: TextChoice) -> Self {
        self.context = Some(context);
        self
    }

    /// Upper-cased word as characters, or `None` for missing/blank words.
    pub fn letters(&self) -> Option<Vec<char>> {
        let word = self.word.as_deref()?;
        if word.trim().is_empty() {
            return None;
        }
        Some(word.chars().flat_map(char::to_uppercase).collect())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dictionary {
    entries: Vec<DictionaryEntry>,
}

impl Dictionary {
    pub fn new(entries: Vec<DictionaryEntry>) -> Self {
        Self { entries }
    }

    pub fn from_json(json: &str) -> Result<Self, DictionaryError> {
        let doc: Value = serde_json::from_str(json)?;
        let items = match doc {
            Value::Array(items) => items,
            Value::Object(mut map) => match map.remove("list") {
                Some(Value::Array(items)) => items,
                _ => return Err(DictionaryError::Shape),
            },
            _ => return Err(DictionaryError::Shape),
        };
        let total = items.len();
        let entries: Vec<DictionaryEntry> = items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect();
        if entries.len() < total {
            log::debug!("skipped {} malformed dictionary entries", total - entries.len());
        }
        Ok(Self { entries })
    }

    /// Parse, logging and degrading to an empty dictionary on failure.
    pub fn from_json_or_empty(json: &str) -> Self {
        Self::from_json(json).unwrap_or_else(|e| {
            log::error!("failed to load dictionary: {e}");
            Self::default()
        })
    }

    pub fn entries(&self) -> &[DictionaryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Indices of entries with a non-blank word, paired with their
    /// upper-cased letters.
    pub fn usable(&self) -> impl Iterator<Item = (usize, Vec<char>)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(i, entry)| entry.letters().map(|letters| (i, letters)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn bare_list_and_wrapped_list_parse_the_same() {
        let bare = r#"[{"word":"cannon","definition":"a large gun"}]"#;
        let wrapped = r#"{"list":[{"word":"cannon","definition":"a large gun"}]}"#;
        let a = Dictionary::from_json(bare).unwrap();
        let b = Dictionary::from_json(wrapped).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 1);
    }

    #[test]
    fn definition_and_context_accept_lists() {
        let json = r#"[{"word":"fort","definition":["a","b"],"context":["c"]}]"#;
        let dict = Dictionary::from_json(json).unwrap();
        let entry = &dict.entries()[0];
        assert_eq!(
            entry.definition,
            Some(TextChoice::Many(vec!["a".into(), "b".into()]))
        );
        let mut rng = StdRng::seed_from_u64(3);
        let ctx = entry.context.as_ref().unwrap().pick(&mut rng);
        assert_eq!(ctx, "c");
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let json = r#"[{"word":"tank"},{"word":42},"junk",{"definition":"no word"}]"#;
        let dict = Dictionary::from_json(json).unwrap();
        assert_eq!(dict.len(), 2);
        let usable: Vec<_> = dict.usable().map(|(_, letters)| letters).collect();
        assert_eq!(usable, vec!["TANK".chars().collect::<Vec<_>>()]);
    }

    #[test]
    fn blank_words_are_not_usable() {
        let dict = Dictionary::new(vec![
            DictionaryEntry::new("   ", "spaces"),
            DictionaryEntry::new("", "empty"),
        ]);
        assert_eq!(dict.usable().count(), 0);
    }

    #[test]
    fn usable_entries_keep_their_dictionary_index() {
        let dict = Dictionary::new(vec![
            DictionaryEntry::new(" ", "blank"),
            DictionaryEntry::new("navy", "ships"),
        ]);
        let usable: Vec<_> = dict.usable().collect();
        assert_eq!(usable, vec![(1, vec!['N', 'A', 'V', 'Y'])]);
    }

    #[test]
    fn wrong_shape_is_an_error() {
        assert!(matches!(Dictionary::from_json("{}"), Err(DictionaryError::Shape)));
        assert!(matches!(
            Dictionary::from_json(r#"{"list":"nope"}"#),
            Err(DictionaryError::Shape)
        ));
        assert!(matches!(Dictionary::from_json("[1,"), Err(DictionaryError::Parse(_))));
        assert!(Dictionary::from_json_or_empty("oops").is_empty());
    }

    #[test]
    fn empty_alternatives_resolve_to_blank() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(TextChoice::Many(vec![]).pick(&mut rng), "");
    }
}
