//! # Placeholder JSON Builder
//!
//! Document assembly for answers that arrive asynchronously. Each sub-query
//! dispatched to another component reserves a placeholder; its answer is
//! later parsed and appended to the array at the reserved location.
//!
//! A malformed answer (or the literal [`INVALID_ANSWER`]) installs `{}`
//! instead, so one bad source never aborts the whole document.

use crate::domain::json_builder::push_at_path;
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;
use std::fmt;

/// Answer text sent by a component that could not answer.
pub const INVALID_ANSWER: &str = "#invalid";

/// First token handed out; smaller values are reserved by callers.
const FIRST_TOKEN: u32 = 2;

/// Identifies one outstanding placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlaceholderToken(u32);

impl PlaceholderToken {
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PlaceholderToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct Placeholder {
    /// Dotted path of the array the answer is appended to
    location: String,
    /// Caller-chosen group, cleared together by `clear_components`
    code: i32,
}

/// Incrementally built document with pending placeholder slots.
#[derive(Debug, Clone)]
pub struct JsonMapBuilder {
    /// Created lazily; `None` until something is written or answered
    document: Option<JsonValue>,
    /// Placeholders still waiting for an answer
    missing: BTreeMap<PlaceholderToken, Placeholder>,
    /// Next token to hand out; never rewinds
    next_token: u32,
}

impl Default for JsonMapBuilder {
    fn default() -> Self {
        Self {
            document: None,
            missing: BTreeMap::new(),
            next_token: FIRST_TOKEN,
        }
    }
}

impl JsonMapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The document, created empty on first access. Locally known parts of
    /// the answer are written here directly.
    pub fn document_mut(&mut self) -> &mut JsonValue {
        self.document
            .get_or_insert_with(|| JsonValue::Object(Map::new()))
    }

    pub fn has_document(&self) -> bool {
        self.document.is_some()
    }

    /// Reserve a slot at `location`; `code` groups placeholders by the
    /// component that will answer them.
    ///
    /// Tokens are never reused, even across [`reset`](Self::reset).
    pub fn generate_placeholder(&mut self, location: &str, code: i32) -> PlaceholderToken {
        let token = PlaceholderToken(self.next_token);
        self.next_token = self.next_token.wrapping_add(1).max(FIRST_TOKEN);
        self.missing.insert(
            token,
            Placeholder {
                location: location.to_string(),
                code,
            },
        );
        token
    }

    /// Install the answer for `token` and retire it.
    ///
    /// Returns whether the document is now complete; an unknown token
    /// changes nothing and returns `false`.
    pub fn add_component(&mut self, answer: &str, token: PlaceholderToken) -> bool {
        let Some(placeholder) = self.missing.remove(&token) else {
            return false;
        };
        let element = if answer == INVALID_ANSWER {
            JsonValue::Object(Map::new())
        } else {
            serde_json::from_str(answer).unwrap_or_else(|_| JsonValue::Object(Map::new()))
        };
        push_at_path(self.document_mut(), &placeholder.location, element);
        self.missing.is_empty()
    }

    /// Abort every placeholder tagged with `code`.
    ///
    /// Returns `true` if something was removed and no placeholders remain;
    /// a code with no placeholders is a no-op returning `false`.
    pub fn clear_components(&mut self, code: i32) -> bool {
        let before = self.missing.len();
        self.missing.retain(|_, placeholder| placeholder.code != code);
        before != self.missing.len() && self.missing.is_empty()
    }

    /// Abort every placeholder; returns whether a document exists.
    pub fn clear_all_components(&mut self) -> bool {
        self.missing.clear();
        self.document.is_some()
    }

    pub fn is_completed(&self) -> bool {
        self.document.is_some() && self.missing.is_empty()
    }

    pub fn outstanding(&self) -> usize {
        self.missing.len()
    }

    pub fn is_outstanding(&self, token: PlaceholderToken) -> bool {
        self.missing.contains_key(&token)
    }

    /// Serialised document, or `{}` if nothing was ever added.
    pub fn generate(&self) -> String {
        match &self.document {
            Some(document) => document.to_string(),
            None => "{}".to_string(),
        }
    }

    /// Drop the document and all placeholders.
    pub fn reset(&mut self) {
        self.document = None;
        self.missing.clear();
    }
}
