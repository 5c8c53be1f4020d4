//! Identifier casing.
//!
//! Schema names (usually `snake_case` or `kebab-case`) are split into words
//! and re-cased per target. Each backend supplies a [`Naming`] describing the
//! case it uses for each [`Convention`] and how it escapes reserved words.
//! Distinct schema names that collapse to the same identifier are caught by
//! a [`NameScope`].

use crate::error::GenerateError;
use std::collections::HashMap;

/// Where an identifier is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Convention {
    /// Type declarations (`User`, `GetUserInput`).
    Type,
    /// Methods and other members (`get_user`, `getUser`).
    Member,
    /// Struct fields and properties.
    Field,
}

/// A casing style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    /// `GetUser`
    Pascal,
    /// `getUser`
    Camel,
    /// `get_user`
    Snake,
    /// Unchanged.
    Preserve,
}

/// How a reserved word is made usable as an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escape {
    /// `r#type`
    RawIdentifier,
    /// `class_`
    TrailingUnderscore,
}

/// A backend's naming rules.
#[derive(Debug, Clone, Copy)]
pub struct Naming {
    pub type_case: Case,
    pub member_case: Case,
    pub field_case: Case,
    pub keywords: &'static [&'static str],
    pub escape: Escape,
}

impl Naming {
    pub const fn new(type_case: Case, member_case: Case, field_case: Case) -> Self {
        Self {
            type_case,
            member_case,
            field_case,
            keywords: &[],
            escape: Escape::TrailingUnderscore,
        }
    }

    pub const fn with_keywords(mut self, keywords: &'static [&'static str], escape: Escape) -> Self {
        self.keywords = keywords;
        self.escape = escape;
        self
    }

    /// Transform `raw` into an identifier for `convention`.
    pub fn identifier(&self, raw: &str, convention: Convention) -> String {
        let case = match convention {
            Convention::Type => self.type_case,
            Convention::Member => self.member_case,
            Convention::Field => self.field_case,
        };

        let mut ident = case.apply(raw);
        if ident.starts_with(|c: char| c.is_ascii_digit()) {
            ident.insert(0, '_');
        }

        if self.keywords.contains(&ident.as_str()) {
            ident = match self.escape {
                // These cannot be raw identifiers.
                Escape::RawIdentifier if !matches!(ident.as_str(), "self" | "Self" | "super" | "crate") => {
                    format!("r#{ident}")
                }
                _ => format!("{ident}_"),
            };
        }

        ident
    }
}

impl Case {
    /// Re-case `raw`.
    pub fn apply(self, raw: &str) -> String {
        let words = split_words(raw);
        if words.is_empty() && self != Case::Preserve {
            return "_".to_string();
        }

        match self {
            Case::Preserve => raw.to_string(),
            Case::Pascal => words.iter().map(|w| capitalize(w)).collect(),
            Case::Camel => words
                .iter()
                .enumerate()
                .map(|(i, w)| if i == 0 { w.to_lowercase() } else { capitalize(w) })
                .collect(),
            Case::Snake => words
                .iter()
                .map(|w| w.to_lowercase())
                .collect::<Vec<_>>()
                .join("_"),
        }
    }
}

/// Split a name into words on separators and camel-case boundaries.
///
/// `get_user`, `get-user`, `getUser` and `GetUser` all split into
/// `["get", "user"]` (modulo case); `HTTPServer` splits into `["HTTP", "Server"]`.
pub fn split_words(raw: &str) -> Vec<String> {
    let chars: Vec<char> = raw.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' || c == '.' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower) {
                words.push(std::mem::take(&mut current));
            }
        }

        current.push(c);
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Identifiers claimed within one scope (e.g. the fields of one type).
#[derive(Debug)]
pub struct NameScope {
    label: String,
    claimed: HashMap<String, String>,
}

impl NameScope {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            claimed: HashMap::new(),
        }
    }

    /// Claim `identifier` for the schema name `raw`.
    ///
    /// Claiming the same pair twice is allowed; a second, different `raw`
    /// mapping to an already claimed identifier is a conflict.
    pub fn claim(&mut self, raw: &str, identifier: &str) -> Result<(), GenerateError> {
        match self.claimed.get(identifier) {
            Some(first) if first != raw => Err(GenerateError::NamingConflict {
                scope: self.label.clone(),
                first: first.clone(),
                second: raw.to_string(),
                identifier: identifier.to_string(),
            }),
            Some(_) => Ok(()),
            None => {
                self.claimed.insert(identifier.to_string(), raw.to_string());
                Ok(())
            }
        }
    }
}
