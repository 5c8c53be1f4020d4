//! Output backends for code generation.
//!
//! Each backend renders a [`Schema`](crate::schema::Schema) as source code
//! for one target. All backends implement the
//! [`Emitter`](crate::traits::Emitter) trait for uniform access via the
//! registry.

use crate::schema::Field;

// Rust
#[cfg(feature = "backend-rust")]
pub mod rust;

#[cfg(feature = "backend-rust")]
pub use rust::{RustBackend, generate_rust_client, generate_rust_types};

// Go
#[cfg(feature = "backend-go")]
pub mod go;

#[cfg(feature = "backend-go")]
pub use go::{GoBackend, generate_go_types};

// TypeScript
#[cfg(feature = "backend-typescript")]
pub mod typescript;

#[cfg(feature = "backend-typescript")]
pub use typescript::{TypeScriptBackend, generate_typescript_client, generate_typescript_types};

// Ruby
#[cfg(feature = "backend-ruby")]
pub mod ruby;

#[cfg(feature = "backend-ruby")]
pub use ruby::{RubyBackend, generate_ruby_client};

/// Banner placed at the top of every generated document.
pub const GENERATED_BANNER: &str = "Do not edit, this file was generated by rpcgen.";

/// `"{name} is {description}."`, or `"{name}."` without a description.
pub(crate) fn describe(name: &str, description: &str) -> String {
    let description = one_line(description);
    let description = description.trim_end_matches('.');
    if description.is_empty() {
        format!("{name}.")
    } else {
        format!("{name} is {description}.")
    }
}

/// Field doc: [`describe`] plus the allowed values and the default.
pub(crate) fn field_doc(name: &str, field: &Field) -> String {
    let mut doc = describe(name, &field.description);
    if !field.enum_values.is_empty() {
        doc.push_str(&format!(" Must be one of: {}.", quote_list(&field.enum_values)));
    }
    if let Some(default) = &field.default {
        doc.push_str(&format!(" Defaults to {default}."));
    }
    doc
}

/// A description as a capitalized sentence, if there is one.
pub(crate) fn sentence(text: &str) -> Option<String> {
    let text = one_line(text);
    let mut chars = text.chars();
    let first = chars.next()?;
    let mut out: String = first.to_uppercase().chain(chars).collect();
    if !out.ends_with('.') {
        out.push('.');
    }
    Some(out)
}

/// Collapse whitespace so the text fits a single comment line.
fn one_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Double-quoted string literal with C-style escapes (valid Go, TypeScript
/// and JSON).
pub(crate) fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// `"a", "b"`
pub(crate) fn quote_list(values: &[String]) -> String {
    values.iter().map(|v| quote(v)).collect::<Vec<_>>().join(", ")
}
