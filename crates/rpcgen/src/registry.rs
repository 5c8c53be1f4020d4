//! Registry of code generation backends.
//!
//! The list is built once from the enabled `backend-*` features and never
//! changes afterwards.

use crate::traits::{BackendCategory, Emitter};
use std::sync::OnceLock;

static BACKENDS: OnceLock<Vec<&'static dyn Emitter>> = OnceLock::new();

fn builtin() -> &'static [&'static dyn Emitter] {
    BACKENDS.get_or_init(|| {
        #[allow(unused_mut)]
        let mut backends: Vec<&'static dyn Emitter> = Vec::new();

        #[cfg(feature = "backend-rust")]
        {
            backends.push(&crate::output::rust::RUST_TYPES_BACKEND);
            backends.push(&crate::output::rust::RUST_CLIENT_BACKEND);
        }

        #[cfg(feature = "backend-go")]
        {
            backends.push(&crate::output::go::GO_BACKEND);
        }

        #[cfg(feature = "backend-typescript")]
        {
            backends.push(&crate::output::typescript::TYPESCRIPT_TYPES_BACKEND);
            backends.push(&crate::output::typescript::TYPESCRIPT_CLIENT_BACKEND);
        }

        #[cfg(feature = "backend-ruby")]
        {
            backends.push(&crate::output::ruby::RUBY_CLIENT_BACKEND);
        }

        backends
    })
}

/// Get a backend by name.
pub fn get_backend(name: &str) -> Option<&'static dyn Emitter> {
    builtin().iter().find(|b| b.name() == name).copied()
}

/// Get all backends for a language.
pub fn backends_for_language(language: &str) -> Vec<&'static dyn Emitter> {
    builtin()
        .iter()
        .filter(|b| b.language() == language)
        .copied()
        .collect()
}

/// Get all backends in a category.
pub fn backends_by_category(category: BackendCategory) -> Vec<&'static dyn Emitter> {
    builtin()
        .iter()
        .filter(|b| b.category() == category)
        .copied()
        .collect()
}

/// List all backends.
pub fn backends() -> Vec<&'static dyn Emitter> {
    builtin().to_vec()
}

/// List all backend names.
pub fn backend_names() -> Vec<&'static str> {
    builtin().iter().map(|b| b.name()).collect()
}
