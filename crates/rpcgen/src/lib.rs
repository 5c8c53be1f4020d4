//! Type, validator and client generation from RPC schemas.
//!
//! `rpcgen` turns one language-neutral API schema (named types, methods with
//! typed inputs and outputs, references, enums, defaults, required markers)
//! into type declarations, validation code and HTTP client stubs for several
//! target languages.
//!
//! # Architecture
//!
//! ```text
//! Schema document        Shared core                Output Backends
//! ───────────────     ─────────────────────      ──────────────────────────
//!                     ┌─ Resolver (resolve.rs)  ┌─> Rust types + validate
//! JSON ─> Schema ─────┼─ Naming  (naming.rs)  ──┼─> Rust client (reqwest)
//!        (schema.rs)  ├─ TypeMapper (mapper.rs) ├─> Go types + Validate()
//!                     └─ Validation (validate.rs)├─> TypeScript types/client
//!                                                └─> Ruby client
//! ```
//!
//! # Example
//!
//! ```
//! use rpcgen::{GenerateOptions, Schema, generate_go_types};
//!
//! let schema = Schema::from_json(r##"{
//!     "types": [
//!         { "name": "user", "properties": [
//!             { "name": "id", "type": "int", "required": true },
//!             { "name": "tags", "type": "array", "items": { "type": "string" } }
//!         ] }
//!     ],
//!     "methods": [
//!         { "name": "get_user",
//!           "inputs": [ { "name": "id", "type": "int", "required": true } ],
//!           "outputs": [ { "name": "user", "$ref": "#/types/user" } ] }
//!     ]
//! }"##).unwrap();
//!
//! let go = generate_go_types(&schema, &GenerateOptions::default()).unwrap();
//! assert!(go.contains("type User struct"));
//! assert!(go.contains("type GetUserInput struct"));
//! assert!(go.contains("func (u *User) Validate() error"));
//! ```
//!
//! # Using the Backend Registry
//!
//! ```
//! use rpcgen::{GenerateOptions, Schema, backend_names, get_backend};
//!
//! for name in backend_names() {
//!     println!("Backend: {}", name);
//! }
//!
//! let schema = Schema::new();
//! if let Some(backend) = get_backend("typescript-types") {
//!     let output = backend.generate(&schema, &GenerateOptions::default()).unwrap();
//!     assert!(output.starts_with("// Do not edit"));
//! }
//! ```
//!
//! # Feature Flags
//!
//! Backend flags (use `backend-*` prefix):
//! - `backend-rust` - `rust-types` and `rust-client`
//! - `backend-go` - `go-types`
//! - `backend-typescript` - `typescript-types` and `typescript-client`
//! - `backend-ruby` - `ruby-client`
//!
//! Language umbrella flags: `rust`, `go`, `typescript`, `ruby`.

pub mod error;
pub mod generate;
pub mod mapper;
pub mod naming;
pub mod output;
pub mod registry;
pub mod resolve;
pub mod schema;
pub mod traits;
pub mod validate;

pub use error::{GenerateError, LoadError, ValidationFailure};
pub use generate::{Context, GenerateOptions, generate};
pub use schema::{Field, Method, Reference, Schema, TypeDef, TypeDescriptor};

// Re-export traits
pub use traits::{BackendCategory, Emitter, MethodIo};

// Re-export registry functions
pub use registry::{backend_names, backends, backends_by_category, backends_for_language, get_backend};

// Re-export generators
#[cfg(feature = "backend-rust")]
pub use output::{generate_rust_client, generate_rust_types};

#[cfg(feature = "backend-go")]
pub use output::generate_go_types;

#[cfg(feature = "backend-typescript")]
pub use output::{generate_typescript_client, generate_typescript_types};

#[cfg(feature = "backend-ruby")]
pub use output::generate_ruby_client;

// Re-export backend structs
#[cfg(feature = "backend-rust")]
pub use output::rust::RustBackend;

#[cfg(feature = "backend-go")]
pub use output::go::GoBackend;

#[cfg(feature = "backend-typescript")]
pub use output::typescript::TypeScriptBackend;

#[cfg(feature = "backend-ruby")]
pub use output::ruby::RubyBackend;
