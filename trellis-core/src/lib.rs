//! Trellis Core
//!
//! This crate provides the core runtime for the Trellis data-binding library.
//! It implements:
//!
//! - Reactive properties over plain nested data, with dependency tracking
//! - Watchers that observe a binding path and react synchronously to writes
//! - A template compiler that wires `v-model` and `{{ }}` bindings to a UI tree
//! - An in-memory UI tree with a small markup reader
//!
//! # Architecture
//!
//! - `reactive`: property cells, dependencies, the collector slot, watchers
//! - `compiler`: tree walk, directive registry and the built-in handlers
//! - `dom`: the UI tree contract and its in-memory implementation
//! - `vm`: the facade that wraps data and compiles a root
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use trellis_core::{Document, Options, Vm};
//!
//! let doc = Document::parse(r#"<div id="app"><input v-model="user.name"><p>{{ user.name }}</p></div>"#)?;
//! let mut vm = Vm::with_resolver(
//!     Options::new(json!({ "user": { "name": "Ann" } })).with_selector("#app"),
//!     &doc,
//! )?;
//!
//! // Writes notify every binding before returning.
//! vm.set("user.name", "Bo")?;
//! assert_eq!(doc.query("p").unwrap().text(), "Bo");
//! ```

pub mod compiler;
pub mod config;
pub mod dom;
pub mod error;
pub mod reactive;
pub mod vm;

pub use compiler::{Compiler, DirectiveKind, Directives};
pub use config::{BaselinePolicy, Config};
pub use dom::{Document, Node, NodeKind, Resolver, UiNode};
pub use error::{Error, Result};
pub use reactive::{observe, Object, Path, Value, Watcher};
pub use vm::{Data, Options, Root, Vm};
