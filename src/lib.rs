//! Completion grammar IDL: a typed tree of argument-grammar fragments plus
//! its canonical JSON wire encoding, consumed by the completion runtime.
//!
//! ```text
//! ir (Node, NodeKind, Keyword) ─┐
//!                               ├─> document (Document, registry) ─> emit (wire JSON)
//!                               └─────────────────────────────────> value (serde_json view)
//! ```
pub mod document;
pub mod emit;
pub mod error;
pub mod ir;
pub mod value;

pub use document::{CompletionFlags, Document};
pub use emit::{EmitOptions, Escaping, FloatFormat};
pub use error::{Error, Result};
pub use ir::{Keyword, KeywordPair, Node, NodeKind};
