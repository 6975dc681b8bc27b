//! Canonical JSON encoding for documents and grammar nodes.
//!
//! Output goes to any [`fmt::Write`] accumulator: `write_str` for literal
//! spans and `write_fmt` for numbers. The emitter only appends, never reads
//! back, and never touches the tree it walks.
//!
//! Key order and key presence are part of the wire format:
//! - document: `flat`, `adHocChannels`, `stdout`, `stderr`, `completion`,
//!   `definitions`, each only when set
//! - node: variant keys first, `id` last and only when set
//! - an empty node slot is the literal `null`
use std::fmt::{self, Write};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::document::Document;
use crate::error::Result;
use crate::ir::{Node, NodeKind};

// ------------------------------- Policy ---------------------------------- //

/// Fractional digits for fixed-point floats (`printf("%f")` compatible).
pub const DEFAULT_FLOAT_PRECISION: usize = 6;

// ————————————————————————————————————————————————————————————————————————————
// OPTIONS
// ————————————————————————————————————————————————————————————————————————————

/// How string content (options, endings, idents, keys, channels, ids) is
/// written between quotes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Escaping {
    /// Bytes are copied as-is. Wire compatible with existing consumers, but
    /// quotes or control characters in input produce invalid JSON.
    #[default]
    Verbatim,
    /// Standard JSON string escaping.
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FloatFormat {
    /// Fixed-point with the given number of fractional digits.
    Fixed(usize),
    /// Shortest representation that round-trips.
    Shortest,
}

impl Default for FloatFormat {
    fn default() -> Self {
        FloatFormat::Fixed(DEFAULT_FLOAT_PRECISION)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitOptions {
    pub escaping: Escaping,
    pub floats: FloatFormat,
}

// ————————————————————————————————————————————————————————————————————————————
// EMITTER
// ————————————————————————————————————————————————————————————————————————————

pub struct Emitter<'w, W: Write + ?Sized> {
    out: &'w mut W,
    options: EmitOptions,
}

/// Tracks whether a separator is due before the next object member or
/// array element.
struct Members {
    first: bool,
}

impl Members {
    fn new() -> Self {
        Self { first: true }
    }

    fn next<W: Write + ?Sized>(&mut self, out: &mut W) -> fmt::Result {
        if self.first {
            self.first = false;
            Ok(())
        } else {
            out.write_char(',')
        }
    }
}

impl<'w, W: Write + ?Sized> Emitter<'w, W> {
    pub fn new(out: &'w mut W, options: EmitOptions) -> Self {
        Self { out, options }
    }

    pub fn document(&mut self, doc: &Document) -> Result<()> {
        debug!(
            has_completion = doc.completion().is_some(),
            definitions = doc.definition_count(),
            "emitting document"
        );
        let flags = doc.flags();
        let mut members = Members::new();
        self.out.write_char('{')?;

        if flags.flat {
            self.key(&mut members, "flat")?;
            self.out.write_str("true")?;
        }
        if flags.ad_hoc_channels {
            self.key(&mut members, "adHocChannels")?;
            self.out.write_str("true")?;
        }
        if let Some(channel) = doc.stdout_channel() {
            self.key(&mut members, "stdout")?;
            self.string(channel)?;
        }
        if let Some(channel) = doc.stderr_channel() {
            self.key(&mut members, "stderr")?;
            self.string(channel)?;
        }
        if let Some(root) = doc.completion() {
            self.key(&mut members, "completion")?;
            self.node(Some(root))?;
        }
        if doc.definition_count() > 0 {
            self.key(&mut members, "definitions")?;
            self.out.write_char('{')?;
            let mut entries = Members::new();
            for (key, node) in doc.definitions() {
                entries.next(&mut *self.out)?;
                self.string(key)?;
                self.out.write_char(':')?;
                self.node(node)?;
            }
            self.out.write_char('}')?;
        }

        self.out.write_char('}')?;
        Ok(())
    }

    pub fn node(&mut self, node: Option<&Node>) -> Result<()> {
        let Some(node) = node else {
            self.out.write_str("null")?;
            return Ok(());
        };
        trace!(kind = node.kind.name(), "emitting node");
        self.out.write_char('{')?;

        match &node.kind {
            NodeKind::Reference { target } => {
                self.out.write_str(r#""type":"reference","ref":"#)?;
                self.string(target)?;
            }
            NodeKind::String { options } => {
                self.out.write_str(r#""type":"string","options":"#)?;
                self.strings(options)?;
            }
            NodeKind::Float { min, max } => {
                self.out.write_str(r#""type":"number","integer":false"#)?;
                if let Some(min) = min {
                    self.out.write_str(r#","min":"#)?;
                    self.float(*min)?;
                }
                if let Some(max) = max {
                    self.out.write_str(r#","max":"#)?;
                    self.float(*max)?;
                }
            }
            NodeKind::Integer { min, max } => {
                self.out.write_str(r#""type":"number","integer":true"#)?;
                if let Some(min) = min {
                    write!(self.out, r#","min":{min}"#)?;
                }
                if let Some(max) = max {
                    write!(self.out, r#","max":{max}"#)?;
                }
            }
            NodeKind::Repeat { subject, endings } => {
                self.out.write_str(r#""type":"repeat","stmt":"#)?;
                self.node(subject.as_deref())?;
                match endings.as_slice() {
                    [] => {}
                    [ending] => {
                        self.out.write_str(r#","end":"#)?;
                        self.string(ending)?;
                    }
                    endings => {
                        self.out.write_str(r#","end":"#)?;
                        self.strings(endings)?;
                    }
                }
            }
            NodeKind::Sequence { nodes } => {
                self.out.write_str(r#""type":"sequence","stmts":["#)?;
                let mut elements = Members::new();
                for child in nodes {
                    elements.next(&mut *self.out)?;
                    self.node(child.as_ref())?;
                }
                self.out.write_char(']')?;
            }
            NodeKind::Keyword(keyword) => {
                self.out.write_str(r#""type":"keyword","stmts":{"#)?;
                let mut entries = Members::new();
                for pair in keyword {
                    entries.next(&mut *self.out)?;
                    self.string(&pair.ident)?;
                    self.out.write_char(':')?;
                    self.node(pair.node.as_ref())?;
                }
                self.out.write_char('}')?;
            }
        }

        if let Some(id) = node.id() {
            self.out.write_str(r#","id":"#)?;
            self.string(id)?;
        }
        self.out.write_char('}')?;
        Ok(())
    }

    fn key(&mut self, members: &mut Members, name: &str) -> Result<()> {
        members.next(&mut *self.out)?;
        write!(self.out, "\"{name}\":")?;
        Ok(())
    }

    fn string(&mut self, value: &str) -> Result<()> {
        match self.options.escaping {
            Escaping::Verbatim => {
                self.out.write_char('"')?;
                self.out.write_str(value)?;
                self.out.write_char('"')?;
            }
            Escaping::Json => {
                let escaped = serde_json::to_string(value)?;
                self.out.write_str(&escaped)?;
            }
        }
        Ok(())
    }

    fn strings(&mut self, values: &[String]) -> Result<()> {
        self.out.write_char('[')?;
        let mut elements = Members::new();
        for value in values {
            elements.next(&mut *self.out)?;
            self.string(value)?;
        }
        self.out.write_char(']')?;
        Ok(())
    }

    fn float(&mut self, value: f64) -> Result<()> {
        match self.options.floats {
            // printf spells non-finite values in lower case
            FloatFormat::Fixed(_) if value.is_nan() => self.out.write_str("nan")?,
            FloatFormat::Fixed(_) if value.is_infinite() => {
                self.out.write_str(if value < 0.0 { "-inf" } else { "inf" })?
            }
            FloatFormat::Fixed(precision) => write!(self.out, "{value:.precision$}")?,
            FloatFormat::Shortest => write!(self.out, "{value}")?,
        }
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// ENTRY POINTS
// ————————————————————————————————————————————————————————————————————————————

pub fn write_document<W: Write + ?Sized>(
    out: &mut W,
    doc: &Document,
    options: EmitOptions,
) -> Result<()> {
    Emitter::new(out, options).document(doc)
}

pub fn write_node<W: Write + ?Sized>(
    out: &mut W,
    node: Option<&Node>,
    options: EmitOptions,
) -> Result<()> {
    Emitter::new(out, options).node(node)
}

pub fn document_to_string(doc: &Document, options: EmitOptions) -> Result<String> {
    let mut out = String::new();
    write_document(&mut out, doc, options)?;
    Ok(out)
}

pub fn node_to_string(node: Option<&Node>, options: EmitOptions) -> Result<String> {
    let mut out = String::new();
    write_node(&mut out, node, options)?;
    Ok(out)
}

/// Encodes the document and writes it to an I/O sink in one call.
pub fn to_writer<W: std::io::Write>(
    mut writer: W,
    doc: &Document,
    options: EmitOptions,
) -> Result<()> {
    let text = document_to_string(doc, options)?;
    writer.write_all(text.as_bytes())?;
    writer.flush()?;
    Ok(())
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_node(f, Some(self), EmitOptions::default()).map_err(|_| fmt::Error)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_document(f, self, EmitOptions::default()).map_err(|_| fmt::Error)
    }
}

impl Node {
    /// Canonical encoding with default options.
    pub fn to_json(&self) -> String {
        self.to_string()
    }
}

impl Document {
    /// Canonical encoding with default options.
    pub fn to_json(&self) -> String {
        self.to_string()
    }
}

// ------------------------------- Tests ------------------------------------ //
