//! Structured view of documents and nodes as `serde_json::Value`.
//!
//! Same keys, same order and same presence rules as the text emitter, for
//! embedders that want to inspect or post-process a document instead of
//! shipping bytes. Floats go through `serde_json::Number`, so they render in
//! serde_json's shortest form and non-finite bounds become `null`.
use serde_json::{Map, Value};

use crate::document::Document;
use crate::ir::{Node, NodeKind};

fn strings(values: &[String]) -> Value {
    Value::Array(values.iter().cloned().map(Value::from).collect())
}

fn float(value: f64) -> Value {
    serde_json::Number::from_f64(value).map_or(Value::Null, Value::Number)
}

pub fn node_value(node: Option<&Node>) -> Value {
    let Some(node) = node else {
        return Value::Null;
    };
    let mut map = Map::new();

    match &node.kind {
        NodeKind::Reference { target } => {
            map.insert("type".into(), Value::from("reference"));
            map.insert("ref".into(), Value::from(target.as_str()));
        }
        NodeKind::String { options } => {
            map.insert("type".into(), Value::from("string"));
            map.insert("options".into(), strings(options));
        }
        NodeKind::Float { min, max } => {
            map.insert("type".into(), Value::from("number"));
            map.insert("integer".into(), Value::Bool(false));
            if let Some(m) = *min {
                map.insert("min".into(), float(m));
            }
            if let Some(m) = *max {
                map.insert("max".into(), float(m));
            }
        }
        NodeKind::Integer { min, max } => {
            map.insert("type".into(), Value::from("number"));
            map.insert("integer".into(), Value::Bool(true));
            if let Some(m) = *min {
                map.insert("min".into(), Value::from(m));
            }
            if let Some(m) = *max {
                map.insert("max".into(), Value::from(m));
            }
        }
        NodeKind::Repeat { subject, endings } => {
            map.insert("type".into(), Value::from("repeat"));
            map.insert("stmt".into(), node_value(subject.as_deref()));
            match endings.as_slice() {
                [] => {}
                [ending] => {
                    map.insert("end".into(), Value::from(ending.as_str()));
                }
                endings => {
                    map.insert("end".into(), strings(endings));
                }
            }
        }
        NodeKind::Sequence { nodes } => {
            map.insert("type".into(), Value::from("sequence"));
            let stmts = nodes.iter().map(|n| node_value(n.as_ref())).collect();
            map.insert("stmts".into(), Value::Array(stmts));
        }
        NodeKind::Keyword(keyword) => {
            map.insert("type".into(), Value::from("keyword"));
            let mut stmts = Map::new();
            for pair in keyword {
                stmts.insert(pair.ident.clone(), node_value(pair.node.as_ref()));
            }
            map.insert("stmts".into(), Value::Object(stmts));
        }
    }

    if let Some(id) = node.id() {
        map.insert("id".into(), Value::from(id));
    }
    Value::Object(map)
}

pub fn document_value(doc: &Document) -> Value {
    let mut map = Map::new();
    let flags = doc.flags();
    if flags.flat {
        map.insert("flat".into(), Value::Bool(true));
    }
    if flags.ad_hoc_channels {
        map.insert("adHocChannels".into(), Value::Bool(true));
    }
    if let Some(channel) = doc.stdout_channel() {
        map.insert("stdout".into(), Value::from(channel));
    }
    if let Some(channel) = doc.stderr_channel() {
        map.insert("stderr".into(), Value::from(channel));
    }
    if let Some(root) = doc.completion() {
        map.insert("completion".into(), node_value(Some(root)));
    }
    if doc.definition_count() > 0 {
        let definitions = doc
            .definitions()
            .map(|(key, node)| (key.to_owned(), node_value(node)))
            .collect::<Map<_, _>>();
        map.insert("definitions".into(), Value::Object(definitions));
    }
    Value::Object(map)
}

impl Node {
    pub fn to_value(&self) -> Value {
        node_value(Some(self))
    }
}

impl Document {
    pub fn to_value(&self) -> Value {
        document_value(self)
    }
}

// ------------------------------- Tests ------------------------------------ //
