//! Top-level completion document: root grammar, execution metadata and the
//! registry of named definitions that `reference` nodes point at.
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ir::Node;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// Execution behavior switches, each emitted only when set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompletionFlags {
    pub flat: bool,
    pub ad_hoc_channels: bool,
}

/// Definition registry. Insertion ordered, one entry per key.
pub(crate) type Definitions = IndexMap<String, Option<Node>>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    completion: Option<Node>,
    flags: CompletionFlags,
    stdout: Option<String>,
    stderr: Option<String>,
    definitions: Definitions,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl CompletionFlags {
    pub const NONE: Self = Self {
        flat: false,
        ad_hoc_channels: false,
    };
    pub const FLAT: Self = Self {
        flat: true,
        ad_hoc_channels: false,
    };
    pub const AD_HOC_CHANNELS: Self = Self {
        flat: false,
        ad_hoc_channels: true,
    };

    pub fn union(self, other: Self) -> Self {
        Self {
            flat: self.flat || other.flat,
            ad_hoc_channels: self.ad_hoc_channels || other.ad_hoc_channels,
        }
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the completion root. `None` clears it.
    pub fn set_completion(&mut self, node: impl Into<Option<Node>>) {
        let node = node.into();
        debug!(
            replaced = self.completion.is_some(),
            cleared = node.is_none(),
            "setting completion root"
        );
        self.completion = node;
    }

    pub fn take_completion(&mut self) -> Option<Node> {
        self.completion.take()
    }

    /// Overwrites flags and both channels together. A `None` channel clears it.
    pub fn set_completion_metadata(
        &mut self,
        flags: CompletionFlags,
        stdout: Option<&str>,
        stderr: Option<&str>,
    ) {
        debug!(?flags, ?stdout, ?stderr, "setting completion metadata");
        self.flags = flags;
        self.stdout = stdout.map(str::to_owned);
        self.stderr = stderr.map(str::to_owned);
    }

    /// Insert-or-replace a named definition.
    ///
    /// An existing key keeps its position in the registry; its previous node is
    /// dropped. New keys are appended.
    pub fn set_definition(&mut self, key: &str, node: impl Into<Option<Node>>) {
        let node = node.into();
        match self.definitions.get_mut(key) {
            Some(slot) => {
                debug!(key, "replacing definition");
                *slot = node;
            }
            None => {
                debug!(key, position = self.definitions.len(), "adding definition");
                self.definitions.insert(key.to_owned(), node);
            }
        }
    }

    /// Removes a definition; remaining entries keep their order.
    pub fn remove_definition(&mut self, key: &str) -> Option<Option<Node>> {
        self.definitions.shift_remove(key)
    }

    pub fn completion(&self) -> Option<&Node> {
        self.completion.as_ref()
    }

    pub fn flags(&self) -> CompletionFlags {
        self.flags
    }

    pub fn stdout_channel(&self) -> Option<&str> {
        self.stdout.as_deref()
    }

    pub fn stderr_channel(&self) -> Option<&str> {
        self.stderr.as_deref()
    }

    pub fn definition(&self, key: &str) -> Option<&Node> {
        self.definitions.get(key).and_then(Option::as_ref)
    }

    pub fn contains_definition(&self, key: &str) -> bool {
        self.definitions.contains_key(key)
    }

    /// Definitions in registry order.
    pub fn definitions(&self) -> impl Iterator<Item = (&str, Option<&Node>)> {
        self.definitions
            .iter()
            .map(|(key, node)| (key.as_str(), node.as_ref()))
    }

    pub fn definition_count(&self) -> usize {
        self.definitions.len()
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(doc: &Document) -> Vec<&str> {
        doc.definitions().map(|(key, _)| key).collect()
    }

    #[test]
    fn new_document_is_empty() {
        let doc = Document::new();
        assert!(doc.completion().is_none());
        assert_eq!(doc.flags(), CompletionFlags::NONE);
        assert!(doc.stdout_channel().is_none());
        assert!(doc.stderr_channel().is_none());
        assert_eq!(doc.definition_count(), 0);
    }

    #[test]
    fn set_definition_replaces_in_place() {
        let mut doc = Document::new();
        doc.set_definition("file", Node::string(["a"]));
        doc.set_definition("remote", Node::string(["origin"]));
        doc.set_definition("branch", Node::string(["main"]));
        doc.set_definition("file", Node::reference("path"));

        assert_eq!(keys(&doc), ["file", "remote", "branch"]);
        assert_eq!(doc.definition("file"), Some(&Node::reference("path")));
    }

    #[test]
    fn null_definition_is_kept() {
        let mut doc = Document::new();
        doc.set_definition("todo", None::<Node>);
        assert!(doc.contains_definition("todo"));
        assert_eq!(doc.definition("todo"), None);
    }

    #[test]
    fn remove_definition_keeps_order() {
        let mut doc = Document::new();
        for key in ["a", "b", "c"] {
            doc.set_definition(key, Node::integer(None, None));
        }
        assert_eq!(
            doc.remove_definition("b"),
            Some(Some(Node::integer(None, None)))
        );
        assert_eq!(keys(&doc), ["a", "c"]);
        assert_eq!(doc.remove_definition("b"), None);
    }

    #[test]
    fn metadata_is_overwritten_not_merged() {
        let mut doc = Document::new();
        doc.set_completion_metadata(
            CompletionFlags::FLAT.union(CompletionFlags::AD_HOC_CHANNELS),
            Some("out"),
            Some("err"),
        );
        doc.set_completion_metadata(CompletionFlags::AD_HOC_CHANNELS, None, Some("log"));

        assert_eq!(doc.flags(), CompletionFlags::AD_HOC_CHANNELS);
        assert_eq!(doc.stdout_channel(), None);
        assert_eq!(doc.stderr_channel(), Some("log"));
    }

    #[test]
    fn completion_can_be_replaced_and_cleared() {
        let mut doc = Document::new();
        doc.set_completion(Node::reference("root"));
        doc.set_completion(Node::string(["x"]));
        assert_eq!(doc.completion(), Some(&Node::string(["x"])));
        doc.set_completion(None::<Node>);
        assert!(doc.completion().is_none());
    }

    #[test]
    fn flags_deserialize_from_camel_case() {
        let flags: CompletionFlags = serde_json::from_str(r#"{"adHocChannels":true}"#).unwrap();
        assert_eq!(flags, CompletionFlags::AD_HOC_CHANNELS);
    }
}
