//! Completion grammar IR.
//!
//! A [`Node`] describes one fragment of accepted command-line input. Trees are
//! built bottom-up: composite constructors take already-built children by
//! value, so every node has exactly one owner and is released exactly once
//! when that owner goes away.
//!
//! Slots that may hold "no node" (repeat subject, sequence children, keyword
//! pair values) are `Option<Node>`; an empty slot is emitted as `null`.
use crate::error::{Error, Result};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    /// Opaque tag consumers attach to matched fragments; emitted last.
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Names a definition; the target is not required to exist.
    Reference { target: String },
    /// Literal choices. Empty means unconstrained.
    String { options: Vec<String> },
    Float { min: Option<f64>, max: Option<f64> },
    Integer { min: Option<i64>, max: Option<i64> },
    /// `subject` recurs until one of `endings` is seen; no endings = unterminated.
    Repeat { subject: Option<Box<Node>>, endings: Vec<String> },
    Sequence { nodes: Vec<Option<Node>> },
    Keyword(Keyword),
}

/// Named sub-grammars, insertion ordered, at most one pair per ident.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Keyword {
    pairs: Vec<KeywordPair>,
}

/// Fields are declared in release order: the child node, then its ident.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordPair {
    pub node: Option<Node>,
    pub ident: String,
}

// ————————————————————————————————————————————————————————————————————————————
// CONSTRUCTORS
// ————————————————————————————————————————————————————————————————————————————

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self { kind, id: None }
    }

    pub fn reference(target: impl Into<String>) -> Self {
        Self::new(NodeKind::Reference {
            target: target.into(),
        })
    }

    pub fn string<I>(options: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self::new(NodeKind::String {
            options: options.into_iter().map(Into::into).collect(),
        })
    }

    pub fn float(min: Option<f64>, max: Option<f64>) -> Self {
        Self::new(NodeKind::Float { min, max })
    }

    pub fn integer(min: Option<i64>, max: Option<i64>) -> Self {
        Self::new(NodeKind::Integer { min, max })
    }

    pub fn repeat<I>(subject: impl Into<Option<Node>>, endings: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self::new(NodeKind::Repeat {
            subject: subject.into().map(Box::new),
            endings: endings.into_iter().map(Into::into).collect(),
        })
    }

    pub fn sequence<I>(nodes: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Option<Node>>,
    {
        Self::new(NodeKind::Sequence {
            nodes: nodes.into_iter().map(Into::into).collect(),
        })
    }

    /// Duplicate idents collapse onto the first occurrence, last value wins.
    pub fn keyword(pairs: impl IntoIterator<Item = KeywordPair>) -> Self {
        Self::new(NodeKind::Keyword(pairs.into_iter().collect()))
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn set_id(&mut self, id: Option<&str>) {
        self.id = id.map(str::to_owned);
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Upsert into a keyword node. See [`Keyword::set`].
    pub fn set_keyword(&mut self, ident: &str, node: impl Into<Option<Node>>) -> Result<()> {
        match &mut self.kind {
            NodeKind::Keyword(keyword) => {
                keyword.set(ident, node);
                Ok(())
            }
            other => Err(Error::NotKeyword {
                found: other.name(),
            }),
        }
    }

    pub fn as_keyword(&self) -> Option<&Keyword> {
        match &self.kind {
            NodeKind::Keyword(keyword) => Some(keyword),
            _ => None,
        }
    }
}

impl NodeKind {
    /// Short human-readable kind name (floats and integers are told apart).
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Reference { .. } => "reference",
            NodeKind::String { .. } => "string",
            NodeKind::Float { .. } => "float",
            NodeKind::Integer { .. } => "integer",
            NodeKind::Repeat { .. } => "repeat",
            NodeKind::Sequence { .. } => "sequence",
            NodeKind::Keyword(_) => "keyword",
        }
    }
}

impl From<NodeKind> for Node {
    fn from(kind: NodeKind) -> Self {
        Self::new(kind)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// KEYWORD
// ————————————————————————————————————————————————————————————————————————————

impl KeywordPair {
    pub fn new(ident: impl Into<String>, node: impl Into<Option<Node>>) -> Self {
        Self {
            node: node.into(),
            ident: ident.into(),
        }
    }
}

impl Keyword {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert-or-replace by ident.
    ///
    /// An existing pair keeps its position and its previous node is dropped
    /// before the new one is installed. Unknown idents are appended.
    pub fn set(&mut self, ident: &str, node: impl Into<Option<Node>>) {
        let node = node.into();
        match self.pairs.iter_mut().find(|pair| pair.ident == ident) {
            Some(pair) => {
                tracing::trace!(ident, "replacing keyword");
                pair.node = node;
            }
            None => {
                tracing::trace!(ident, position = self.pairs.len(), "appending keyword");
                self.pairs.push(KeywordPair::new(ident, node));
            }
        }
    }

    pub fn pair(&self, ident: &str) -> Option<&KeywordPair> {
        self.pairs.iter().find(|pair| pair.ident == ident)
    }

    pub fn get(&self, ident: &str) -> Option<&Node> {
        self.pair(ident).and_then(|pair| pair.node.as_ref())
    }

    pub fn contains(&self, ident: &str) -> bool {
        self.pair(ident).is_some()
    }

    /// Removes a pair; the remaining pairs keep their relative order.
    pub fn remove(&mut self, ident: &str) -> Option<KeywordPair> {
        let index = self.pairs.iter().position(|pair| pair.ident == ident)?;
        Some(self.pairs.remove(index))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, KeywordPair> {
        self.pairs.iter()
    }
}

impl FromIterator<KeywordPair> for Keyword {
    fn from_iter<I: IntoIterator<Item = KeywordPair>>(pairs: I) -> Self {
        let mut keyword = Keyword::new();
        for KeywordPair { ident, node } in pairs {
            keyword.set(&ident, node);
        }
        keyword
    }
}

impl<'a> IntoIterator for &'a Keyword {
    type Item = &'a KeywordPair;
    type IntoIter = std::slice::Iter<'a, KeywordPair>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}

// ------------------------------- Tests ------------------------------------ //
