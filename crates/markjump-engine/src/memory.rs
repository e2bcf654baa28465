//! An in-memory document that implements the DOM capability traits.
//!
//! Elements are a flat list in document order. Selectors support a small
//! subset of CSS: comma-separated compound selectors built from a tag name
//! (or `*`), `#id`, `.class`, `[attr]` and `[attr=value]`. Combinators and
//! pseudo-classes are rejected as invalid.
//!
//! Every native interaction is appended to a log so tests can assert on
//! exactly which side effects a dispatch produced.

use crate::dom::{BrowsingContext, Document, ElementHandle};
use async_trait::async_trait;
use markjump_common::error::BackendError;
use std::sync::Arc;
use tokio::sync::Mutex;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    Click(usize),
    Focus(usize),
    SelectAll(usize),
    Submit(usize),
    OpenNewContext(String),
    ReplaceLocation(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryNode {
    tag: String,
    attributes: Vec<(String, String)>,
    checked: bool,
    selection: Option<(usize, usize)>,
}

impl MemoryNode {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
            checked: false,
            selection: None,
        }
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        if name == "checked" {
            self.checked = true;
        }
        match self.attributes.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value.to_string(),
            None => self.attributes.push((name.to_string(), value.to_string())),
        }
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn checked(&self) -> bool {
        self.checked
    }

    /// Selected character range, set by `select_all`.
    pub fn selection(&self) -> Option<(usize, usize)> {
        self.selection
    }

    fn value(&self) -> &str {
        self.attribute("value").unwrap_or("")
    }

    fn is_checkbox(&self) -> bool {
        self.tag == "input" && self.attribute("type") == Some("checkbox")
    }

    fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .is_some_and(|c| c.split_ascii_whitespace().any(|c| c == class))
    }
}

#[derive(Debug)]
struct MemoryState {
    base_url: Url,
    location: String,
    nodes: Vec<MemoryNode>,
    focused: Option<usize>,
    opened: Vec<String>,
    log: Vec<Interaction>,
}

pub struct MemoryDocumentBuilder {
    base_url: Url,
    nodes: Vec<MemoryNode>,
}

impl MemoryDocumentBuilder {
    pub fn element(mut self, node: MemoryNode) -> Self {
        self.nodes.push(node);
        self
    }

    /// Append a marker element carrying `key` and pointing at `selector`.
    pub fn marker(self, key: &str, selector: &str) -> Self {
        self.element(
            MemoryNode::new("span")
                .attr("class", "marker")
                .attr("key", key)
                .attr("pointed-link", selector),
        )
    }

    pub fn build(self) -> MemoryDocument {
        let location = self.base_url.to_string();
        MemoryDocument {
            state: Arc::new(Mutex::new(MemoryState {
                base_url: self.base_url,
                location,
                nodes: self.nodes,
                focused: None,
                opened: Vec::new(),
                log: Vec::new(),
            })),
        }
    }
}

/// Cloning yields another handle onto the same document.
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryDocument {
    pub fn builder(base_url: &str) -> Result<MemoryDocumentBuilder, url::ParseError> {
        Ok(MemoryDocumentBuilder {
            base_url: Url::parse(base_url)?,
            nodes: Vec::new(),
        })
    }

    pub async fn interactions(&self) -> Vec<Interaction> {
        self.state.lock().await.log.clone()
    }

    /// Index of the first element matching `selector`.
    pub async fn index_of(&self, selector: &str) -> Result<Option<usize>, BackendError> {
        let parsed = SelectorList::parse(selector)?;
        let state = self.state.lock().await;
        Ok(state.nodes.iter().position(|n| parsed.matches(n)))
    }

    pub async fn node(&self, selector: &str) -> Result<Option<MemoryNode>, BackendError> {
        let parsed = SelectorList::parse(selector)?;
        let state = self.state.lock().await;
        Ok(state.nodes.iter().find(|n| parsed.matches(n)).cloned())
    }

    pub async fn focused(&self) -> Option<MemoryNode> {
        let state = self.state.lock().await;
        state.focused.and_then(|i| state.nodes.get(i).cloned())
    }

    /// Current location of this browsing context.
    pub async fn location(&self) -> String {
        self.state.lock().await.location.clone()
    }

    /// URLs opened in new browsing contexts, oldest first.
    pub async fn opened_contexts(&self) -> Vec<String> {
        self.state.lock().await.opened.clone()
    }
}

#[async_trait]
impl Document for MemoryDocument {
    type Element = MemoryElement;

    async fn query_all(&self, selector: &str) -> Result<Vec<MemoryElement>, BackendError> {
        let parsed = SelectorList::parse(selector)?;
        let state = self.state.lock().await;
        Ok(state
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| parsed.matches(node))
            .map(|(index, _)| MemoryElement {
                state: Arc::clone(&self.state),
                index,
            })
            .collect())
    }
}

#[async_trait]
impl BrowsingContext for MemoryDocument {
    async fn open_in_new_context(&self, url: &str) -> Result<(), BackendError> {
        let mut state = self.state.lock().await;
        state.opened.push(url.to_string());
        state.log.push(Interaction::OpenNewContext(url.to_string()));
        Ok(())
    }

    async fn replace_location(&self, url: &str) -> Result<(), BackendError> {
        let mut state = self.state.lock().await;
        state.location = url.to_string();
        state.log.push(Interaction::ReplaceLocation(url.to_string()));
        Ok(())
    }
}

pub struct MemoryElement {
    state: Arc<Mutex<MemoryState>>,
    index: usize,
}

impl MemoryElement {
    pub fn index(&self) -> usize {
        self.index
    }

    async fn read<T>(&self, f: impl FnOnce(&MemoryNode) -> T + Send) -> Result<T, BackendError> {
        let state = self.state.lock().await;
        state
            .nodes
            .get(self.index)
            .map(f)
            .ok_or(BackendError::ElementStale)
    }
}

#[async_trait]
impl ElementHandle for MemoryElement {
    async fn tag_name(&self) -> Result<String, BackendError> {
        self.read(|n| n.tag.clone()).await
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>, BackendError> {
        self.read(|n| n.attribute(name).map(str::to_string)).await
    }

    async fn href(&self) -> Result<Option<String>, BackendError> {
        let state = self.state.lock().await;
        let node = state.nodes.get(self.index).ok_or(BackendError::ElementStale)?;
        if node.tag != "a" && node.tag != "area" {
            return Ok(None);
        }
        // Anchors always expose a string; unparsable values come back verbatim.
        let resolved = match node.attribute("href") {
            None => String::new(),
            Some(raw) => state
                .base_url
                .join(raw)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| raw.to_string()),
        };
        Ok(Some(resolved))
    }

    async fn click(&self) -> Result<(), BackendError> {
        let mut state = self.state.lock().await;
        let node = state
            .nodes
            .get_mut(self.index)
            .ok_or(BackendError::ElementStale)?;
        if node.is_checkbox() {
            node.checked = !node.checked;
        }
        state.log.push(Interaction::Click(self.index));
        Ok(())
    }

    async fn focus(&self) -> Result<(), BackendError> {
        let mut state = self.state.lock().await;
        if self.index >= state.nodes.len() {
            return Err(BackendError::ElementStale);
        }
        state.focused = Some(self.index);
        state.log.push(Interaction::Focus(self.index));
        Ok(())
    }

    async fn select_all(&self) -> Result<(), BackendError> {
        let mut state = self.state.lock().await;
        let node = state
            .nodes
            .get_mut(self.index)
            .ok_or(BackendError::ElementStale)?;
        node.selection = Some((0, node.value().chars().count()));
        state.log.push(Interaction::SelectAll(self.index));
        Ok(())
    }

    async fn submit(&self) -> Result<(), BackendError> {
        let mut state = self.state.lock().await;
        if self.index >= state.nodes.len() {
            return Err(BackendError::ElementStale);
        }
        state.log.push(Interaction::Submit(self.index));
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Condition {
    Id(String),
    Class(String),
    Has(String),
    Equals(String, String),
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    conditions: Vec<Condition>,
}

impl Compound {
    fn matches(&self, node: &MemoryNode) -> bool {
        if let Some(tag) = &self.tag
            && *tag != node.tag
        {
            return false;
        }
        self.conditions.iter().all(|c| match c {
            Condition::Id(id) => node.attribute("id") == Some(id.as_str()),
            Condition::Class(class) => node.has_class(class),
            Condition::Has(name) => node.attribute(name).is_some(),
            Condition::Equals(name, value) => node.attribute(name) == Some(value.as_str()),
        })
    }
}

#[derive(Debug, PartialEq, Eq)]
struct SelectorList(Vec<Compound>);

impl SelectorList {
    fn parse(selector: &str) -> Result<Self, BackendError> {
        let invalid = || BackendError::SelectorInvalid {
            selector: selector.to_string(),
        };
        let compounds = selector
            .split(',')
            .map(|part| parse_compound(part.trim()).ok_or_else(invalid))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self(compounds))
    }

    fn matches(&self, node: &MemoryNode) -> bool {
        self.0.iter().any(|c| c.matches(node))
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn take_ident(input: &str) -> Option<(&str, &str)> {
    let end = input.find(|c| !is_ident_char(c)).unwrap_or(input.len());
    if end == 0 {
        return None;
    }
    Some(input.split_at(end))
}

fn parse_compound(input: &str) -> Option<Compound> {
    if input.is_empty() {
        return None;
    }
    let mut compound = Compound::default();
    let mut rest = input;

    if let Some(tail) = rest.strip_prefix('*') {
        rest = tail;
    } else if let Some((tag, tail)) = take_ident(rest) {
        compound.tag = Some(tag.to_ascii_lowercase());
        rest = tail;
    }

    while !rest.is_empty() {
        let mut chars = rest.chars();
        let marker = chars.next()?;
        let tail = chars.as_str();
        match marker {
            '#' => {
                let (id, tail) = take_ident(tail)?;
                compound.conditions.push(Condition::Id(id.to_string()));
                rest = tail;
            }
            '.' => {
                let (class, tail) = take_ident(tail)?;
                compound.conditions.push(Condition::Class(class.to_string()));
                rest = tail;
            }
            '[' => {
                let close = tail.find(']')?;
                compound.conditions.push(parse_attribute(&tail[..close])?);
                rest = &tail[close + 1..];
            }
            _ => return None,
        }
    }
    Some(compound)
}

fn parse_attribute(body: &str) -> Option<Condition> {
    let (name, rest) = take_ident(body.trim())?;
    let rest = rest.trim();
    if rest.is_empty() {
        return Some(Condition::Has(name.to_string()));
    }
    let value = rest.strip_prefix('=')?.trim();
    let unquoted = ['"', '\'']
        .iter()
        .find_map(|q| value.strip_prefix(*q).and_then(|v| v.strip_suffix(*q)));
    let value = match unquoted {
        Some(v) => v,
        None if !value.is_empty() && value.chars().all(is_ident_char) => value,
        None => return None,
    };
    Some(Condition::Equals(name.to_string(), value.to_string()))
}
