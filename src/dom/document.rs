//! Document - Arena-backed host document.
//!
//! Nodes are indices into a single arena and never move. A node is either
//! an element, a text run, or a fragment. Appending a fragment moves its
//! children into the new parent and leaves the fragment empty, which is
//! what makes [`Document::replace_children`] a single-step swap.

use std::collections::BTreeMap;
use std::fmt;

use super::selector::Selector;
use crate::error::{Result, RuntimeError};

/// Handle to a node in a [`Document`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// What a node is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Element {
        tag: String,
        attributes: BTreeMap<String, String>,
    },
    Text(String),
    Fragment,
}

#[derive(Debug)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A host document rooted at a `body` element.
#[derive(Debug)]
pub struct Document {
    nodes: Vec<Node>,
    body: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            body: NodeId(0),
        };
        doc.body = doc.create_element("body");
        doc
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    // =========================================================================
    // Creation
    // =========================================================================

    fn insert(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.insert(NodeKind::Element {
            tag: tag.to_ascii_lowercase(),
            attributes: BTreeMap::new(),
        })
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.insert(NodeKind::Text(text.to_string()))
    }

    /// Off-document container whose children move on append.
    pub fn create_fragment(&mut self) -> NodeId {
        self.insert(NodeKind::Fragment)
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id.0).ok_or(RuntimeError::MissingNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(id.0).ok_or(RuntimeError::MissingNode(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(id.0).map(|node| &node.kind)
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match self.kind(id)? {
            NodeKind::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|node| node.parent)
    }

    /// Children of `id`, empty for unknown nodes.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    /// Whether `id` is reachable from the body.
    pub fn is_connected(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == self.body {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        match self.kind(id)? {
            NodeKind::Element { attributes, .. } => attributes.get(name).map(String::as_str),
            _ => None,
        }
    }

    /// Set an attribute. Ignored on text and fragment nodes.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<()> {
        if let NodeKind::Element { attributes, .. } = &mut self.node_mut(id)?.kind {
            attributes.insert(name.to_string(), value.to_string());
        }
        Ok(())
    }

    // =========================================================================
    // Tree Mutation
    // =========================================================================

    /// Append `child` under `parent`, detaching it from any previous parent.
    ///
    /// Appending a fragment moves the fragment's children instead.
    /// Fails with [`RuntimeError::HierarchyRequest`] when the append would
    /// put a node inside itself or one of its own descendants.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.ensure_insertable(parent, child)?;
        if self.node(child)?.kind == NodeKind::Fragment {
            let moved = std::mem::take(&mut self.node_mut(child)?.children);
            for grandchild in moved {
                self.node_mut(grandchild)?.parent = Some(parent);
                self.node_mut(parent)?.children.push(grandchild);
            }
            return Ok(());
        }

        self.detach(child)?;
        self.node_mut(child)?.parent = Some(parent);
        self.node_mut(parent)?.children.push(child);
        Ok(())
    }

    /// Whether `ancestor` is `node` or one of its ancestors.
    fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Reject inserts that would make the tree cyclic. For a fragment the
    /// nodes actually moved are its children.
    fn ensure_insertable(&self, parent: NodeId, child: NodeId) -> Result<()> {
        self.node(parent)?;
        let node = self.node(child)?;
        let moved: &[NodeId] = if node.kind == NodeKind::Fragment {
            &node.children
        } else {
            std::slice::from_ref(&child)
        };
        let cyclic = self.is_inclusive_ancestor(child, parent)
            || moved.iter().any(|&id| self.is_inclusive_ancestor(id, parent));
        if cyclic {
            return Err(RuntimeError::HierarchyRequest { parent, child });
        }
        Ok(())
    }

    /// Remove `child` from `parent`. Returns false if it was not a child.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<bool> {
        if self.node(child)?.parent != Some(parent) {
            return Ok(false);
        }
        self.node_mut(parent)?.children.retain(|&c| c != child);
        self.node_mut(child)?.parent = None;
        Ok(true)
    }

    /// Remove `node` from its parent. Returns false if it had none.
    pub fn detach(&mut self, node: NodeId) -> Result<bool> {
        match self.node(node)?.parent {
            Some(parent) => self.remove_child(parent, node),
            None => Ok(false),
        }
    }

    /// Replace every child of `parent` with `content` in one step.
    pub fn replace_children(&mut self, parent: NodeId, content: NodeId) -> Result<()> {
        self.ensure_insertable(parent, content)?;
        let old = std::mem::take(&mut self.node_mut(parent)?.children);
        for child in old {
            self.node_mut(child)?.parent = None;
        }
        self.append_child(parent, content)
    }

    // =========================================================================
    // Text
    // =========================================================================

    /// Concatenated text of `id` and its descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        if let Some(NodeKind::Text(text)) = self.kind(id) {
            out.push_str(text);
        }
        for &child in self.children(id) {
            self.collect_text(child, out);
        }
    }

    /// Replace the children of `id` with a single text node.
    pub fn set_text_content(&mut self, id: NodeId, text: &str) -> Result<()> {
        if let NodeKind::Text(existing) = &mut self.node_mut(id)?.kind {
            *existing = text.to_string();
            return Ok(());
        }
        let text = self.create_text(text);
        self.replace_children(id, text)
    }

    // =========================================================================
    // Query
    // =========================================================================

    /// First connected element matching `selector`, depth-first from the body.
    pub fn query_selector(&self, selector: &str) -> Option<NodeId> {
        let selector = Selector::parse(selector)?;
        self.find(self.body, &selector)
    }

    fn find(&self, id: NodeId, selector: &Selector) -> Option<NodeId> {
        if let Some(NodeKind::Element { tag, attributes }) = self.kind(id) {
            if selector.matches(tag, |name| attributes.get(name).map(String::as_str)) {
                return Some(id);
            }
        }
        self.children(id)
            .iter()
            .find_map(|&child| self.find(child, selector))
    }

    // =========================================================================
    // Serialization
    // =========================================================================

    /// Serialize `id` and its subtree as HTML.
    pub fn to_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_html(id, &mut out);
        out
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        match self.kind(id) {
            Some(NodeKind::Element { tag, attributes }) => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attributes {
                    out.push_str(&format!(" {name}=\"{}\"", escape(value)));
                }
                out.push('>');
                for &child in self.children(id) {
                    self.write_html(child, out);
                }
                out.push_str(&format!("</{tag}>"));
            }
            Some(NodeKind::Text(text)) => out.push_str(&escape(text)),
            Some(NodeKind::Fragment) => {
                for &child in self.children(id) {
                    self.write_html(child, out);
                }
            }
            None => {}
        }
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> (Document, NodeId) {
        let mut doc = Document::new();
        let app = doc.create_element("div");
        doc.set_attribute(app, "id", "app").unwrap();
        doc.append_child(doc.body(), app).unwrap();
        (doc, app)
    }

    #[test]
    fn test_query_selector() {
        let (mut doc, app) = page();
        let item = doc.create_element("li");
        doc.set_attribute(item, "class", "item active").unwrap();
        doc.append_child(app, item).unwrap();

        assert_eq!(doc.query_selector("#app"), Some(app));
        assert_eq!(doc.query_selector("li.active"), Some(item));
        assert_eq!(doc.query_selector("#missing"), None);
        assert_eq!(doc.query_selector("div li"), None);
    }

    #[test]
    fn test_detached_nodes_are_not_found() {
        let mut doc = Document::new();
        let loose = doc.create_element("div");
        doc.set_attribute(loose, "id", "loose").unwrap();

        assert_eq!(doc.query_selector("#loose"), None);
        assert!(!doc.is_connected(loose));
    }

    #[test]
    fn test_append_moves_between_parents() {
        let (mut doc, app) = page();
        let other = doc.create_element("section");
        doc.append_child(doc.body(), other).unwrap();
        let child = doc.create_element("span");

        doc.append_child(app, child).unwrap();
        doc.append_child(other, child).unwrap();

        assert!(doc.children(app).is_empty());
        assert_eq!(doc.children(other), &[child]);
        assert_eq!(doc.parent(child), Some(other));
    }

    #[test]
    fn test_fragment_append_moves_children() {
        let (mut doc, app) = page();
        let fragment = doc.create_fragment();
        let a = doc.create_text("a");
        let b = doc.create_text("b");
        doc.append_child(fragment, a).unwrap();
        doc.append_child(fragment, b).unwrap();

        doc.append_child(app, fragment).unwrap();

        assert!(doc.children(fragment).is_empty());
        assert_eq!(doc.children(app), &[a, b]);
        assert_eq!(doc.text_content(app), "ab");
    }

    #[test]
    fn test_replace_children() {
        let (mut doc, app) = page();
        let old = doc.create_text("old");
        doc.append_child(app, old).unwrap();

        let fragment = doc.create_fragment();
        let fresh = doc.create_element("p");
        doc.append_child(fragment, fresh).unwrap();
        doc.replace_children(app, fragment).unwrap();

        assert_eq!(doc.children(app), &[fresh]);
        assert_eq!(doc.parent(old), None);
    }

    #[test]
    fn test_detach() {
        let (mut doc, app) = page();
        let child = doc.create_element("p");
        doc.append_child(app, child).unwrap();

        assert!(doc.detach(child).unwrap());
        assert!(!doc.detach(child).unwrap());
        assert!(doc.children(app).is_empty());
    }

    #[test]
    fn test_append_to_itself_is_rejected() {
        let (mut doc, app) = page();

        assert!(matches!(
            doc.append_child(app, app),
            Err(RuntimeError::HierarchyRequest { .. })
        ));
        assert_eq!(doc.parent(app), Some(doc.body()));
    }

    #[test]
    fn test_append_ancestor_is_rejected() {
        let (mut doc, app) = page();
        let inner = doc.create_element("span");
        doc.append_child(app, inner).unwrap();
        let body = doc.body();

        assert!(matches!(
            doc.append_child(inner, app),
            Err(RuntimeError::HierarchyRequest { .. })
        ));
        assert!(matches!(
            doc.append_child(inner, body),
            Err(RuntimeError::HierarchyRequest { .. })
        ));
        assert_eq!(doc.parent(body), None);
        assert!(doc.is_connected(inner));
        assert_eq!(doc.text_content(body), "");
    }

    #[test]
    fn test_fragment_holding_ancestor_is_rejected() {
        let (mut doc, app) = page();
        let inner = doc.create_element("span");
        doc.append_child(app, inner).unwrap();

        let fragment = doc.create_fragment();
        let loose = doc.create_element("p");
        doc.append_child(fragment, loose).unwrap();
        doc.append_child(fragment, app).unwrap();

        assert!(matches!(
            doc.append_child(inner, fragment),
            Err(RuntimeError::HierarchyRequest { .. })
        ));
        // Nothing moved
        assert_eq!(doc.children(fragment), &[loose, app]);
        assert!(doc.children(inner).is_empty());
    }

    #[test]
    fn test_replace_children_with_ancestor_keeps_old_children() {
        let (mut doc, app) = page();
        let old = doc.create_text("old");
        doc.append_child(app, old).unwrap();
        let body = doc.body();

        assert!(doc.replace_children(app, body).is_err());
        assert_eq!(doc.children(app), &[old]);
    }

    #[test]
    fn test_remove_child_of_other_parent() {
        let (mut doc, app) = page();
        let child = doc.create_element("p");
        assert!(!doc.remove_child(app, child).unwrap());
    }

    #[test]
    fn test_set_text_content() {
        let (mut doc, app) = page();
        let child = doc.create_element("p");
        doc.append_child(app, child).unwrap();

        doc.set_text_content(app, "replaced").unwrap();
        assert_eq!(doc.text_content(app), "replaced");
        assert_eq!(doc.children(app).len(), 1);
        assert_eq!(doc.parent(child), None);
    }

    #[test]
    fn test_to_html() {
        let (mut doc, app) = page();
        let p = doc.create_element("p");
        doc.set_attribute(p, "title", "a \"b\"").unwrap();
        doc.append_child(app, p).unwrap();
        doc.set_text_content(p, "1 < 2").unwrap();

        assert_eq!(
            doc.to_html(app),
            r#"<div id="app"><p title="a &quot;b&quot;">1 &lt; 2</p></div>"#
        );
    }

    #[test]
    fn test_missing_node() {
        let mut doc = Document::new();
        let err = doc.append_child(doc.body(), NodeId(99)).unwrap_err();
        assert!(matches!(err, RuntimeError::MissingNode(NodeId(99))));
    }
}
