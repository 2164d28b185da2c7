//! In-memory document tree for PLCopen XML projects.
//!
//! Nodes live in an arena owned by [`Document`] and are addressed by
//! [`NodeId`]. The validator only ever appends children (diagnostics), so
//! ids handed out by the loader stay valid for the lifetime of the tree.

/// Tag of the node appended for a failed rule.
pub const ERROR_TAG: &str = "SidValidationError";
/// Tag of the node appended for a computed canonical value.
pub const INFO_TAG: &str = "SidValidationInfo";

/// Index of a node inside its [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// A single element: tag, ordered attributes and ordered child elements.
#[derive(Debug, Clone)]
pub struct Node {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
    /// Character data directly inside the element (e.g. ST bodies), kept
    /// only so the annotated document can be written back.
    pub text: String,
}

impl Node {
    fn new(tag: &str, parent: Option<NodeId>) -> Self {
        Node {
            tag: tag.to_string(),
            attributes: Vec::new(),
            children: Vec::new(),
            parent,
            text: String::new(),
        }
    }

    /// `true` for nodes appended by the validator itself.
    pub fn is_diagnostic(&self) -> bool {
        self.tag == ERROR_TAG || self.tag == INFO_TAG
    }
}

/// An ordered, mutable element tree with a single root.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    /// Creates a document holding only a root element with the given tag.
    pub fn new(root_tag: &str) -> Self {
        Document {
            nodes: vec![Node::new(root_tag, None)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn tag(&self, id: NodeId) -> &str {
        &self.nodes[id.0].tag
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Raw attribute value, untrimmed.
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.nodes[id.0]
            .attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Attribute value with surrounding whitespace removed; a missing
    /// attribute reads as the empty string.
    pub fn attr_trimmed(&self, id: NodeId, name: &str) -> &str {
        self.attr(id, name).map(str::trim).unwrap_or("")
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        let attrs = &mut self.nodes[id.0].attributes;
        match attrs.iter_mut().find(|(k, _)| k == name) {
            Some(slot) => slot.1 = value.to_string(),
            None => attrs.push((name.to_string(), value.to_string())),
        }
    }

    pub fn text(&self, id: NodeId) -> &str {
        &self.nodes[id.0].text
    }

    pub fn push_text(&mut self, id: NodeId, text: &str) {
        self.nodes[id.0].text.push_str(text);
    }

    /// Appends a new element under `parent` and returns its id.
    pub fn append_child(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(tag, Some(parent)));
        self.nodes[parent.0].children.push(id);
        id
    }

    /// All children, diagnostics included.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Content children only; validator annotations are skipped.
    pub fn elements(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes[id.0]
            .children
            .iter()
            .copied()
            .filter(|c| !self.nodes[c.0].is_diagnostic())
            .collect()
    }

    /// First content child with the given tag.
    pub fn find_child(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        self.nodes[id.0]
            .children
            .iter()
            .copied()
            .find(|c| self.nodes[c.0].tag == tag)
    }

    /// All content children with the given tag, in document order.
    pub fn find_children(&self, id: NodeId, tag: &str) -> Vec<NodeId> {
        self.nodes[id.0]
            .children
            .iter()
            .copied()
            .filter(|c| self.nodes[c.0].tag == tag)
            .collect()
    }

    /// The first content child. Schema validation guarantees cardinality
    /// for the places this is used, so "single" means "the one that is
    /// there".
    pub fn single_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0]
            .children
            .iter()
            .copied()
            .find(|c| !self.nodes[c.0].is_diagnostic())
    }

    /// Follows a chain of tags from `id`, taking the first match each step.
    pub fn path(&self, id: NodeId, tags: &[&str]) -> Option<NodeId> {
        tags.iter()
            .try_fold(id, |current, tag| self.find_child(current, tag))
    }

    /// Every node in document order (pre-order, depth first).
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.nodes[current.0].children.iter().rev().copied());
        }
        out
    }

    /// Human readable location such as `/project/types/pous/pou[Main]`.
    pub fn location(&self, id: NodeId) -> String {
        let mut parts = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = &self.nodes[node_id.0];
            let label = match self.attr(node_id, "name").or_else(|| self.attr(node_id, "member")) {
                Some(name) if !name.trim().is_empty() => format!("{}[{}]", node.tag, name.trim()),
                _ => node.tag.clone(),
            };
            parts.push(label);
            current = node.parent;
        }
        parts.reverse();
        format!("/{}", parts.join("/"))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Document, NodeId, NodeId) {
        let mut doc = Document::new("project");
        let types = doc.append_child(doc.root(), "types");
        let pous = doc.append_child(types, "pous");
        let pou = doc.append_child(pous, "pou");
        doc.set_attr(pou, "name", " Main ");
        (doc, pous, pou)
    }

    #[test]
    fn attributes_are_trimmed_on_request() {
        let (doc, _, pou) = sample();
        assert_eq!(doc.attr(pou, "name"), Some(" Main "));
        assert_eq!(doc.attr_trimmed(pou, "name"), "Main");
        assert_eq!(doc.attr_trimmed(pou, "pouType"), "");
    }

    #[test]
    fn structural_queries_skip_diagnostics() {
        let (mut doc, pous, pou) = sample();
        let err = doc.append_child(pous, ERROR_TAG);
        doc.set_attr(err, "message", "boom");
        assert_eq!(doc.elements(pous), vec![pou]);
        assert_eq!(doc.single_child(pous), Some(pou));
        assert_eq!(doc.children(pous).len(), 2);
    }

    #[test]
    fn location_uses_name_attributes() {
        let (doc, _, pou) = sample();
        assert_eq!(doc.location(pou), "/project/types/pous/pou[Main]");
        assert_eq!(doc.path(doc.root(), &["types", "pous", "pou"]), Some(pou));
    }

    #[test]
    fn descendants_are_in_document_order() {
        let (doc, pous, pou) = sample();
        let all = doc.descendants(doc.root());
        assert_eq!(all.len(), 4);
        assert_eq!(all[2], pous);
        assert_eq!(all[3], pou);
    }
}
