//! Arena-backed syntax tree and the `Document` mutation entry points
//!
//! Nodes live in a flat arena owned by the [`Document`]. Ownership runs
//! strictly parent-to-children; the parent link stored on each node is a
//! plain index used for upward navigation only, so no reference cycles can
//! form. All structural mutation goes through the `Document` methods, each
//! of which returns the inserted or replacement node id or an [`EditError`].

use crate::error::EditError;

/// Index of a node inside its owning [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Kind tag of a syntax node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Root of a script document; holds imports and top-level statements
    Script,
    /// `import a.b.c` directive
    Import,
    /// `val name: Type by tasks` style declaration, kept mostly opaque
    Property,
    /// Call expression, optionally with a trailing block argument
    Call,
    /// Argument list between parentheses
    ArgumentList,
    /// One supplied argument, positional or named
    Argument,
    /// Explicit name part of a named argument
    ArgumentName,
    /// Braced statement list used as a block argument or lambda body
    Block,
    /// `lhs = rhs` assignment statement
    Assignment,
    /// Reference expression wrapping identifier text (possibly dotted)
    Name,
    /// String literal leaf, text includes the quotes
    StringLiteral,
    /// Identifier leaf
    Identifier,
    /// Punctuation leaf (braces, parentheses, `=`, `,`, ...)
    Token,
    /// Whitespace leaf
    Whitespace,
    /// Line comment leaf
    Comment,
}

impl NodeKind {
    /// Leaves carry text; interior nodes derive their text from children.
    pub fn is_leaf(self) -> bool {
        matches!(
            self,
            NodeKind::StringLiteral
                | NodeKind::Identifier
                | NodeKind::Token
                | NodeKind::Whitespace
                | NodeKind::Comment
        )
    }

    /// Whitespace and comments separate statements without being statements.
    pub fn is_trivia(self) -> bool {
        matches!(self, NodeKind::Whitespace | NodeKind::Comment)
    }
}

/// Byte range of a node within the document text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    /// Text for leaves, `None` for interior nodes
    text: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Owning container for one parsed document or fragment
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
    root: NodeId,
}

impl Document {
    pub(crate) fn with_root(kind: NodeKind) -> Self {
        let root = NodeData {
            kind,
            text: None,
            parent: None,
            children: Vec::new(),
        };
        Document {
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.node(id).kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).children.first().copied()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).children.last().copied()
    }

    /// Text of a leaf node, `None` for interior nodes
    pub fn leaf_text(&self, id: NodeId) -> Option<&str> {
        self.node(id).text.as_deref()
    }

    /// Full text of a node: leaf text, or the concatenation of its children
    pub fn text(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let data = self.node(id);
        if let Some(text) = &data.text {
            out.push_str(text);
        } else {
            for &child in &data.children {
                self.collect_text(child, out);
            }
        }
    }

    /// Text of the whole document
    pub fn full_text(&self) -> String {
        self.text(self.root)
    }

    fn text_len(&self, id: NodeId) -> usize {
        let data = self.node(id);
        match &data.text {
            Some(text) => text.len(),
            None => data.children.iter().map(|&c| self.text_len(c)).sum(),
        }
    }

    /// Byte span of a node, or `None` if it is not attached under the root.
    ///
    /// Spans are derived from the tree on demand, so they are consistent with
    /// the children's concatenated text after every mutation.
    pub fn span(&self, id: NodeId) -> Option<Span> {
        let mut offset = 0;
        if self.locate(self.root, id, &mut offset) {
            Some(Span {
                start: offset,
                end: offset + self.text_len(id),
            })
        } else {
            None
        }
    }

    fn locate(&self, current: NodeId, target: NodeId, offset: &mut usize) -> bool {
        if current == target {
            return true;
        }
        let data = self.node(current);
        if data.text.is_some() {
            *offset += data.text.as_ref().map(String::len).unwrap_or(0);
            return false;
        }
        for &child in &data.children {
            if self.locate(child, target, offset) {
                return true;
            }
        }
        false
    }

    fn sibling(&self, id: NodeId, delta: isize) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|&c| c == id)?;
        let target = pos as isize + delta;
        if target < 0 {
            None
        } else {
            siblings.get(target as usize).copied()
        }
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.sibling(id, 1)
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.sibling(id, -1)
    }

    /// Ancestors of a node, nearest first, excluding the node itself
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: self.parent(id),
        }
    }

    /// Ancestor exactly `depth` levels above the node
    pub fn ancestor_at(&self, id: NodeId, depth: usize) -> Option<NodeId> {
        let mut current = id;
        for _ in 0..depth {
            current = self.parent(current)?;
        }
        Some(current)
    }

    /// Nearest strict ancestor with the given kind
    pub fn strict_ancestor_of_kind(&self, id: NodeId, kind: NodeKind) -> Option<NodeId> {
        self.ancestors(id).find(|&a| self.kind(a) == kind)
    }

    /// Direct children with the given kind, in order
    pub fn children_of_kind(&self, id: NodeId, kind: NodeKind) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&c| self.kind(c) == kind)
            .collect()
    }

    /// First direct child with the given kind
    pub fn child_of_kind(&self, id: NodeId, kind: NodeKind) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&c| self.kind(c) == kind)
    }

    /// All nodes under (and including) `id` in preorder
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_descendants(id, &mut out);
        out
    }

    fn collect_descendants(&self, id: NodeId, out: &mut Vec<NodeId>) {
        out.push(id);
        for &child in self.children(id) {
            self.collect_descendants(child, out);
        }
    }

    // ----- construction and mutation -----

    /// Create a new detached leaf in this arena
    pub fn new_leaf(&mut self, kind: NodeKind, text: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData {
            kind,
            text: Some(text.into()),
            parent: None,
            children: Vec::new(),
        });
        id
    }

    pub(crate) fn new_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData {
            kind,
            text: None,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Deep-copy a node from another document into this arena.
    ///
    /// The copy is detached; insert it with one of the mutation methods.
    /// This is how fragments parsed in isolation get attached to a target
    /// document.
    pub fn graft(&mut self, src: &Document, node: NodeId) -> NodeId {
        let data = src.node(node);
        if let Some(text) = &data.text {
            self.new_leaf(data.kind, text.clone())
        } else {
            let copy = self.new_node(data.kind);
            for &child in &data.children {
                let child_copy = self.graft(src, child);
                self.node_mut(child_copy).parent = Some(copy);
                self.node_mut(copy).children.push(child_copy);
            }
            copy
        }
    }

    fn check_attachable(&self, node: NodeId) -> Result<(), EditError> {
        if self.node(node).parent.is_some() || node == self.root {
            Err(EditError::AlreadyAttached(node))
        } else {
            Ok(())
        }
    }

    /// Insert a detached node immediately after `anchor`
    pub fn insert_after(&mut self, anchor: NodeId, node: NodeId) -> Result<NodeId, EditError> {
        self.check_attachable(node)?;
        let parent = self.parent(anchor).ok_or(EditError::Detached(anchor))?;
        let pos = self
            .children(parent)
            .iter()
            .position(|&c| c == anchor)
            .ok_or(EditError::Detached(anchor))?;
        self.node_mut(parent).children.insert(pos + 1, node);
        self.node_mut(node).parent = Some(parent);
        Ok(node)
    }

    /// Insert a detached node immediately before `anchor`
    pub fn insert_before(&mut self, anchor: NodeId, node: NodeId) -> Result<NodeId, EditError> {
        self.check_attachable(node)?;
        let parent = self.parent(anchor).ok_or(EditError::Detached(anchor))?;
        let pos = self
            .children(parent)
            .iter()
            .position(|&c| c == anchor)
            .ok_or(EditError::Detached(anchor))?;
        self.node_mut(parent).children.insert(pos, node);
        self.node_mut(node).parent = Some(parent);
        Ok(node)
    }

    /// Append a detached node as the last child of `parent`
    pub fn append_child(&mut self, parent: NodeId, node: NodeId) -> Result<NodeId, EditError> {
        self.check_attachable(node)?;
        if self.node(parent).text.is_some() {
            return Err(EditError::LeafParent(parent));
        }
        self.node_mut(parent).children.push(node);
        self.node_mut(node).parent = Some(parent);
        Ok(node)
    }

    /// Insert a detached node as the first child of `parent`
    pub fn prepend_child(&mut self, parent: NodeId, node: NodeId) -> Result<NodeId, EditError> {
        self.check_attachable(node)?;
        if self.node(parent).text.is_some() {
            return Err(EditError::LeafParent(parent));
        }
        self.node_mut(parent).children.insert(0, node);
        self.node_mut(node).parent = Some(parent);
        Ok(node)
    }

    /// Replace an attached node with a detached one, in place.
    ///
    /// The old node is detached and stays in the arena; surrounding
    /// whitespace is untouched.
    pub fn replace(&mut self, old: NodeId, new: NodeId) -> Result<NodeId, EditError> {
        self.check_attachable(new)?;
        let parent = self.parent(old).ok_or(EditError::Detached(old))?;
        let pos = self
            .children(parent)
            .iter()
            .position(|&c| c == old)
            .ok_or(EditError::Detached(old))?;
        self.node_mut(parent).children[pos] = new;
        self.node_mut(new).parent = Some(parent);
        self.node_mut(old).parent = None;
        Ok(new)
    }

    /// Used by the parser; the child is known to be freshly created.
    pub(crate) fn attach(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(self.node(child).parent.is_none());
        self.node_mut(parent).children.push(child);
        self.node_mut(child).parent = Some(parent);
    }
}

/// Iterator over a node's ancestor chain, nearest first
pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.doc.parent(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_tree() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::with_root(NodeKind::Script);
        let root = doc.root();
        let call = doc.new_node(NodeKind::Call);
        let name = doc.new_node(NodeKind::Name);
        let ident = doc.new_leaf(NodeKind::Identifier, "dependencies");
        doc.attach(name, ident);
        doc.attach(call, name);
        doc.attach(root, call);
        (doc, call, name, ident)
    }

    #[test]
    fn text_concatenates_leaves() {
        let (doc, call, _, _) = small_tree();
        assert_eq!(doc.text(call), "dependencies");
        assert_eq!(doc.full_text(), "dependencies");
    }

    #[test]
    fn span_tracks_mutations() {
        let (mut doc, call, _, _) = small_tree();
        let ws = doc.new_leaf(NodeKind::Whitespace, "\n");
        doc.insert_before(call, ws).unwrap();
        let span = doc.span(call).unwrap();
        assert_eq!(span.start, 1);
        assert_eq!(span.end, 1 + "dependencies".len());
    }

    #[test]
    fn ancestors_walk_upward() {
        let (doc, call, name, ident) = small_tree();
        let chain: Vec<_> = doc.ancestors(ident).collect();
        assert_eq!(chain, vec![name, call, doc.root()]);
        assert_eq!(doc.ancestor_at(ident, 2), Some(call));
    }

    #[test]
    fn insert_rejects_attached_node() {
        let (mut doc, call, name, _) = small_tree();
        let err = doc.insert_after(call, name).unwrap_err();
        assert!(matches!(err, EditError::AlreadyAttached(_)));
    }

    #[test]
    fn replace_detaches_old_node() {
        let (mut doc, call, _, _) = small_tree();
        let other = doc.new_leaf(NodeKind::Identifier, "repositories");
        let name = doc.child_of_kind(call, NodeKind::Name).unwrap();
        doc.replace(name, other).unwrap();
        assert_eq!(doc.text(call), "repositories");
        assert!(doc.parent(name).is_none());
    }

    #[test]
    fn graft_copies_subtree() {
        let (src, call, _, _) = small_tree();
        let mut dst = Document::with_root(NodeKind::Script);
        let copy = dst.graft(&src, call);
        let root = dst.root();
        dst.append_child(root, copy).unwrap();
        assert_eq!(dst.full_text(), "dependencies");
    }
}
