//! DocumentTree: arena-based mutable document storage.
//!
//! Every node lives in a `PrimaryMap` owned by the tree. Parent links are
//! plain back-references; ownership is expressed by the parent's ordered
//! child list. Removed nodes keep their slot (marked removed) so stale
//! handles are detected instead of silently aliasing new nodes.

use std::collections::BTreeMap;
use std::fmt;

use cranelift_entity::PrimaryMap;
use smallvec::SmallVec;

use crate::errors::{TreeError, TreeResult};
use crate::refs::NodeRef;
use crate::value::PropertyValue;

// ============================================================================
// Entity data
// ============================================================================

/// Data for a single node in the arena.
#[derive(Clone, Debug)]
pub struct NodeData {
    pub name: String,
    pub type_name: String,
    pub properties: BTreeMap<String, PropertyValue>,
    pub children: SmallVec<[NodeRef; 4]>,
    pub parent: Option<NodeRef>,
    removed: bool,
}

impl NodeData {
    fn new(name: String, type_name: String, parent: Option<NodeRef>) -> Self {
        Self {
            name,
            type_name,
            properties: BTreeMap::new(),
            children: SmallVec::new(),
            parent,
            removed: false,
        }
    }
}

/// Detached copy of a subtree, taken before a copy is attached so that a
/// node may be copied into its own subtree.
struct SubtreeSnapshot {
    type_name: String,
    properties: BTreeMap<String, PropertyValue>,
    children: Vec<(String, SubtreeSnapshot)>,
}

// ============================================================================
// DocumentTree
// ============================================================================

/// Arena-owned document tree.
///
/// The tree always has a document root (empty name, path `/`) which cannot
/// be removed. Cloning the tree produces an independent snapshot with the
/// same `NodeRef` numbering.
#[derive(Clone, Debug)]
pub struct DocumentTree {
    nodes: PrimaryMap<NodeRef, NodeData>,
    root: NodeRef,
}

impl DocumentTree {
    /// Create a tree containing only a document root of the given type.
    pub fn new(root_type: impl Into<String>) -> Self {
        let mut nodes = PrimaryMap::new();
        let root = nodes.push(NodeData::new(String::new(), root_type.into(), None));
        Self { nodes, root }
    }

    pub fn root(&self) -> NodeRef {
        self.root
    }

    /// Number of nodes currently attached to the tree.
    pub fn live_nodes(&self) -> usize {
        self.nodes.values().filter(|n| !n.removed).count()
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Get immutable reference to node data.
    ///
    /// Removed nodes are still readable; they have no parent and no
    /// children.
    pub fn node(&self, node: NodeRef) -> &NodeData {
        &self.nodes[node]
    }

    pub fn is_alive(&self, node: NodeRef) -> bool {
        !self.nodes[node].removed
    }

    pub fn name(&self, node: NodeRef) -> &str {
        &self.nodes[node].name
    }

    pub fn type_name(&self, node: NodeRef) -> &str {
        &self.nodes[node].type_name
    }

    pub fn parent(&self, node: NodeRef) -> Option<NodeRef> {
        self.nodes[node].parent
    }

    pub fn children(&self, node: NodeRef) -> &[NodeRef] {
        &self.nodes[node].children
    }

    /// Look up a direct child by name.
    pub fn child(&self, node: NodeRef, name: &str) -> Option<NodeRef> {
        self.nodes[node]
            .children
            .iter()
            .copied()
            .find(|&c| self.nodes[c].name == name)
    }

    pub fn has_child(&self, node: NodeRef, name: &str) -> bool {
        self.child(node, name).is_some()
    }

    /// Position of `node` within its parent's child list.
    pub fn child_index(&self, node: NodeRef) -> Option<usize> {
        let parent = self.nodes[node].parent?;
        self.nodes[parent].children.iter().position(|&c| c == node)
    }

    pub fn next_sibling(&self, node: NodeRef) -> Option<NodeRef> {
        let parent = self.nodes[node].parent?;
        let index = self.child_index(node)?;
        self.nodes[parent].children.get(index + 1).copied()
    }

    pub fn property(&self, node: NodeRef, key: &str) -> Option<&PropertyValue> {
        self.nodes[node].properties.get(key)
    }

    pub fn has_property(&self, node: NodeRef, key: &str) -> bool {
        self.nodes[node].properties.contains_key(key)
    }

    pub fn properties(&self, node: NodeRef) -> &BTreeMap<String, PropertyValue> {
        &self.nodes[node].properties
    }

    /// Absolute slash-separated path of a node (`/` for the root).
    pub fn path(&self, node: NodeRef) -> String {
        let mut segments = Vec::new();
        let mut current = Some(node);
        while let Some(n) = current {
            if n == self.root {
                break;
            }
            segments.push(self.nodes[n].name.as_str());
            current = self.nodes[n].parent;
        }
        segments.reverse();
        format!("/{}", segments.join("/"))
    }

    /// Resolve an absolute path produced by [`DocumentTree::path`].
    pub fn resolve(&self, path: &str) -> Option<NodeRef> {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .try_fold(self.root, |node, segment| self.child(node, segment))
    }

    pub fn is_ancestor_or_self(&self, ancestor: NodeRef, node: NodeRef) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.nodes[n].parent;
        }
        false
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Set a property, returning the previous value.
    pub fn set_property(
        &mut self,
        node: NodeRef,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> TreeResult<Option<PropertyValue>> {
        let data = self.live_mut(node)?;
        Ok(data.properties.insert(key.into(), value.into()))
    }

    pub fn remove_property(
        &mut self,
        node: NodeRef,
        key: &str,
    ) -> TreeResult<Option<PropertyValue>> {
        let data = self.live_mut(node)?;
        Ok(data.properties.remove(key))
    }

    pub fn set_type_name(&mut self, node: NodeRef, type_name: impl Into<String>) -> TreeResult<()> {
        self.live_mut(node)?.type_name = type_name.into();
        Ok(())
    }

    /// Append a fresh child node.
    ///
    /// Fails with [`TreeError::DuplicateName`] if `parent` already has a
    /// child called `name`.
    pub fn add_child(
        &mut self,
        parent: NodeRef,
        name: impl Into<String>,
        type_name: impl Into<String>,
    ) -> TreeResult<NodeRef> {
        let name = name.into();
        validate_name(&name)?;
        self.live(parent)?;
        self.ensure_free_name(parent, &name)?;

        let child = self
            .nodes
            .push(NodeData::new(name, type_name.into(), Some(parent)));
        self.nodes[parent].children.push(child);
        Ok(child)
    }

    /// Detach a node from its parent and remove it with all descendants.
    ///
    /// The document root has no parent to detach from; removing it is a
    /// no-op.
    pub fn remove(&mut self, node: NodeRef) -> TreeResult<()> {
        if node == self.root {
            return Ok(());
        }
        self.live(node)?;

        if let Some(parent) = self.nodes[node].parent {
            self.nodes[parent].children.retain(|c| *c != node);
        }

        let mut stack = vec![node];
        while let Some(n) = stack.pop() {
            let data = &mut self.nodes[n];
            data.removed = true;
            data.parent = None;
            stack.extend(data.children.drain(..));
        }
        Ok(())
    }

    /// Deep-copy `source` (type, properties, descendants in order) and
    /// attach the copy under `target_parent` as `name`.
    ///
    /// The source is snapshotted first, so copying a node into its own
    /// subtree terminates and never creates a cycle.
    pub fn copy_subtree(
        &mut self,
        source: NodeRef,
        target_parent: NodeRef,
        name: impl Into<String>,
    ) -> TreeResult<NodeRef> {
        let name = name.into();
        validate_name(&name)?;
        self.live(source)?;
        self.live(target_parent)?;
        self.ensure_free_name(target_parent, &name)?;

        let snapshot = self.snapshot(source);
        Ok(self.materialize(target_parent, name, snapshot))
    }

    /// Move `node` before `before` among its siblings, or to the end when
    /// `before` is `None`. Reordering the root is a no-op.
    pub fn order_before(&mut self, node: NodeRef, before: Option<NodeRef>) -> TreeResult<()> {
        self.live(node)?;
        let Some(parent) = self.nodes[node].parent else {
            return Ok(());
        };
        if let Some(sibling) = before {
            self.live(sibling)?;
            if self.nodes[sibling].parent != Some(parent) {
                return Err(TreeError::NotSibling { node, sibling });
            }
            if sibling == node {
                return Ok(());
            }
        }

        let children = &mut self.nodes[parent].children;
        children.retain(|c| *c != node);
        let position = before
            .and_then(|s| children.iter().position(|c| *c == s))
            .unwrap_or(children.len());
        children.insert(position, node);
        Ok(())
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn live(&self, node: NodeRef) -> TreeResult<&NodeData> {
        let data = &self.nodes[node];
        if data.removed {
            Err(TreeError::Removed(node))
        } else {
            Ok(data)
        }
    }

    fn live_mut(&mut self, node: NodeRef) -> TreeResult<&mut NodeData> {
        let data = &mut self.nodes[node];
        if data.removed {
            Err(TreeError::Removed(node))
        } else {
            Ok(data)
        }
    }

    fn ensure_free_name(&self, parent: NodeRef, name: &str) -> TreeResult<()> {
        if self.has_child(parent, name) {
            return Err(TreeError::DuplicateName {
                parent: self.path(parent),
                name: name.to_owned(),
            });
        }
        Ok(())
    }

    fn snapshot(&self, node: NodeRef) -> SubtreeSnapshot {
        let data = &self.nodes[node];
        SubtreeSnapshot {
            type_name: data.type_name.clone(),
            properties: data.properties.clone(),
            children: data
                .children
                .iter()
                .map(|&c| (self.nodes[c].name.clone(), self.snapshot(c)))
                .collect(),
        }
    }

    fn materialize(&mut self, parent: NodeRef, name: String, snapshot: SubtreeSnapshot) -> NodeRef {
        let mut data = NodeData::new(name, snapshot.type_name, Some(parent));
        data.properties = snapshot.properties;
        let node = self.nodes.push(data);
        self.nodes[parent].children.push(node);
        for (child_name, child) in snapshot.children {
            self.materialize(node, child_name, child);
        }
        node
    }
}

fn validate_name(name: &str) -> TreeResult<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains('/') {
        return Err(TreeError::InvalidName(name.to_owned()));
    }
    Ok(())
}

impl fmt::Display for DocumentTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::printer::print_subtree(self, self.root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(tree: &DocumentTree, node: NodeRef) -> Vec<&str> {
        tree.children(node).iter().map(|&c| tree.name(c)).collect()
    }

    #[test]
    fn add_child_rejects_sibling_name_collision() {
        let mut tree = DocumentTree::new("rep:root");
        let root = tree.root();
        tree.add_child(root, "apps", "nt:folder").unwrap();

        let err = tree.add_child(root, "apps", "nt:folder").unwrap_err();
        assert_eq!(
            err,
            TreeError::DuplicateName {
                parent: "/".to_owned(),
                name: "apps".to_owned(),
            }
        );
        assert_eq!(tree.children(root).len(), 1);
    }

    #[test]
    fn add_child_rejects_path_like_names() {
        let mut tree = DocumentTree::new("rep:root");
        let root = tree.root();
        assert!(matches!(
            tree.add_child(root, "a/b", "nt:unstructured"),
            Err(TreeError::InvalidName(_))
        ));
        assert!(matches!(
            tree.add_child(root, "", "nt:unstructured"),
            Err(TreeError::InvalidName(_))
        ));
    }

    #[test]
    fn remove_is_transitive() {
        let mut tree = DocumentTree::new("rep:root");
        let root = tree.root();
        let a = tree.add_child(root, "a", "nt:unstructured").unwrap();
        let b = tree.add_child(a, "b", "nt:unstructured").unwrap();
        let c = tree.add_child(b, "c", "nt:unstructured").unwrap();

        tree.remove(a).unwrap();

        assert!(!tree.is_alive(a));
        assert!(!tree.is_alive(b));
        assert!(!tree.is_alive(c));
        assert!(tree.children(root).is_empty());
        assert_eq!(tree.live_nodes(), 1);
        assert_eq!(tree.remove(b), Err(TreeError::Removed(b)));
        assert_eq!(
            tree.set_property(c, "x", 1i64),
            Err(TreeError::Removed(c))
        );
    }

    #[test]
    fn removing_root_is_a_no_op() {
        let mut tree = DocumentTree::new("rep:root");
        let root = tree.root();
        let child = tree.add_child(root, "child", "nt:unstructured").unwrap();

        assert_eq!(tree.remove(root), Ok(()));
        assert!(tree.is_alive(root));
        assert!(tree.is_alive(child));
        assert_eq!(tree.children(root), [child]);
        assert_eq!(tree.live_nodes(), 2);
    }

    #[test]
    fn copy_subtree_preserves_order_and_properties() {
        let mut tree = DocumentTree::new("rep:root");
        let root = tree.root();
        let src = tree.add_child(root, "src", "cq:Widget").unwrap();
        tree.set_property(src, "fieldLabel", "Title").unwrap();
        for name in ["z", "a", "m"] {
            tree.add_child(src, name, "cq:Widget").unwrap();
        }
        let dst = tree.add_child(root, "dst", "nt:unstructured").unwrap();

        let copy = tree.copy_subtree(src, dst, "renamed").unwrap();

        assert_ne!(copy, src);
        assert_eq!(tree.path(copy), "/dst/renamed");
        assert_eq!(tree.type_name(copy), "cq:Widget");
        assert_eq!(
            tree.property(copy, "fieldLabel"),
            Some(&PropertyValue::from("Title"))
        );
        assert_eq!(names(&tree, copy), ["z", "a", "m"]);
        // Source untouched.
        assert_eq!(names(&tree, src), ["z", "a", "m"]);
    }

    #[test]
    fn copy_subtree_into_itself_terminates() {
        let mut tree = DocumentTree::new("rep:root");
        let root = tree.root();
        let a = tree.add_child(root, "a", "nt:unstructured").unwrap();
        tree.add_child(a, "b", "nt:unstructured").unwrap();

        let copy = tree.copy_subtree(a, a, "again").unwrap();

        assert_eq!(names(&tree, a), ["b", "again"]);
        assert_eq!(names(&tree, copy), ["b"]);
    }

    #[test]
    fn copy_subtree_rejects_collision() {
        let mut tree = DocumentTree::new("rep:root");
        let root = tree.root();
        let a = tree.add_child(root, "a", "nt:unstructured").unwrap();
        tree.add_child(root, "b", "nt:unstructured").unwrap();

        assert!(matches!(
            tree.copy_subtree(a, root, "b"),
            Err(TreeError::DuplicateName { .. })
        ));
        assert_eq!(tree.live_nodes(), 3);
    }

    #[test]
    fn order_before_moves_within_siblings() {
        let mut tree = DocumentTree::new("rep:root");
        let root = tree.root();
        let a = tree.add_child(root, "a", "nt:unstructured").unwrap();
        let b = tree.add_child(root, "b", "nt:unstructured").unwrap();
        let c = tree.add_child(root, "c", "nt:unstructured").unwrap();

        tree.order_before(c, Some(a)).unwrap();
        assert_eq!(names(&tree, root), ["c", "a", "b"]);

        tree.order_before(c, None).unwrap();
        assert_eq!(names(&tree, root), ["a", "b", "c"]);

        let nested = tree.add_child(a, "nested", "nt:unstructured").unwrap();
        assert_eq!(
            tree.order_before(nested, Some(b)),
            Err(TreeError::NotSibling {
                node: nested,
                sibling: b,
            })
        );
    }

    #[test]
    fn path_and_resolve_agree() {
        let mut tree = DocumentTree::new("rep:root");
        let root = tree.root();
        let apps = tree.add_child(root, "apps", "nt:folder").unwrap();
        let dialog = tree.add_child(apps, "dialog", "cq:Dialog").unwrap();

        assert_eq!(tree.path(root), "/");
        assert_eq!(tree.path(dialog), "/apps/dialog");
        assert_eq!(tree.resolve("/apps/dialog"), Some(dialog));
        assert_eq!(tree.resolve("/"), Some(root));
        assert_eq!(tree.resolve("/apps/missing"), None);
        assert!(tree.is_ancestor_or_self(apps, dialog));
        assert!(!tree.is_ancestor_or_self(dialog, apps));
    }

    #[test]
    fn sibling_navigation() {
        let mut tree = DocumentTree::new("rep:root");
        let root = tree.root();
        let a = tree.add_child(root, "a", "nt:unstructured").unwrap();
        let b = tree.add_child(root, "b", "nt:unstructured").unwrap();

        assert_eq!(tree.child_index(b), Some(1));
        assert_eq!(tree.next_sibling(a), Some(b));
        assert_eq!(tree.next_sibling(b), None);
        assert_eq!(tree.next_sibling(root), None);
    }
}
