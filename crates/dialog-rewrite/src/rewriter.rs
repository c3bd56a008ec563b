//! Scoped mutation capability handed to rules.
//!
//! A rule never sees `&mut DocumentTree` directly. It gets a
//! `SubtreeRewriter` which can read the whole tree but only mutate:
//!
//! - the matched node and its descendants,
//! - the matched node's parent, by adding new children to it,
//! - nodes created during this rewrite, and their descendants.

use dialog_tree::{DocumentTree, NodeRef, PropertyValue};

use crate::errors::{RuleError, RuleResult};

pub struct SubtreeRewriter<'a> {
    tree: &'a mut DocumentTree,
    node: NodeRef,
    parent: Option<NodeRef>,
    /// Roots of subtrees this rewriter attached under `parent`.
    created: Vec<NodeRef>,
    finalized: Vec<NodeRef>,
}

impl<'a> SubtreeRewriter<'a> {
    pub(crate) fn new(tree: &'a mut DocumentTree, node: NodeRef) -> Self {
        let parent = tree.parent(node);
        Self {
            tree,
            node,
            parent,
            created: Vec::new(),
            finalized: Vec::new(),
        }
    }

    pub fn tree(&self) -> &DocumentTree {
        &*self.tree
    }

    /// The matched node.
    pub fn node(&self) -> NodeRef {
        self.node
    }

    /// Parent of the matched node at the time the rewrite started.
    pub fn parent(&self) -> Option<NodeRef> {
        self.parent
    }

    // === Mutations ===

    /// Add a fresh child under `parent`, which must be writable or the
    /// matched node's parent.
    pub fn add_child(
        &mut self,
        parent: NodeRef,
        name: &str,
        type_name: &str,
    ) -> RuleResult<NodeRef> {
        self.check_attach_target(parent)?;
        let child = self.tree.add_child(parent, name, type_name)?;
        self.track_created(parent, child);
        Ok(child)
    }

    /// Deep-copy `source` (anywhere in the tree) under `target_parent`.
    pub fn copy_subtree(
        &mut self,
        source: NodeRef,
        target_parent: NodeRef,
        name: &str,
    ) -> RuleResult<NodeRef> {
        self.check_attach_target(target_parent)?;
        let copy = self.tree.copy_subtree(source, target_parent, name)?;
        self.track_created(target_parent, copy);
        Ok(copy)
    }

    pub fn set_property(
        &mut self,
        node: NodeRef,
        key: &str,
        value: impl Into<PropertyValue>,
    ) -> RuleResult<()> {
        self.check_writable(node)?;
        self.tree.set_property(node, key, value)?;
        Ok(())
    }

    pub fn remove_property(&mut self, node: NodeRef, key: &str) -> RuleResult<Option<PropertyValue>> {
        self.check_writable(node)?;
        Ok(self.tree.remove_property(node, key)?)
    }

    pub fn set_type_name(&mut self, node: NodeRef, type_name: &str) -> RuleResult<()> {
        self.check_writable(node)?;
        Ok(self.tree.set_type_name(node, type_name)?)
    }

    /// Reorder a writable node among its siblings.
    pub fn order_before(&mut self, node: NodeRef, before: Option<NodeRef>) -> RuleResult<()> {
        self.check_writable(node)?;
        Ok(self.tree.order_before(node, before)?)
    }

    /// Remove a node of the matched subtree (the matched node included).
    pub fn remove(&mut self, node: NodeRef) -> RuleResult<()> {
        if !self.tree.is_ancestor_or_self(self.node, node) {
            return Err(RuleError::scope_violation(format!(
                "cannot remove {}: outside the rewritten subtree",
                self.tree.path(node)
            )));
        }
        Ok(self.tree.remove(node)?)
    }

    /// Exclude `node` from matching for the rest of the engine run.
    pub fn finalize(&mut self, node: NodeRef) -> RuleResult<()> {
        self.check_writable(node)?;
        if !self.finalized.contains(&node) {
            self.finalized.push(node);
        }
        Ok(())
    }

    // === Query ===

    /// Whether `node` may stand in for the matched node: the matched node
    /// itself, a node of its subtree, or a node this rewrite created under
    /// the parent.
    pub(crate) fn is_valid_replacement(&self, node: NodeRef) -> bool {
        self.tree.is_ancestor_or_self(self.node, node) || self.created.contains(&node)
    }

    pub(crate) fn into_finalized(self) -> Vec<NodeRef> {
        self.finalized
    }

    fn is_writable(&self, node: NodeRef) -> bool {
        self.tree.is_ancestor_or_self(self.node, node)
            || self
                .created
                .iter()
                .any(|&c| self.tree.is_ancestor_or_self(c, node))
    }

    fn check_writable(&self, node: NodeRef) -> RuleResult<()> {
        if self.is_writable(node) {
            Ok(())
        } else {
            Err(RuleError::scope_violation(format!(
                "{} is outside the rewritten subtree",
                self.tree.path(node)
            )))
        }
    }

    fn check_attach_target(&self, target: NodeRef) -> RuleResult<()> {
        if Some(target) == self.parent || self.is_writable(target) {
            Ok(())
        } else {
            Err(RuleError::scope_violation(format!(
                "cannot add children to {}",
                self.tree.path(target)
            )))
        }
    }

    fn track_created(&mut self, parent: NodeRef, child: NodeRef) {
        if Some(parent) == self.parent && !self.is_writable(parent) {
            self.created.push(child);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dialog_tree::TreeError;

    fn fixture() -> (DocumentTree, NodeRef, NodeRef, NodeRef) {
        let mut tree = DocumentTree::new("rep:root");
        let root = tree.root();
        let comp = tree.add_child(root, "comp", "cq:Component").unwrap();
        let matched = tree.add_child(comp, "dialog", "cq:Dialog").unwrap();
        let sibling = tree.add_child(comp, "other", "nt:unstructured").unwrap();
        (tree, comp, matched, sibling)
    }

    #[test]
    fn nodes_created_under_parent_become_writable() {
        let (mut tree, comp, matched, _) = fixture();
        let mut rw = SubtreeRewriter::new(&mut tree, matched);

        let created = rw.add_child(comp, "created", "nt:unstructured").unwrap();
        let nested = rw.add_child(created, "nested", "nt:unstructured").unwrap();
        rw.set_property(nested, "a", 1i64).unwrap();
        rw.finalize(created).unwrap();

        assert_eq!(rw.into_finalized(), vec![created]);
        assert_eq!(tree.path(nested), "/comp/created/nested");
    }

    #[test]
    fn siblings_and_parent_properties_are_read_only() {
        let (mut tree, comp, matched, sibling) = fixture();
        let mut rw = SubtreeRewriter::new(&mut tree, matched);

        assert!(matches!(
            rw.set_property(sibling, "x", true),
            Err(RuleError::ScopeViolation(_))
        ));
        assert!(matches!(
            rw.set_property(comp, "x", true),
            Err(RuleError::ScopeViolation(_))
        ));
        assert!(matches!(
            rw.add_child(sibling, "x", "nt:unstructured"),
            Err(RuleError::ScopeViolation(_))
        ));
        assert!(matches!(rw.remove(sibling), Err(RuleError::ScopeViolation(_))));
        assert!(matches!(rw.finalize(sibling), Err(RuleError::ScopeViolation(_))));
    }

    #[test]
    fn copy_reads_outside_but_writes_inside() {
        let (mut tree, comp, matched, sibling) = fixture();
        let mut rw = SubtreeRewriter::new(&mut tree, matched);

        let copy = rw.copy_subtree(sibling, matched, "copied").unwrap();
        assert_eq!(rw.tree().path(copy), "/comp/dialog/copied");

        let top = rw.copy_subtree(sibling, comp, "other-copy").unwrap();
        rw.set_property(top, "copied", true).unwrap();
        assert_eq!(rw.tree().parent(top), Some(comp));
    }

    #[test]
    fn remove_property_is_scoped() {
        let (mut tree, _, matched, sibling) = fixture();
        tree.set_property(matched, "title", "Edit").unwrap();
        tree.set_property(sibling, "title", "Other").unwrap();
        let mut rw = SubtreeRewriter::new(&mut tree, matched);

        assert_eq!(
            rw.remove_property(matched, "title").unwrap(),
            Some(PropertyValue::from("Edit"))
        );
        assert_eq!(rw.remove_property(matched, "title").unwrap(), None);
        assert!(matches!(
            rw.remove_property(sibling, "title"),
            Err(RuleError::ScopeViolation(_))
        ));
        assert!(rw.tree().has_property(sibling, "title"));
    }

    #[test]
    fn created_node_can_take_a_slot_among_existing_siblings() {
        let (mut tree, comp, matched, sibling) = fixture();
        let mut rw = SubtreeRewriter::new(&mut tree, matched);

        let created = rw.add_child(comp, "created", "nt:unstructured").unwrap();
        rw.order_before(created, Some(matched)).unwrap();
        rw.order_before(matched, None).unwrap();

        let names: Vec<&str> = rw
            .tree()
            .children(comp)
            .iter()
            .map(|&c| rw.tree().name(c))
            .collect();
        assert_eq!(names, ["created", "other", "dialog"]);

        assert!(matches!(
            rw.order_before(sibling, Some(created)),
            Err(RuleError::ScopeViolation(_))
        ));
        assert!(matches!(
            rw.order_before(comp, None),
            Err(RuleError::ScopeViolation(_))
        ));
    }

    #[test]
    fn created_node_cannot_be_ordered_before_a_non_sibling() {
        let (mut tree, comp, matched, _) = fixture();
        let inner = tree.add_child(matched, "inner", "nt:unstructured").unwrap();
        let mut rw = SubtreeRewriter::new(&mut tree, matched);

        let created = rw.add_child(comp, "created", "nt:unstructured").unwrap();
        assert!(matches!(
            rw.order_before(created, Some(inner)),
            Err(RuleError::Tree(TreeError::NotSibling { .. }))
        ));
    }

    #[test]
    fn only_subtree_and_created_nodes_are_valid_replacements() {
        let (mut tree, comp, matched, sibling) = fixture();
        let inner = tree.add_child(matched, "inner", "nt:unstructured").unwrap();
        let mut rw = SubtreeRewriter::new(&mut tree, matched);
        let created = rw.add_child(comp, "created", "nt:unstructured").unwrap();

        assert!(rw.is_valid_replacement(matched));
        assert!(rw.is_valid_replacement(inner));
        assert!(rw.is_valid_replacement(created));
        assert!(!rw.is_valid_replacement(sibling));
        assert!(!rw.is_valid_replacement(comp));
    }

    #[test]
    fn duplicate_child_is_a_target_conflict() {
        let (mut tree, comp, matched, _) = fixture();
        let mut rw = SubtreeRewriter::new(&mut tree, matched);
        assert!(matches!(
            rw.add_child(comp, "other", "nt:unstructured"),
            Err(RuleError::TargetConflict(_))
        ));
    }
}
