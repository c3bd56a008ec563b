//! JSON representation of document trees.
//!
//! A node is an object with its name, type, properties and ordered
//! children; the top-level object is the document root:
//!
//! ```json
//! {
//!   "type": "rep:root",
//!   "children": [
//!     { "name": "dialog", "type": "cq:Dialog", "properties": { "title": "Edit" } }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use dialog_tree::{DocumentTree, NodeRef, PropertyValue, TreeResult};
use serde::{Deserialize, Serialize};

use crate::errors::Result;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeDocument {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, PropertyValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeDocument>,
}

impl NodeDocument {
    /// Capture the whole tree, starting at the document root.
    pub fn from_tree(tree: &DocumentTree) -> Self {
        Self::capture(tree, tree.root())
    }

    fn capture(tree: &DocumentTree, node: NodeRef) -> Self {
        let name = if node == tree.root() {
            String::new()
        } else {
            tree.name(node).to_owned()
        };
        NodeDocument {
            name,
            type_name: tree.type_name(node).to_owned(),
            properties: tree.properties(node).clone(),
            children: tree
                .children(node)
                .iter()
                .map(|&c| Self::capture(tree, c))
                .collect(),
        }
    }

    /// Build a tree with this node as document root. The root's own name
    /// is ignored.
    pub fn into_tree(self) -> TreeResult<DocumentTree> {
        let mut tree = DocumentTree::new(self.type_name);
        let root = tree.root();
        for (key, value) in self.properties {
            tree.set_property(root, key, value)?;
        }
        for child in self.children {
            child.attach(&mut tree, root)?;
        }
        Ok(tree)
    }

    fn attach(self, tree: &mut DocumentTree, parent: NodeRef) -> TreeResult<NodeRef> {
        let node = tree.add_child(parent, self.name, self.type_name)?;
        for (key, value) in self.properties {
            tree.set_property(node, key, value)?;
        }
        for child in self.children {
            child.attach(tree, node)?;
        }
        Ok(node)
    }
}

pub fn from_json_str(json: &str) -> Result<DocumentTree> {
    let document: NodeDocument = serde_json::from_str(json)?;
    Ok(document.into_tree()?)
}

pub fn to_json_string(tree: &DocumentTree) -> Result<String> {
    Ok(serde_json::to_string_pretty(&NodeDocument::from_tree(tree))?)
}

pub fn load(path: &Path) -> Result<DocumentTree> {
    let json = std::fs::read_to_string(path)?;
    from_json_str(&json)
}

pub fn save(tree: &DocumentTree, path: &Path) -> Result<()> {
    let mut json = to_json_string(tree)?;
    json.push('\n');
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use dialog_tree::TreeError;

    #[test]
    fn loads_nested_nodes_in_order() {
        let tree = from_json_str(
            r#"{
                "type": "rep:root",
                "children": [
                    {"name": "b", "type": "nt:unstructured", "properties": {"n": 1, "on": true}},
                    {"name": "a", "type": "nt:unstructured", "children": [
                        {"name": "leaf", "type": "cq:Widget", "properties": {"xtype": "textfield"}}
                    ]}
                ]
            }"#,
        )
        .unwrap();

        let root = tree.root();
        let names: Vec<&str> = tree.children(root).iter().map(|&c| tree.name(c)).collect();
        assert_eq!(names, ["b", "a"]);
        let b = tree.resolve("/b").unwrap();
        assert_eq!(tree.property(b, "n"), Some(&PropertyValue::Long(1)));
        assert_eq!(tree.property(b, "on"), Some(&PropertyValue::Boolean(true)));
        let leaf = tree.resolve("/a/leaf").unwrap();
        assert_eq!(tree.type_name(leaf), "cq:Widget");
    }

    #[test]
    fn duplicate_sibling_names_are_rejected() {
        let err = from_json_str(
            r#"{"type": "rep:root", "children": [
                {"name": "x", "type": "nt:unstructured"},
                {"name": "x", "type": "nt:unstructured"}
            ]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Tree(TreeError::DuplicateName { .. })));
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = from_json_str(r#"{"children": []}"#).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn tree_survives_json_round_trip() {
        let mut tree = DocumentTree::new("rep:root");
        let root = tree.root();
        let node = tree.add_child(root, "dialog", "cq:Dialog").unwrap();
        tree.set_property(node, "height", 2.5).unwrap();
        tree.add_child(node, "items", "cq:WidgetCollection").unwrap();

        let json = to_json_string(&tree).unwrap();
        let reloaded = from_json_str(&json).unwrap();

        assert_eq!(reloaded.to_string(), tree.to_string());
    }
}
