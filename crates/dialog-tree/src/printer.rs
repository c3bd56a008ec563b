//! Text format printer for document trees.
//!
//! One node per line, children indented by two spaces:
//!
//! ```text
//! / : rep:root
//!   apps : nt:folder
//!     dialog : cq:Dialog {title = "Edit"}
//! ```

use std::fmt::Write;

use crate::refs::NodeRef;
use crate::tree::DocumentTree;

/// Print `node` and its descendants.
pub fn print_subtree(tree: &DocumentTree, node: NodeRef) -> String {
    let mut out = String::new();
    print_node(tree, node, 0, &mut out);
    out
}

fn print_node(tree: &DocumentTree, node: NodeRef, depth: usize, out: &mut String) {
    let name = if node == tree.root() {
        "/"
    } else {
        tree.name(node)
    };
    let _ = write!(out, "{:indent$}{name} : {}", "", tree.type_name(node), indent = depth * 2);

    let properties = tree.properties(node);
    if !properties.is_empty() {
        out.push_str(" {");
        for (i, (key, value)) in properties.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            let _ = write!(out, "{key} = {value}");
        }
        out.push('}');
    }
    out.push('\n');

    for &child in tree.children(node) {
        print_node(tree, child, depth + 1, out);
    }
}
