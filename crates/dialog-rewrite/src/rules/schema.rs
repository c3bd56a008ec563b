//! Node types, names and markers of the legacy and target dialog schemas.

use dialog_tree::{DocumentTree, NodeRef};

// === Legacy dialog schema ===

pub const DIALOG_TYPE: &str = "cq:Dialog";
pub const WIDGET_COLLECTION_TYPE: &str = "cq:WidgetCollection";
pub const TAB_PANEL_TYPE: &str = "cq:TabPanel";
pub const PANEL_TYPE: &str = "cq:Panel";

/// Legacy widget-kind marker property.
pub const XTYPE_PROPERTY: &str = "xtype";
pub const TAB_PANEL_XTYPE: &str = "tabpanel";

pub const ITEMS: &str = "items";
pub const TABS: &str = "tabs";

pub const HELP_PATH_PROPERTY: &str = "helpPath";
pub const TITLE_PROPERTY: &str = "title";

// === Target schema ===

pub const CONTAINER_NAME: &str = "cq:dialog";
pub const CONTAINER_TYPE: &str = "nt:unstructured";
pub const CONTENT_NAME: &str = "content";
pub const RESOURCE_TYPE_PROPERTY: &str = "sling:resourceType";
pub const DIALOG_RESOURCE_TYPE: &str = "cq/gui/components/authoring/dialog";
pub const JCR_TITLE_PROPERTY: &str = "jcr:title";

pub fn has_type(tree: &DocumentTree, node: NodeRef, type_name: &str) -> bool {
    tree.type_name(node) == type_name
}

pub fn has_xtype(tree: &DocumentTree, node: NodeRef, xtype: &str) -> bool {
    tree.property(node, XTYPE_PROPERTY)
        .and_then(|v| v.as_str())
        .is_some_and(|v| v == xtype)
}

/// A tab panel is either typed as one or carries the `tabpanel` xtype.
pub fn is_tab_panel(tree: &DocumentTree, node: NodeRef) -> bool {
    has_type(tree, node, TAB_PANEL_TYPE) || has_xtype(tree, node, TAB_PANEL_XTYPE)
}
