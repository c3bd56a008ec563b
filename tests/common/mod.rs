//! Common test utilities for document conversion tests.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::NamedTempFile;

/// A component with a plain dialog holding two widgets, and a component
/// whose dialog has no items.
pub const SAMPLE_DOCUMENT: &str = r#"{
  "type": "rep:root",
  "children": [
    {
      "name": "text",
      "type": "cq:Component",
      "children": [
        {
          "name": "dialog",
          "type": "cq:Dialog",
          "properties": { "title": "Text", "helpPath": "/help/text" },
          "children": [
            {
              "name": "items",
              "type": "cq:WidgetCollection",
              "children": [
                { "name": "title", "type": "cq:Widget", "properties": { "xtype": "textfield" } },
                { "name": "body", "type": "cq:Widget", "properties": { "xtype": "richtext" } }
              ]
            }
          ]
        },
        { "name": "editConfig", "type": "cq:EditConfig" }
      ]
    },
    {
      "name": "broken",
      "type": "cq:Component",
      "children": [
        { "name": "dialog", "type": "cq:Dialog" }
      ]
    }
  ]
}"#;

/// Write `contents` to a temporary `.json` file.
pub fn write_document(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(".json").expect("Failed to create temp file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write document");
    file
}

/// Run the converter binary with the given arguments.
pub fn run_cli(args: &[&str], input: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_dialog-conversion"))
        .args(args)
        .arg(input)
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to execute dialog-conversion")
}
