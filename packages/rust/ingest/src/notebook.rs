//! Jupyter notebook (`.ipynb`) flattening.

use serde_json::Value;
use tracing::{debug, warn};

/// Flatten notebook JSON into plain text for the model.
///
/// Markdown cells are kept verbatim, code cells are fenced, and every other
/// cell type is dropped. Input that is not JSON, or JSON without a `cells`
/// array, is returned unchanged.
pub fn flatten_notebook(raw: &str) -> String {
    let notebook: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "notebook is not valid JSON, treating as plain text");
            return raw.to_string();
        }
    };

    let Some(cells) = notebook.get("cells").and_then(Value::as_array) else {
        debug!("notebook JSON has no cell list, treating as plain text");
        return raw.to_string();
    };

    let mut out = String::new();
    for cell in cells {
        let source = cell.get("source").map(cell_source).unwrap_or_default();
        match cell.get("cell_type").and_then(Value::as_str) {
            Some("markdown") => {
                out.push_str(&source);
                out.push_str("\n\n");
            }
            Some("code") => {
                out.push_str("```\n");
                out.push_str(&source);
                out.push_str("\n```\n\n");
            }
            _ => {}
        }
    }

    out.trim_end().to_string()
}

/// Join a cell's `source`, which nbformat allows as a string or a list of lines.
fn cell_source(source: &Value) -> String {
    match source {
        Value::String(s) => s.clone(),
        Value::Array(parts) => parts
            .iter()
            .map(|part| match part {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_and_code_cells_are_flattened() {
        let nb = r#"{"cells":[
            {"cell_type":"markdown","source":["Intro"]},
            {"cell_type":"code","source":"print(1)"}
        ]}"#;
        assert_eq!(flatten_notebook(nb), "Intro\n\n```\nprint(1)\n```");
    }

    #[test]
    fn line_fragments_are_joined_without_separator() {
        let nb = r##"{"cells":[{"cell_type":"markdown","source":["# Title\n","Body line"]}]}"##;
        assert_eq!(flatten_notebook(nb), "# Title\nBody line");
    }

    #[test]
    fn raw_and_unknown_cells_are_dropped() {
        let nb = r#"{"cells":[
            {"cell_type":"raw","source":"skip me"},
            {"cell_type":"markdown","source":"keep"},
            {"source":"no type"}
        ]}"#;
        assert_eq!(flatten_notebook(nb), "keep");
    }

    #[test]
    fn cell_order_is_preserved_and_every_code_cell_fenced() {
        let nb = r#"{"cells":[
            {"cell_type":"code","source":"a = 1"},
            {"cell_type":"markdown","source":"middle"},
            {"cell_type":"code","source":"b = 2"}
        ]}"#;
        let flat = flatten_notebook(nb);
        let a = flat.find("a = 1").unwrap();
        let m = flat.find("middle").unwrap();
        let b = flat.find("b = 2").unwrap();
        assert!(a < m && m < b);
        assert_eq!(flat.matches("```").count(), 4);
    }

    #[test]
    fn plain_text_is_returned_unchanged() {
        let text = "Just some notes\n\nwith paragraphs  ";
        assert_eq!(flatten_notebook(text), text);
        assert_eq!(flatten_notebook(&flatten_notebook(text)), text);
    }

    #[test]
    fn json_without_cells_is_returned_unchanged() {
        let json = r#"{"metadata":{},"nbformat":4}"#;
        assert_eq!(flatten_notebook(json), json);

        let not_a_list = r#"{"cells":"oops"}"#;
        assert_eq!(flatten_notebook(not_a_list), not_a_list);
    }

    #[test]
    fn missing_source_counts_as_empty() {
        let nb = r#"{"cells":[{"cell_type":"code"},{"cell_type":"markdown","source":"after"}]}"#;
        assert_eq!(flatten_notebook(nb), "```\n\n```\n\nafter");
    }
}
