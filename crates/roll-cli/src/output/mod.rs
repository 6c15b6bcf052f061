use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::ui;

pub mod table;

/// Render a serializable response to a string in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Table => Ok(render_table(serde_json::to_value(value)?)),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
    }
}

/// Print a serializable response in the requested format.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

/// Write a pre-rendered document (CSV) to `path`, or stdout when `None`.
pub fn output_document(document: &str, path: Option<&str>) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, document)
                .map_err(|error| anyhow::anyhow!("failed to write '{path}': {error}"))?;
            tracing::info!(path, bytes = document.len(), "export written");
        }
        None => print!("{document}"),
    }
    Ok(())
}

fn options() -> table::TableOptions {
    let prefs = ui::prefs();
    table::TableOptions {
        max_width: prefs.term_width,
        color: prefs.table_color,
    }
}

/// Arrays become one row per element; objects become key/value rows, except
/// that a single array-valued field (a roster's `entries`) is tabulated
/// beneath the scalar fields.
fn render_table(value: Value) -> String {
    match value {
        Value::Array(items) => render_rows(&items),
        Value::Object(map) => {
            let mut scalars = Vec::new();
            let mut nested = Vec::new();
            for (key, value) in map {
                match value {
                    Value::Array(items) if items.iter().all(Value::is_object) => {
                        nested.push((key, items));
                    }
                    other => scalars.push(vec![key, cell(&other)]),
                }
            }
            let mut out = table::render_table(&["key", "value"], &scalars, options());
            for (key, items) in nested {
                out.push_str(&format!("\n\n{key}:\n"));
                out.push_str(&render_rows(&items));
            }
            out
        }
        scalar => table::render_table(&["value"], &[vec![cell(&scalar)]], options()),
    }
}

fn render_rows(items: &[Value]) -> String {
    if items.is_empty() {
        return String::from("(no rows)");
    }
    if !items.iter().all(Value::is_object) {
        let rows = items.iter().map(|item| vec![cell(item)]).collect::<Vec<_>>();
        return table::render_table(&["value"], &rows, options());
    }

    // Columns in first-seen order; later rows may add columns.
    let mut headers = Vec::<String>::new();
    for map in items.iter().filter_map(Value::as_object) {
        for key in map.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let header_refs = headers.iter().map(String::as_str).collect::<Vec<_>>();
    let rows = items
        .iter()
        .filter_map(Value::as_object)
        .map(|map| {
            headers
                .iter()
                .map(|header| map.get(header).map_or_else(|| String::from("-"), cell))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    table::render_table(&header_refs, &rows, options())
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::from("-"),
        Value::String(v) => v.clone(),
        Value::Number(n) => n
            .as_f64()
            .filter(|f| f.fract() != 0.0)
            .map_or_else(|| n.to_string(), |f| format!("{f:.2}")),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::render;
    use crate::cli::OutputFormat;

    #[derive(Serialize)]
    struct Entry {
        username: &'static str,
        status: &'static str,
    }

    #[derive(Serialize)]
    struct Roster {
        session_id: &'static str,
        percentage: f64,
        entries: Vec<Entry>,
    }

    fn roster() -> Roster {
        Roster {
            session_id: "cls-1",
            percentage: 100.0 / 3.0,
            entries: vec![
                Entry {
                    username: "s0",
                    status: "present",
                },
                Entry {
                    username: "s1",
                    status: "absent",
                },
            ],
        }
    }

    #[test]
    fn json_render_is_valid_json() {
        let out = render(&roster(), OutputFormat::Json).expect("json render should work");
        let parsed: serde_json::Value = serde_json::from_str(&out).expect("json should parse");
        assert_eq!(parsed["session_id"], "cls-1");
        assert_eq!(parsed["entries"][1]["status"], "absent");
    }

    #[test]
    fn raw_render_is_single_line_json() {
        let out = render(&roster(), OutputFormat::Raw).expect("raw render should work");
        assert!(!out.contains('\n'));
    }

    #[test]
    fn table_render_nests_entry_rows() {
        let out = render(&roster(), OutputFormat::Table).expect("table render should work");
        assert!(out.lines().next().is_some_and(|line| line.contains("key")));
        assert!(out.contains("33.33"));
        assert!(out.contains("entries:"));
        assert!(
            out.lines()
                .any(|line| line.split_whitespace().eq(["absent", "s1"]))
        );
    }

    #[test]
    fn empty_list_renders_placeholder() {
        let empty: Vec<Entry> = Vec::new();
        let out = render(&empty, OutputFormat::Table).expect("table render should work");
        assert_eq!(out, "(no rows)");
    }
}
