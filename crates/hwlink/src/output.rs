use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// Print the result of `command` to stdout in the requested format.
pub fn print_result<T: Serialize>(command: &str, result: &T, format: OutputFormat) {
    println!("{}", render_result(command, result, format));
}

pub fn render_result<T: Serialize>(command: &str, result: &T, format: OutputFormat) -> String {
    let fields = result_fields(result);
    match format {
        OutputFormat::Json => {
            let mut out = Map::new();
            out.insert("command".to_string(), Value::from(command));
            out.extend(fields);
            serde_json::to_string(&Value::Object(out)).unwrap_or_else(|_| "{}".to_string())
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"]);
            for (key, value) in &fields {
                table.add_row(vec![key.clone(), display_value(value, "\n")]);
            }
            table.to_string()
        }
        OutputFormat::Pretty => {
            let width = fields.keys().map(String::len).max().unwrap_or(0);
            let mut lines = vec![format!("{command}:")];
            for (key, value) in &fields {
                lines.push(format!(
                    "  {:<width$}  {}",
                    format!("{key}:"),
                    display_value(value, ", "),
                    width = width + 1
                ));
            }
            lines.join("\n")
        }
    }
}

fn result_fields<T: Serialize>(result: &T) -> Map<String, Value> {
    match serde_json::to_value(result) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            let mut map = Map::new();
            map.insert("result".to_string(), other);
            map
        }
        Err(err) => {
            let mut map = Map::new();
            map.insert("error".to_string(), Value::from(err.to_string()));
            map
        }
    }
}

fn display_value(value: &Value, separator: &str) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|v| display_value(v, separator))
            .collect::<Vec<_>>()
            .join(separator),
        other => other.to_string(),
    }
}
