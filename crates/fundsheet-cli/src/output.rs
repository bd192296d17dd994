use fundsheet_sheets::FundRecord;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Columns shown for search hits, in order.
const SEARCH_COLUMNS: [&str; 8] = [
    "class_id",
    "name",
    "trading_currency",
    "tna",
    "tea",
    "tem",
    "year_performance",
    "updated",
];

/// Prints a pipeline report under the command name.
pub fn render_report<T: Serialize>(
    command: &str,
    report: &T,
    format: OutputFormat,
) -> Result<(), CliError> {
    let value = serde_json::to_value(report)?;
    match format {
        OutputFormat::Json => {
            let payload = json!({ "command": command, "result": value });
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        OutputFormat::Table => {
            println!("{command}");
            for (key, value) in flatten(&value) {
                println!("  {key:<16} {value}");
            }
        }
    }
    Ok(())
}

pub fn render_search(
    query: &str,
    matches: &[(String, FundRecord)],
    format: OutputFormat,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let results: Vec<Value> = matches
                .iter()
                .map(|(class_id, record)| {
                    let mut object = Map::new();
                    object.insert(String::from("class_id"), Value::from(class_id.as_str()));
                    for (key, value) in record {
                        object.insert((*key).to_string(), Value::from(value.as_str()));
                    }
                    Value::Object(object)
                })
                .collect();
            let payload = json!({ "query": query, "results": results });
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        OutputFormat::Table => {
            if matches.is_empty() {
                println!("no funds match '{query}'");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = matches
                .iter()
                .map(|(class_id, record)| search_row(class_id, record))
                .collect();
            print!("{}", render_table(&SEARCH_COLUMNS, &rows));
        }
    }
    Ok(())
}

fn search_row(class_id: &str, record: &FundRecord) -> Vec<String> {
    SEARCH_COLUMNS
        .iter()
        .map(|column| match *column {
            "class_id" => class_id.to_string(),
            other => record.get(other).cloned().unwrap_or_default(),
        })
        .collect()
}

/// Left-aligned columns separated by two spaces, widths from the widest cell.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (index, cell) in row.iter().enumerate().take(widths.len()) {
            widths[index] = widths[index].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header: Vec<String> = headers.iter().map(|h| (*h).to_string()).collect();
    push_line(&mut out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut out, &rule, &widths);
    for row in rows {
        push_line(&mut out, row, &widths);
    }
    out
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = widths
        .iter()
        .enumerate()
        .map(|(index, &width)| {
            let cell = cells.get(index).map_or("", String::as_str);
            format!("{cell:<width$}")
        })
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

fn flatten(value: &Value) -> Vec<(String, String)> {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| {
                let text = match value {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                };
                (key.clone(), text)
            })
            .collect(),
        other => vec![(String::from("value"), other.to_string())],
    }
}
