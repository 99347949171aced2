//! Request command handlers

use anyhow::{Context, Result, bail};
use colored::*;
use reqwest::Method;
use serde_json::Value;
use std::fs;
use std::time::Duration;

use super::{BodyArgs, CommonArgs, DeleteArgs, GetArgs, OutputFormat};
use apiquery::api::{ApiClient, OrderBy, Pagination, QueryEnvelope, RequestConfig, SortDirection};

/// Listing GET: `--where`, `--order` and paging flags become the query
/// envelope.
pub async fn handle_get(client: &ApiClient, args: GetArgs) -> Result<()> {
    let filter = args
        .filter
        .as_deref()
        .map(|raw| serde_json::from_str::<Value>(raw))
        .transpose()
        .context("--where is not valid JSON")?;
    let order = parse_order(&args.order)?;
    let pagination = match (args.page, args.cursor) {
        (Some(page), _) => Some(Pagination::page(page, args.size)),
        (None, Some(cursor)) => Some(Pagination::cursor(cursor, args.size)),
        (None, None) => None,
    };

    let envelope: QueryEnvelope<Value, String> =
        QueryEnvelope::new(pagination, Some(order), filter);
    let overrides = request_config(&args.common)?;

    let result: Option<Value> = client.list(&args.path, &envelope, Some(overrides)).await?;
    emit(result, &args.common)
}

/// Body from `--data` or `--file`, with object keys kept in written order.
fn read_body(args: &BodyArgs) -> Result<Option<Value>> {
    let body = match (&args.data, &args.file) {
        (Some(raw), _) => Some(serde_json::from_str::<Value>(raw).context("--data is not valid JSON")?),
        (None, Some(path)) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read body file: {}", path.display()))?;
            Some(
                serde_json::from_str::<Value>(&content)
                    .with_context(|| format!("Body file is not valid JSON: {}", path.display()))?,
            )
        }
        (None, None) => None,
    };
    Ok(body)
}

pub async fn handle_body(client: &ApiClient, method: Method, args: BodyArgs) -> Result<()> {
    let body = read_body(&args)?;
    let overrides = request_config(&args.common)?;

    let result: Option<Value> = client
        .request(method, &args.path, body, Some(overrides))
        .await?;
    emit(result, &args.common)
}

pub async fn handle_delete(client: &ApiClient, args: DeleteArgs) -> Result<()> {
    let overrides = request_config(&args.common)?;
    let result: Option<Value> = client.delete(&args.path, Some(overrides)).await?;
    emit(result, &args.common)
}

/// `field:dir` pairs, in the order given.
fn parse_order(raw: &[String]) -> Result<OrderBy<String>> {
    let mut order = OrderBy::new();
    for entry in raw {
        let (field, direction) = match entry.split_once(':') {
            Some((field, direction)) => (field.trim(), direction.parse::<SortDirection>()?),
            None => (entry.trim(), SortDirection::Asc),
        };
        if field.is_empty() {
            bail!("Empty field name in --order '{}'", entry);
        }
        order.set(field.to_string(), direction);
    }
    Ok(order)
}

fn request_config(common: &CommonArgs) -> Result<RequestConfig> {
    let mut config = RequestConfig::new();

    for header in &common.headers {
        let Some((name, value)) = header.split_once(':') else {
            bail!("Header '{}' must look like 'Name: value'", header);
        };
        config = config
            .try_header(name, value)
            .with_context(|| format!("Invalid header '{}'", header))?;
    }
    for param in &common.query {
        let Some((key, value)) = param.split_once('=') else {
            bail!("Query parameter '{}' must look like 'key=value'", param);
        };
        config = config.query_param(key, value);
    }
    if let Some(secs) = common.timeout {
        config = config.timeout(Duration::from_secs(secs));
    }

    Ok(config)
}

fn emit(result: Option<Value>, common: &CommonArgs) -> Result<()> {
    let Some(value) = result else {
        eprintln!("{}", "(no content)".dimmed());
        return Ok(());
    };

    let formatted = format_output(&value, common.format)?;
    match &common.output {
        Some(path) => {
            fs::write(path, &formatted)
                .with_context(|| format!("Failed to write output to: {}", path.display()))?;
            eprintln!("Response saved to: {}", path.display().to_string().bright_green());
        }
        None => println!("{}", formatted),
    }
    Ok(())
}

/// Format a response body according to the requested output format
fn format_output(data: &Value, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(data).context("Failed to format JSON output"),
        OutputFormat::Compact => serde_json::to_string(data).context("Failed to format JSON output"),
        OutputFormat::Csv => {
            // Standard response bodies carry their rows under `data`.
            let rows = match data.get("data") {
                Some(items @ Value::Array(_)) => items,
                _ => data,
            };
            Ok(json_to_csv(rows))
        }
    }
}

/// Convert JSON data to CSV representation
fn json_to_csv(data: &Value) -> String {
    match data {
        Value::Array(arr) => {
            if arr.is_empty() {
                return "No data\n".to_string();
            }

            let mut csv = String::new();

            // Headers come from the first object
            if let Some(Value::Object(first_obj)) = arr.first() {
                let headers: Vec<String> = first_obj.keys().cloned().collect();
                csv.push_str(
                    &headers
                        .iter()
                        .map(|h| csv_escape(h))
                        .collect::<Vec<_>>()
                        .join(","),
                );
                csv.push('\n');

                for item in arr {
                    if let Value::Object(obj) = item {
                        let row: Vec<String> = headers
                            .iter()
                            .map(|h| csv_escape(&json_value_to_string(obj.get(h).unwrap_or(&Value::Null))))
                            .collect();
                        csv.push_str(&row.join(","));
                        csv.push('\n');
                    }
                }
            } else {
                csv.push_str("value\n");
                for item in arr {
                    csv.push_str(&csv_escape(&json_value_to_string(item)));
                    csv.push('\n');
                }
            }
            csv
        }
        Value::Object(obj) => {
            let mut csv = String::from("key,value\n");
            for (key, value) in obj {
                csv.push_str(&format!(
                    "{},{}\n",
                    csv_escape(key),
                    csv_escape(&json_value_to_string(value))
                ));
            }
            csv
        }
        _ => format!("value\n{}\n", csv_escape(&json_value_to_string(data))),
    }
}

fn json_value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
