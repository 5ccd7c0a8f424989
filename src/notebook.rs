//! Notebook parsing and re-serialization.
//!
//! The reader is deliberately permissive: the only hard failures are text that
//! is not JSON and a document without a `cells` array. Every other oddity
//! (string-or-array text fields, unknown cell and output types, missing
//! counts) degrades to a documented default.

use serde_json::{json, Map, Value};

use crate::error::{ConvertError, Result};
use crate::models::{
    split_lines, value_to_text, Cell, CellKind, FormatVersion, MimeBundle, Notebook,
    NotebookMetadata, Output, StreamName,
};

// ============================================================================
// Parsing
// ============================================================================

pub fn parse_notebook(raw: &str) -> Result<Notebook> {
    let root: Value = serde_json::from_str(raw)
        .map_err(|e| ConvertError::MalformedInput(format!("invalid JSON: {}", e)))?;

    let root = root
        .as_object()
        .ok_or_else(|| ConvertError::MalformedInput("top level is not an object".to_string()))?;

    let cells = root
        .get("cells")
        .and_then(Value::as_array)
        .ok_or_else(|| ConvertError::MalformedInput("missing `cells` array".to_string()))?;

    let defaults = FormatVersion::default();
    let format_version = FormatVersion {
        major: read_u32(root.get("nbformat")).unwrap_or(defaults.major),
        minor: read_u32(root.get("nbformat_minor")).unwrap_or(defaults.minor),
    };

    let metadata = NotebookMetadata::from_raw(object_or_empty(root.get("metadata")));

    let cells = cells
        .iter()
        .enumerate()
        .map(|(index, cell)| parse_cell(index, cell))
        .collect();

    Ok(Notebook {
        format_version,
        metadata,
        cells,
    })
}

fn parse_cell(index: usize, value: &Value) -> Cell {
    let cell_type = value.get("cell_type").and_then(Value::as_str).unwrap_or("");
    let kind = CellKind::from_type(cell_type);
    if kind == CellKind::Code && cell_type != "code" {
        log::debug!("cell {}: unknown cell_type {:?}, treating as code", index, cell_type);
    }

    let source = read_lines(value.get("source"));
    let metadata = object_or_empty(value.get("metadata"));
    let id = value.get("id").and_then(Value::as_str).map(str::to_string);

    let attachments = value
        .get("attachments")
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .filter_map(|(name, bundle)| {
                    bundle
                        .as_object()
                        .map(|b| (name.clone(), MimeBundle::from_map(b.clone())))
                })
                .collect()
        })
        .unwrap_or_default();

    let (outputs, execution_count) = if kind == CellKind::Code {
        let outputs = value
            .get("outputs")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(|o| parse_output(index, o)).collect())
            .unwrap_or_default();
        (outputs, read_i64(value.get("execution_count")))
    } else {
        (Vec::new(), None)
    };

    Cell {
        kind,
        id,
        source,
        metadata,
        outputs,
        execution_count,
        attachments,
    }
}

fn parse_output(cell_index: usize, value: &Value) -> Output {
    let output_type = value.get("output_type").and_then(Value::as_str).unwrap_or("");
    let data = || MimeBundle::from_map(object_or_empty(value.get("data")));
    let metadata = || object_or_empty(value.get("metadata"));

    match output_type {
        "display_data" => Output::DisplayData {
            data: data(),
            metadata: metadata(),
        },
        "execute_result" => Output::ExecuteResult {
            data: data(),
            metadata: metadata(),
            execution_count: read_i64(value.get("execution_count")),
        },
        "error" => Output::Error {
            name: read_text(value.get("ename")),
            value: read_text(value.get("evalue")),
            traceback: read_traceback(value.get("traceback")),
        },
        other => {
            if other != "stream" {
                log::debug!(
                    "cell {}: unknown output_type {:?}, reading it as a stream",
                    cell_index,
                    other
                );
            }
            let name = value.get("name").and_then(Value::as_str).unwrap_or("stdout");
            Output::Stream {
                name: StreamName::from_name(name),
                text: read_text(value.get("text")),
            }
        }
    }
}

fn read_u32(value: Option<&Value>) -> Option<u32> {
    value.and_then(Value::as_u64).and_then(|n| u32::try_from(n).ok())
}

fn read_i64(value: Option<&Value>) -> Option<i64> {
    value.and_then(Value::as_i64)
}

fn read_text(value: Option<&Value>) -> String {
    value.map(value_to_text).unwrap_or_default()
}

/// Source lines: arrays keep their element boundaries, a single string is split
/// at newlines. Either way the concatenation is the authored text.
fn read_lines(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().map(value_to_text).collect(),
        Some(other) => split_lines(&value_to_text(other)),
        None => Vec::new(),
    }
}

fn read_traceback(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().map(value_to_text).collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => vec![value_to_text(other)],
    }
}

fn object_or_empty(value: Option<&Value>) -> Map<String, Value> {
    value.and_then(Value::as_object).cloned().unwrap_or_default()
}

// ============================================================================
// Serialization
// ============================================================================

/// Writes the document back out in notebook JSON shape.
pub fn notebook_to_json(notebook: &Notebook) -> Value {
    json!({
        "cells": notebook.cells.iter().map(cell_to_json).collect::<Vec<_>>(),
        "metadata": Value::Object(notebook.metadata.raw.clone()),
        "nbformat": notebook.format_version.major,
        "nbformat_minor": notebook.format_version.minor,
    })
}

/// Serializes with the single-space indentation notebook files use on disk.
pub fn notebook_to_string(notebook: &Notebook) -> Result<String> {
    let value = notebook_to_json(notebook);
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    serde::Serialize::serialize(&value, &mut ser)
        .map_err(|e| ConvertError::MalformedInput(format!("cannot serialize notebook: {}", e)))?;
    String::from_utf8(buf)
        .map_err(|e| ConvertError::MalformedInput(format!("serialized notebook is not UTF-8: {}", e)))
}

fn cell_to_json(cell: &Cell) -> Value {
    let mut obj = Map::new();
    obj.insert("cell_type".into(), json!(cell.kind.as_str()));
    if let Some(ref id) = cell.id {
        obj.insert("id".into(), json!(id));
    }
    obj.insert("metadata".into(), Value::Object(cell.metadata.clone()));
    obj.insert("source".into(), json!(cell.source));

    if !cell.attachments.is_empty() {
        let attachments: Map<String, Value> = cell
            .attachments
            .iter()
            .map(|(name, bundle)| (name.clone(), bundle.to_value()))
            .collect();
        obj.insert("attachments".into(), Value::Object(attachments));
    }

    if cell.kind == CellKind::Code {
        obj.insert("execution_count".into(), json!(cell.execution_count));
        obj.insert(
            "outputs".into(),
            Value::Array(cell.outputs.iter().map(output_to_json).collect()),
        );
    }

    Value::Object(obj)
}

fn output_to_json(output: &Output) -> Value {
    let output_type = output.output_type();
    match output {
        Output::Stream { name, text } => json!({
            "output_type": output_type,
            "name": name.as_str(),
            "text": split_lines(text),
        }),
        Output::DisplayData { data, metadata } => json!({
            "output_type": output_type,
            "data": data.to_value(),
            "metadata": Value::Object(metadata.clone()),
        }),
        Output::ExecuteResult {
            data,
            metadata,
            execution_count,
        } => json!({
            "output_type": output_type,
            "data": data.to_value(),
            "metadata": Value::Object(metadata.clone()),
            "execution_count": execution_count,
        }),
        Output::Error {
            name,
            value,
            traceback,
        } => json!({
            "output_type": output_type,
            "ename": name,
            "evalue": value,
            "traceback": traceback,
        }),
    }
}

// ============================================================================
// Tests
// ============================================================================
