//! Output formats for a resolved record.
//!
//! Both formats go through `serde_json::Value` (built with `preserve_order`),
//! so the PHP writer sees the same field names in the same order as the JSON
//! output: struct declaration order, `entityid` first.

use crate::saml::{error::Error, metadata::RemoteIdpMetadata};
use serde_json::Value;
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Json,
    /// `saml20-idp-remote.php` body.
    Php,
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "php" => Ok(Self::Php),
            other => Err(format!("unsupported output format: {other}")),
        }
    }
}

/// Render `metadata` in `format`, newline terminated.
///
/// # Errors
/// Returns an error if the record cannot be converted to JSON.
pub fn render(metadata: &RemoteIdpMetadata, format: Format) -> Result<String, Error> {
    match format {
        Format::Json => {
            let mut out = serde_json::to_string_pretty(&metadata.metadata_set())?;
            out.push('\n');
            Ok(out)
        }
        Format::Php => to_php(metadata),
    }
}

/// PHP metadata file: `$metadata['<entityid>'] = [ ... ];`
///
/// # Errors
/// Returns an error if the record cannot be converted to JSON.
pub fn to_php(metadata: &RemoteIdpMetadata) -> Result<String, Error> {
    let value = serde_json::to_value(metadata)?;

    let mut out = String::from("<?php\n\n");
    out.push_str("$metadata[");
    out.push_str(&php_string(metadata.entity_id()));
    out.push_str("] = ");
    write_php(&mut out, &value, 0);
    out.push_str(";\n");

    Ok(out)
}

fn php_string(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
}

fn indent(out: &mut String, depth: usize) {
    out.push_str(&"  ".repeat(depth));
}

fn write_php(out: &mut String, value: &Value, depth: usize) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => {
            let _ = write!(out, "{n}");
        }
        Value::String(s) => out.push_str(&php_string(s)),
        Value::Array(items) if items.is_empty() => out.push_str("[]"),
        Value::Array(items) => {
            out.push_str("[\n");
            for item in items {
                indent(out, depth + 1);
                write_php(out, item, depth + 1);
                out.push_str(",\n");
            }
            indent(out, depth);
            out.push(']');
        }
        Value::Object(map) if map.is_empty() => out.push_str("[]"),
        Value::Object(map) => {
            out.push_str("[\n");
            for (key, item) in map {
                indent(out, depth + 1);
                out.push_str(&php_string(key));
                out.push_str(" => ");
                write_php(out, item, depth + 1);
                out.push_str(",\n");
            }
            indent(out, depth);
            out.push(']');
        }
    }
}
