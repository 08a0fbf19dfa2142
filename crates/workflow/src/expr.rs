// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Template variable substitution and condition evaluation.

use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::LazyLock;

/// `${name}` / `${scope.name}` placeholder.
#[allow(clippy::expect_used)]
static VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z0-9_-]+)*)\}")
        .expect("constant pattern is valid")
});

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Look a dotted path up in the variables map.
///
/// The exact key wins over path traversal, so `item.name` stored as a
/// flat key shadows digging into an `item` object.
fn lookup<'a>(vars: &'a HashMap<String, Value>, path: &str) -> Option<&'a Value> {
    if let Some(value) = vars.get(path) {
        return Some(value);
    }
    let mut parts = path.split('.');
    let mut current = vars.get(parts.next()?)?;
    for part in parts {
        current = match current {
            Value::Object(map) => map.get(part)?,
            Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Substitute `${…}` placeholders. Unknown variables stay as-is.
pub fn substitute(template: &str, vars: &HashMap<String, Value>) -> String {
    VAR_PATTERN
        .replace_all(template, |caps: &regex::Captures<'_>| {
            match lookup(vars, &caps[1]) {
                Some(value) => render(value),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Resolve a loop `items` expression into an array.
///
/// A literal variable path resolves from the map first; otherwise the
/// substituted expression is parsed as JSON, falling back to a
/// comma-separated list. A scalar becomes a one-element array.
pub fn resolve_items(expr: &str, vars: &HashMap<String, Value>) -> Vec<Value> {
    let trimmed = expr.trim();
    let varpath = trimmed
        .strip_prefix("${")
        .and_then(|s| s.strip_suffix('}'))
        .unwrap_or(trimmed);
    if let Some(value) = lookup(vars, varpath) {
        return coerce_items(value);
    }
    let substituted = substitute(trimmed, vars);
    if let Ok(parsed) = serde_json::from_str::<Value>(&substituted) {
        return coerce_items(&parsed);
    }
    split_csv(&substituted)
}

fn coerce_items(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.clone(),
        Value::String(s) => {
            if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(s) {
                items
            } else {
                split_csv(s)
            }
        }
        Value::Null => Vec::new(),
        other => vec![other.clone()],
    }
}

fn split_csv(s: &str) -> Vec<Value> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed
        .split(',')
        .map(|part| Value::String(part.trim().to_string()))
        .collect()
}

/// Truthiness of a bare value: non-empty, not `"false"`, not `"0"`.
fn truthy(s: &str) -> bool {
    let s = s.trim();
    !s.is_empty() && !s.eq_ignore_ascii_case("false") && s != "0"
}

/// Evaluate a condition after substitution.
///
/// Comparisons (`==`, `!=`, `<=`, `>=`, `<`, `>`) compare numerically
/// when both sides parse as floats, as strings otherwise. A bare value
/// uses truthiness.
pub fn eval_condition(expr: &str, vars: &HashMap<String, Value>) -> bool {
    let resolved = substitute(expr, vars);
    for op in ["==", "!=", "<=", ">=", "<", ">"] {
        if let Some((left, right)) = resolved.split_once(op) {
            let (left, right) = (left.trim(), right.trim());
            let strip = |s: &str| s.trim_matches(|c| c == '"' || c == '\'').to_string();
            let (ls, rs) = (strip(left), strip(right));
            if let (Ok(a), Ok(b)) = (ls.parse::<f64>(), rs.parse::<f64>()) {
                return match op {
                    "==" => a == b,
                    "!=" => a != b,
                    "<=" => a <= b,
                    ">=" => a >= b,
                    "<" => a < b,
                    ">" => a > b,
                    _ => false,
                };
            }
            return match op {
                "==" => ls == rs,
                "!=" => ls != rs,
                "<=" => ls <= rs,
                ">=" => ls >= rs,
                "<" => ls < rs,
                ">" => ls > rs,
                _ => false,
            };
        }
    }
    truthy(&resolved)
}

#[cfg(test)]
#[path = "expr_tests.rs"]
mod tests;
