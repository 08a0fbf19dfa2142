// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output envelope and exit codes.

use clap::ValueEnum;
use muster_core::ErrorCode;
use serde::Serialize;

/// Process exit codes.
pub const EXIT_OK: i32 = 0;
pub const EXIT_ERROR: i32 = 1;
pub const EXIT_DEPENDENCY: i32 = 2;

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Machine-mode envelope for every operation result.
#[derive(Debug, Serialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Envelope {
    pub fn ok(data: serde_json::Value) -> Self {
        Self {
            success: true,
            error_code: None,
            error: None,
            hint: None,
            data: Some(data),
        }
    }

    pub fn err(code: ErrorCode, error: impl Into<String>) -> Self {
        Self {
            success: false,
            error_code: Some(code),
            error: Some(error.into()),
            hint: code.hint(),
            data: None,
        }
    }
}

/// Print a successful result and return the exit code.
pub fn emit_ok(format: OutputFormat, data: serde_json::Value, text: &str) -> i32 {
    match format {
        OutputFormat::Json => print_json(&Envelope::ok(data)),
        OutputFormat::Text => {
            if !text.is_empty() {
                println!("{}", text);
            }
        }
    }
    EXIT_OK
}

/// Print a failure and return the exit code (dependency failures map
/// to exit 2).
pub fn emit_err(format: OutputFormat, code: ErrorCode, error: &str) -> i32 {
    match format {
        OutputFormat::Json => print_json(&Envelope::err(code, error)),
        OutputFormat::Text => match code.hint() {
            Some(hint) => eprintln!("error: {} ({})", error, hint),
            None => eprintln!("error: {}", error),
        },
    }
    if code == ErrorCode::DependencyMissing {
        EXIT_DEPENDENCY
    } else {
        EXIT_ERROR
    }
}

fn print_json(envelope: &Envelope) {
    match serde_json::to_string_pretty(envelope) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("error: cannot serialize output: {}", e),
    }
}
