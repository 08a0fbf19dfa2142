// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ANSI escape stripping.
//!
//! Removes CSI (`ESC [ … final`) and OSC (`ESC ] … BEL|ST`) sequences.
//! Stripping is idempotent: the output contains no removable sequence.

/// Strip CSI and OSC escape sequences from terminal output.
///
/// Lone or unfinished escapes are dropped rather than passed through, so
/// a scrollback cut mid-sequence still strips clean.
pub fn strip_ansi(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\u{1b}' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            // CSI: parameter/intermediate bytes end at a final byte in @..~
            Some('[') => {
                chars.next();
                for c in chars.by_ref() {
                    if ('\u{40}'..='\u{7e}').contains(&c) {
                        break;
                    }
                }
            }
            // OSC: terminated by BEL or ST (ESC \)
            Some(']') => {
                chars.next();
                while let Some(c) = chars.next() {
                    if c == '\u{7}' {
                        break;
                    }
                    if c == '\u{1b}' {
                        if chars.peek() == Some(&'\\') {
                            chars.next();
                        }
                        break;
                    }
                }
            }
            // Other two-byte escapes (ESC c, ESC =, …): drop the pair
            Some(_) => {
                chars.next();
            }
            None => {}
        }
    }
    out
}
