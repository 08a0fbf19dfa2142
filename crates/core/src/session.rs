// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session identifiers and naming rules.

crate::define_id! {
    /// Name of a multiplexer session hosting a fleet.
    pub struct SessionId;
}

/// Session names are `[A-Za-z0-9_-]+`. The literal "general" is exempt
/// wherever handoffs accept it as a catch-all bucket.
pub fn is_valid_session_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
