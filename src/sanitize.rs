//! Input sanitization for user-supplied free text
//!
//! Every free-text field is validated here before it is interpolated into a
//! prompt. Fields are rejected outright on any rule violation; the only
//! normalization ever applied is trimming and whitespace collapse. This is
//! the prompt-injection boundary: nothing user-controlled reaches the AI
//! provider without passing through this module.

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum length of a name-like field, in characters
pub const MAX_NAME_LENGTH: usize = 50;

/// Maximum length of a selected check-in option, in characters
pub const MAX_OPTION_LENGTH: usize = 200;

/// Fallback display name when the caller provides none
pub const DEFAULT_NAME: &str = "friend";

/// Substrings associated with prompt-injection attempts
///
/// Matched case-insensitively against the trimmed value. Presence of any
/// entry fails validation; there is no partial acceptance.
const BLOCKLIST: &[&str] = &[
    "ignore",
    "disregard",
    "forget",
    "new instructions",
    "previous instructions",
    "system",
    "admin",
    "override",
    "act as",
    "you are now",
    "pretend",
];

/// The fixed set of spending categories the service understands
///
/// Enumerated request fields must be a member of this set; anything else is
/// a validation failure, not an unknown-category passthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpendingCategory {
    Food,
    Transport,
    Entertainment,
    Shopping,
}

impl SpendingCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpendingCategory::Food => "Food",
            SpendingCategory::Transport => "Transport",
            SpendingCategory::Entertainment => "Entertainment",
            SpendingCategory::Shopping => "Shopping",
        }
    }
}

impl fmt::Display for SpendingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpendingCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Food" => Ok(SpendingCategory::Food),
            "Transport" => Ok(SpendingCategory::Transport),
            "Entertainment" => Ok(SpendingCategory::Entertainment),
            "Shopping" => Ok(SpendingCategory::Shopping),
            _ => Err(()),
        }
    }
}

/// Trim and collapse internal whitespace runs to single spaces
fn normalize(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Case-insensitive scan for blocklisted substrings
fn blocklisted(value: &str) -> Option<&'static str> {
    let lowered = value.to_lowercase();
    BLOCKLIST.iter().find(|term| lowered.contains(**term)).copied()
}

fn check_blocklist(field: &str, value: &str) -> AppResult<()> {
    if let Some(term) = blocklisted(value) {
        tracing::warn!(
            field = field,
            term = term,
            "Rejected input containing blocklisted phrase"
        );
        return Err(AppError::validation(
            field,
            "contains a disallowed phrase",
        ));
    }
    Ok(())
}

fn check_length(field: &str, value: &str, max: usize) -> AppResult<()> {
    let chars = value.chars().count();
    if chars > max {
        return Err(AppError::validation(
            field,
            format!("exceeds maximum length of {max} characters (got {chars})"),
        ));
    }
    Ok(())
}

/// Sanitize an optional name-like field
///
/// Empty-after-trim input is treated as "not provided" and passes through as
/// `None`. Otherwise the value must fit the name character class (letters,
/// spaces, hyphens, apostrophes), the length bound, and the blocklist.
pub fn optional_name(field: &str, raw: Option<&str>) -> AppResult<Option<String>> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    let value = normalize(raw);
    if value.is_empty() {
        return Ok(None);
    }

    check_length(field, &value, MAX_NAME_LENGTH)?;

    if let Some(bad) = value
        .chars()
        .find(|c| !(c.is_alphabetic() || *c == ' ' || *c == '-' || *c == '\''))
    {
        return Err(AppError::validation(
            field,
            format!("contains disallowed character {bad:?}"),
        ));
    }

    check_blocklist(field, &value)?;

    Ok(Some(value))
}

/// Sanitize a required bounded free-choice field (a selected check-in option)
///
/// No character-class restriction beyond the blocklist, but the field is
/// required: empty-after-trim input fails validation.
pub fn required_option(field: &str, raw: &str) -> AppResult<String> {
    let value = normalize(raw);
    if value.is_empty() {
        return Err(AppError::validation(field, "must not be empty"));
    }

    check_length(field, &value, MAX_OPTION_LENGTH)?;
    check_blocklist(field, &value)?;

    Ok(value)
}

/// Validate an enumerated category field against the fixed allowed set
pub fn category(field: &str, raw: &str) -> AppResult<SpendingCategory> {
    let value = normalize(raw);
    if value.is_empty() {
        return Err(AppError::validation(field, "must not be empty"));
    }

    value.parse().map_err(|_| {
        AppError::validation(
            field,
            "must be one of: Food, Transport, Entertainment, Shopping",
        )
    })
}
