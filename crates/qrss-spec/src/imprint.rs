//! Imprint text templates.
//!
//! A template is plain text with `{placeholder}` fields. Unknown
//! placeholders are a configuration error; a lone `{` without a closing
//! brace is kept as literal text.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Template used when none is configured.
pub const DEFAULT_IMPRINT: &str = "{label} {timestamp} {center}+-{halfbw}";

const PLACEHOLDERS: &[&str] = &["label", "timestamp", "center", "halfbw"];

/// Values substituted into an imprint template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImprintFields<'a> {
    pub label: &'a str,
    pub timestamp: &'a str,
    /// Absolute plot center in Hz.
    pub center_hz: i64,
    /// Half the plot bandwidth in Hz.
    pub half_bw_hz: i64,
}

/// Imprint template text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImprintTemplate(pub String);

impl Default for ImprintTemplate {
    fn default() -> Self {
        Self(DEFAULT_IMPRINT.to_string())
    }
}

enum Piece<'a> {
    Text(&'a str),
    Field(&'a str),
}

fn pieces(template: &str) -> Vec<Piece<'_>> {
    let mut out = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let Some(len) = rest[open + 1..].find('}') else {
            break;
        };
        if open > 0 {
            out.push(Piece::Text(&rest[..open]));
        }
        out.push(Piece::Field(&rest[open + 1..open + 1 + len]));
        rest = &rest[open + len + 2..];
    }
    if !rest.is_empty() {
        out.push(Piece::Text(rest));
    }
    out
}

impl ImprintTemplate {
    /// Check that every placeholder is known.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for piece in pieces(&self.0) {
            if let Piece::Field(name) = piece {
                if !PLACEHOLDERS.contains(&name) {
                    return Err(ConfigError::ImprintPlaceholder(name.to_string()));
                }
            }
        }
        Ok(())
    }

    /// Substitute `fields` into the template.
    ///
    /// Unknown placeholders are left verbatim; call [`validate`](Self::validate)
    /// at startup to reject them.
    pub fn render(&self, fields: &ImprintFields<'_>) -> String {
        let mut out = String::with_capacity(self.0.len() + 32);
        for piece in pieces(&self.0) {
            match piece {
                Piece::Text(text) => out.push_str(text),
                Piece::Field("label") => out.push_str(fields.label),
                Piece::Field("timestamp") => out.push_str(fields.timestamp),
                Piece::Field("center") => out.push_str(&fields.center_hz.to_string()),
                Piece::Field("halfbw") => out.push_str(&fields.half_bw_hz.to_string()),
                Piece::Field(other) => {
                    out.push('{');
                    out.push_str(other);
                    out.push('}');
                }
            }
        }
        out
    }
}
