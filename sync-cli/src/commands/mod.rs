//! CLI command implementations.

pub mod identity;
pub mod lan;
pub mod merge;
pub mod packet;
pub mod qr;

use anyhow::Result;
use serde::Serialize;

/// What a command prints, and whether the process should exit 0.
#[derive(Debug)]
pub struct Output {
    pub text: String,
    pub success: bool,
}

impl Output {
    /// Plain text, exit code 0.
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            success: true,
        }
    }

    /// Pretty JSON, exit code 0.
    pub fn json<T: Serialize>(value: &T) -> Result<Self> {
        Ok(Self::ok(serde_json::to_string_pretty(value)?))
    }

    /// Pretty JSON, exit code 1.
    pub fn failed_json<T: Serialize>(value: &T) -> Result<Self> {
        Ok(Self {
            success: false,
            ..Self::json(value)?
        })
    }
}
