// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Error types for layout construction and image emission.

use std::fmt;
use std::io;

/// Categories of layout errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutErrorKind {
    Build,
    Cli,
    Image,
    Io,
}

/// A layout error with a kind and message.
#[derive(Debug, Clone)]
pub struct LayoutError {
    kind: LayoutErrorKind,
    message: String,
}

impl LayoutError {
    pub fn new(kind: LayoutErrorKind, msg: &str, param: Option<&str>) -> Self {
        Self {
            kind,
            message: format_error(msg, param),
        }
    }

    pub fn io(err: &io::Error, context: &str) -> Self {
        Self::new(LayoutErrorKind::Io, context, Some(&err.to_string()))
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> LayoutErrorKind {
        self.kind
    }
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for LayoutError {}

fn format_error(msg: &str, param: Option<&str>) -> String {
    match param {
        Some(param) => format!("{msg}: {param}"),
        None => msg.to_string(),
    }
}
