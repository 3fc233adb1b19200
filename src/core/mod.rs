// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Format-agnostic layout engine.
//!
//! - [`chip`] - Chip kinds and fixed-width encodings
//! - [`layout`] - Arena, builder API, and lazy evaluator
//! - [`error`] - Error types

pub mod chip;
pub mod error;
pub mod layout;
