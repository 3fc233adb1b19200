// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

// Library entry exposing the layout engine and the ELF emitter.
pub mod core;
pub mod emitter;
