// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Subcommand implementations
//!
//! Each command asks the shared detector for a decision and prints it as
//! text or JSON.

pub mod detect;
pub mod fits;
pub mod hints;
