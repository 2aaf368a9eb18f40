// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Shared default registry construction for the preprocessor and its CLI.

use crate::core::generators::Generator;
use crate::core::registry::{Limits, Registry};

/// Build the registry holding every built-in directive.
pub fn build_default_registry(limits: Limits) -> Registry {
    let mut registry = Registry::new(limits);
    for generator in Generator::ALL {
        registry.register(generator);
    }
    registry
}
