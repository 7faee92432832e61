// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subject profile lookup.

use async_trait::async_trait;

use crate::domain::Profile;
use crate::error::CadenceError;

/// Resolves a subject identifier into a profile, caching by normalized
/// identifier.
#[async_trait]
pub trait ProfileResolver: Send + Sync {
    async fn resolve(&self, identifier: &str) -> Result<Profile, CadenceError>;
}
