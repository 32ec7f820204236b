// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - integrations with external collaborators.

pub mod identity;

pub use identity::{IdentityError, IdentityVerifier, VerifiedIdentity};
