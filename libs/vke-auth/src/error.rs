// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Error types for vke-auth

use thiserror::Error;

/// Errors that can occur while producing authentication material
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// A credential required by the selected mode is empty
    #[error("missing {0}, please check your configuration")]
    MissingCredential(&'static str),

    /// A computed value cannot be carried in an HTTP header
    #[error("invalid value for header {name}: {reason}")]
    InvalidHeader { name: &'static str, reason: String },
}
