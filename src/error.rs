// Copyright 2026 Colin Finck <colin@reactos.org>
// SPDX-License-Identifier: GPL-2.0-or-later

use displaydoc::Display;

use crate::key_value::ValueType;

/// Central result type of reg-tree.
pub type Result<T, E = RegTreeError> = core::result::Result<T, E>;

/// Central error type of reg-tree.
#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub enum RegTreeError {
    /// Access to the key {path:?} was denied
    AccessDenied { path: String },
    /// The key {path:?} already exists
    AlreadyExists { path: String },
    /// The data of value {name:?} cannot be decoded: {reason}
    Decode { name: String, reason: String },
    /// The subkeys of {path:?} cannot be enumerated: {reason}
    Enumeration { path: String, reason: String },
    /// Invalid argument: {reason}
    InvalidArgument { reason: &'static str },
    /// The handle {handle} is not a valid open key handle
    InvalidHandle { handle: String },
    /// The key or value {path:?} does not exist
    NotFound { path: String },
    /// The key {path:?} has not been opened
    NotOpen { path: String },
    /// The key {path:?} cannot be opened: {reason}
    Open { path: String, reason: String },
    /// The registry provider failed: {reason}
    Provider { reason: String },
    /// The value {name:?} should be written as {expected:?}, but a {actual} value was given
    TypeMismatch {
        name: String,
        expected: ValueType,
        actual: &'static str,
    },
    /// The environment variable {variable:?} cannot be resolved
    UnresolvableVariable { variable: String },
    /// The value {name:?} has the data type {actual:#010x}, which is not supported
    UnsupportedType { name: String, actual: u32 },
}

impl std::error::Error for RegTreeError {}
