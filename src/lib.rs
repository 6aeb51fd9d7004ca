// Copyright 2019-2026 Colin Finck <colin@reactos.org>
// SPDX-License-Identifier: GPL-2.0-or-later

//! Mirror keys and typed values of a hierarchical registry into an owned in-memory tree.
//!
//! A [`RegKey`] describes a key by a root reference and a path.
//! [`RegKey::materialize`] opens every immediate subkey and decodes all of its values into a
//! [`Tree`], and [`Walk`] traverses such a tree depth-first, optionally materializing every
//! visited key on the way.
//!
//! All registry access goes through a [`RegistryProvider`]. [`MemoryRegistry`] is a complete
//! in-memory implementation of it.

mod error;
mod helpers;
mod key_value;
mod memory;
mod open_key;
mod permission;
mod provider;
mod reg_key;
mod string;
mod subkeys_list;
mod tree;
mod walker;

pub use crate::error::*;
pub use crate::helpers::PATH_SEPARATOR;
pub use crate::key_value::*;
pub use crate::memory::*;
pub use crate::open_key::*;
pub use crate::permission::*;
pub use crate::provider::*;
pub use crate::reg_key::*;
pub use crate::string::*;
pub use crate::subkeys_list::*;
pub use crate::tree::*;
pub use crate::walker::*;
