// Copyright 2026 Colin Finck <colin@reactos.org>
// SPDX-License-Identifier: GPL-2.0-or-later

use crate::error::Result;
use crate::key_value::{RawValue, Value, ValueType};
use crate::permission::Permission;
use crate::string::expand_process_environment_strings;
use core::fmt;

/// Primitive operations of a hierarchical registry store.
///
/// Everything else in this crate (enumeration, materialization, walking) is built on top of
/// these operations. Implementors only need to supply the required methods; the typed
/// `read_*` methods decode the result of [`RegistryProvider::read_raw_value`].
///
/// A provider must report a refused open through [`RegTreeError::AccessDenied`], never through
/// an error message that callers would have to inspect.
///
/// [`RegTreeError::AccessDenied`]: crate::error::RegTreeError::AccessDenied
pub trait RegistryProvider {
    /// Handle to an opened key.
    /// Root references are handles as well, which is why they need to be cloneable.
    type Handle: Clone + fmt::Debug;

    /// Opens the key at `path` relative to `root`, requesting `permission`.
    fn open_node(&self, root: &Self::Handle, path: &str, permission: Permission)
        -> Result<Self::Handle>;

    /// Returns the names of the subkeys of `handle` in store order,
    /// but not more than `limit` names if a limit is given.
    fn list_child_names(&self, handle: &Self::Handle, limit: Option<usize>) -> Result<Vec<String>>;

    /// Returns the names of all values of `handle` in store order.
    fn list_value_names(&self, handle: &Self::Handle) -> Result<Vec<String>>;

    /// Returns the value `name` of `handle` with its data type code and raw data.
    fn read_raw_value(&self, handle: &Self::Handle, name: &str) -> Result<RawValue>;

    /// Creates or overwrites a value of `handle`.
    fn write_raw_value(&self, handle: &Self::Handle, value: &RawValue) -> Result<()>;

    /// Creates the subkey `name` of `handle` or opens it if it already exists.
    ///
    /// Returns the handle of the subkey and whether the subkey has already existed.
    fn create_child_node(
        &self,
        handle: &Self::Handle,
        name: &str,
        permission: Permission,
    ) -> Result<(Self::Handle, bool)>;

    /// Closes a handle returned by [`RegistryProvider::open_node`] or
    /// [`RegistryProvider::create_child_node`].
    fn close_node(&self, handle: Self::Handle) -> Result<()>;

    /// Expands all `%NAME%` placeholders in `text`.
    ///
    /// The default implementation uses the environment of the current process.
    fn expand_string(&self, text: &str) -> Result<String> {
        expand_process_environment_strings(text)
    }

    /// Returns the data type of the value `name`.
    fn read_value_type(&self, handle: &Self::Handle, name: &str) -> Result<ValueType> {
        self.read_raw_value(handle, name)?.data_type()
    }

    /// Reads a `REG_SZ` or `REG_EXPAND_SZ` value without expanding it.
    fn read_text_value(&self, handle: &Self::Handle, name: &str) -> Result<String> {
        self.read_raw_value(handle, name)?.string_data()
    }

    /// Reads a `REG_SZ` or `REG_EXPAND_SZ` value and expands its placeholders.
    fn read_expand_text_value(&self, handle: &Self::Handle, name: &str) -> Result<String> {
        let text = self.read_text_value(handle, name)?;
        self.expand_string(&text)
    }

    /// Reads a `REG_DWORD` or `REG_QWORD` value.
    fn read_integer_value(&self, handle: &Self::Handle, name: &str) -> Result<u64> {
        self.read_raw_value(handle, name)?.integer_data()
    }

    /// Reads a `REG_BINARY` value.
    fn read_binary_value(&self, handle: &Self::Handle, name: &str) -> Result<Vec<u8>> {
        self.read_raw_value(handle, name)?.binary_data()
    }

    /// Reads a `REG_MULTI_SZ` value.
    fn read_multi_text_value(&self, handle: &Self::Handle, name: &str) -> Result<Vec<String>> {
        self.read_raw_value(handle, name)?.multi_string_data()
    }

    /// Writes `value` as data of type `value_type`.
    ///
    /// The type is checked before anything is handed to the store, so a mismatch never
    /// reaches [`RegistryProvider::write_raw_value`].
    fn write_value(
        &self,
        handle: &Self::Handle,
        name: &str,
        value: &Value,
        value_type: ValueType,
    ) -> Result<()> {
        let raw = RawValue::encode(name, value, value_type)?;
        self.write_raw_value(handle, &raw)
    }
}
