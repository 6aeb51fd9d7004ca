// Copyright 2026 Colin Finck <colin@reactos.org>
// SPDX-License-Identifier: GPL-2.0-or-later

use crate::error::{RegTreeError, Result};
use crate::helpers::{join_path, PATH_SEPARATOR};
use crate::key_value::{decode_value, Value, ValueType};
use crate::open_key::OpenKey;
use crate::permission::Permission;
use crate::provider::RegistryProvider;
use crate::subkeys_list::SubkeyEnumerator;
use crate::tree::{ChildEntry, Tree, ValueMap};
use core::fmt;
use tracing::debug;

/// A single key of a registry, addressed by a root reference and a path relative to it.
///
/// A `RegKey` is only a description of how to open the key until [`RegKey::open`] is called
/// or it has been handed out by [`RegKey::materialize`] as part of a [`ChildEntry`].
/// It owns the [`Tree`] of its materialized subkeys.
pub struct RegKey<'p, P: RegistryProvider> {
    provider: &'p P,
    root: P::Handle,
    path: String,
    permission: Permission,
    open_key: Option<OpenKey<'p, P>>,
    subkeys: Tree<'p, P>,
}

impl<'p, P> RegKey<'p, P>
where
    P: RegistryProvider,
{
    /// Creates an unopened key at `path` relative to `root`.
    ///
    /// `root` is not owned by the key and is never closed by it.
    /// `permission` is used whenever this key or one of its subkeys is opened.
    pub fn new(
        provider: &'p P,
        root: P::Handle,
        path: impl Into<String>,
        permission: Permission,
    ) -> Self {
        Self {
            provider,
            root,
            path: path.into(),
            permission,
            open_key: None,
            subkeys: Tree::new(),
        }
    }

    pub fn provider(&self) -> &'p P {
        self.provider
    }

    /// Returns the root reference `path` is relative to.
    pub fn root(&self) -> &P::Handle {
        &self.root
    }

    /// Returns the path of this key relative to [`RegKey::root`].
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the last component of [`RegKey::path`].
    pub fn name(&self) -> &str {
        let path = self.path.trim_end_matches(PATH_SEPARATOR);

        match path.rfind(PATH_SEPARATOR) {
            Some(index) => &path[index + 1..],
            None => path,
        }
    }

    pub fn permission(&self) -> Permission {
        self.permission
    }

    pub fn is_open(&self) -> bool {
        self.open_key.is_some()
    }

    /// Returns the provider handle if this key is open.
    pub fn handle(&self) -> Option<&P::Handle> {
        self.open_key.as_deref()
    }

    /// Returns the subkeys materialized by the last call to [`RegKey::materialize`].
    pub fn subkeys(&self) -> &Tree<'p, P> {
        &self.subkeys
    }

    pub fn subkeys_mut(&mut self) -> &mut Tree<'p, P> {
        &mut self.subkeys
    }

    /// Opens this key with its permission.
    ///
    /// Does nothing if the key is already open.
    pub fn open(&mut self) -> Result<()> {
        if self.open_key.is_none() {
            let open_key = OpenKey::open(self.provider, &self.root, &self.path, self.permission)?;
            self.open_key = Some(open_key);
        }

        Ok(())
    }

    /// Closes the handle of this key, if it is open.
    ///
    /// The handles of materialized subkeys are not affected.
    pub fn close(&mut self) -> Result<()> {
        match self.open_key.take() {
            Some(open_key) => open_key.close(),
            None => Ok(()),
        }
    }

    /// Returns a [`SubkeyEnumerator`] to list the names of the immediate subkeys.
    pub fn subkey_names(&self) -> SubkeyEnumerator<'_, 'p, P> {
        SubkeyEnumerator::new(self)
    }

    /// Returns the names of the immediate subkeys in store order,
    /// but not more than `limit` names if a limit is given.
    pub fn enumerate_subkeys(&self, limit: Option<usize>) -> Result<Vec<String>> {
        let enumerator = self.subkey_names();

        match limit {
            Some(limit) => enumerator.limit(limit).names(),
            None => enumerator.names(),
        }
    }

    /// Enumerates all subkeys, opens each of them with the permission of this key,
    /// and decodes all their values.
    ///
    /// The previous [`Tree`] of this key is replaced entirely.
    /// Values with an empty name are decoded, but not stored.
    ///
    /// The first error aborts the operation. Subkeys processed before the failing one remain
    /// in the [`Tree`], so the tree must be considered partially updated after an error.
    /// An access-denied error names the full path of the subkey that could not be opened.
    pub fn materialize(&mut self) -> Result<&Tree<'p, P>> {
        let names = self.enumerate_subkeys(None)?;
        debug!(path = %self.path, subkeys = names.len(), "materializing subkeys");

        self.subkeys.clear();

        for name in names {
            let path = join_path(&self.path, &name);

            let open_key = OpenKey::open(self.provider, &self.root, &path, self.permission)
                .map_err(|e| match e {
                    RegTreeError::AccessDenied { .. } => RegTreeError::AccessDenied {
                        path: path.clone(),
                    },
                    RegTreeError::Provider { reason } => RegTreeError::Open {
                        path: path.clone(),
                        reason,
                    },
                    e => e,
                })?;

            let values = read_values(self.provider, &*open_key)?;
            debug!(path = %path, values = values.len(), "materialized subkey");

            let key = RegKey {
                provider: self.provider,
                root: self.root.clone(),
                path,
                permission: self.permission,
                open_key: Some(open_key),
                subkeys: Tree::new(),
            };
            self.subkeys.insert(name, ChildEntry::new(key, values));
        }

        Ok(&self.subkeys)
    }

    /// Reads and decodes the value `name` of this key.
    pub fn value(&self, name: &str) -> Result<Value> {
        decode_value(self.provider, self.open_handle()?, name)
    }

    /// Reads and decodes all named values of this key.
    pub fn values(&self) -> Result<ValueMap> {
        read_values(self.provider, self.open_handle()?)
    }

    /// Creates the subkey `name` and materializes the subkeys again afterwards.
    ///
    /// Fails with [`RegTreeError::AlreadyExists`] if the subkey already exists.
    pub fn create_subkey(&mut self, name: &str) -> Result<()> {
        let (handle, already_existed) =
            self.provider
                .create_child_node(self.open_handle()?, name, self.permission)?;
        OpenKey::from_handle(self.provider, handle, self.permission).close()?;

        if already_existed {
            return Err(RegTreeError::AlreadyExists {
                path: join_path(&self.path, name),
            });
        }

        self.materialize()?;
        Ok(())
    }

    /// Writes `value` as data of type `value_type` and materializes the subkeys again afterwards.
    ///
    /// The type of `value` is checked before anything is written.
    pub fn set_value(&mut self, name: &str, value: &Value, value_type: ValueType) -> Result<()> {
        self.provider
            .write_value(self.open_handle()?, name, value, value_type)?;
        self.materialize()?;
        Ok(())
    }

    fn open_handle(&self) -> Result<&P::Handle> {
        self.handle().ok_or_else(|| RegTreeError::NotOpen {
            path: self.path.clone(),
        })
    }
}

impl<'p, P> fmt::Debug for RegKey<'p, P>
where
    P: RegistryProvider,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegKey")
            .field("root", &self.root)
            .field("path", &self.path)
            .field("permission", &self.permission)
            .field("open_key", &self.open_key)
            .field("subkeys", &self.subkeys)
            .finish()
    }
}

/// Decodes every value of `handle`.
/// A decoding error of any value aborts, even if that value would not be stored.
fn read_values<P>(provider: &P, handle: &P::Handle) -> Result<ValueMap>
where
    P: RegistryProvider,
{
    let mut values = ValueMap::new();

    for name in provider.list_value_names(handle)? {
        let value = decode_value(provider, handle, &name)?;

        if !name.is_empty() {
            values.insert(name, value);
        }
    }

    Ok(values)
}
