// Copyright 2026 Colin Finck <colin@reactos.org>
// SPDX-License-Identifier: GPL-2.0-or-later

use crate::error::{RegTreeError, Result};
use crate::helpers::{join_path, path_components};
use crate::key_value::{RawValue, Value, ValueType};
use crate::permission::Permission;
use crate::provider::RegistryProvider;
use crate::string::{
    cmp_names, expand_environment_strings, names_equal, process_environment_variable,
};
use core::cell::{Cell, RefCell};
use core::cmp::Ordering;
use core::fmt;
use enumn::N;
use std::collections::BTreeMap;

/// Predefined root keys of a registry.
///
/// The discriminants are the handle values Windows uses for the `HKEY_*` constants.
#[derive(Clone, Copy, Debug, Eq, Hash, N, Ord, PartialEq, PartialOrd)]
#[repr(u32)]
pub enum RootKey {
    ClassesRoot = 0x8000_0000,
    CurrentUser = 0x8000_0001,
    LocalMachine = 0x8000_0002,
    Users = 0x8000_0003,
    CurrentConfig = 0x8000_0005,
}

impl RootKey {
    const ALL: [RootKey; 5] = [
        Self::ClassesRoot,
        Self::CurrentUser,
        Self::LocalMachine,
        Self::Users,
        Self::CurrentConfig,
    ];

    /// Returns the well-known name of this root key, e.g. `HKEY_LOCAL_MACHINE`.
    pub fn name(self) -> &'static str {
        match self {
            Self::ClassesRoot => "HKEY_CLASSES_ROOT",
            Self::CurrentUser => "HKEY_CURRENT_USER",
            Self::LocalMachine => "HKEY_LOCAL_MACHINE",
            Self::Users => "HKEY_USERS",
            Self::CurrentConfig => "HKEY_CURRENT_CONFIG",
        }
    }
}

/// Handle of a [`MemoryRegistry`] key.
///
/// Predefined root keys have the values of [`RootKey`], and are valid without being opened.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct MemoryHandle(u32);

impl MemoryHandle {
    /// Returns the raw handle value.
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Returns the predefined root key this handle refers to, if any.
    pub fn root_key(self) -> Option<RootKey> {
        RootKey::n(self.0)
    }
}

impl From<RootKey> for MemoryHandle {
    fn from(root_key: RootKey) -> Self {
        Self(root_key as u32)
    }
}

impl fmt::Debug for MemoryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.root_key() {
            Some(root_key) => write!(f, "MemoryHandle({})", root_key.name()),
            None => write!(f, "MemoryHandle({:#010x})", self.0),
        }
    }
}

struct MemoryNode {
    name: String,
    subkeys: Vec<usize>,
    values: Vec<RawValue>,
    denied: Permission,
    fail_enumeration: bool,
}

impl MemoryNode {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            subkeys: Vec::new(),
            values: Vec::new(),
            denied: Permission::empty(),
            fail_enumeration: false,
        }
    }
}

struct OpenHandle {
    node: usize,
    path: String,
    permission: Permission,
}

/// A resolved handle: the node it refers to, the path used in error messages, and the
/// permission it has been opened with.
struct HandleInfo {
    node: usize,
    path: String,
    permission: Permission,
}

struct MemoryStore {
    nodes: Vec<MemoryNode>,
    roots: Vec<(RootKey, usize)>,
    handles: BTreeMap<u32, OpenHandle>,
    next_handle: u32,
    /// Upper-cased variable names. `None` marks a variable that cannot be resolved.
    environment: BTreeMap<String, Option<String>>,
}

impl MemoryStore {
    fn new() -> Self {
        let mut store = Self {
            nodes: Vec::new(),
            roots: Vec::new(),
            handles: BTreeMap::new(),
            next_handle: 1,
            environment: BTreeMap::new(),
        };

        for root_key in RootKey::ALL.iter() {
            let index = store.nodes.len();
            store.nodes.push(MemoryNode::new(root_key.name()));
            store.roots.push((*root_key, index));
        }

        store
    }

    fn root_node(&self, root_key: RootKey) -> usize {
        self.roots
            .iter()
            .find(|(key, _)| *key == root_key)
            .map(|(_, index)| *index)
            .unwrap_or_default()
    }

    fn handle_info(&self, handle: &MemoryHandle) -> Result<HandleInfo> {
        if let Some(root_key) = handle.root_key() {
            return Ok(HandleInfo {
                node: self.root_node(root_key),
                path: String::new(),
                permission: Permission::ALL_ACCESS,
            });
        }

        let open_handle =
            self.handles
                .get(&handle.0)
                .ok_or_else(|| RegTreeError::InvalidHandle {
                    handle: format!("{:?}", handle),
                })?;

        Ok(HandleInfo {
            node: open_handle.node,
            path: open_handle.path.clone(),
            permission: open_handle.permission,
        })
    }

    fn find_subkey(&self, parent: usize, name: &str) -> Option<usize> {
        self.nodes[parent]
            .subkeys
            .iter()
            .copied()
            .find(|&subkey| names_equal(&self.nodes[subkey].name, name))
    }

    fn resolve(&self, node: usize, path: &str) -> Option<usize> {
        path_components(path).try_fold(node, |node, component| self.find_subkey(node, component))
    }

    fn add_subkey(&mut self, parent: usize, name: &str) -> usize {
        let index = self.nodes.len();
        self.nodes.push(MemoryNode::new(name));

        // Keep the subkeys sorted the way the registry enumerates them.
        let nodes = &self.nodes;
        let position = nodes[parent]
            .subkeys
            .partition_point(|&subkey| cmp_names(&nodes[subkey].name, name) == Ordering::Less);
        self.nodes[parent].subkeys.insert(position, index);

        index
    }

    fn ensure_path(&mut self, node: usize, path: &str) -> usize {
        let mut node = node;

        for component in path_components(path) {
            node = match self.find_subkey(node, component) {
                Some(subkey) => subkey,
                None => self.add_subkey(node, component),
            };
        }

        node
    }

    fn insert_handle(&mut self, node: usize, path: String, permission: Permission) -> MemoryHandle {
        let raw = self.next_handle;
        self.next_handle += 1;
        self.handles.insert(
            raw,
            OpenHandle {
                node,
                path,
                permission,
            },
        );

        MemoryHandle(raw)
    }

    fn set_value(&mut self, node: usize, value: RawValue) {
        let values = &mut self.nodes[node].values;

        match values
            .iter_mut()
            .find(|existing| names_equal(existing.name(), value.name()))
        {
            Some(existing) => *existing = value,
            None => values.push(value),
        }
    }
}

fn require(info: &HandleInfo, permission: Permission) -> Result<()> {
    if info.permission.contains(permission) {
        Ok(())
    } else {
        Err(RegTreeError::AccessDenied {
            path: info.path.clone(),
        })
    }
}

/// A registry held entirely in memory.
///
/// It behaves like the Windows registry in the aspects relevant to this crate:
///
/// * The five predefined root keys exist and never need to be opened or closed.
/// * Key and value names are case-insensitive.
/// * Subkeys are enumerated in case-insensitive alphabetical order, values in insertion order.
/// * Every handle remembers the permission it has been opened with and operations
///   requiring other access rights fail with [`RegTreeError::AccessDenied`].
///
/// The registry is meant for single-threaded use and therefore not `Sync`.
pub struct MemoryRegistry {
    store: RefCell<MemoryStore>,
    calls: Cell<usize>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self {
            store: RefCell::new(MemoryStore::new()),
            calls: Cell::new(0),
        }
    }

    /// Creates the key at `path` below `root_key` including all missing parent keys.
    pub fn create_key(&self, root_key: RootKey, path: &str) -> Result<()> {
        let mut store = self.store.borrow_mut();
        let root = store.root_node(root_key);
        store.ensure_path(root, path);
        Ok(())
    }

    /// Encodes `value` as `value_type` and stores it in the key at `path`, creating the key
    /// if necessary.
    pub fn insert_value(
        &self,
        root_key: RootKey,
        path: &str,
        name: &str,
        value: &Value,
        value_type: ValueType,
    ) -> Result<()> {
        let raw = RawValue::encode(name, value, value_type)?;
        self.insert_raw_value(root_key, path, raw)
    }

    /// Stores `value` unchecked in the key at `path`, creating the key if necessary.
    ///
    /// This allows storing data that cannot be decoded.
    pub fn insert_raw_value(&self, root_key: RootKey, path: &str, value: RawValue) -> Result<()> {
        let mut store = self.store.borrow_mut();
        let root = store.root_node(root_key);
        let node = store.ensure_path(root, path);
        store.set_value(node, value);
        Ok(())
    }

    /// Refuses every future open of the key at `path` that requests any of the `denied` rights.
    pub fn deny_access(&self, root_key: RootKey, path: &str, denied: Permission) -> Result<()> {
        let mut store = self.store.borrow_mut();
        let node = self.existing_node(&store, root_key, path)?;
        store.nodes[node].denied |= denied;
        Ok(())
    }

    /// Makes every future enumeration of the subkeys of `path` fail.
    pub fn fail_enumeration(&self, root_key: RootKey, path: &str) -> Result<()> {
        let mut store = self.store.borrow_mut();
        let node = self.existing_node(&store, root_key, path)?;
        store.nodes[node].fail_enumeration = true;
        Ok(())
    }

    /// Sets an environment variable used when expanding `REG_EXPAND_SZ` data.
    ///
    /// Variables not set here are taken from the process environment.
    pub fn set_environment_variable(&self, name: &str, value: &str) {
        self.store
            .borrow_mut()
            .environment
            .insert(name.to_uppercase(), Some(value.to_string()));
    }

    /// Makes expanding the variable `name` fail.
    pub fn mark_unresolvable(&self, name: &str) {
        self.store
            .borrow_mut()
            .environment
            .insert(name.to_uppercase(), None);
    }

    /// Returns the number of currently open (non-predefined) handles.
    pub fn open_handle_count(&self) -> usize {
        self.store.borrow().handles.len()
    }

    /// Returns the number of [`RegistryProvider`] calls made so far.
    pub fn provider_calls(&self) -> usize {
        self.calls.get()
    }

    fn existing_node(&self, store: &MemoryStore, root_key: RootKey, path: &str) -> Result<usize> {
        store
            .resolve(store.root_node(root_key), path)
            .ok_or_else(|| RegTreeError::NotFound {
                path: path.to_string(),
            })
    }

    fn count_call(&self) {
        self.calls.set(self.calls.get() + 1);
    }
}

impl Default for MemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryProvider for MemoryRegistry {
    type Handle = MemoryHandle;

    fn open_node(
        &self,
        root: &MemoryHandle,
        path: &str,
        permission: Permission,
    ) -> Result<MemoryHandle> {
        self.count_call();
        let mut store = self.store.borrow_mut();
        let info = store.handle_info(root)?;
        let full_path = join_path(&info.path, path.trim_matches('\\'));

        let node = store
            .resolve(info.node, path)
            .ok_or_else(|| RegTreeError::NotFound {
                path: full_path.clone(),
            })?;

        if store.nodes[node].denied.intersects(permission) {
            return Err(RegTreeError::AccessDenied { path: full_path });
        }

        Ok(store.insert_handle(node, full_path, permission))
    }

    fn list_child_names(&self, handle: &MemoryHandle, limit: Option<usize>) -> Result<Vec<String>> {
        self.count_call();
        let store = self.store.borrow();
        let info = store.handle_info(handle)?;
        require(&info, Permission::ENUMERATE_SUB_KEYS)?;

        let node = &store.nodes[info.node];
        if node.fail_enumeration {
            return Err(RegTreeError::Enumeration {
                path: info.path,
                reason: "the subkeys list is corrupted".to_string(),
            });
        }

        let limit = limit.unwrap_or(usize::MAX);
        let names = node
            .subkeys
            .iter()
            .take(limit)
            .map(|&subkey| store.nodes[subkey].name.clone())
            .collect();

        Ok(names)
    }

    fn list_value_names(&self, handle: &MemoryHandle) -> Result<Vec<String>> {
        self.count_call();
        let store = self.store.borrow();
        let info = store.handle_info(handle)?;
        require(&info, Permission::QUERY_VALUE)?;

        let names = store.nodes[info.node]
            .values
            .iter()
            .map(|value| value.name().to_string())
            .collect();

        Ok(names)
    }

    fn read_raw_value(&self, handle: &MemoryHandle, name: &str) -> Result<RawValue> {
        self.count_call();
        let store = self.store.borrow();
        let info = store.handle_info(handle)?;
        require(&info, Permission::QUERY_VALUE)?;

        store.nodes[info.node]
            .values
            .iter()
            .find(|value| names_equal(value.name(), name))
            .cloned()
            .ok_or_else(|| RegTreeError::NotFound {
                path: join_path(&info.path, name),
            })
    }

    fn write_raw_value(&self, handle: &MemoryHandle, value: &RawValue) -> Result<()> {
        self.count_call();
        let mut store = self.store.borrow_mut();
        let info = store.handle_info(handle)?;
        require(&info, Permission::SET_VALUE)?;

        store.set_value(info.node, value.clone());
        Ok(())
    }

    fn create_child_node(
        &self,
        handle: &MemoryHandle,
        name: &str,
        permission: Permission,
    ) -> Result<(MemoryHandle, bool)> {
        self.count_call();
        if path_components(name).next().is_none() {
            return Err(RegTreeError::InvalidArgument {
                reason: "the name of a new key must not be empty",
            });
        }

        let mut store = self.store.borrow_mut();
        let info = store.handle_info(handle)?;
        require(&info, Permission::CREATE_SUB_KEY)?;
        let full_path = join_path(&info.path, name.trim_matches('\\'));

        let (node, already_existed) = match store.resolve(info.node, name) {
            Some(node) => (node, true),
            None => (store.ensure_path(info.node, name), false),
        };

        if store.nodes[node].denied.intersects(permission) {
            return Err(RegTreeError::AccessDenied { path: full_path });
        }

        let handle = store.insert_handle(node, full_path, permission);
        Ok((handle, already_existed))
    }

    fn close_node(&self, handle: MemoryHandle) -> Result<()> {
        self.count_call();

        // Closing a predefined key is a no-op.
        if handle.root_key().is_some() {
            return Ok(());
        }

        match self.store.borrow_mut().handles.remove(&handle.0) {
            Some(_) => Ok(()),
            None => Err(RegTreeError::InvalidHandle {
                handle: format!("{:?}", handle),
            }),
        }
    }

    fn expand_string(&self, text: &str) -> Result<String> {
        let store = self.store.borrow();

        expand_environment_strings(text, |name| match store.environment.get(&name.to_uppercase()) {
            Some(Some(value)) => Ok(Some(value.clone())),
            Some(None) => Err(RegTreeError::UnresolvableVariable {
                variable: name.to_string(),
            }),
            None => process_environment_variable(name),
        })
    }
}
