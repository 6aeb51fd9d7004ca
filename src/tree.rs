// Copyright 2026 Colin Finck <colin@reactos.org>
// SPDX-License-Identifier: GPL-2.0-or-later

use crate::error::Result;
use crate::key_value::Value;
use crate::provider::RegistryProvider;
use crate::reg_key::RegKey;
use core::fmt;
use core::ops::Index;
use std::collections::btree_map::{self, BTreeMap};

/// Decoded values of a single key, by name.
pub type ValueMap = BTreeMap<String, Value>;

/// A materialized subkey: how to re-open it, and the values it had when it was materialized.
pub struct ChildEntry<'p, P: RegistryProvider> {
    key: RegKey<'p, P>,
    values: ValueMap,
}

impl<'p, P> ChildEntry<'p, P>
where
    P: RegistryProvider,
{
    pub(crate) fn new(key: RegKey<'p, P>, values: ValueMap) -> Self {
        Self { key, values }
    }

    /// Returns the key of this subkey.
    ///
    /// It holds the handle the subkey has been opened with during materialization, so its
    /// values can be read and written directly.
    pub fn key(&self) -> &RegKey<'p, P> {
        &self.key
    }

    pub fn key_mut(&mut self) -> &mut RegKey<'p, P> {
        &mut self.key
    }

    /// Returns all named values of this subkey.
    pub fn values(&self) -> &ValueMap {
        &self.values
    }

    /// Finds a single value by name.
    ///
    /// The lookup is exact-case, using the names as the provider has listed them.
    /// Use [`RegKey::value`] on [`ChildEntry::key`] for a case-insensitive lookup
    /// through the provider.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Creates a fresh, unopened [`RegKey`] for this subkey and, if `populate` is true,
    /// materializes its own subkeys.
    pub fn reopen(&self, populate: bool) -> Result<RegKey<'p, P>> {
        let mut key = RegKey::new(
            self.key.provider(),
            self.key.root().clone(),
            self.key.path(),
            self.key.permission(),
        );

        if populate {
            key.materialize()?;
        }

        Ok(key)
    }
}

impl<'p, P> fmt::Debug for ChildEntry<'p, P>
where
    P: RegistryProvider,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChildEntry")
            .field("key", &self.key)
            .field("values", &self.values)
            .finish()
    }
}

/// The materialized subkeys of a [`RegKey`], by name.
pub struct Tree<'p, P: RegistryProvider> {
    entries: BTreeMap<String, ChildEntry<'p, P>>,
}

impl<'p, P> Tree<'p, P>
where
    P: RegistryProvider,
{
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Finds a single subkey by its name as enumerated.
    pub fn get(&self, name: &str) -> Option<&ChildEntry<'p, P>> {
        self.entries.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ChildEntry<'p, P>> {
        self.entries.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns an iterator over the subkey names.
    pub fn names(&self) -> btree_map::Keys<'_, String, ChildEntry<'p, P>> {
        self.entries.keys()
    }

    /// Returns an iterator over all subkeys and their names.
    pub fn iter(&self) -> btree_map::Iter<'_, String, ChildEntry<'p, P>> {
        self.entries.iter()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn insert(&mut self, name: String, entry: ChildEntry<'p, P>) {
        self.entries.insert(name, entry);
    }
}

impl<'p, P> Default for Tree<'p, P>
where
    P: RegistryProvider,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<'p, P> Index<&str> for Tree<'p, P>
where
    P: RegistryProvider,
{
    type Output = ChildEntry<'p, P>;

    fn index(&self, name: &str) -> &Self::Output {
        match self.entries.get(name) {
            Some(entry) => entry,
            None => panic!("no subkey named {:?} has been materialized", name),
        }
    }
}

impl<'a, 'p, P> IntoIterator for &'a Tree<'p, P>
where
    P: RegistryProvider,
{
    type Item = (&'a String, &'a ChildEntry<'p, P>);
    type IntoIter = btree_map::Iter<'a, String, ChildEntry<'p, P>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<'p, P> fmt::Debug for Tree<'p, P>
where
    P: RegistryProvider,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}
