// Copyright 2026 Colin Finck <colin@reactos.org>
// SPDX-License-Identifier: GPL-2.0-or-later

use crate::error::{RegTreeError, Result};
use crate::provider::RegistryProvider;
use crate::reg_key::RegKey;
use crate::tree::Tree;
use tracing::debug;

type Visitor<'a, 'p, P> = Box<dyn FnMut(&RegKey<'p, P>) -> Result<()> + 'a>;

/// Depth-first, pre-order traversal of a materialized [`Tree`].
///
/// Every subkey is re-opened as a fresh [`RegKey`], optionally materialized, handed to the
/// visitor, and then descended into. Without [`Walk::repopulate`], the re-opened keys have no
/// materialized subkeys, so only the given tree level is visited.
///
/// ```ignore
/// Walk::new(key.subkeys())
///     .repopulate(true)
///     .visitor(|key| {
///         println!("{}", key.path());
///         Ok(())
///     })
///     .run()?;
/// ```
pub struct Walk<'a, 'p, P: RegistryProvider> {
    tree: &'a Tree<'p, P>,
    repopulate: bool,
    visitor: Option<Visitor<'a, 'p, P>>,
}

impl<'a, 'p, P> Walk<'a, 'p, P>
where
    P: RegistryProvider,
{
    pub fn new(tree: &'a Tree<'p, P>) -> Self {
        Self {
            tree,
            repopulate: false,
            visitor: None,
        }
    }

    /// Materializes every re-opened subkey before visiting it.
    pub fn repopulate(mut self, repopulate: bool) -> Self {
        self.repopulate = repopulate;
        self
    }

    pub fn visitor<F>(mut self, visitor: F) -> Self
    where
        F: FnMut(&RegKey<'p, P>) -> Result<()> + 'a,
    {
        self.visitor = Some(Box::new(visitor));
        self
    }

    /// Performs the walk.
    ///
    /// Fails with [`RegTreeError::InvalidArgument`] if no visitor has been set, before any
    /// subkey is touched. Otherwise, the first error of re-opening, materializing, or the
    /// visitor aborts the walk.
    pub fn run(self) -> Result<()> {
        let mut visitor = self.visitor.ok_or(RegTreeError::InvalidArgument {
            reason: "a walk needs a visitor",
        })?;

        walk_tree(self.tree, self.repopulate, &mut *visitor)
    }
}

/// Walks `tree` like [`Walk`] does with the given settings.
pub fn walk<'p, P, F>(tree: &Tree<'p, P>, repopulate: bool, visitor: F) -> Result<()>
where
    P: RegistryProvider,
    F: FnMut(&RegKey<'p, P>) -> Result<()>,
{
    let mut visitor = visitor;
    walk_tree(tree, repopulate, &mut visitor)
}

fn walk_tree<'p, P>(
    tree: &Tree<'p, P>,
    repopulate: bool,
    visitor: &mut dyn FnMut(&RegKey<'p, P>) -> Result<()>,
) -> Result<()>
where
    P: RegistryProvider,
{
    for (_, entry) in tree {
        let key = entry.reopen(repopulate)?;
        debug!(path = key.path(), "visiting key");

        visitor(&key)?;
        walk_tree(key.subkeys(), repopulate, visitor)?;
    }

    Ok(())
}
