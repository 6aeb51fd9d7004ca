// Copyright 2026 Colin Finck <colin@reactos.org>
// SPDX-License-Identifier: GPL-2.0-or-later

use crate::error::{RegTreeError, Result};
use crate::open_key::OpenKey;
use crate::permission::Permission;
use crate::provider::RegistryProvider;
use crate::reg_key::RegKey;
use tracing::debug;

/// Lists the names of the immediate subkeys of a [`RegKey`], returned by [`RegKey::subkey_names`].
///
/// The key is opened separately for enumeration, requesting nothing but
/// [`Permission::ENUMERATE_SUB_KEYS`], so a key configured with a write-only permission
/// can still be enumerated.
pub struct SubkeyEnumerator<'k, 'p, P: RegistryProvider> {
    key: &'k RegKey<'p, P>,
    limit: Option<usize>,
    limit_given_twice: bool,
}

impl<'k, 'p, P> SubkeyEnumerator<'k, 'p, P>
where
    P: RegistryProvider,
{
    pub(crate) fn new(key: &'k RegKey<'p, P>) -> Self {
        Self {
            key,
            limit: None,
            limit_given_twice: false,
        }
    }

    /// Returns at most `limit` names, namely the first ones in store order.
    ///
    /// The limit can only be given once. Giving it again makes [`SubkeyEnumerator::names`] fail
    /// with [`RegTreeError::InvalidArgument`].
    pub fn limit(mut self, limit: usize) -> Self {
        if self.limit.is_some() {
            self.limit_given_twice = true;
        }

        self.limit = Some(limit);
        self
    }

    /// Opens the key for enumeration and returns the subkey names.
    pub fn names(self) -> Result<Vec<String>> {
        if self.limit_given_twice {
            return Err(RegTreeError::InvalidArgument {
                reason: "the subkey limit must not be given more than once",
            });
        }

        let provider = self.key.provider();
        let path = self.key.path();
        let open_key = OpenKey::open(
            provider,
            self.key.root(),
            path,
            Permission::ENUMERATE_SUB_KEYS,
        )?;

        let mut names = provider
            .list_child_names(&*open_key, self.limit)
            .map_err(|e| match e {
                e @ RegTreeError::AccessDenied { .. } | e @ RegTreeError::Enumeration { .. } => e,
                e => RegTreeError::Enumeration {
                    path: path.to_string(),
                    reason: e.to_string(),
                },
            })?;
        open_key.close()?;

        if let Some(limit) = self.limit {
            names.truncate(limit);
        }

        debug!(path, count = names.len(), limit = ?self.limit, "enumerated subkeys");
        Ok(names)
    }
}
