// Copyright 2026 Colin Finck <colin@reactos.org>
// SPDX-License-Identifier: GPL-2.0-or-later

use crate::error::Result;
use crate::permission::Permission;
use crate::provider::RegistryProvider;
use core::fmt;
use core::ops::Deref;
use tracing::warn;

/// An open provider handle that is closed when this guard goes out of scope.
///
/// Use [`OpenKey::close`] to learn about errors while closing.
pub struct OpenKey<'p, P: RegistryProvider> {
    provider: &'p P,
    handle: Option<P::Handle>,
    permission: Permission,
}

impl<'p, P> OpenKey<'p, P>
where
    P: RegistryProvider,
{
    /// Opens `path` relative to `root` with the given `permission`.
    pub fn open(
        provider: &'p P,
        root: &P::Handle,
        path: &str,
        permission: Permission,
    ) -> Result<Self> {
        let handle = provider.open_node(root, path, permission)?;
        Ok(Self::from_handle(provider, handle, permission))
    }

    /// Takes ownership of an already opened `handle`.
    pub fn from_handle(provider: &'p P, handle: P::Handle, permission: Permission) -> Self {
        Self {
            provider,
            handle: Some(handle),
            permission,
        }
    }

    /// Returns the permission this handle has been opened with.
    pub fn permission(&self) -> Permission {
        self.permission
    }

    /// Closes the handle and reports any error.
    pub fn close(mut self) -> Result<()> {
        match self.handle.take() {
            Some(handle) => self.provider.close_node(handle),
            None => Ok(()),
        }
    }
}

impl<'p, P> Deref for OpenKey<'p, P>
where
    P: RegistryProvider,
{
    type Target = P::Handle;

    fn deref(&self) -> &Self::Target {
        match &self.handle {
            Some(handle) => handle,
            // The handle is only taken by `close` and `drop`, which both consume the guard.
            None => unreachable!(),
        }
    }
}

impl<'p, P> Drop for OpenKey<'p, P>
where
    P: RegistryProvider,
{
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(e) = self.provider.close_node(handle) {
                warn!(error = %e, "closing a registry handle failed");
            }
        }
    }
}

impl<'p, P> fmt::Debug for OpenKey<'p, P>
where
    P: RegistryProvider,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenKey")
            .field("handle", &self.handle)
            .field("permission", &self.permission)
            .finish()
    }
}
