// Copyright 2026 Colin Finck <colin@reactos.org>
// SPDX-License-Identifier: GPL-2.0-or-later

use bitflags::bitflags;

bitflags! {
    /// Access rights requested when opening a key.
    ///
    /// The bit values match the `KEY_*` access masks of the Windows registry API,
    /// so they can be handed to a native provider unchanged.
    #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
    pub struct Permission: u32 {
        /// Read the values of a key.
        const QUERY_VALUE = 0x0000_0001;
        /// Create, overwrite, or delete values of a key.
        const SET_VALUE = 0x0000_0002;
        /// Create subkeys.
        const CREATE_SUB_KEY = 0x0000_0004;
        /// Enumerate the subkeys of a key.
        const ENUMERATE_SUB_KEYS = 0x0000_0008;
        /// Request change notifications.
        const NOTIFY = 0x0000_0010;
        /// Create a symbolic link.
        const CREATE_LINK = 0x0000_0020;
        /// `STANDARD_RIGHTS_READ`, part of every composite mask below.
        const STANDARD_READ = 0x0002_0000;

        const READ = Self::STANDARD_READ.bits()
            | Self::QUERY_VALUE.bits()
            | Self::ENUMERATE_SUB_KEYS.bits()
            | Self::NOTIFY.bits();
        const WRITE = Self::STANDARD_READ.bits()
            | Self::SET_VALUE.bits()
            | Self::CREATE_SUB_KEY.bits();
        const EXECUTE = Self::READ.bits();
        const ALL_ACCESS = 0x000f_003f;
    }
}
