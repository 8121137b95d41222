// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Globally defined variables relevant to boot manager configuration.

use guid::Guid;

/// UEFI spec 3.3 - Globally Defined Variables
///
/// Vendor namespace of `BootOrder`, `Boot####`, `BootCurrent` and friends.
pub const EFI_GLOBAL_VARIABLE: Guid = Guid::from_static_str("8be4df61-93ca-11d2-aa0d-00e098032b8c");

/// UEFI spec 3.3 - `BootOrder`: ordered list of `Boot####` options (`UINT16[]`).
pub const BOOT_ORDER: &str = "BootOrder";
/// UEFI spec 3.3 - `BootCurrent`: option selected for the current boot (`UINT16`).
pub const BOOT_CURRENT: &str = "BootCurrent";
/// UEFI spec 3.3 - `BootNext`: option to use for the next boot only (`UINT16`).
pub const BOOT_NEXT: &str = "BootNext";
/// UEFI spec 3.1.1 - prefix of a `Boot####` load option variable.
pub const BOOT_OPTION_PREFIX: &str = "Boot";
