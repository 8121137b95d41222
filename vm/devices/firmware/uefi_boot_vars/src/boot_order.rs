// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Code to parse `BootOrder` and the other `UINT16` boot manager variables.

use crate::Error;
use uefi_specs::uefi::nvram::BOOT_OPTION_PREFIX;

/// Decodes `BootOrder`: little-endian `u16` option numbers, highest priority
/// first.
pub fn parse_boot_order(data: &[u8]) -> Result<Vec<u16>, Error> {
    let boot_order_iter = data.chunks_exact(2);
    if !boot_order_iter.remainder().is_empty() {
        return Err(Error::MalformedBootOrder { len: data.len() });
    }
    Ok(boot_order_iter
        .map(|x| u16::from_le_bytes([x[0], x[1]]))
        .collect())
}

/// Encodes option numbers in `BootOrder` format.
pub fn encode_boot_order(ids: &[u16]) -> Vec<u8> {
    ids.iter().flat_map(|id| id.to_le_bytes()).collect()
}

/// Decodes a single-`u16` variable such as `BootCurrent` or `BootNext`.
pub fn parse_u16_variable(data: &[u8]) -> Result<u16, Error> {
    let bytes: [u8; 2] = data.try_into().map_err(|_| Error::InvalidLength {
        offset: 0,
        declared: size_of::<u16>(),
        consumed: data.len(),
    })?;
    Ok(u16::from_le_bytes(bytes))
}

/// Name of the load option variable for `id`, e.g. `Boot000A`.
pub fn boot_option_name(id: u16) -> String {
    format!("{BOOT_OPTION_PREFIX}{id:04X}")
}

/// Parses a `Boot####` variable name back into its option number.
///
/// Exactly four hex digits must follow the prefix. UEFI mandates uppercase,
/// but lowercase is accepted since some tools write it.
pub fn parse_boot_option_name(name: &str) -> Option<u16> {
    let digits = name.strip_prefix(BOOT_OPTION_PREFIX)?;
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u16::from_str_radix(digits, 16).ok()
}
