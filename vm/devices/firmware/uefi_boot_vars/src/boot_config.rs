// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Joins `BootOrder` to the `Boot####` variables it names.

use crate::boot_order::boot_option_name;
use crate::boot_order::parse_boot_order;
use crate::boot_order::parse_u16_variable;
use crate::Decoded;
use crate::Error;
use crate::LoadOption;
use crate::VariableSource;
use thiserror::Error;
use uefi_specs::uefi::nvram;

/// Why a single boot entry could not be produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    /// `BootOrder` names an option whose variable does not exist.
    #[error("boot option variable {name} not found")]
    VariableNotFound {
        #[expect(missing_docs)]
        name: String,
    },
    /// The variable exists but is not a valid load option.
    #[error("failed to decode boot option variable {name}")]
    Decode {
        #[expect(missing_docs)]
        name: String,
        /// Why the load option failed to decode.
        #[source]
        source: Error,
    },
}

/// Failure to assemble a boot configuration at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The store has no `BootOrder` variable.
    #[error("BootOrder variable not found")]
    BootOrderNotFound,
    /// `BootOrder` exists but is malformed.
    #[error("failed to decode BootOrder")]
    BootOrder(#[source] Error),
}

/// Non-fatal problems with the optional boot manager variables.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigWarning {
    /// `BootCurrent` or `BootNext` exists but could not be decoded. The
    /// corresponding field is left as `None`.
    #[error("malformed {name} variable")]
    MalformedVariable {
        #[expect(missing_docs)]
        name: &'static str,
        /// Why the value failed to decode.
        #[source]
        source: Error,
    },
}

/// One position in the boot order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootEntry {
    /// Option number from `BootOrder`.
    pub id: u16,
    /// Variable name derived from `id`.
    pub name: String,
    /// The decoded option, or why it is unavailable.
    pub option: Result<Decoded<LoadOption>, EntryError>,
}

impl BootEntry {
    /// Returns the load option if it decoded.
    pub fn load_option(&self) -> Option<&LoadOption> {
        self.option.as_ref().ok().map(|decoded| &decoded.value)
    }
}

/// Resolves each id in `order` against `source`.
///
/// The result has one entry per id, in `order` sequence, duplicates
/// included. A missing or undecodable variable only affects its own entry.
pub fn assemble_entries<S: VariableSource + ?Sized>(order: &[u16], source: &S) -> Vec<BootEntry> {
    order
        .iter()
        .map(|&id| {
            let name = boot_option_name(id);
            let option = match source.get(&name) {
                None => Err(EntryError::VariableNotFound { name: name.clone() }),
                Some(data) => LoadOption::parse(data).map_err(|source| EntryError::Decode {
                    name: name.clone(),
                    source,
                }),
            };
            if let Err(err) = &option {
                tracing::warn!(
                    name = name.as_str(),
                    id,
                    error = err as &dyn std::error::Error,
                    "skipping boot entry"
                );
            }
            BootEntry { id, name, option }
        })
        .collect()
}

/// The boot manager's view of the variable store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootConfiguration {
    /// Decoded `BootOrder`.
    pub order: Vec<u16>,
    /// One entry per `order` element, in the same sequence.
    pub entries: Vec<BootEntry>,
    /// Option the firmware booted from, if recorded.
    pub boot_current: Option<u16>,
    /// One-shot override for the next boot, if set.
    pub boot_next: Option<u16>,
    #[expect(missing_docs)]
    pub warnings: Vec<ConfigWarning>,
}

impl BootConfiguration {
    /// Reads `BootOrder`, every option it lists, and the optional
    /// `BootCurrent` and `BootNext` variables from `source`.
    ///
    /// Only a missing or malformed `BootOrder` fails the whole call.
    pub fn from_source<S: VariableSource + ?Sized>(source: &S) -> Result<Self, ConfigError> {
        let order = source
            .get(nvram::BOOT_ORDER)
            .ok_or(ConfigError::BootOrderNotFound)?;
        let order = parse_boot_order(order).map_err(ConfigError::BootOrder)?;
        let entries = assemble_entries(&order, source);

        let mut warnings = Vec::new();
        let mut read_u16 = |name: &'static str| {
            let data = source.get(name)?;
            match parse_u16_variable(data) {
                Ok(v) => Some(v),
                Err(err) => {
                    tracing::warn!(
                        name,
                        error = &err as &dyn std::error::Error,
                        "ignoring malformed variable"
                    );
                    warnings.push(ConfigWarning::MalformedVariable { name, source: err });
                    None
                }
            }
        };
        let boot_current = read_u16(nvram::BOOT_CURRENT);
        let boot_next = read_u16(nvram::BOOT_NEXT);

        Ok(Self {
            order,
            entries,
            boot_current,
            boot_next,
            warnings,
        })
    }

    /// Returns the first entry for option `id`.
    pub fn entry(&self, id: u16) -> Option<&BootEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Decoded options with the active bit set, in boot order.
    pub fn active_entries(&self) -> impl Iterator<Item = (u16, &LoadOption)> {
        self.entries
            .iter()
            .filter_map(|e| Some((e.id, e.load_option()?)))
            .filter(|(_, option)| option.is_active())
    }
}
