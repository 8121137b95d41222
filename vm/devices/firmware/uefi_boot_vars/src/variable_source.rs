// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The seam between the decoders and whatever holds the variables.
//!
//! Reading a real store (efivarfs, a saved NVRAM image, ...) is up to the
//! caller. This module only defines what the decoders need from it:
//! exact-name lookup and enumeration.

use guid::Guid;
use std::collections::BTreeMap;
use thiserror::Error;

/// A variable as handed over by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawVariable {
    #[expect(missing_docs)]
    pub name: String,
    /// Vendor namespace, when the store reports one.
    pub vendor: Option<Guid>,
    /// `EFI_VARIABLE_*` attribute bits, when the store reports them.
    pub attributes: Option<u32>,
    #[expect(missing_docs)]
    pub data: Vec<u8>,
}

/// Errors turning an efivarfs directory entry into a [`RawVariable`].
#[derive(Debug, Error)]
pub enum EfivarfsError {
    /// The file name is not `Name-xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx`.
    #[error("efivarfs file name {0:?} does not end in a vendor GUID")]
    MissingVendor(String),
    /// The GUID part of the file name is malformed.
    #[error("invalid vendor GUID in efivarfs file name")]
    Vendor(#[source] guid::ParseError),
    /// The file is shorter than its attribute prefix.
    #[error("efivarfs file is {0} bytes, too short for the attribute prefix")]
    MissingAttributes(usize),
}

/// Length of a hyphenated GUID string.
const GUID_STR_LEN: usize = 36;

impl RawVariable {
    /// Creates a variable with no vendor or attribute information.
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            vendor: None,
            attributes: None,
            data: data.into(),
        }
    }

    /// Builds a variable from an efivarfs file name and its contents.
    ///
    /// efivarfs names files `Name-VendorGuid` and prefixes the variable data
    /// with the 4-byte little-endian attribute word.
    pub fn from_efivarfs(file_name: &str, contents: &[u8]) -> Result<Self, EfivarfsError> {
        let missing_vendor = || EfivarfsError::MissingVendor(file_name.to_owned());

        let split = file_name
            .len()
            .checked_sub(GUID_STR_LEN + 1)
            .filter(|&i| i > 0)
            .ok_or_else(missing_vendor)?;
        let (name, vendor) = file_name
            .get(..split)
            .zip(file_name.get(split..))
            .and_then(|(name, rest)| Some((name, rest.strip_prefix('-')?)))
            .ok_or_else(missing_vendor)?;
        let vendor: Guid = vendor.parse().map_err(EfivarfsError::Vendor)?;

        let (attributes, data) = contents
            .split_first_chunk::<4>()
            .ok_or(EfivarfsError::MissingAttributes(contents.len()))?;

        Ok(Self {
            name: name.to_owned(),
            vendor: Some(vendor),
            attributes: Some(u32::from_le_bytes(*attributes)),
            data: data.to_vec(),
        })
    }
}

/// Lookup and enumeration of raw variables by name.
pub trait VariableSource {
    /// Returns the data of the variable called `name`, if present.
    fn get(&self, name: &str) -> Option<&[u8]>;

    /// Enumerates the names of all variables.
    fn names(&self) -> Box<dyn Iterator<Item = &str> + '_>;
}

/// Linear search; the first variable with a matching name wins.
impl VariableSource for [RawVariable] {
    fn get(&self, name: &str) -> Option<&[u8]> {
        self.iter()
            .find(|v| v.name == name)
            .map(|v| v.data.as_slice())
    }

    fn names(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        Box::new(self.iter().map(|v| v.name.as_str()))
    }
}

impl VariableSource for Vec<RawVariable> {
    fn get(&self, name: &str) -> Option<&[u8]> {
        // `[T]::get` would shadow the trait method here.
        VariableSource::get(self.as_slice(), name)
    }

    fn names(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        VariableSource::names(self.as_slice())
    }
}

/// Variables held in memory, keyed and enumerated by name.
///
/// Holds one variable per name. Callers reading a store that mixes vendor
/// namespaces should keep only `EFI_GLOBAL_VARIABLE` entries, which is where
/// the boot manager variables live.
#[derive(Debug, Clone, Default)]
pub struct InMemoryVariables {
    vars: BTreeMap<String, RawVariable>,
}

impl InMemoryVariables {
    #[expect(missing_docs)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `var`, returning the variable it replaced, if any.
    pub fn insert(&mut self, var: RawVariable) -> Option<RawVariable> {
        self.vars.insert(var.name.clone(), var)
    }

    #[expect(missing_docs)]
    pub fn remove(&mut self, name: &str) -> Option<RawVariable> {
        self.vars.remove(name)
    }

    #[expect(missing_docs)]
    pub fn iter(&self) -> impl Iterator<Item = &RawVariable> {
        self.vars.values()
    }

    #[expect(missing_docs)]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    #[expect(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl FromIterator<RawVariable> for InMemoryVariables {
    fn from_iter<T: IntoIterator<Item = RawVariable>>(iter: T) -> Self {
        let mut vars = Self::new();
        for var in iter {
            vars.insert(var);
        }
        vars
    }
}

impl VariableSource for InMemoryVariables {
    fn get(&self, name: &str) -> Option<&[u8]> {
        self.vars.get(name).map(|v| v.data.as_slice())
    }

    fn names(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        Box::new(self.vars.keys().map(String::as_str))
    }
}
