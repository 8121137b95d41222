// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Decoders for the UEFI boot manager variables: `BootOrder`, the
//! `Boot####` load options, and the device paths embedded in them.
//!
//! Every decoder works on a borrowed byte slice and returns owned values, so
//! results outlive the buffer they were read from. Nothing here touches a
//! real variable store; callers hand in `(name, bytes)` pairs through
//! [`VariableSource`].

#![forbid(unsafe_code)]

pub mod boot_config;
pub mod boot_order;
pub mod cursor;
pub mod device_path;
pub mod load_option;
pub mod variable_source;

pub use boot_config::BootConfiguration;
pub use cursor::ByteCursor;
pub use device_path::DevicePath;
pub use device_path::DevicePathNode;
pub use load_option::LoadOption;
pub use variable_source::RawVariable;
pub use variable_source::VariableSource;

use uefi_specs::uefi::boot::EfiDeviceType;
use uefi_specs::uefi::nvram;

/// Errors that end a single decode call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The buffer ended before a field or record did.
    #[error("input truncated at offset {offset:#x}: needed {needed} bytes, {available} available")]
    TruncatedInput {
        /// Offset of the read that failed.
        offset: usize,
        /// Bytes the read required.
        needed: usize,
        /// Bytes that were left.
        available: usize,
    },
    /// A length field disagrees with the bytes its contents actually occupy.
    #[error("length at offset {offset:#x} declares {declared} bytes, but {consumed} are required")]
    InvalidLength {
        /// Start of the structure carrying the length.
        offset: usize,
        /// Length stated by the structure.
        declared: usize,
        /// Length implied by the structure's contents.
        consumed: usize,
    },
    /// A `BootOrder` payload that is not a whole number of `u16`s.
    #[error("boot order has odd length {len}")]
    MalformedBootOrder {
        /// Length of the payload in bytes.
        len: usize,
    },
    /// A value too large for its length field when encoding.
    #[error("{len} bytes do not fit a 16-bit length field")]
    PayloadTooLarge {
        /// Length that was requested.
        len: usize,
    },
}

/// Non-fatal findings reported next to a successfully decoded value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Warning {
    /// A device path node of a kind this crate does not interpret. It was
    /// kept verbatim as [`DevicePathNode::Unsupported`].
    #[error(
        "unsupported device path node (type {node_type:?}, subtype {node_subtype:#04x}, {length} bytes) at path {path_index} node {node_index}"
    )]
    UnsupportedNode {
        /// Index of the device path within the file path list.
        path_index: usize,
        /// Index of the node within its device path.
        node_index: usize,
        #[expect(missing_docs)]
        node_type: EfiDeviceType,
        #[expect(missing_docs)]
        node_subtype: u8,
        /// Declared length of the node, header included.
        length: u16,
    },
}

/// A decoded value together with the diagnostics gathered while decoding it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded<T> {
    #[expect(missing_docs)]
    pub value: T,
    #[expect(missing_docs)]
    pub warnings: Vec<Warning>,
}

impl<T> Decoded<T> {
    /// Returns `true` if every part of the input was understood.
    pub fn is_fully_understood(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Discards the diagnostics.
    pub fn into_value(self) -> T {
        self.value
    }
}

/// A single boot manager variable, decoded according to its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedVariable {
    #[expect(missing_docs)]
    BootOrder(Vec<u16>),
    /// A `Boot####` load option.
    Boot {
        #[expect(missing_docs)]
        id: u16,
        #[expect(missing_docs)]
        option: Decoded<LoadOption>,
    },
    #[expect(missing_docs)]
    BootCurrent(u16),
    #[expect(missing_docs)]
    BootNext(u16),
    /// Any other variable, left as raw bytes.
    Unknown(Vec<u8>),
}

/// Decodes one variable, choosing the decoder from its name.
pub fn parse_variable(name: &str, data: &[u8]) -> Result<ParsedVariable, Error> {
    Ok(match name {
        nvram::BOOT_ORDER => ParsedVariable::BootOrder(boot_order::parse_boot_order(data)?),
        nvram::BOOT_CURRENT => ParsedVariable::BootCurrent(boot_order::parse_u16_variable(data)?),
        nvram::BOOT_NEXT => ParsedVariable::BootNext(boot_order::parse_u16_variable(data)?),
        _ => match boot_order::parse_boot_option_name(name) {
            Some(id) => ParsedVariable::Boot {
                id,
                option: LoadOption::parse(data)?,
            },
            None => ParsedVariable::Unknown(data.to_vec()),
        },
    })
}

/// Builders for hand-assembled wire bytes shared by the unit tests.
#[cfg(test)]
pub(crate) mod test_util {
    /// Encodes a device path node around `payload`.
    pub fn node(node_type: u8, node_subtype: u8, payload: &[u8]) -> Vec<u8> {
        let mut v = vec![node_type, node_subtype];
        v.extend(((payload.len() + 4) as u16).to_le_bytes());
        v.extend(payload);
        v
    }

    pub fn end_entire() -> Vec<u8> {
        node(0x7f, 0xff, &[])
    }

    pub fn utf16z(s: &str) -> Vec<u8> {
        s.encode_utf16()
            .chain([0])
            .flat_map(|w| w.to_le_bytes())
            .collect()
    }

    /// Hard drive node: partition 1, start 2048, 1048576 sectors, GPT.
    pub fn hard_drive() -> Vec<u8> {
        let mut payload = Vec::new();
        payload.extend(1u32.to_le_bytes());
        payload.extend(2048u64.to_le_bytes());
        payload.extend(1048576u64.to_le_bytes());
        payload.extend([0x5a; 16]);
        payload.push(0x02);
        payload.push(0x02);
        node(0x04, 0x01, &payload)
    }

    /// A complete `EFI_LOAD_OPTION`.
    pub fn load_option(attributes: u32, description: &str, paths: &[u8], opt: &[u8]) -> Vec<u8> {
        let mut v = Vec::new();
        v.extend(attributes.to_le_bytes());
        v.extend((paths.len() as u16).to_le_bytes());
        v.extend(utf16z(description));
        v.extend(paths);
        v.extend(opt);
        v
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use test_util::*;

    #[test]
    fn dispatch_by_name() {
        assert_eq!(
            parse_variable("BootOrder", &[1, 0, 0, 0]).unwrap(),
            ParsedVariable::BootOrder(vec![1, 0])
        );
        assert_eq!(
            parse_variable("BootCurrent", &[3, 0]).unwrap(),
            ParsedVariable::BootCurrent(3)
        );
        assert_eq!(
            parse_variable("BootNext", &[0x0a, 0]).unwrap(),
            ParsedVariable::BootNext(10)
        );
        assert_eq!(
            parse_variable("Timeout", &[5, 0]).unwrap(),
            ParsedVariable::Unknown(vec![5, 0])
        );

        let mut paths = hard_drive();
        paths.extend(end_entire());
        let data = load_option(1, "disk", &paths, &[]);
        match parse_variable("Boot001F", &data).unwrap() {
            ParsedVariable::Boot { id, option } => {
                assert_eq!(id, 0x1f);
                assert_eq!(option.value.description, "disk");
                assert!(option.is_fully_understood());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn dispatch_errors_propagate() {
        assert_eq!(
            parse_variable("BootOrder", &[1, 0, 0]),
            Err(Error::MalformedBootOrder { len: 3 })
        );
        assert!(matches!(
            parse_variable("Boot0000", &[1, 0]),
            Err(Error::TruncatedInput { .. })
        ));
    }
}
