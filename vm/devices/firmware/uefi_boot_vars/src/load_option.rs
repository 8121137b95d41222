// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! `EFI_LOAD_OPTION`, the payload of every `Boot####` variable.

use crate::cursor::ByteCursor;
use crate::device_path;
use crate::device_path::DevicePath;
use crate::Decoded;
use crate::Error;
use crate::Warning;
use uefi_specs::uefi::boot::EfiLoadOption;
pub use uefi_specs::uefi::boot::LoadOptionAttributes;
use zerocopy::IntoBytes;

/// A decoded boot option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOption {
    /// Raw attribute word; bits without a named accessor are kept as-is.
    pub attributes: LoadOptionAttributes,
    #[expect(missing_docs)]
    pub description: String,
    /// The first device path of the file path list, which locates the image
    /// to load.
    pub device_path: DevicePath,
    /// Further device paths packed into the same file path list.
    pub additional_paths: Vec<DevicePath>,
    /// Bytes after the file path list, passed to the image untouched.
    pub optional_data: Vec<u8>,
}

impl LoadOption {
    /// Decodes an `EFI_LOAD_OPTION`.
    ///
    /// The `FilePathListLength` field is a byte count. The device paths must
    /// fill it exactly; nodes of unknown kind are kept and reported as
    /// warnings.
    pub fn parse(data: &[u8]) -> Result<Decoded<LoadOption>, Error> {
        let mut cursor = ByteCursor::new(data);

        let header: EfiLoadOption = cursor.read_struct()?;
        let description = cursor.read_utf16le_cstring()?;

        let path_list_len = header.file_path_list_length.get() as usize;
        let mut path_list = cursor.split(path_list_len)?;
        let mut paths = Vec::new();
        while !path_list.is_empty() {
            let budget = path_list.remaining();
            paths.push(device_path::decode_sequence(&mut path_list, budget)?);
        }

        let mut paths = paths.into_iter();
        let value = LoadOption {
            attributes: header.attributes.get().into(),
            description,
            device_path: paths.next().unwrap_or_default(),
            additional_paths: paths.collect(),
            optional_data: cursor.read_rest().to_vec(),
        };

        let warnings = value
            .paths()
            .enumerate()
            .flat_map(|(path_index, path)| {
                path.iter()
                    .enumerate()
                    .filter(|(_, node)| node.is_unsupported())
                    .map(move |(node_index, node)| Warning::UnsupportedNode {
                        path_index,
                        node_index,
                        node_type: node.node_type(),
                        node_subtype: node.node_subtype(),
                        length: node.declared_length(),
                    })
            })
            .collect();

        Ok(Decoded { value, warnings })
    }

    /// Iterates over every device path in file path list order.
    pub fn paths(&self) -> impl Iterator<Item = &DevicePath> {
        std::iter::once(&self.device_path).chain(&self.additional_paths)
    }

    /// Returns `true` if the firmware may boot this option.
    pub fn is_active(&self) -> bool {
        self.attributes.active()
    }

    /// Serializes the option as an `EFI_LOAD_OPTION`.
    ///
    /// Decoded options re-encode to their original bytes, except that text
    /// that was not valid UTF-16 comes back with U+FFFD in place of each
    /// unpaired surrogate.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut path_list = Vec::new();
        for path in self.paths() {
            path.extend_as_spec_path(&mut path_list)?;
        }
        let file_path_list_length = u16::try_from(path_list.len()).map_err(|_| {
            Error::PayloadTooLarge {
                len: path_list.len(),
            }
        })?;

        let header = EfiLoadOption {
            attributes: u32::from(self.attributes).into(),
            file_path_list_length: file_path_list_length.into(),
        };

        let mut v = Vec::new();
        v.extend(header.as_bytes());
        v.extend(
            self.description
                .encode_utf16()
                .chain([0])
                .flat_map(u16::to_le_bytes),
        );
        v.extend(path_list);
        v.extend(&self.optional_data);
        Ok(v)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::device_path::DevicePathNode;
    use crate::device_path::EndOfPath;
    use crate::test_util::*;
    use uefi_specs::uefi::boot::EfiDeviceType;
    use uefi_specs::uefi::boot::EfiPartitionFormat;
    use uefi_specs::uefi::boot::EfiSignatureType;

    #[test]
    fn linux_entry() {
        let mut paths = hard_drive();
        paths.extend(end_entire());
        let data = load_option(0x0000_0001, "Linux", &paths, &[0xde, 0xad]);

        let decoded = LoadOption::parse(&data).unwrap();
        assert!(decoded.is_fully_understood());
        let option = decoded.value;

        assert_eq!(u32::from(option.attributes), 1);
        assert!(option.is_active());
        assert_eq!(option.description, "Linux");
        assert_eq!(option.device_path.len(), 1);
        assert_eq!(option.device_path.end, Some(EndOfPath::Entire));
        assert!(option.additional_paths.is_empty());
        assert_eq!(option.optional_data, [0xde, 0xad]);

        let DevicePathNode::HardDriveMedia(hd) = &option.device_path[0] else {
            panic!("unexpected {:?}", option.device_path[0]);
        };
        assert_eq!(hd.partition_number, 1);
        assert_eq!(hd.partition_start, 2048);
        assert_eq!(hd.partition_size, 1048576);
        assert_eq!(hd.partition_format, EfiPartitionFormat::GUID);
        assert_eq!(hd.signature_type, EfiSignatureType::GUID);

        assert_eq!(option.to_bytes().unwrap(), data);
    }

    #[test]
    fn path_list_length_is_a_byte_count() {
        // Three nodes; a node-count reading of the field would stop early or
        // run into the optional data.
        let mut paths = hard_drive();
        paths.extend(node(0x04, 0x04, &utf16z("\\EFI\\debian\\shimx64.efi")));
        paths.extend(node(0x01, 0x01, &[0x00, 0x02]));
        paths.extend(end_entire());
        let data = load_option(1, "debian", &paths, b"opt");

        let option = LoadOption::parse(&data).unwrap().value;
        assert_eq!(option.device_path.len(), 3);
        assert_eq!(option.optional_data, b"opt");
        assert_eq!(
            option.device_path.iter().map(|n| n.declared_length() as usize).sum::<usize>() + 4,
            paths.len()
        );
    }

    #[test_with_tracing::test]
    fn unsupported_node_is_reported() {
        let mut paths = node(0x02, 0x01, &[0xd0, 0x41, 0x03, 0x0a, 0, 0, 0, 0]);
        paths.extend(hard_drive());
        paths.extend(end_entire());
        let data = load_option(1, "acpi", &paths, &[]);

        let decoded = LoadOption::parse(&data).unwrap();
        assert!(!decoded.is_fully_understood());
        assert_eq!(
            decoded.warnings,
            [Warning::UnsupportedNode {
                path_index: 0,
                node_index: 0,
                node_type: EfiDeviceType::ACPI,
                node_subtype: 0x01,
                length: 12,
            }]
        );
        assert_eq!(decoded.value.device_path.len(), 2);
        assert!(matches!(
            decoded.value.device_path[1],
            DevicePathNode::HardDriveMedia(_)
        ));
    }

    #[test]
    fn empty_description_and_path_list() {
        let data = load_option(0, "", &[], &[1, 2, 3]);
        let option = LoadOption::parse(&data).unwrap().value;
        assert_eq!(option.description, "");
        assert!(option.device_path.is_empty());
        assert_eq!(option.device_path.end, None);
        assert!(!option.is_active());
        assert_eq!(option.optional_data, [1, 2, 3]);
    }

    #[test]
    fn multiple_device_paths() {
        let mut paths = hard_drive();
        paths.extend(end_entire());
        paths.extend(node(0x04, 0x03, &[0x11; 20]));
        paths.extend(end_entire());
        let data = load_option(1, "initrd", &paths, &[]);

        let decoded = LoadOption::parse(&data).unwrap();
        let option = &decoded.value;
        assert_eq!(option.device_path.len(), 1);
        assert_eq!(option.additional_paths.len(), 1);
        assert!(option.additional_paths[0][0].is_unsupported());
        assert!(matches!(
            decoded.warnings[..],
            [Warning::UnsupportedNode {
                path_index: 1,
                node_index: 0,
                ..
            }]
        ));
        assert_eq!(option.to_bytes().unwrap(), data);
    }

    #[test]
    fn path_list_shorter_than_nodes() {
        let mut paths = hard_drive();
        paths.extend(end_entire());
        let mut data = load_option(1, "x", &paths, &[]);
        // Claim 44 bytes instead of 46: the End node now straddles the
        // boundary.
        data[4] = 44;

        // 6 header bytes + "x\0" as UTF-16.
        let paths_start = 10;
        assert_eq!(
            LoadOption::parse(&data),
            Err(Error::InvalidLength {
                offset: paths_start,
                declared: 44,
                consumed: 46
            })
        );
    }

    #[test]
    fn path_list_longer_than_buffer() {
        let mut paths = hard_drive();
        paths.extend(end_entire());
        let mut data = load_option(1, "x", &paths, &[]);
        data[4] = 50;
        assert!(matches!(
            LoadOption::parse(&data),
            Err(Error::TruncatedInput { offset: 10, .. })
        ));
    }

    #[test]
    fn truncated_fields() {
        assert!(matches!(
            LoadOption::parse(&[1, 0, 0, 0, 0]),
            Err(Error::TruncatedInput { offset: 0, .. })
        ));
        // Header present, description never terminated.
        assert!(matches!(
            LoadOption::parse(&[1, 0, 0, 0, 0, 0, b'a', 0]),
            Err(Error::TruncatedInput { offset: 6, .. })
        ));
    }

    #[test]
    fn unpaired_surrogates_are_replaced() {
        let mut paths = node(0x04, 0x04, &[0x00, 0xdc, b'a', 0x00, 0x00, 0x00]);
        paths.extend(end_entire());
        let mut data = Vec::new();
        data.extend(1u32.to_le_bytes());
        data.extend((paths.len() as u16).to_le_bytes());
        data.extend([0x00, 0xd8, 0x00, 0x00]);
        data.extend(&paths);

        let option = LoadOption::parse(&data).unwrap().value;
        assert_eq!(option.description, "\u{fffd}");
        assert_eq!(
            option.device_path[0],
            DevicePathNode::FilePath {
                path: "\u{fffd}a".into()
            }
        );

        // Same shape, replacement character in place of each surrogate.
        let mut expected = data.clone();
        expected[6..8].copy_from_slice(&[0xfd, 0xff]);
        expected[14..16].copy_from_slice(&[0xfd, 0xff]);
        assert_eq!(option.to_bytes().unwrap(), expected);
    }

    #[test]
    fn attributes_are_preserved_opaquely() {
        let data = load_option(0xffff_fff6, "odd", &[], &[]);
        let option = LoadOption::parse(&data).unwrap().value;
        assert!(!option.is_active());
        assert!(option.attributes.force_reconnect());
        assert!(!option.attributes.hidden());
        assert_eq!(option.attributes.category(), 0x1f);
        assert_eq!(u32::from(option.attributes), 0xffff_fff6);
        assert_eq!(option.to_bytes().unwrap(), data);

        let boot = LoadOptionAttributes::new().with_active(true);
        assert_eq!(boot.category(), LoadOptionAttributes::CATEGORY_BOOT);

        let app = LoadOptionAttributes::new()
            .with_active(true)
            .with_category(LoadOptionAttributes::CATEGORY_APP);
        assert_eq!(u32::from(app), 0x0000_0101);
    }
}
