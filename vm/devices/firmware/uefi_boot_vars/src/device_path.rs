// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Device path nodes (UEFI spec chapter 10).
//!
//! Every node starts with the same 4-byte header: type, subtype, and a
//! little-endian length covering the header and payload. Known kinds are
//! decoded into typed variants. Anything else is kept verbatim as
//! [`DevicePathNode::Unsupported`], which is always possible because the
//! length alone is enough to step over a node.

use crate::cursor::ByteCursor;
use crate::Error;
use guid::Guid;
use std::ops::Deref;
use uefi_specs::uefi::boot::EfiAcpiDeviceSubType;
use uefi_specs::uefi::boot::EfiDevicePathProtocol;
use uefi_specs::uefi::boot::EfiDeviceType;
use uefi_specs::uefi::boot::EfiEndDeviceSubType;
use uefi_specs::uefi::boot::EfiHardDriveDevice;
use uefi_specs::uefi::boot::EfiHardwareDeviceSubType;
use uefi_specs::uefi::boot::EfiMediaDeviceSubType;
use uefi_specs::uefi::boot::EfiMessagingDeviceSubType;
use uefi_specs::uefi::boot::EfiPartitionFormat;
use uefi_specs::uefi::boot::EfiSignatureType;
use uefi_specs::uefi::boot::DEVICE_PATH_HEADER_LEN;
use uefi_specs::uefi::boot::EFI_DEBUGPORT_PROTOCOL_GUID;
use uefi_specs::uefi::boot::HARD_DRIVE_PAYLOAD_LEN;
use uefi_specs::uefi::boot::VENDOR_GUID_LEN;
use zerocopy::FromBytes;
use zerocopy::IntoBytes;

/// Media / Hard Drive node: a partition on a block device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HardDriveMedia {
    /// 1-based partition index. Zero refers to the whole disk.
    pub partition_number: u32,
    /// Starting LBA of the partition.
    pub partition_start: u64,
    /// Size of the partition in logical blocks.
    pub partition_size: u64,
    /// Raw signature; see [`Self::signature_guid`] and
    /// [`Self::mbr_signature`].
    pub partition_signature: Guid,
    #[expect(missing_docs)]
    pub partition_format: EfiPartitionFormat,
    #[expect(missing_docs)]
    pub signature_type: EfiSignatureType,
}

impl HardDriveMedia {
    /// The GPT unique partition GUID, if this is a GUID signature.
    pub fn signature_guid(&self) -> Option<Guid> {
        (self.signature_type == EfiSignatureType::GUID).then_some(self.partition_signature)
    }

    /// The 32-bit MBR disk signature, if this is an MBR signature. It
    /// occupies the first four bytes of the signature field.
    pub fn mbr_signature(&self) -> Option<u32> {
        (self.signature_type == EfiSignatureType::MBR).then_some(self.partition_signature.data1)
    }

    fn to_spec(&self) -> EfiHardDriveDevice {
        EfiHardDriveDevice {
            partition_number: self.partition_number.into(),
            partition_start: self.partition_start.into(),
            partition_size: self.partition_size.into(),
            partition_signature: self.partition_signature,
            partition_format: self.partition_format,
            signature_type: self.signature_type,
        }
    }
}

impl From<EfiHardDriveDevice> for HardDriveMedia {
    fn from(raw: EfiHardDriveDevice) -> Self {
        Self {
            partition_number: raw.partition_number.get(),
            partition_start: raw.partition_start.get(),
            partition_size: raw.partition_size.get(),
            partition_signature: raw.partition_signature,
            partition_format: raw.partition_format,
            signature_type: raw.signature_type,
        }
    }
}

/// Which End node terminated a device path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndOfPath {
    /// End This Instance (subtype 0x01); another instance follows.
    Instance,
    /// End Entire Device Path (subtype 0xFF).
    Entire,
}

impl EndOfPath {
    fn subtype(self) -> EfiEndDeviceSubType {
        match self {
            EndOfPath::Instance => EfiEndDeviceSubType::INSTANCE,
            EndOfPath::Entire => EfiEndDeviceSubType::ENTIRE,
        }
    }
}

/// One decoded device path node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DevicePathNode {
    /// Media (0x04) / Hard Drive (0x01).
    HardDriveMedia(HardDriveMedia),
    /// Messaging (0x03) / Vendor (0x0A). Firmware uses this node with
    /// [`EFI_DEBUGPORT_PROTOCOL_GUID`] to describe the debug port.
    DebugPortMessaging {
        #[expect(missing_docs)]
        vendor_guid: Guid,
        /// Vendor-defined bytes after the GUID; usually empty.
        vendor_data: Vec<u8>,
    },
    /// Media (0x04) / PIWG Firmware File (0x06), kept as an opaque blob.
    FirmwareFile {
        #[expect(missing_docs)]
        data: Vec<u8>,
    },
    /// Media (0x04) / File Path (0x04).
    FilePath {
        #[expect(missing_docs)]
        path: String,
    },
    /// End (0x7F) node. Never appears inside [`DevicePath::nodes`].
    EndOfPath(EndOfPath),
    /// A node of a kind this crate does not interpret.
    Unsupported {
        #[expect(missing_docs)]
        node_type: EfiDeviceType,
        #[expect(missing_docs)]
        node_subtype: u8,
        /// Payload bytes following the header, kept verbatim.
        payload: Vec<u8>,
    },
}

impl DevicePathNode {
    #[expect(missing_docs)]
    pub fn node_type(&self) -> EfiDeviceType {
        match self {
            DevicePathNode::HardDriveMedia(_)
            | DevicePathNode::FirmwareFile { .. }
            | DevicePathNode::FilePath { .. } => EfiDeviceType::MEDIA,
            DevicePathNode::DebugPortMessaging { .. } => EfiDeviceType::MESSAGING,
            DevicePathNode::EndOfPath(_) => EfiDeviceType::END,
            DevicePathNode::Unsupported { node_type, .. } => *node_type,
        }
    }

    #[expect(missing_docs)]
    pub fn node_subtype(&self) -> u8 {
        match self {
            DevicePathNode::HardDriveMedia(_) => EfiMediaDeviceSubType::HARD_DRIVE.0,
            DevicePathNode::FirmwareFile { .. } => EfiMediaDeviceSubType::PIWG_FIRMWARE_FILE.0,
            DevicePathNode::FilePath { .. } => EfiMediaDeviceSubType::FILE.0,
            DevicePathNode::DebugPortMessaging { .. } => EfiMessagingDeviceSubType::VENDOR.0,
            DevicePathNode::EndOfPath(end) => end.subtype().0,
            DevicePathNode::Unsupported { node_subtype, .. } => *node_subtype,
        }
    }

    /// Size of the payload following the header.
    pub fn payload_len(&self) -> usize {
        match self {
            DevicePathNode::HardDriveMedia(_) => HARD_DRIVE_PAYLOAD_LEN,
            DevicePathNode::DebugPortMessaging { vendor_data, .. } => {
                VENDOR_GUID_LEN + vendor_data.len()
            }
            DevicePathNode::FirmwareFile { data } => data.len(),
            DevicePathNode::FilePath { path } => (path.encode_utf16().count() + 1) * 2,
            DevicePathNode::EndOfPath(_) => 0,
            DevicePathNode::Unsupported { payload, .. } => payload.len(),
        }
    }

    /// Value of the node's length field: header plus payload.
    ///
    /// Saturates at `u16::MAX` for constructed nodes too large to encode.
    pub fn declared_length(&self) -> u16 {
        (DEVICE_PATH_HEADER_LEN + self.payload_len())
            .try_into()
            .unwrap_or(u16::MAX)
    }

    /// Name of the node's subtype, if it is one UEFI defines for the node's
    /// type.
    pub fn subtype_name(&self) -> Option<&'static str> {
        subtype_name(self.node_type(), self.node_subtype())
    }

    #[expect(missing_docs)]
    pub fn is_unsupported(&self) -> bool {
        matches!(self, DevicePathNode::Unsupported { .. })
    }

    /// Returns `true` for a messaging vendor node carrying the debug port GUID.
    pub fn is_debug_port(&self) -> bool {
        matches!(
            self,
            DevicePathNode::DebugPortMessaging { vendor_guid, .. }
                if *vendor_guid == EFI_DEBUGPORT_PROTOCOL_GUID
        )
    }

    /// The file GUID of a firmware file node whose payload is exactly a GUID.
    pub fn file_guid(&self) -> Option<Guid> {
        match self {
            DevicePathNode::FirmwareFile { data } => Guid::read_from_bytes(data).ok(),
            _ => None,
        }
    }

    /// Serialize the node, header included, onto the end of `v`.
    pub fn extend_as_spec_node(&self, v: &mut Vec<u8>) -> Result<(), Error> {
        let total = DEVICE_PATH_HEADER_LEN + self.payload_len();
        let length = u16::try_from(total).map_err(|_| Error::PayloadTooLarge { len: total })?;
        let header = EfiDevicePathProtocol {
            device_type: self.node_type(),
            sub_type: self.node_subtype(),
            length: length.into(),
        };
        v.extend(header.as_bytes());

        match self {
            DevicePathNode::HardDriveMedia(hd) => v.extend(hd.to_spec().as_bytes()),
            DevicePathNode::DebugPortMessaging {
                vendor_guid,
                vendor_data,
            } => {
                v.extend(vendor_guid.as_bytes());
                v.extend(vendor_data);
            }
            DevicePathNode::FirmwareFile { data } => v.extend(data),
            DevicePathNode::FilePath { path } => {
                v.extend(path.encode_utf16().chain([0]).flat_map(u16::to_le_bytes));
            }
            DevicePathNode::EndOfPath(_) => {}
            DevicePathNode::Unsupported { payload, .. } => v.extend(payload),
        }
        Ok(())
    }
}

/// Decodes one node and advances `cursor` by exactly its declared length.
///
/// Unknown `(type, subtype)` pairs are not an error: they come back as
/// [`DevicePathNode::Unsupported`]. On error the cursor does not move.
pub fn decode_node(cursor: &mut ByteCursor<'_>) -> Result<DevicePathNode, Error> {
    let start = cursor.position();
    let mut node_cursor = cursor.clone();

    let header: EfiDevicePathProtocol = node_cursor.read_struct()?;
    let length = header.length.get() as usize;
    let invalid = |consumed| Error::InvalidLength {
        offset: start,
        declared: length,
        consumed,
    };

    let payload_len = length
        .checked_sub(DEVICE_PATH_HEADER_LEN)
        .ok_or(invalid(DEVICE_PATH_HEADER_LEN))?;
    let mut payload = node_cursor.split(payload_len)?;

    let node = decode_payload(header.device_type, header.sub_type, &mut payload).map_err(
        |err| match err {
            // The whole payload was available, so running out means the
            // layout needs more than the node declares.
            Error::TruncatedInput { needed, .. } => {
                invalid(DEVICE_PATH_HEADER_LEN + payload_len - payload.remaining() + needed)
            }
            err => err,
        },
    )?;

    if !payload.is_empty() {
        return Err(invalid(
            DEVICE_PATH_HEADER_LEN + payload_len - payload.remaining(),
        ));
    }

    if node.is_unsupported() {
        tracing::debug!(
            offset = start,
            node_type = ?header.device_type,
            node_subtype = header.sub_type,
            subtype_name = subtype_name(header.device_type, header.sub_type),
            length,
            "skipping unsupported device path node"
        );
    }

    *cursor = node_cursor;
    Ok(node)
}

fn decode_payload(
    device_type: EfiDeviceType,
    sub_type: u8,
    payload: &mut ByteCursor<'_>,
) -> Result<DevicePathNode, Error> {
    let node = match device_type {
        EfiDeviceType::MEDIA => match EfiMediaDeviceSubType(sub_type) {
            EfiMediaDeviceSubType::HARD_DRIVE => {
                DevicePathNode::HardDriveMedia(payload.read_struct::<EfiHardDriveDevice>()?.into())
            }
            EfiMediaDeviceSubType::FILE => DevicePathNode::FilePath {
                path: payload.read_utf16le_cstring()?,
            },
            EfiMediaDeviceSubType::PIWG_FIRMWARE_FILE => DevicePathNode::FirmwareFile {
                data: payload.read_rest().to_vec(),
            },
            _ => unsupported(device_type, sub_type, payload),
        },
        EfiDeviceType::MESSAGING => match EfiMessagingDeviceSubType(sub_type) {
            EfiMessagingDeviceSubType::VENDOR => DevicePathNode::DebugPortMessaging {
                vendor_guid: payload.read_struct()?,
                vendor_data: payload.read_rest().to_vec(),
            },
            _ => unsupported(device_type, sub_type, payload),
        },
        EfiDeviceType::END => match EfiEndDeviceSubType(sub_type) {
            EfiEndDeviceSubType::INSTANCE => DevicePathNode::EndOfPath(EndOfPath::Instance),
            EfiEndDeviceSubType::ENTIRE => DevicePathNode::EndOfPath(EndOfPath::Entire),
            _ => unsupported(device_type, sub_type, payload),
        },
        _ => unsupported(device_type, sub_type, payload),
    };
    Ok(node)
}

fn subtype_name(device_type: EfiDeviceType, sub_type: u8) -> Option<&'static str> {
    match device_type {
        EfiDeviceType::HARDWARE => EfiHardwareDeviceSubType(sub_type).name(),
        EfiDeviceType::ACPI => EfiAcpiDeviceSubType(sub_type).name(),
        EfiDeviceType::MESSAGING => EfiMessagingDeviceSubType(sub_type).name(),
        EfiDeviceType::MEDIA => EfiMediaDeviceSubType(sub_type).name(),
        EfiDeviceType::END => EfiEndDeviceSubType(sub_type).name(),
        _ => None,
    }
}

fn unsupported(
    node_type: EfiDeviceType,
    node_subtype: u8,
    payload: &mut ByteCursor<'_>,
) -> DevicePathNode {
    DevicePathNode::Unsupported {
        node_type,
        node_subtype,
        payload: payload.read_rest().to_vec(),
    }
}

/// One device path: the nodes up to (not including) its End node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DevicePath {
    #[expect(missing_docs)]
    pub nodes: Vec<DevicePathNode>,
    /// The End node that terminated the path, or `None` if the byte budget
    /// ran out first.
    pub end: Option<EndOfPath>,
}

impl Deref for DevicePath {
    type Target = [DevicePathNode];

    fn deref(&self) -> &[DevicePathNode] {
        &self.nodes
    }
}

impl DevicePath {
    /// Serialize the nodes, followed by the End node if there was one.
    pub fn extend_as_spec_path(&self, v: &mut Vec<u8>) -> Result<(), Error> {
        for node in &self.nodes {
            node.extend_as_spec_node(v)?;
        }
        if let Some(end) = self.end {
            DevicePathNode::EndOfPath(end).extend_as_spec_node(v)?;
        }
        Ok(())
    }
}

/// Decodes nodes from at most the next `byte_budget` bytes of `cursor`,
/// stopping early at an End node.
///
/// `cursor` advances past the nodes read, End node included. Bytes of the
/// budget after the End node are left for the caller. A node that would run
/// past the budget is [`Error::InvalidLength`].
pub fn decode_sequence(
    cursor: &mut ByteCursor<'_>,
    byte_budget: usize,
) -> Result<DevicePath, Error> {
    let mut outer = cursor.clone();
    let start = outer.position();
    let mut budget = outer.split(byte_budget)?;

    let mut path = DevicePath::default();
    while !budget.is_empty() {
        let node = decode_node(&mut budget).map_err(|err| match err {
            Error::TruncatedInput {
                offset, needed, ..
            } => Error::InvalidLength {
                offset: start,
                declared: byte_budget,
                consumed: offset - start + needed,
            },
            err => err,
        })?;

        match node {
            DevicePathNode::EndOfPath(end) => {
                path.end = Some(end);
                break;
            }
            node => path.nodes.push(node),
        }
    }

    let consumed = byte_budget - budget.remaining();
    cursor.skip(consumed)?;
    Ok(path)
}
