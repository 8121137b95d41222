// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Definitions related to UEFI boot entries

use bitfield_struct::bitfield;
use guid::Guid;
use zerocopy::FromBytes;
use zerocopy::Immutable;
use zerocopy::IntoBytes;
use zerocopy::KnownLayout;
use zerocopy::LittleEndian;
use zerocopy::U16;
use zerocopy::U32;
use zerocopy::U64;

/// From UEFI spec 10.2
#[repr(C)]
#[derive(IntoBytes, FromBytes, Immutable, KnownLayout, Debug)]
pub struct EfiDevicePathProtocol {
    pub device_type: EfiDeviceType,
    pub sub_type: u8,
    pub length: U16<LittleEndian>,
}

/// Size of [`EfiDevicePathProtocol`], shared by every device path node.
pub const DEVICE_PATH_HEADER_LEN: usize = 4;

/// From UEFI spec 3.1.3
///
/// Followed by the null-terminated UCS-2 `Description`, then
/// `file_path_list_length` bytes of device paths, then `OptionalData`.
#[repr(C)]
#[derive(IntoBytes, FromBytes, Immutable, KnownLayout, Debug)]
pub struct EfiLoadOption {
    pub attributes: U32<LittleEndian>,
    pub file_path_list_length: U16<LittleEndian>,
}

/// Size of the fixed part of [`EfiLoadOption`].
pub const LOAD_OPTION_HEADER_LEN: usize = 6;

/// From UEFI spec 3.1.3 - `LOAD_OPTION_*` attribute bits.
#[bitfield(u32)]
#[derive(Eq, PartialEq)]
pub struct LoadOptionAttributes {
    pub active: bool,
    pub force_reconnect: bool,
    _reserved0: bool,
    pub hidden: bool,
    #[bits(4)]
    _reserved1: u8,
    /// `LOAD_OPTION_CATEGORY_*` (bits 8..=12)
    #[bits(5)]
    pub category: u8,
    #[bits(19)]
    _reserved2: u32,
}

impl LoadOptionAttributes {
    /// `LOAD_OPTION_CATEGORY_BOOT`
    pub const CATEGORY_BOOT: u8 = 0x00;
    /// `LOAD_OPTION_CATEGORY_APP`
    pub const CATEGORY_APP: u8 = 0x01;
}

open_enum::open_enum! {
    /// From UEFI spec 10.3.1
    #[derive(IntoBytes, FromBytes, Immutable, KnownLayout)]
    pub enum EfiDeviceType: u8 {
        HARDWARE = 0x01,
        ACPI = 0x02,
        MESSAGING = 0x03,
        MEDIA = 0x04,
        BIOS_BOOT_SPEC = 0x05,
        END = 0x7F,
    }
}

open_enum::open_enum! {
    /// From UEFI spec 10.3.1
    pub enum EfiEndDeviceSubType: u8 {
        INSTANCE = 0x01,
        ENTIRE = 0xFF,
    }
}

open_enum::open_enum! {
    /// From UEFI spec 10.3.2
    pub enum EfiHardwareDeviceSubType: u8 {
        PCI = 1,
        PCCARD = 2,
        MEMORY_MAPPED = 3,
        VENDOR = 4,
        CONTROLLER = 5,
        BMC = 6,
    }
}

open_enum::open_enum! {
    /// From UEFI spec 10.3.3
    pub enum EfiAcpiDeviceSubType: u8 {
        ACPI = 1,
        EXPANDED_ACPI = 2,
        ADR = 3,
        NVDIMM = 4,
    }
}

open_enum::open_enum! {
    /// From UEFI spec 10.3.4
    pub enum EfiMessagingDeviceSubType: u8 {
        ATAPI = 1,
        SCSI = 2,
        USB = 5,
        VENDOR = 10,
        MAC_ADDRESS = 11,
        IPV4 = 12,
        IPV6 = 13,
        UART = 14,
        USB_CLASS = 15,
        SATA = 18,
        NVME_NAMESPACE = 23,
        URI = 24,
    }
}

open_enum::open_enum! {
    /// From UEFI spec 10.3.5
    pub enum EfiMediaDeviceSubType: u8 {
        HARD_DRIVE = 0x01,
        CD_ROM = 0x02,
        VENDOR = 0x03,
        FILE = 0x04,
        MEDIA_PROTOCOL = 0x05,
        PIWG_FIRMWARE_FILE = 0x06,
        PIWG_FIRMWARE_VOLUME = 0x07,
        RELATIVE_OFFSET_RANGE = 0x08,
        RAM_DISK = 0x09,
    }
}

open_enum::open_enum! {
    /// From UEFI spec 10.3.5.1
    #[derive(IntoBytes, FromBytes, Immutable, KnownLayout)]
    pub enum EfiPartitionFormat: u8 {
        MBR = 0x01,
        GUID = 0x02,
    }
}

open_enum::open_enum! {
    /// From UEFI spec 10.3.5.1
    #[derive(IntoBytes, FromBytes, Immutable, KnownLayout)]
    pub enum EfiSignatureType: u8 {
        NONE = 0x00,
        MBR = 0x01,
        GUID = 0x02,
    }
}

/// From UEFI spec 10.3.5.1 - payload of a Hard Drive media node, following
/// the node header.
#[repr(C, packed)]
#[derive(IntoBytes, FromBytes, Immutable, KnownLayout, Debug)]
pub struct EfiHardDriveDevice {
    pub partition_number: U32<LittleEndian>,
    pub partition_start: U64<LittleEndian>,
    pub partition_size: U64<LittleEndian>,
    pub partition_signature: Guid,
    pub partition_format: EfiPartitionFormat,
    pub signature_type: EfiSignatureType,
}

/// Payload size of a Hard Drive media node.
pub const HARD_DRIVE_PAYLOAD_LEN: usize = 38;

/// Payload size of a vendor GUID, as carried by vendor-defined and PIWG nodes.
pub const VENDOR_GUID_LEN: usize = 16;

const _: () = assert!(size_of::<EfiDevicePathProtocol>() == DEVICE_PATH_HEADER_LEN);
const _: () = assert!(size_of::<EfiLoadOption>() == LOAD_OPTION_HEADER_LEN);
const _: () = assert!(size_of::<EfiHardDriveDevice>() == HARD_DRIVE_PAYLOAD_LEN);
const _: () = assert!(Guid::LEN == VENDOR_GUID_LEN);

/// From UEFI spec 18.3.1 - identifies a messaging vendor node as the debug port.
pub const EFI_DEBUGPORT_PROTOCOL_GUID: Guid =
    Guid::from_static_str("eba4e8d2-3858-41ec-a281-2647ba9660d0");
