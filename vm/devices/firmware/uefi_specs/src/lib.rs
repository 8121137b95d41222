// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Types and constants related to the UEFI spec.
//!
//! Everything in here describes bytes exactly as firmware stores them. Turning
//! those bytes into owned, validated values is the job of `uefi_boot_vars`.

#![no_std]
#![forbid(unsafe_code)]
#![expect(missing_docs)]

pub mod uefi;
