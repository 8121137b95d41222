// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![no_std]

//! Provides the [`open_enum`] macro.

/// Declares a `#[repr(transparent)]` newtype over an integer that reads like
/// an enum but accepts every value of the storage type.
///
/// Each variant is a `pub const` of the newtype, so known values can be
/// matched by name while unknown ones round-trip untouched.
///
/// The generated type derives `Copy`, `Clone`, `Eq`, `PartialEq`, `Hash`,
/// `Ord` and `PartialOrd`, and gets:
///
/// - a `Debug` impl printing the variant name, or the raw value when unknown
/// - a `name()` method returning the variant name, if any
///
/// # Examples
///
/// ```
/// open_enum::open_enum! {
///     pub enum NodeType: u8 {
///         MEDIA = 0x04,
///         END = 0x7F,
///     }
/// }
///
/// assert_eq!(NodeType(0x7F), NodeType::END);
/// assert_eq!(NodeType::MEDIA.name(), Some("MEDIA"));
/// assert_eq!(NodeType(0x42).name(), None);
/// assert_eq!(format!("{:?}", NodeType(0x42)), "66");
/// ```
#[macro_export]
macro_rules! open_enum {
    (
        $(#[$a:meta])*
        $v:vis enum $name:ident : $storage:ty {
            $(#![$implattr:meta])*
            $(
                $(#[$vattr:meta])*
                $variant:ident = $value:expr,
            )*
        }
    ) => {
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
        #[repr(transparent)]
        $(#[$a])*
        $v struct $name(pub $storage);

        $(#[$implattr])*
        impl $name {
            $(
                $(#[$vattr])*
                pub const $variant: $name = $name($value);
            )*
        }

        impl $name {
            /// Returns the name of the matching variant, or `None` if the raw
            /// value is not one of the declared variants.
            #[allow(dead_code)]
            pub fn name(&self) -> Option<&'static str> {
                #![allow(unreachable_patterns)]
                match *self {
                    $( Self::$variant => Some(stringify!($variant)), )*
                    _ => None,
                }
            }
        }

        impl ::core::fmt::Debug for $name {
            fn fmt(&self, fmt: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                match self.name() {
                    Some(s) => fmt.pad(s),
                    None => ::core::fmt::Debug::fmt(&self.0, fmt),
                }
            }
        }
    }
}
