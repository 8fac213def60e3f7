//! Common types for GATT declarations
//!
//! This module defines the property flags and the service ranges tracked
//! while compiling a profile.

use bitflags::bitflags;

bitflags! {
    /// Property flags of an attribute.
    ///
    /// The low byte holds the GATT characteristic properties; the upper
    /// bits are storage and security extensions read by the firmware's
    /// attribute server. Some extension names deliberately reuse bits of
    /// characteristic properties that never appear on the same record.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PropertyFlags: u32 {
        // GATT Characteristic Properties
        const BROADCAST = 0x01;
        const READ = 0x02;
        const WRITE_WITHOUT_RESPONSE = 0x04;
        const WRITE = 0x08;
        const NOTIFY = 0x10;
        const INDICATE = 0x20;
        const AUTHENTICATED_SIGNED_WRITE = 0x40;
        const EXTENDED_PROPERTIES = 0x80;

        // Storage and security extensions
        const DYNAMIC = 0x100;
        const LONG_UUID = 0x200;
        const AUTHENTICATION_REQUIRED = 0x400;
        const AUTHORIZATION_REQUIRED = 0x800;
        const ENCRYPTION_KEY_SIZE_7 = 0x6000;
        const ENCRYPTION_KEY_SIZE_8 = 0x7000;
        const ENCRYPTION_KEY_SIZE_9 = 0x8000;
        const ENCRYPTION_KEY_SIZE_10 = 0x9000;
        const ENCRYPTION_KEY_SIZE_11 = 0xa000;
        const ENCRYPTION_KEY_SIZE_12 = 0xb000;
        const ENCRYPTION_KEY_SIZE_13 = 0xc000;
        const ENCRYPTION_KEY_SIZE_14 = 0xd000;
        const ENCRYPTION_KEY_SIZE_15 = 0xe000;
        const ENCRYPTION_KEY_SIZE_16 = 0xf000;

        // Extended Properties, compiler only
        const RELIABLE_WRITE = 0x10000;

        // Only meaningful on configuration attributes
        const READ_WITHOUT_AUTHENTICATION = 0x0001;
        const PERSISTENT_WRITE_CCC = 0x0010;
    }
}

impl PropertyFlags {
    /// Bits kept on a characteristic value: everything except
    /// broadcast, notify and indicate
    pub const VALUE_MASK: u32 = 0x1ffce;

    /// Security and reliable-write bits a generated client configuration
    /// inherits from its characteristic
    pub const CCC_INHERITED_MASK: u32 = 0x1fc00;

    /// Parse a `|`-separated list of flag names.
    ///
    /// Unknown names contribute nothing and are returned so the caller can
    /// report them.
    pub fn parse(text: &str) -> (PropertyFlags, Vec<String>) {
        let mut flags = PropertyFlags::empty();
        let mut unknown = Vec::new();

        for name in text.split('|').map(str::trim).filter(|name| !name.is_empty()) {
            match PropertyFlags::from_name(name) {
                Some(flag) => flags |= flag,
                None => unknown.push(name.to_string()),
            }
        }

        (flags, unknown)
    }

    /// Whether a client configuration descriptor must follow the value
    pub fn needs_client_configuration(&self) -> bool {
        self.intersects(PropertyFlags::NOTIFY | PropertyFlags::INDICATE)
    }

    /// The characteristic properties byte of a declaration
    pub fn declaration_byte(&self) -> u8 {
        (self.bits() & 0xff) as u8
    }

    /// The 16-bit flags field written into a record
    pub fn record_flags(&self) -> u16 {
        (self.bits() & 0xffff) as u16
    }
}

/// A service and the handle range it covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Service {
    /// Symbolic key derived from the declaring UUID token
    pub key: String,
    /// Handle of the service declaration
    pub start_handle: u16,
    /// Last handle of the service, fixed when the service is closed
    pub end_handle: u16,
}
