//! Characteristic expansion
//!
//! A single `CHARACTERISTIC` line becomes two to four consecutive records:
//! the declaration, the value, an optional Client Characteristic
//! Configuration (notify or indicate) and an optional Characteristic
//! Extended Properties descriptor (reliable write).

use super::types::PropertyFlags;
use crate::att::constants::*;
use crate::att::AttributeRecord;
use crate::uuid::Uuid;

/// Everything needed to lay out one characteristic
#[derive(Debug, Clone)]
pub struct CharacteristicLayout {
    pub uuid: Uuid,
    /// Declared properties, with EXTENDED_PROPERTIES already added for
    /// reliable writes
    pub properties: PropertyFlags,
    pub value: Vec<u8>,
}

impl CharacteristicLayout {
    pub fn new(uuid: Uuid, properties: PropertyFlags, value: Vec<u8>) -> Self {
        let mut properties = properties;
        if properties.contains(PropertyFlags::RELIABLE_WRITE) {
            properties |= PropertyFlags::EXTENDED_PROPERTIES;
        }
        Self {
            uuid,
            properties,
            value,
        }
    }

    pub fn has_client_configuration(&self) -> bool {
        self.properties.needs_client_configuration()
    }

    pub fn has_extended_properties(&self) -> bool {
        self.properties.contains(PropertyFlags::RELIABLE_WRITE)
    }

    /// Number of handles the characteristic occupies
    pub fn record_count(&self) -> usize {
        2 + self.has_client_configuration() as usize + self.has_extended_properties() as usize
    }

    /// Flags of the value record
    pub fn value_flags(&self) -> PropertyFlags {
        let mut flags =
            PropertyFlags::from_bits_retain(self.properties.bits() & PropertyFlags::VALUE_MASK);
        if self.uuid.is_long() {
            flags |= PropertyFlags::LONG_UUID;
        }
        flags
    }

    /// Flags of the generated client configuration: the inherited security
    /// bits plus readable, writable, dynamic and persistent
    pub fn client_configuration_flags(&self) -> PropertyFlags {
        PropertyFlags::from_bits_retain(self.properties.bits() & PropertyFlags::CCC_INHERITED_MASK)
            | PropertyFlags::READ_WITHOUT_AUTHENTICATION
            | PropertyFlags::READ
            | PropertyFlags::WRITE
            | PropertyFlags::DYNAMIC
            | PropertyFlags::PERSISTENT_WRITE_CCC
    }

    /// Lay out the records starting at `declaration_handle`
    pub fn records(&self, declaration_handle: u16) -> Vec<AttributeRecord> {
        let value_handle = declaration_handle + 1;
        let mut records = Vec::with_capacity(self.record_count());

        let mut declaration = vec![self.properties.declaration_byte()];
        declaration.extend_from_slice(&value_handle.to_le_bytes());
        declaration.extend(self.uuid.as_bytes());
        records.push(AttributeRecord::new(
            declaration_handle,
            PropertyFlags::READ.record_flags(),
            Uuid::Uuid16(CHARACTERISTIC_UUID),
            declaration,
        ));

        records.push(AttributeRecord::new(
            value_handle,
            self.value_flags().record_flags(),
            self.uuid,
            self.value.clone(),
        ));

        let mut handle = value_handle;
        if self.has_client_configuration() {
            handle += 1;
            records.push(
                AttributeRecord::new(
                    handle,
                    self.client_configuration_flags().record_flags(),
                    Uuid::Uuid16(CLIENT_CHAR_CONFIG_UUID),
                    vec![0x00, 0x00],
                )
                .with_comment("CLIENT_CHARACTERISTIC_CONFIGURATION"),
            );
        }

        if self.has_extended_properties() {
            handle += 1;
            records.push(
                AttributeRecord::new(
                    handle,
                    PropertyFlags::READ.record_flags(),
                    Uuid::Uuid16(CHAR_EXTENDED_PROPS_UUID),
                    EXTENDED_PROPS_RELIABLE_WRITE.to_le_bytes().to_vec(),
                )
                .with_comment("CHARACTERISTIC_EXTENDED_PROPERTIES"),
            );
        }

        records
    }
}
