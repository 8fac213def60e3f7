//! Compiled attribute database
//!
//! Binary layout of one record, all fields little-endian:
//! `size (16) | flags (16) | handle (16) | type uuid (16/128) | value (...)`.
//! The database is closed by a bare zero size field.
use super::constants::*;
use crate::error::{CompileError, CompileResult};
use crate::gatt::PropertyFlags;
use crate::uuid::Uuid;
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};

/// Size of the terminating record: a zero size field only
pub const TERMINATOR_SIZE: usize = 2;

/// One row of the compiled database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeRecord {
    /// Attribute handle
    pub handle: u16,
    /// Low 16 bits of the property mask
    pub flags: u16,
    /// Attribute type
    pub uuid: Option<Uuid>,
    /// Attribute value
    pub value: Vec<u8>,
    /// Human readable label, rendered as a comment above the record
    pub comment: String,
}

impl AttributeRecord {
    /// Create a new record
    pub fn new(handle: u16, flags: u16, uuid: Uuid, value: Vec<u8>) -> Self {
        Self {
            handle,
            flags,
            uuid: Some(uuid),
            value,
            comment: String::new(),
        }
    }

    /// Attach the comment line shown in the generated header
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Attribute type as a 16-bit value, if it is one
    pub fn type_u16(&self) -> Option<u16> {
        self.uuid.and_then(|uuid| uuid.as_u16())
    }

    /// Encoded size in bytes, including the size field itself
    pub fn size(&self) -> usize {
        ATT_RECORD_HEADER_SIZE + self.uuid.map_or(0, |uuid| uuid.len()) + self.value.len()
    }

    /// Serialize the record to its binary layout
    pub fn to_bytes(&self) -> CompileResult<Vec<u8>> {
        let size = u16::try_from(self.size()).map_err(|_| {
            CompileError::InvalidValue(format!(
                "attribute 0x{:04x} too large ({} bytes)",
                self.handle,
                self.size()
            ))
        })?;

        let mut buf = Vec::with_capacity(self.size());
        buf.extend_from_slice(&size.to_le_bytes());
        buf.extend_from_slice(&self.flags.to_le_bytes());
        buf.extend_from_slice(&self.handle.to_le_bytes());
        if let Some(uuid) = &self.uuid {
            buf.extend_from_slice(&uuid.as_bytes());
        }
        buf.extend_from_slice(&self.value);
        Ok(buf)
    }
}

/// Ordered collection of compiled records
#[derive(Debug, Clone, Default)]
pub struct AttributeDatabase {
    records: Vec<AttributeRecord>,
    /// Running size of all records, excluding the terminator
    size: usize,
}

impl AttributeDatabase {
    /// Create a new empty attribute database
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record. Handles must be strictly increasing.
    pub fn push(&mut self, record: AttributeRecord) -> CompileResult<()> {
        if let Some(last) = self.records.last() {
            if record.handle <= last.handle {
                return Err(CompileError::InvalidValue(format!(
                    "handle 0x{:04x} does not follow 0x{:04x}",
                    record.handle, last.handle
                )));
            }
        } else if record.handle < ATT_HANDLE_MIN {
            return Err(CompileError::InvalidValue("handle 0x0000 is reserved".into()));
        }

        self.size += record.size();
        self.records.push(record);
        Ok(())
    }

    pub fn records(&self) -> &[AttributeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a record by handle
    pub fn get(&self, handle: u16) -> Option<&AttributeRecord> {
        self.records
            .binary_search_by_key(&handle, |record| record.handle)
            .ok()
            .map(|index| &self.records[index])
    }

    /// Total encoded size including the terminator
    pub fn total_size(&self) -> usize {
        self.size + TERMINATOR_SIZE
    }

    /// Encode every record followed by the terminator
    pub fn to_bytes(&self) -> CompileResult<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.total_size());
        for record in &self.records {
            buf.extend(record.to_bytes()?);
        }
        buf.extend_from_slice(&[0u8; TERMINATOR_SIZE]);
        Ok(buf)
    }

    /// Decode a compiled database.
    ///
    /// The width of the type field is not encoded explicitly; records
    /// flagged `LONG_UUID` carry a 128-bit type, all others a 16-bit one.
    pub fn parse(data: &[u8]) -> CompileResult<Self> {
        let mut cursor = Cursor::new(data);
        let mut database = Self::new();

        loop {
            let offset = cursor.position() as usize;
            let size = cursor
                .read_u16::<LittleEndian>()
                .map_err(|_| CompileError::MalformedRecord(offset))? as usize;
            if size == 0 {
                break;
            }

            let flags = cursor
                .read_u16::<LittleEndian>()
                .map_err(|_| CompileError::MalformedRecord(offset))?;
            let handle = cursor
                .read_u16::<LittleEndian>()
                .map_err(|_| CompileError::MalformedRecord(offset))?;

            let uuid_len = if flags & PropertyFlags::LONG_UUID.bits() as u16 != 0 {
                16
            } else {
                2
            };
            if size < ATT_RECORD_HEADER_SIZE + uuid_len {
                return Err(CompileError::MalformedRecord(offset));
            }

            let mut uuid = vec![0u8; uuid_len];
            cursor
                .read_exact(&mut uuid)
                .map_err(|_| CompileError::MalformedRecord(offset))?;
            let mut value = vec![0u8; size - ATT_RECORD_HEADER_SIZE - uuid_len];
            cursor
                .read_exact(&mut value)
                .map_err(|_| CompileError::MalformedRecord(offset))?;

            let uuid = Uuid::from_bytes(&uuid).ok_or(CompileError::MalformedRecord(offset))?;
            database.push(AttributeRecord::new(handle, flags, uuid, value))?;
        }

        Ok(database)
    }
}
