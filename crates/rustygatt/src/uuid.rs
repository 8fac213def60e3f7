use crate::error::{CompileError, CompileResult};
use log::trace;
use regex_lite::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

/// A 16-bit or 128-bit Bluetooth UUID.
///
/// Both forms are kept in the little-endian byte order the attribute
/// database uses on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Uuid {
    /// 16-bit SIG-assigned UUID
    Uuid16(u16),
    /// 128-bit UUID, little-endian
    Uuid128([u8; 16]),
}

/// 16-bit assigned numbers that are always available, independent of any
/// definitions file.
const WELL_KNOWN_UUIDS: &[(&str, u16)] = &[
    ("GAP_SERVICE", 0x1800),
    ("GATT_SERVICE", 0x1801),
    ("GAP_DEVICE_NAME", 0x2a00),
    ("GAP_APPEARANCE", 0x2a01),
    ("GAP_PERIPHERAL_PRIVACY_FLAG", 0x2a02),
    ("GAP_RECONNECTION_ADDRESS", 0x2a03),
    ("GAP_PERIPHERAL_PREFERRED_CONNECTION_PARAMETERS", 0x2a04),
    ("GATT_SERVICE_CHANGED", 0x2a05),
];

fn uuid128_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            "^[0-9A-Fa-f]{8}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{12}$",
        )
        .expect("128-bit UUID pattern is a valid regex")
    })
}

fn define_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*#define\s+(\w+)\s+(\w+)").expect("#define pattern is a valid regex")
    })
}

impl Uuid {
    /// Convert raw little-endian bytes to a UUID based on length
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        match bytes.len() {
            2 => Some(Uuid::Uuid16(u16::from_le_bytes([bytes[0], bytes[1]]))),
            16 => {
                let mut uuid = [0u8; 16];
                uuid.copy_from_slice(bytes);
                Some(Uuid::Uuid128(uuid))
            }
            _ => None,
        }
    }

    /// Parse the hyphenated 128-bit literal form, e.g.
    /// `6E400001-B5A3-F393-E0A9-E50E24DCCA9E`.
    pub fn parse_uuid128(text: &str) -> Option<Self> {
        if !is_uuid128_literal(text) {
            return None;
        }
        let digits: String = text.chars().filter(|c| *c != '-').collect();
        let mut bytes = [0u8; 16];
        hex::decode_to_slice(&digits, &mut bytes).ok()?;
        // literal is written most significant byte first
        bytes.reverse();
        Some(Uuid::Uuid128(bytes))
    }

    /// Little-endian wire representation, 2 or 16 bytes
    pub fn as_bytes(&self) -> Vec<u8> {
        match self {
            Uuid::Uuid16(uuid) => uuid.to_le_bytes().to_vec(),
            Uuid::Uuid128(uuid) => uuid.to_vec(),
        }
    }

    /// Number of bytes this UUID occupies in a record
    pub fn len(&self) -> usize {
        match self {
            Uuid::Uuid16(_) => 2,
            Uuid::Uuid128(_) => 16,
        }
    }

    pub fn is_long(&self) -> bool {
        matches!(self, Uuid::Uuid128(_))
    }

    /// Get the 16-bit UUID value if this is a 16-bit UUID
    pub fn as_u16(&self) -> Option<u16> {
        match self {
            Uuid::Uuid16(uuid) => Some(*uuid),
            Uuid::Uuid128(_) => None,
        }
    }
}

impl fmt::Display for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Uuid::Uuid16(uuid) => write!(f, "{:04X}", uuid),
            Uuid::Uuid128(uuid) => {
                write!(
                    f,
                    "{:02X}{:02X}{:02X}{:02X}-{:02X}{:02X}-{:02X}{:02X}-{:02X}{:02X}-{:02X}{:02X}{:02X}{:02X}{:02X}{:02X}",
                    uuid[15], uuid[14], uuid[13], uuid[12],
                    uuid[11], uuid[10],
                    uuid[9], uuid[8],
                    uuid[7], uuid[6],
                    uuid[5], uuid[4], uuid[3], uuid[2], uuid[1], uuid[0]
                )
            }
        }
    }
}

/// Whether `text` has the shape of a hyphenated 128-bit UUID literal
pub fn is_uuid128_literal(text: &str) -> bool {
    uuid128_pattern().is_match(text)
}

/// Resolves UUID tokens from a profile definition.
///
/// Lookup order: the built-in GAP/GATT table, the assigned-numbers table
/// loaded from a definitions file, the 128-bit literal form, and finally a
/// bare hexadecimal 16-bit value.
#[derive(Debug, Clone, Default)]
pub struct UuidResolver {
    assigned: HashMap<String, u16>,
}

impl UuidResolver {
    /// Create a resolver that only knows the built-in table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resolver from an already parsed assigned-numbers table
    pub fn with_assigned_numbers(assigned: HashMap<String, u16>) -> Self {
        Self { assigned }
    }

    /// Resolve a token to its canonical UUID
    pub fn resolve(&self, token: &str) -> CompileResult<Uuid> {
        if let Some((_, value)) = WELL_KNOWN_UUIDS.iter().find(|(name, _)| *name == token) {
            return Ok(Uuid::Uuid16(*value));
        }

        let key = token.to_uppercase().replace('.', "_");
        if let Some(value) = self.assigned.get(&key) {
            return Ok(Uuid::Uuid16(*value));
        }

        if let Some(uuid) = Uuid::parse_uuid128(token) {
            return Ok(uuid);
        }

        parse_hex_u16(token)
            .map(Uuid::Uuid16)
            .ok_or_else(|| CompileError::UnresolvedUuid(token.to_string()))
    }
}

/// Parse the `#define NAME VALUE` lines of a definitions file. Values are
/// hexadecimal; lines whose value does not fit a 16-bit UUID are skipped.
pub fn parse_definitions(text: &str) -> HashMap<String, u16> {
    let mut defines = HashMap::new();
    for line in text.lines() {
        let Some(caps) = define_pattern().captures(line) else {
            continue;
        };
        let (name, value) = (&caps[1], &caps[2]);
        match parse_hex_u16(value) {
            Some(value) => {
                defines.insert(name.to_string(), value);
            }
            None => trace!("Skipping define {} = {}", name, value),
        }
    }
    defines
}

/// Parse a bare hexadecimal 16-bit value, with or without a `0x` prefix
pub(crate) fn parse_hex_u16(text: &str) -> Option<u16> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    if digits.is_empty() {
        return None;
    }
    u16::from_str_radix(digits, 16).ok()
}
