//! Attribute type codes and handle bounds

// ATT handle values
pub const ATT_HANDLE_MIN: u16 = 0x0001;
pub const ATT_HANDLE_MAX: u16 = 0xFFFF;

// Record header: size (2) + flags (2) + handle (2)
pub const ATT_RECORD_HEADER_SIZE: usize = 6;

// Declarations
pub const PRIMARY_SERVICE_UUID: u16 = 0x2800;
pub const SECONDARY_SERVICE_UUID: u16 = 0x2801;
pub const INCLUDE_UUID: u16 = 0x2802;
pub const CHARACTERISTIC_UUID: u16 = 0x2803;

// Descriptors
pub const CHAR_EXTENDED_PROPS_UUID: u16 = 0x2900;
pub const CHAR_USER_DESC_UUID: u16 = 0x2901;
pub const CLIENT_CHAR_CONFIG_UUID: u16 = 0x2902;
pub const SERVER_CHAR_CONFIG_UUID: u16 = 0x2903;
pub const CHAR_FORMAT_UUID: u16 = 0x2904;
pub const CHAR_AGGREGATE_FORMAT_UUID: u16 = 0x2905;
pub const VALID_RANGE_UUID: u16 = 0x2906;
pub const EXTERNAL_REPORT_REF_UUID: u16 = 0x2907;
pub const REPORT_REF_UUID: u16 = 0x2908;
pub const NUMBER_OF_DIGITALS_UUID: u16 = 0x2909;
pub const VALUE_TRIGGER_SETTING_UUID: u16 = 0x290A;
pub const ENV_SENSING_CONFIG_UUID: u16 = 0x290B;
pub const ENV_SENSING_MEASUREMENT_UUID: u16 = 0x290C;
pub const ENV_SENSING_TRIGGER_SETTING_UUID: u16 = 0x290D;

// Characteristic Extended Properties value
pub const EXTENDED_PROPS_RELIABLE_WRITE: u16 = 0x0001;
