//! Attribute layer of the compiled database
//!
//! This module holds the attribute type codes and the binary record model
//! the firmware consumes: an ordered run of fixed-layout records closed by a
//! zero size field.

pub mod constants;
pub mod database;

pub use self::constants::*;
pub use self::database::{AttributeDatabase, AttributeRecord, TERMINATOR_SIZE};
