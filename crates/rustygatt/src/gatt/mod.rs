//! GATT declarations
//!
//! This module turns the declarations of a profile into attribute records:
//! property flags, the shared compilation context, and one compiler per
//! declaration keyword.

pub mod characteristic;
pub mod context;
pub mod declaration;
pub mod types;
pub mod value;

#[cfg(test)]
mod tests;

pub use characteristic::CharacteristicLayout;
pub use context::{symbol_key, CompilationContext};
pub use declaration::{compile_declaration, Compiled, Keyword};
pub use types::{PropertyFlags, Service};
pub use value::Field;
