//! RustyGatt - a compiler for BLE GATT profile definitions
//!
//! This library translates a line-oriented description of a GATT server
//! (services, characteristics, descriptors) into the binary attribute
//! database embedded by firmware, together with symbolic handle defines.
//! It includes UUID resolution, property flag encoding, handle allocation
//! across nested imports, and rendering of the generated C header.

pub mod att;
pub mod error;
pub mod gatt;
pub mod profile;
pub mod uuid;

// Re-export common types for convenience
pub use att::{AttributeDatabase, AttributeRecord};
pub use error::{CompileError, CompileResult, CompileWarning};
pub use gatt::{CompilationContext, Field, Keyword, PropertyFlags, Service};
pub use profile::{compile_file, CompiledProfile, Compiler, CompilerConfig};
pub use uuid::{Uuid, UuidResolver};
