//! Profile compilation
//!
//! This module reads `.gatt` profile sources, expands imports, and renders
//! the compiled attribute database as a C header.

pub mod compiler;
pub mod emitter;
pub mod loader;
pub mod tokenizer;


pub use compiler::{compile_file, CompiledProfile, Compiler, CompilerConfig};
pub use emitter::Emitter;
pub use loader::{FsLoader, MemoryLoader, SourceLoader};
pub use tokenizer::tokenize;
