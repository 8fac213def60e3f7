//! Profile compiler driver
//!
//! Reads a profile line by line, expands `#import` directives in place,
//! and feeds every declaration through the shared compilation context into
//! the emitter.

use super::emitter::Emitter;
use super::loader::{FsLoader, SourceLoader};
use super::tokenizer::tokenize;
use crate::att::AttributeDatabase;
use crate::error::{CompileError, CompileResult, CompileWarning};
use crate::gatt::{compile_declaration, CompilationContext, Service};
use crate::uuid::{parse_definitions, UuidResolver};
use log::{debug, info};
use regex_lite::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

fn import_patterns() -> &'static (Regex, Regex) {
    static PATTERNS: OnceLock<(Regex, Regex)> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        (
            Regex::new(r"^#import\s+<(.*)>").expect("shared import pattern is a valid regex"),
            Regex::new(r#"^#import\s+"(.*)""#).expect("local import pattern is a valid regex"),
        )
    })
}

/// Compiler configuration
#[derive(Debug, Clone)]
pub struct CompilerConfig {
    /// Directory searched by `#import <name>`
    pub include_dir: PathBuf,
    /// Definitions file with the 16-bit assigned numbers
    pub assigned_numbers: Option<PathBuf>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            include_dir: PathBuf::from("gatt-service"),
            assigned_numbers: None,
        }
    }
}

/// Result of a successful compile
#[derive(Debug)]
pub struct CompiledProfile {
    /// The generated C header
    pub header: String,
    /// The compiled records
    pub database: AttributeDatabase,
    /// Service ranges in declaration order
    pub services: Vec<Service>,
    /// Non-fatal diagnostics
    pub warnings: Vec<CompileWarning>,
}

impl CompiledProfile {
    /// Size of the byte array, terminator included
    pub fn total_size(&self) -> usize {
        self.database.total_size()
    }

    /// The byte array the header embeds
    pub fn to_bytes(&self) -> CompileResult<Vec<u8>> {
        self.database.to_bytes()
    }
}

/// Compiles one profile and everything it imports
pub struct Compiler<L: SourceLoader = FsLoader> {
    config: CompilerConfig,
    loader: L,
    ctx: CompilationContext,
    /// Files currently being expanded, outermost first
    import_stack: Vec<PathBuf>,
}

impl Compiler<FsLoader> {
    /// Create a compiler reading from the filesystem
    pub fn new(config: CompilerConfig) -> CompileResult<Self> {
        Self::with_loader(config, FsLoader)
    }
}

impl<L: SourceLoader> Compiler<L> {
    /// Create a compiler reading sources through `loader`. The
    /// assigned-numbers file, if configured, is read here.
    pub fn with_loader(config: CompilerConfig, loader: L) -> CompileResult<Self> {
        let resolver = match &config.assigned_numbers {
            Some(path) => {
                let text = loader.load(path).map_err(|e| CompileError::io(path, e))?;
                let assigned = parse_definitions(&text);
                debug!("Loaded {} assigned numbers from {}", assigned.len(), path.display());
                UuidResolver::with_assigned_numbers(assigned)
            }
            None => UuidResolver::new(),
        };

        Ok(Self {
            config,
            loader,
            ctx: CompilationContext::new(resolver),
            import_stack: Vec::new(),
        })
    }

    /// Compile `input` into a header named `output_name`
    pub fn compile(mut self, input: &Path, output_name: &str) -> CompileResult<CompiledProfile> {
        let text = self
            .loader
            .load(input)
            .map_err(|e| CompileError::io(input, e))?;

        let mut emitter = Emitter::new(output_name, &input.display().to_string());
        self.import_stack.push(input.to_path_buf());
        self.compile_lines(input, &text, &mut emitter)?;
        self.import_stack.pop();

        if self.ctx.close_service().is_some() {
            emitter.service_boundary();
        }

        let (header, database) = emitter.finish(
            self.ctx.service_defines(),
            self.ctx.characteristic_defines(),
        );
        Ok(CompiledProfile {
            header,
            database,
            services: self.ctx.services().to_vec(),
            warnings: self.ctx.warnings().to_vec(),
        })
    }

    fn compile_lines(
        &mut self,
        file: &Path,
        text: &str,
        emitter: &mut Emitter,
    ) -> CompileResult<()> {
        for (index, line) in text.lines().enumerate() {
            let line_number = index + 1;
            let line = line.trim();

            if line.starts_with("//") {
                emitter.comment(line);
                continue;
            }

            if line.starts_with("#import") {
                self.import(file, line_number, line, emitter)?;
                continue;
            }

            if line.starts_with("#TODO") {
                self.ctx.warn(CompileWarning::Todo {
                    file: file.display().to_string(),
                    line: line_number,
                });
                emitter.todo(line);
                continue;
            }

            if line.is_empty() {
                continue;
            }

            let compiled = compile_declaration(&tokenize(line), &mut self.ctx)?;
            if compiled.closed_service.is_some() {
                emitter.service_boundary();
            }
            for record in compiled.records {
                emitter.emit(record)?;
            }
        }
        Ok(())
    }

    fn import_path(&self, file: &Path, line: &str) -> Option<PathBuf> {
        let (shared, local) = import_patterns();
        if let Some(caps) = shared.captures(line) {
            return Some(self.config.include_dir.join(&caps[1]));
        }
        if let Some(caps) = local.captures(line) {
            let dir = file.parent().unwrap_or_else(|| Path::new(""));
            return Some(dir.join(&caps[1]));
        }
        None
    }

    /// Expand an `#import` in place. Failing to open the file is not fatal;
    /// the including file simply continues.
    fn import(
        &mut self,
        file: &Path,
        line_number: usize,
        line: &str,
        emitter: &mut Emitter,
    ) -> CompileResult<()> {
        let Some(path) = self.import_path(file, line) else {
            self.ctx.warn(CompileWarning::MalformedImport {
                file: file.display().to_string(),
                line: line_number,
            });
            return Ok(());
        };

        if self.import_stack.contains(&path) {
            self.ctx.warn(CompileWarning::ImportFailed {
                path,
                reason: "recursive import".into(),
            });
            return Ok(());
        }

        info!("Importing {}", path.display());
        let text = match self.loader.load(&path) {
            Ok(text) => text,
            Err(e) => {
                self.ctx.warn(CompileWarning::ImportFailed {
                    path,
                    reason: e.to_string(),
                });
                return Ok(());
            }
        };

        emitter.import_begin(line);
        self.import_stack.push(path.clone());
        self.compile_lines(&path, &text, emitter)?;
        self.import_stack.pop();
        emitter.import_end(line);
        Ok(())
    }
}

/// Compile a profile from the filesystem
pub fn compile_file(
    config: CompilerConfig,
    input: &Path,
    output_name: &str,
) -> CompileResult<CompiledProfile> {
    Compiler::new(config)?.compile(input, output_name)
}
