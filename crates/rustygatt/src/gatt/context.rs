//! Compilation state shared by every declaration of one compile
//!
//! The context owns the handle cursor, the open service, and the symbol
//! tables. Nested imports borrow the same context, so nothing here resets
//! until the compile is finished.

use super::types::{PropertyFlags, Service};
use crate::att::constants::{ATT_HANDLE_MAX, ATT_HANDLE_MIN};
use crate::error::{CompileError, CompileResult, CompileWarning};
use crate::uuid::{Uuid, UuidResolver};
use log::{debug, warn};
use std::collections::HashMap;

/// Symbolic key used in generated define names: the UUID token as
/// written, with `-` replaced by `_`
pub fn symbol_key(token: &str) -> String {
    token.replace('-', "_")
}

#[derive(Debug, Clone)]
struct OpenService {
    key: String,
    start_handle: u16,
}

/// Mutable state of one compiler invocation
#[derive(Debug)]
pub struct CompilationContext {
    resolver: UuidResolver,
    /// Next handle to hand out; wider than u16 to detect exhaustion
    next_handle: u32,
    open_service: Option<OpenService>,
    /// Closed services in declaration order
    services: Vec<Service>,
    service_index: HashMap<String, usize>,
    characteristic_indices: HashMap<String, u32>,
    current_characteristic: String,
    presentation_formats: HashMap<String, u16>,
    service_defines: Vec<String>,
    characteristic_defines: Vec<String>,
    warnings: Vec<CompileWarning>,
}

impl CompilationContext {
    /// Create a new context with the handle cursor at the first handle
    pub fn new(resolver: UuidResolver) -> Self {
        Self {
            resolver,
            next_handle: ATT_HANDLE_MIN as u32,
            open_service: None,
            services: Vec::new(),
            service_index: HashMap::new(),
            characteristic_indices: HashMap::new(),
            current_characteristic: String::new(),
            presentation_formats: HashMap::new(),
            service_defines: Vec::new(),
            characteristic_defines: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// The handle the next record will receive
    pub fn next_handle(&self) -> CompileResult<u16> {
        if self.next_handle > ATT_HANDLE_MAX as u32 {
            return Err(CompileError::HandleOverflow);
        }
        Ok(self.next_handle as u16)
    }

    /// Hand out the next handle
    pub fn allocate_handle(&mut self) -> CompileResult<u16> {
        let handle = self.next_handle()?;
        self.next_handle += 1;
        Ok(handle)
    }

    /// Close the open service, if any, and open a new one at the cursor.
    ///
    /// Returns the service that was closed.
    pub fn open_service(&mut self, token: &str) -> CompileResult<Option<Service>> {
        let closed = self.close_service();
        let start_handle = self.next_handle()?;
        self.open_service = Some(OpenService {
            key: symbol_key(token),
            start_handle,
        });
        Ok(closed)
    }

    /// Fix the end handle of the open service and record its range
    pub fn close_service(&mut self) -> Option<Service> {
        let open = self.open_service.take()?;
        // The declaration itself took a handle, so the cursor is past start
        let end_handle = (self.next_handle - 1) as u16;
        let service = Service {
            key: open.key,
            start_handle: open.start_handle,
            end_handle,
        };
        debug!(
            "Service {} spans [0x{:04x}, 0x{:04x}]",
            service.key, service.start_handle, service.end_handle
        );

        self.service_defines.push(format!(
            "#define ATT_SERVICE_{}_START_HANDLE 0x{:04x}",
            service.key, service.start_handle
        ));
        self.service_defines.push(format!(
            "#define ATT_SERVICE_{}_END_HANDLE 0x{:04x}",
            service.key, service.end_handle
        ));

        match self.service_index.get(&service.key) {
            Some(&index) => self.services[index] = service.clone(),
            None => {
                self.service_index
                    .insert(service.key.clone(), self.services.len());
                self.services.push(service.clone());
            }
        }
        Some(service)
    }

    /// A service that has already been closed
    pub fn service(&self, key: &str) -> Option<&Service> {
        self.service_index.get(key).map(|&index| &self.services[index])
    }

    /// All closed services in declaration order
    pub fn services(&self) -> &[Service] {
        &self.services
    }

    /// Make `token` the current characteristic and derive its symbolic key.
    ///
    /// Characteristics sharing a UUID are numbered `_01`, `_02`, ...
    /// unless a tag names them explicitly.
    pub fn begin_characteristic(&mut self, token: &str, tag: Option<&str>) -> &str {
        let base = symbol_key(token);
        let index = self
            .characteristic_indices
            .entry(base.clone())
            .and_modify(|index| *index += 1)
            .or_insert(1);

        self.current_characteristic = match tag {
            Some(tag) => format!("{}_{}", base, tag.to_uppercase().replace(' ', "_")),
            None => format!("{}_{:02x}", base, index),
        };
        &self.current_characteristic
    }

    /// Record a handle define for the current characteristic
    pub fn define_characteristic_handle(&mut self, suffix: &str, handle: u16) {
        self.characteristic_defines.push(format!(
            "#define ATT_CHARACTERISTIC_{}_{}_HANDLE 0x{:04x}",
            self.current_characteristic, suffix, handle
        ));
    }

    /// Remember the handle of a presentation format descriptor
    pub fn register_format(&mut self, identifier: &str, handle: u16) {
        self.presentation_formats.insert(identifier.to_string(), handle);
    }

    pub fn format_handle(&self, identifier: &str) -> Option<u16> {
        self.presentation_formats.get(identifier).copied()
    }

    pub fn resolve_uuid(&self, token: &str) -> CompileResult<Uuid> {
        self.resolver.resolve(token)
    }

    /// Parse a flag list, reporting unknown names as warnings
    pub fn parse_properties(&mut self, text: &str) -> PropertyFlags {
        let (flags, unknown) = PropertyFlags::parse(text);
        for name in unknown {
            self.warn(CompileWarning::UnknownProperty(name));
        }
        flags
    }

    /// Report a non-fatal condition
    pub fn warn(&mut self, warning: CompileWarning) {
        warn!("{}", warning);
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[CompileWarning] {
        &self.warnings
    }

    pub fn service_defines(&self) -> &[String] {
        &self.service_defines
    }

    pub fn characteristic_defines(&self) -> &[String] {
        &self.characteristic_defines
    }
}
