//! Rendering of the generated C header
//!
//! The emitter writes the byte array as it is compiled, one comment line
//! and one hex line per record, and keeps the same records in an
//! [`AttributeDatabase`] so the binary form is available as well.

use crate::att::{AttributeDatabase, AttributeRecord, TERMINATOR_SIZE};
use crate::error::CompileResult;
use log::{debug, info};
use std::fmt::Write;

const INDENT: &str = "    ";

fn write_bytes(out: &mut String, bytes: &[u8]) {
    out.push_str(INDENT);
    for byte in bytes {
        let _ = write!(out, "0x{:02x}, ", byte);
    }
    out.push('\n');
}

/// Accumulates the generated header text and the compiled records
#[derive(Debug)]
pub struct Emitter {
    out: String,
    database: AttributeDatabase,
}

impl Emitter {
    /// Start a header for `output_name`, generated from `input_name`
    pub fn new(output_name: &str, input_name: &str) -> Self {
        let mut out = String::new();
        let _ = write!(
            out,
            "\n\
             // {} generated from {}\n\
             \n\
             // binary representation\n\
             // attribute size in bytes (16), flags(16), handle (16), uuid (16/128), value(...)\n\
             \n\
             #include <stdint.h>\n\
             \n\
             const uint8_t profile_data[] =\n\
             {{\n",
            output_name, input_name
        );
        Self {
            out,
            database: AttributeDatabase::new(),
        }
    }

    /// Pass a `//` comment line through
    pub fn comment(&mut self, line: &str) {
        let _ = writeln!(self.out, "{}//{}", INDENT, line.trim_start_matches('/'));
    }

    /// Keep an unhandled `#TODO` line as a comment
    pub fn todo(&mut self, line: &str) {
        let _ = writeln!(self.out, "// {}", line);
    }

    pub fn import_begin(&mut self, line: &str) {
        let _ = writeln!(self.out, "{}// {} -- BEGIN", INDENT, line);
    }

    pub fn import_end(&mut self, line: &str) {
        let _ = writeln!(self.out, "{}// {} -- END", INDENT, line);
    }

    /// Separate the records of two services
    pub fn service_boundary(&mut self) {
        self.out.push('\n');
    }

    /// Write one record
    pub fn emit(&mut self, record: AttributeRecord) -> CompileResult<()> {
        let bytes = record.to_bytes()?;
        debug!("0x{:04x} {} ({} bytes)", record.handle, record.comment, bytes.len());

        let _ = writeln!(self.out, "{}// 0x{:04x} {}", INDENT, record.handle, record.comment);
        write_bytes(&mut self.out, &bytes);
        self.database.push(record)
    }

    /// Close the array and append the handle define blocks
    pub fn finish(
        mut self,
        service_defines: &[String],
        characteristic_defines: &[String],
    ) -> (String, AttributeDatabase) {
        let _ = writeln!(self.out, "{}// END", INDENT);
        write_bytes(&mut self.out, &[0u8; TERMINATOR_SIZE]);

        let total_size = self.database.total_size();
        let _ = writeln!(self.out, "}}; // total size {} bytes ", total_size);
        info!("Total size {} bytes", total_size);

        self.out.push_str("\n\n//\n// list service handle ranges\n//\n");
        for define in service_defines {
            self.out.push_str(define);
            self.out.push('\n');
        }
        self.out.push_str("\n//\n// list mapping between characteristics and handles\n//\n");
        for define in characteristic_defines {
            self.out.push_str(define);
            self.out.push('\n');
        }

        (self.out, self.database)
    }
}
