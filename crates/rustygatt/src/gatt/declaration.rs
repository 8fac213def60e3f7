//! Declaration compilers
//!
//! Every keyword of the profile language maps to one compiler with the same
//! shape: it takes the fields of a line and the shared context, allocates
//! handles, and returns the records to emit in order.

use super::characteristic::CharacteristicLayout;
use super::context::{symbol_key, CompilationContext};
use super::types::{PropertyFlags, Service};
use super::value::{field, parse_hex_byte, Field};
use crate::att::constants::*;
use crate::att::AttributeRecord;
use crate::error::{CompileError, CompileResult, CompileWarning};
use crate::uuid::Uuid;
use log::debug;

/// Output of one declaration
#[derive(Debug, Default)]
pub struct Compiled {
    /// Service closed because this declaration opened a new one
    pub closed_service: Option<Service>,
    /// Records in handle order
    pub records: Vec<AttributeRecord>,
}

impl Compiled {
    fn records(records: Vec<AttributeRecord>) -> Self {
        Self {
            closed_service: None,
            records,
        }
    }
}

type CompileFn = fn(&[Field], &mut CompilationContext) -> CompileResult<Compiled>;

/// Leading keyword of a declaration line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    PrimaryService,
    SecondaryService,
    IncludeService,
    Characteristic,
    CharacteristicUserDescription,
    ClientCharacteristicConfiguration,
    ServerCharacteristicConfiguration,
    CharacteristicFormat,
    CharacteristicAggregateFormat,
    ValidRange,
    ExternalReportReference,
    ReportReference,
    NumberOfDigitals,
    ValueTriggerSetting,
    EnvironmentalSensingConfiguration,
    EnvironmentalSensingMeasurement,
    EnvironmentalSensingTriggerSetting,
}

const KEYWORDS: &[(&str, Keyword)] = &[
    ("PRIMARY_SERVICE", Keyword::PrimaryService),
    ("SECONDARY_SERVICE", Keyword::SecondaryService),
    ("INCLUDE_SERVICE", Keyword::IncludeService),
    ("CHARACTERISTIC", Keyword::Characteristic),
    ("CHARACTERISTIC_USER_DESCRIPTION", Keyword::CharacteristicUserDescription),
    ("CLIENT_CHARACTERISTIC_CONFIGURATION", Keyword::ClientCharacteristicConfiguration),
    ("SERVER_CHARACTERISTIC_CONFIGURATION", Keyword::ServerCharacteristicConfiguration),
    ("CHARACTERISTIC_FORMAT", Keyword::CharacteristicFormat),
    ("CHARACTERISTIC_AGGREGATE_FORMAT", Keyword::CharacteristicAggregateFormat),
    ("VALID_RANGE", Keyword::ValidRange),
    ("EXTERNAL_REPORT_REFERENCE", Keyword::ExternalReportReference),
    ("REPORT_REFERENCE", Keyword::ReportReference),
    ("NUMBER_OF_DIGITALS", Keyword::NumberOfDigitals),
    ("VALUE_TRIGGER_SETTING", Keyword::ValueTriggerSetting),
    ("ENVIRONMENTAL_SENSING_CONFIGURATION", Keyword::EnvironmentalSensingConfiguration),
    ("ENVIRONMENTAL_SENSING_MEASUREMENT", Keyword::EnvironmentalSensingMeasurement),
    ("ENVIRONMENTAL_SENSING_TRIGGER_SETTING", Keyword::EnvironmentalSensingTriggerSetting),
];

impl Keyword {
    pub fn from_name(name: &str) -> Option<Self> {
        KEYWORDS
            .iter()
            .find(|(keyword, _)| *keyword == name)
            .map(|(_, keyword)| *keyword)
    }

    pub fn name(&self) -> &'static str {
        KEYWORDS
            .iter()
            .find(|(_, keyword)| keyword == self)
            .map_or("", |(name, _)| *name)
    }

    /// Attribute type of the record this keyword declares
    pub fn attribute_type(&self) -> u16 {
        match self {
            Keyword::PrimaryService => PRIMARY_SERVICE_UUID,
            Keyword::SecondaryService => SECONDARY_SERVICE_UUID,
            Keyword::IncludeService => INCLUDE_UUID,
            Keyword::Characteristic => CHARACTERISTIC_UUID,
            Keyword::CharacteristicUserDescription => CHAR_USER_DESC_UUID,
            Keyword::ClientCharacteristicConfiguration => CLIENT_CHAR_CONFIG_UUID,
            Keyword::ServerCharacteristicConfiguration => SERVER_CHAR_CONFIG_UUID,
            Keyword::CharacteristicFormat => CHAR_FORMAT_UUID,
            Keyword::CharacteristicAggregateFormat => CHAR_AGGREGATE_FORMAT_UUID,
            Keyword::ValidRange => VALID_RANGE_UUID,
            Keyword::ExternalReportReference => EXTERNAL_REPORT_REF_UUID,
            Keyword::ReportReference => REPORT_REF_UUID,
            Keyword::NumberOfDigitals => NUMBER_OF_DIGITALS_UUID,
            Keyword::ValueTriggerSetting => VALUE_TRIGGER_SETTING_UUID,
            Keyword::EnvironmentalSensingConfiguration => ENV_SENSING_CONFIG_UUID,
            Keyword::EnvironmentalSensingMeasurement => ENV_SENSING_MEASUREMENT_UUID,
            Keyword::EnvironmentalSensingTriggerSetting => ENV_SENSING_TRIGGER_SETTING_UUID,
        }
    }

    fn compiler(&self) -> CompileFn {
        match self {
            Keyword::PrimaryService => compile_primary_service,
            Keyword::SecondaryService => compile_secondary_service,
            Keyword::IncludeService => compile_include_service,
            Keyword::Characteristic => compile_characteristic,
            Keyword::CharacteristicUserDescription => compile_user_description,
            Keyword::ClientCharacteristicConfiguration => compile_client_configuration,
            Keyword::ServerCharacteristicConfiguration => compile_server_configuration,
            Keyword::CharacteristicFormat => compile_format,
            Keyword::CharacteristicAggregateFormat => compile_aggregate_format,
            Keyword::ReportReference => compile_report_reference,
            Keyword::NumberOfDigitals => compile_number_of_digitals,
            Keyword::ValidRange
            | Keyword::ExternalReportReference
            | Keyword::ValueTriggerSetting
            | Keyword::EnvironmentalSensingConfiguration
            | Keyword::EnvironmentalSensingMeasurement
            | Keyword::EnvironmentalSensingTriggerSetting => compile_unimplemented,
        }
    }

    /// Compile one declaration; `fields[0]` is the keyword itself
    pub fn compile(
        &self,
        fields: &[Field],
        ctx: &mut CompilationContext,
    ) -> CompileResult<Compiled> {
        (self.compiler())(fields, ctx)
    }
}

/// Compile a tokenized line, warning about unknown keywords
pub fn compile_declaration(
    fields: &[Field],
    ctx: &mut CompilationContext,
) -> CompileResult<Compiled> {
    let Some(first) = fields.first() else {
        return Ok(Compiled::default());
    };
    match Keyword::from_name(first.as_str()) {
        Some(keyword) => keyword.compile(fields, ctx),
        None => {
            ctx.warn(CompileWarning::UnknownKeyword(first.text.clone()));
            Ok(Compiled::default())
        }
    }
}

fn join(fields: &[Field]) -> String {
    fields
        .iter()
        .map(Field::as_str)
        .collect::<Vec<_>>()
        .join("-")
}

fn read_record(handle: u16, type_: u16, value: Vec<u8>) -> AttributeRecord {
    AttributeRecord::new(handle, PropertyFlags::READ.record_flags(), Uuid::Uuid16(type_), value)
}

fn compile_service(
    fields: &[Field],
    ctx: &mut CompilationContext,
    keyword: Keyword,
) -> CompileResult<Compiled> {
    let token = field(fields, 1, keyword.name())?.as_str();
    let uuid = ctx.resolve_uuid(token)?;

    let closed_service = ctx.open_service(token)?;
    let handle = ctx.allocate_handle()?;
    let record = read_record(handle, keyword.attribute_type(), uuid.as_bytes())
        .with_comment(join(fields));

    Ok(Compiled {
        closed_service,
        records: vec![record],
    })
}

fn compile_primary_service(
    fields: &[Field],
    ctx: &mut CompilationContext,
) -> CompileResult<Compiled> {
    compile_service(fields, ctx, Keyword::PrimaryService)
}

fn compile_secondary_service(
    fields: &[Field],
    ctx: &mut CompilationContext,
) -> CompileResult<Compiled> {
    compile_service(fields, ctx, Keyword::SecondaryService)
}

fn compile_include_service(
    fields: &[Field],
    ctx: &mut CompilationContext,
) -> CompileResult<Compiled> {
    let token = field(fields, 1, "INCLUDE_SERVICE")?.as_str();
    let uuid = ctx.resolve_uuid(token)?;
    let service = ctx
        .service(&symbol_key(token))
        .cloned()
        .ok_or_else(|| CompileError::UnknownService(token.to_string()))?;

    let mut value = Vec::with_capacity(6);
    value.extend_from_slice(&service.start_handle.to_le_bytes());
    value.extend_from_slice(&service.end_handle.to_le_bytes());
    // 128-bit service UUIDs are left for the client to read
    if !uuid.is_long() {
        value.extend(uuid.as_bytes());
    }

    let handle = ctx.allocate_handle()?;
    Ok(Compiled::records(vec![
        read_record(handle, INCLUDE_UUID, value).with_comment(join(fields)),
    ]))
}

fn compile_characteristic(
    fields: &[Field],
    ctx: &mut CompilationContext,
) -> CompileResult<Compiled> {
    let token = field(fields, 1, "CHARACTERISTIC")?.as_str();
    let uuid = ctx.resolve_uuid(token)?;
    let properties = ctx.parse_properties(field(fields, 2, "CHARACTERISTIC")?.as_str());
    let value_field = fields.get(3).cloned().unwrap_or_else(|| Field::new(""));
    let value = value_field.literal_bytes()?;
    let tag = fields.get(4).map(Field::as_str).filter(|tag| !tag.is_empty());

    ctx.begin_characteristic(token, tag);
    let layout = CharacteristicLayout::new(uuid, properties, value);

    let declaration_handle = ctx.allocate_handle()?;
    for _ in 1..layout.record_count() {
        ctx.allocate_handle()?;
    }

    let mut records = layout.records(declaration_handle);
    records[0].comment = join(&fields[..fields.len().min(3)]);
    records[1].comment = format!(
        "VALUE-{}-'{}'",
        join(&fields[1..fields.len().min(3)]),
        value_field.text
    );

    ctx.define_characteristic_handle("VALUE", records[1].handle);
    if let Some(ccc) = records
        .iter()
        .find(|record| record.type_u16() == Some(CLIENT_CHAR_CONFIG_UUID))
    {
        let handle = ccc.handle;
        ctx.define_characteristic_handle("CLIENT_CONFIGURATION", handle);
    }

    Ok(Compiled::records(records))
}

fn compile_user_description(
    fields: &[Field],
    ctx: &mut CompilationContext,
) -> CompileResult<Compiled> {
    let keyword = "CHARACTERISTIC_USER_DESCRIPTION";
    let properties = ctx.parse_properties(field(fields, 1, keyword)?.as_str());
    let value = field(fields, 2, keyword)?.literal_bytes()?;

    let handle = ctx.allocate_handle()?;
    ctx.define_characteristic_handle("USER_DESCRIPTION", handle);

    let record = AttributeRecord::new(
        handle,
        properties.record_flags(),
        Uuid::Uuid16(CHAR_USER_DESC_UUID),
        value,
    )
    .with_comment(join(fields));
    Ok(Compiled::records(vec![record]))
}

fn compile_client_configuration(
    _fields: &[Field],
    _ctx: &mut CompilationContext,
) -> CompileResult<Compiled> {
    debug!("CLIENT_CHARACTERISTIC_CONFIGURATION is generated from NOTIFY/INDICATE, ignoring");
    Ok(Compiled::default())
}

fn compile_server_configuration(
    fields: &[Field],
    ctx: &mut CompilationContext,
) -> CompileResult<Compiled> {
    let declared = field(fields, 1, "SERVER_CHARACTERISTIC_CONFIGURATION")?.as_str();
    let properties = ctx.parse_properties(declared) | PropertyFlags::DYNAMIC;

    let handle = ctx.allocate_handle()?;
    ctx.define_characteristic_handle("SERVER_CONFIGURATION", handle);

    let record = AttributeRecord::new(
        handle,
        properties.record_flags(),
        Uuid::Uuid16(SERVER_CHAR_CONFIG_UUID),
        Vec::new(),
    )
    .with_comment(join(fields));
    Ok(Compiled::records(vec![record]))
}

/// Resolve a UUID field that must fit in 16 bits
fn short_uuid(ctx: &CompilationContext, token: &str) -> CompileResult<u16> {
    ctx.resolve_uuid(token)?
        .as_u16()
        .ok_or_else(|| CompileError::InvalidValue(format!("'{}' is not a 16-bit UUID", token)))
}

fn compile_format(fields: &[Field], ctx: &mut CompilationContext) -> CompileResult<Compiled> {
    let keyword = "CHARACTERISTIC_FORMAT";
    let identifier = field(fields, 1, keyword)?.as_str();
    let format = parse_hex_byte(field(fields, 2, keyword)?.as_str())?;
    let exponent = parse_hex_byte(field(fields, 3, keyword)?.as_str())?;
    let unit = short_uuid(ctx, field(fields, 4, keyword)?.as_str())?;
    let name_space = parse_hex_byte(field(fields, 5, keyword)?.as_str())?;
    let description = short_uuid(ctx, field(fields, 6, keyword)?.as_str())?;

    let mut value = Vec::with_capacity(7);
    value.push(format);
    value.push(exponent);
    value.extend_from_slice(&unit.to_le_bytes());
    value.push(name_space);
    value.extend_from_slice(&description.to_le_bytes());

    let handle = ctx.allocate_handle()?;
    ctx.register_format(identifier, handle);

    Ok(Compiled::records(vec![
        read_record(handle, CHAR_FORMAT_UUID, value).with_comment(join(fields)),
    ]))
}

fn compile_aggregate_format(
    fields: &[Field],
    ctx: &mut CompilationContext,
) -> CompileResult<Compiled> {
    let mut value = Vec::with_capacity(2 * fields.len().saturating_sub(1));
    for identifier in fields.iter().skip(1) {
        let format_handle = ctx
            .format_handle(identifier.as_str())
            .ok_or_else(|| CompileError::UnknownFormat(identifier.text.clone()))?;
        value.extend_from_slice(&format_handle.to_le_bytes());
    }

    let handle = ctx.allocate_handle()?;
    Ok(Compiled::records(vec![
        read_record(handle, CHAR_AGGREGATE_FORMAT_UUID, value).with_comment(join(fields)),
    ]))
}

fn compile_report_reference(
    fields: &[Field],
    ctx: &mut CompilationContext,
) -> CompileResult<Compiled> {
    let keyword = "REPORT_REFERENCE";
    // declared flags are checked but the descriptor is always read-only
    ctx.parse_properties(field(fields, 1, keyword)?.as_str());
    let report_id = parse_hex_byte(field(fields, 2, keyword)?.as_str())?;
    let report_type = parse_hex_byte(field(fields, 3, keyword)?.as_str())?;

    let handle = ctx.allocate_handle()?;
    Ok(Compiled::records(vec![read_record(
        handle,
        REPORT_REF_UUID,
        vec![report_id, report_type],
    )
    .with_comment(join(fields))]))
}

fn compile_number_of_digitals(
    fields: &[Field],
    ctx: &mut CompilationContext,
) -> CompileResult<Compiled> {
    let keyword = "NUMBER_OF_DIGITALS";
    // the flags field is optional: `NUMBER_OF_DIGITALS, <count>` is accepted too
    let count = if fields.len() > 2 {
        ctx.parse_properties(fields[1].as_str());
        field(fields, 2, keyword)?
    } else {
        field(fields, 1, keyword)?
    };
    let count = parse_hex_byte(count.as_str())?;

    let handle = ctx.allocate_handle()?;
    Ok(Compiled::records(vec![
        read_record(handle, NUMBER_OF_DIGITALS_UUID, vec![count]).with_comment(join(fields)),
    ]))
}

fn compile_unimplemented(
    fields: &[Field],
    ctx: &mut CompilationContext,
) -> CompileResult<Compiled> {
    if let Some(keyword) = fields.first() {
        ctx.warn(CompileWarning::Unimplemented(keyword.text.clone()));
    }
    Ok(Compiled::default())
}
