//! Unit tests for the declaration compilers

use super::*;
use crate::att::constants::*;
use crate::att::AttributeRecord;
use crate::error::{CompileError, CompileWarning};
use crate::uuid::{Uuid, UuidResolver};

fn context() -> CompilationContext {
    CompilationContext::new(UuidResolver::new())
}

/// Split a line on commas the simple way; none of these lines quote commas
fn fields(line: &str) -> Vec<Field> {
    line.split(',')
        .map(|part| {
            let part = part.trim();
            if part.starts_with('"') {
                Field::quoted(part.trim_matches('"'))
            } else {
                Field::new(part)
            }
        })
        .collect()
}

fn compile(ctx: &mut CompilationContext, line: &str) -> Vec<AttributeRecord> {
    compile_declaration(&fields(line), ctx).unwrap().records
}

#[test]
fn test_device_name_scenario() {
    let mut ctx = context();
    let mut records = compile(&mut ctx, "PRIMARY_SERVICE, 1800");
    records.extend(compile(&mut ctx, "CHARACTERISTIC, 2A00, READ | WRITE, \"Device\""));
    let closed = ctx.close_service().unwrap();

    assert_eq!((closed.start_handle, closed.end_handle), (1, 3));
    assert_eq!(records.len(), 3);

    assert_eq!(records[0].handle, 1);
    assert_eq!(records[0].type_u16(), Some(PRIMARY_SERVICE_UUID));
    assert_eq!(records[0].value, vec![0x00, 0x18]);

    assert_eq!(records[1].handle, 2);
    assert_eq!(records[1].type_u16(), Some(CHARACTERISTIC_UUID));
    assert_eq!(records[1].value, vec![0x0a, 0x03, 0x00, 0x00, 0x2a]);

    assert_eq!(records[2].handle, 3);
    assert_eq!(records[2].uuid, Some(Uuid::Uuid16(0x2a00)));
    assert_eq!(records[2].value, b"Device".to_vec());

    assert_eq!(
        ctx.characteristic_defines(),
        &["#define ATT_CHARACTERISTIC_2A00_01_VALUE_HANDLE 0x0003".to_string()]
    );
}

#[test]
fn test_service_declarations() {
    let mut ctx = context();
    let compiled = compile_declaration(&fields("SECONDARY_SERVICE, GATT_SERVICE"), &mut ctx).unwrap();
    assert!(compiled.closed_service.is_none());
    assert_eq!(compiled.records[0].type_u16(), Some(SECONDARY_SERVICE_UUID));
    assert_eq!(compiled.records[0].comment, "SECONDARY_SERVICE-GATT_SERVICE");

    let compiled = compile_declaration(
        &fields("PRIMARY_SERVICE, 6E400001-B5A3-F393-E0A9-E50E24DCCA9E"),
        &mut ctx,
    )
    .unwrap();
    let closed = compiled.closed_service.unwrap();
    assert_eq!(closed.key, "GATT_SERVICE");
    assert_eq!((closed.start_handle, closed.end_handle), (1, 1));
    assert_eq!(compiled.records[0].handle, 2);
    assert_eq!(compiled.records[0].value.len(), 16);
    assert_eq!(compiled.records[0].size(), 6 + 2 + 16);
}

#[test]
fn test_include_service() {
    let mut ctx = context();
    compile(&mut ctx, "PRIMARY_SERVICE, 180F");
    compile(&mut ctx, "CHARACTERISTIC, 2A19, READ, 64");
    compile(&mut ctx, "PRIMARY_SERVICE, 6E400001-B5A3-F393-E0A9-E50E24DCCA9E");
    compile(&mut ctx, "PRIMARY_SERVICE, 1812");

    let records = compile(&mut ctx, "INCLUDE_SERVICE, 180F");
    assert_eq!(records[0].handle, 6);
    assert_eq!(records[0].type_u16(), Some(INCLUDE_UUID));
    assert_eq!(records[0].value, vec![0x01, 0x00, 0x03, 0x00, 0x0f, 0x18]);

    // 128-bit UUIDs are left out of the payload
    let records = compile(&mut ctx, "INCLUDE_SERVICE, 6E400001-B5A3-F393-E0A9-E50E24DCCA9E");
    assert_eq!(records[0].value, vec![0x04, 0x00, 0x04, 0x00]);
    assert_eq!(records[0].size(), 6 + 2 + 4);
}

#[test]
fn test_include_unknown_service_is_fatal() {
    let mut ctx = context();
    compile(&mut ctx, "PRIMARY_SERVICE, 1800");
    let result = compile_declaration(&fields("INCLUDE_SERVICE, 180A"), &mut ctx);
    assert!(matches!(result, Err(CompileError::UnknownService(key)) if key == "180A"));
}

#[test]
fn test_include_open_service_is_fatal() {
    let mut ctx = context();
    compile(&mut ctx, "PRIMARY_SERVICE, 1800");
    let result = compile_declaration(&fields("INCLUDE_SERVICE, 1800"), &mut ctx);
    assert!(matches!(result, Err(CompileError::UnknownService(_))));
}

#[test]
fn test_characteristic_tag_and_ccc_define() {
    let mut ctx = context();
    compile(&mut ctx, "PRIMARY_SERVICE, 180D");
    let records = compile(&mut ctx, "CHARACTERISTIC, 2A37, NOTIFY, 00 00, Heart Rate");
    assert_eq!(records.len(), 3);
    assert_eq!(records[2].type_u16(), Some(CLIENT_CHAR_CONFIG_UUID));
    assert_eq!(records[1].comment, "VALUE-2A37-NOTIFY-'00 00'");
    assert_eq!(
        ctx.characteristic_defines(),
        &[
            "#define ATT_CHARACTERISTIC_2A37_HEART_RATE_VALUE_HANDLE 0x0003".to_string(),
            "#define ATT_CHARACTERISTIC_2A37_HEART_RATE_CLIENT_CONFIGURATION_HANDLE 0x0004"
                .to_string(),
        ]
    );
    assert_eq!(ctx.next_handle().unwrap(), 5);
}

#[test]
fn test_unresolvable_characteristic_uuid() {
    let mut ctx = context();
    let result = compile_declaration(&fields("CHARACTERISTIC, XYZ, READ, 00"), &mut ctx);
    assert!(matches!(result, Err(CompileError::UnresolvedUuid(_))));
}

#[test]
fn test_descriptors() {
    let mut ctx = context();
    compile(&mut ctx, "PRIMARY_SERVICE, 181A");
    compile(&mut ctx, "CHARACTERISTIC, 2A6E, READ | DYNAMIC, 00 00");

    let records = compile(&mut ctx, "CHARACTERISTIC_USER_DESCRIPTION, READ, \"Temp\"");
    assert_eq!(records[0].type_u16(), Some(CHAR_USER_DESC_UUID));
    assert_eq!(records[0].flags, 0x0002);
    assert_eq!(records[0].value, b"Temp".to_vec());
    assert_eq!(records[0].size(), 12);

    let records = compile(&mut ctx, "SERVER_CHARACTERISTIC_CONFIGURATION, READ | WRITE");
    assert_eq!(records[0].type_u16(), Some(SERVER_CHAR_CONFIG_UUID));
    assert_eq!(records[0].flags, 0x010a);
    assert!(records[0].value.is_empty());

    assert_eq!(
        &ctx.characteristic_defines()[1..],
        &[
            "#define ATT_CHARACTERISTIC_2A6E_01_USER_DESCRIPTION_HANDLE 0x0004".to_string(),
            "#define ATT_CHARACTERISTIC_2A6E_01_SERVER_CONFIGURATION_HANDLE 0x0005".to_string(),
        ]
    );
}

#[test]
fn test_explicit_client_configuration_is_ignored() {
    let mut ctx = context();
    compile(&mut ctx, "PRIMARY_SERVICE, 1800");
    let records = compile(&mut ctx, "CLIENT_CHARACTERISTIC_CONFIGURATION, READ | WRITE");
    assert!(records.is_empty());
    assert_eq!(ctx.next_handle().unwrap(), 2);
    assert!(ctx.warnings().is_empty());
}

#[test]
fn test_formats_and_aggregate() {
    let mut ctx = context();
    compile(&mut ctx, "PRIMARY_SERVICE, 181A");
    let records = compile(&mut ctx, "CHARACTERISTIC_FORMAT, temp, 0E, FE, 272F, 01, 0000");
    assert_eq!(records[0].handle, 2);
    assert_eq!(records[0].type_u16(), Some(CHAR_FORMAT_UUID));
    assert_eq!(records[0].value, vec![0x0e, 0xfe, 0x2f, 0x27, 0x01, 0x00, 0x00]);
    compile(&mut ctx, "CHARACTERISTIC_FORMAT, hum, 06, 00, 27AD, 01, 0000");

    let records = compile(&mut ctx, "CHARACTERISTIC_AGGREGATE_FORMAT, temp, hum");
    assert_eq!(records[0].type_u16(), Some(CHAR_AGGREGATE_FORMAT_UUID));
    assert_eq!(records[0].value, vec![0x02, 0x00, 0x03, 0x00]);

    let result = compile_declaration(
        &fields("CHARACTERISTIC_AGGREGATE_FORMAT, temp, pressure"),
        &mut ctx,
    );
    assert!(matches!(result, Err(CompileError::UnknownFormat(id)) if id == "pressure"));
}

#[test]
fn test_report_reference_and_digitals() {
    let mut ctx = context();
    compile(&mut ctx, "PRIMARY_SERVICE, 1812");

    let records = compile(&mut ctx, "REPORT_REFERENCE, READ, 1, 2");
    assert_eq!(records[0].type_u16(), Some(REPORT_REF_UUID));
    assert_eq!(records[0].value, vec![0x01, 0x02]);
    assert_eq!(records[0].flags, 0x0002);

    let records = compile(&mut ctx, "NUMBER_OF_DIGITALS, READ, 08");
    assert_eq!(records[0].type_u16(), Some(NUMBER_OF_DIGITALS_UUID));
    assert_eq!(records[0].value, vec![0x08]);

    let records = compile(&mut ctx, "NUMBER_OF_DIGITALS, 04");
    assert_eq!(records[0].value, vec![0x04]);
}

#[test]
fn test_unimplemented_and_unknown_keywords() {
    let mut ctx = context();
    compile(&mut ctx, "PRIMARY_SERVICE, 181A");
    assert!(compile(&mut ctx, "VALID_RANGE, READ, 00 10").is_empty());
    assert!(compile(&mut ctx, "ENVIRONMENTAL_SENSING_MEASUREMENT, READ").is_empty());
    assert!(compile(&mut ctx, "FROBNICATE, 1").is_empty());
    assert_eq!(ctx.next_handle().unwrap(), 2);
    assert_eq!(
        ctx.warnings(),
        &[
            CompileWarning::Unimplemented("VALID_RANGE".into()),
            CompileWarning::Unimplemented("ENVIRONMENTAL_SENSING_MEASUREMENT".into()),
            CompileWarning::UnknownKeyword("FROBNICATE".into()),
        ]
    );
}

#[test]
fn test_missing_field() {
    let mut ctx = context();
    let result = compile_declaration(&fields("PRIMARY_SERVICE"), &mut ctx);
    assert!(matches!(
        result,
        Err(CompileError::MissingField { keyword: "PRIMARY_SERVICE", index: 1 })
    ));
}

#[test]
fn test_keyword_table() {
    assert_eq!(Keyword::from_name("REPORT_REFERENCE"), Some(Keyword::ReportReference));
    assert_eq!(Keyword::ReportReference.name(), "REPORT_REFERENCE");
    assert_eq!(Keyword::ValueTriggerSetting.attribute_type(), VALUE_TRIGGER_SETTING_UUID);
    assert_eq!(Keyword::from_name("primary_service"), None);
}
