use crate::binary::section::SectionCode;
use nom::{bytes::complete::{tag, take}, multi::many0, number::complete::{le_u32, le_u8}, sequence::pair, IResult};
use nom_leb128::{leb128_i32, leb128_i64, leb128_u32};
use num_traits::FromPrimitive;

use super::types::{Export, ExportDesc, FuncType, Global, GlobalType, Import, ImportDesc, Limits, TableType, ValueType};

const WASM_MAGIC: &str = "\0asm";

#[derive(Debug, PartialEq, Eq)]
pub struct Module {
    pub magic: String,
    pub version: u32,
    pub type_section: Option<Vec<FuncType>>,
    pub fn_section: Option<Vec<u32>>,
    pub import_section: Option<Vec<Import>>,
    pub global_section: Option<Vec<Global>>,
    pub export_section: Option<Vec<Export>>,
}

impl Default for Module {
    fn default() -> Self {
        Self {
            magic: WASM_MAGIC.to_string(), version: 1,
            type_section: None, fn_section: None,
            import_section: None, global_section: None,
            export_section: None,
        }
    }
}

impl Module {
    pub fn new(wasm: &[u8]) -> anyhow::Result<Self> {
        let (_, module) = Module::decode(wasm)
            .map_err(|err| anyhow::anyhow!("failed to parse wasm: {}", err))?;
        Ok(module)
    }

    fn decode(input: &[u8]) -> IResult<&[u8], Module> {
        let (input, _) = tag(WASM_MAGIC.as_bytes())(input)?;
        let (input, version) = le_u32(input)?;

        let mut module = Module { magic: WASM_MAGIC.to_string(), version, ..Default::default() };

        let mut remaining = input;

        while !remaining.is_empty() {
            match decode_section_header(remaining) {
                Ok((input, (code, sz))) => {
                    let (rest, section_contents) = take(sz)(input)?;

                    match code {
                        SectionCode::Type => {
                            let (_, tys) = decode_type_section(section_contents)?;
                            module.type_section = Some(tys);
                        }
                        SectionCode::Function => {
                            let (_, fns) = decode_function_section(section_contents)?;
                            module.fn_section = Some(fns);
                        }
                        SectionCode::Import => {
                            let (_, imports) = decode_import_section(section_contents)?;
                            module.import_section = Some(imports);
                        }
                        SectionCode::Global => {
                            let (_, globals) = decode_global_section(section_contents)?;
                            module.global_section = Some(globals);
                        }
                        SectionCode::Export => {
                            let (_, exports) = decode_export_section(section_contents)?;
                            module.export_section = Some(exports);
                        }
                        // The remaining sections carry no interface information.
                        SectionCode::Custom
                        | SectionCode::Table
                        | SectionCode::Memory
                        | SectionCode::Start
                        | SectionCode::Element
                        | SectionCode::Code
                        | SectionCode::Data
                        | SectionCode::DataCount => {
                            // skip
                        }
                    }
                    remaining = rest;
                }
                Err(err) => return Err(err),
            }
        }

        Ok((input, module))
    }
}

fn decode_failure<T>(input: &[u8]) -> IResult<&[u8], T> {
    use nom::error::Error as NomError;
    use nom::error::ErrorKind as NomErrKind;
    Err(nom::Err::Failure(NomError { input, code: NomErrKind::Verify }))
}

fn decode_section_header(input: &[u8]) -> IResult<&[u8], (SectionCode, u32)> {
    let (input, (code, sz)) = pair(le_u8, leb128_u32)(input)?;

    match SectionCode::from_u8(code) {
        Some(code) => Ok((input, (code, sz))),
        None => decode_failure(input),
    }
}

fn decode_value_type(input: &[u8]) -> IResult<&[u8], ValueType> {
    let (input, v) = le_u8(input)?;

    match ValueType::from_u8(v) {
        Some(ty) => Ok((input, ty)),
        None => decode_failure(input),
    }
}

fn decode_type_section(input: &[u8]) -> IResult<&[u8], Vec<FuncType>> {
    let (mut input, type_count) = leb128_u32(input)?;
    let mut fns = vec![];

    for _ in 0..type_count {
        let (rest, _) = le_u8(input)?; // omit fn sig
        // decode fn parameter types
        let (rest, tys) = decode_raw_seq(rest)?;
        let (_, params) = many0(decode_value_type)(tys)?;

        // decode fn return types
        let (rest, tys) = decode_raw_seq(rest)?;
        let (_, returns) = many0(decode_value_type)(tys)?;

        fns.push(FuncType { params, returns });
        input = rest;
    }

    Ok((input, fns))
}

fn decode_function_section(input: &[u8]) -> IResult<&[u8], Vec<u32>> {
    let mut fns = vec![];
    let (mut input, count) = leb128_u32(input)?;

    for _ in 0..count {
        let (rest, i) = leb128_u32(input)?;
        fns.push(i);
        input = rest;
    }

    Ok((input, fns))
}

fn decode_raw_seq(input: &[u8]) -> IResult<&[u8], &[u8]> {
    let (rest, sz) = leb128_u32(input)?;
    let (rest, bytes) = take(sz)(rest)?;

    Ok((rest, bytes))
}

fn decode_name(input: &[u8]) -> IResult<&[u8], String> {
    let (rest, name_bytes) = decode_raw_seq(input)?;

    match String::from_utf8(name_bytes.to_vec()) {
        Ok(name) => Ok((rest, name)),
        Err(_) => decode_failure(input),
    }
}

fn decode_limits(input: &[u8]) -> IResult<&[u8], Limits> {
    let (input, has_max) = le_u8(input)?;
    let (input, initial) = leb128_u32(input)?;

    match has_max {
        0 => Ok((input, Limits { initial, max: None })),
        1 => {
            let (input, max) = leb128_u32(input)?;
            Ok((input, Limits { initial, max: Some(max) }))
        }
        _ => decode_failure(input),
    }
}

fn decode_table_type(input: &[u8]) -> IResult<&[u8], TableType> {
    let (input, element) = decode_value_type(input)?;
    let (input, limits) = decode_limits(input)?;

    Ok((input, TableType { element, limits }))
}

fn decode_global_type(input: &[u8]) -> IResult<&[u8], GlobalType> {
    let (input, value_type) = decode_value_type(input)?;
    let (input, mutability) = le_u8(input)?;

    match mutability {
        0 => Ok((input, GlobalType { value_type, mutable: false })),
        1 => Ok((input, GlobalType { value_type, mutable: true })),
        _ => decode_failure(input),
    }
}

// Init expressions here are a single const-style instruction followed by end.
fn decode_init_expr(input: &[u8]) -> IResult<&[u8], ()> {
    let (input, opcode) = le_u8(input)?;

    let input = match opcode {
        0x41 => leb128_i32(input)?.0,       // i32.const
        0x42 => leb128_i64(input)?.0,       // i64.const
        0x43 => take(4usize)(input)?.0,     // f32.const
        0x44 => take(8usize)(input)?.0,     // f64.const
        0x23 => leb128_u32(input)?.0,       // global.get
        0xD0 => le_u8(input)?.0,            // ref.null
        0xD2 => leb128_u32(input)?.0,       // ref.func
        _ => return decode_failure(input),
    };

    let (input, end) = le_u8(input)?;
    match end {
        0x0b => Ok((input, ())),
        _ => decode_failure(input),
    }
}

fn decode_global_section(input: &[u8]) -> IResult<&[u8], Vec<Global>> {
    let (input, count) = leb128_u32(input)?;
    let mut globals = vec![];

    let mut remaining = input;

    for _ in 0..count {
        let (rest, ty) = decode_global_type(remaining)?;
        let (rest, _) = decode_init_expr(rest)?;

        globals.push(Global { ty });

        remaining = rest;
    }

    Ok((remaining, globals))
}

fn decode_export_section(input: &[u8]) -> IResult<&[u8], Vec<Export>> {
    let (input, count) = leb128_u32(input)?;
    let mut exports = vec![];

    let mut remaining = input;

    for _ in 0..count {
        let (rest, name) = decode_name(remaining)?;
        let (rest, kind) = le_u8(rest)?;
        let (rest, i) = leb128_u32(rest)?;

        let desc = match kind {
            0x00 => ExportDesc::Func(i),
            0x01 => ExportDesc::Table(i),
            0x02 => ExportDesc::Memory(i),
            0x03 => ExportDesc::Global(i),
            _ => return decode_failure(rest),
        };
        exports.push(Export { name, desc });

        remaining = rest;
    }

    Ok((remaining, exports))
}

fn decode_import_section(input: &[u8]) -> IResult<&[u8], Vec<Import>> {
    let (input, count) = leb128_u32(input)?;
    let mut imports = vec![];

    let mut remaining = input;

    for _ in 0..count {
        let (rest, mod_name) = decode_name(remaining)?;
        let (rest, field_name) = decode_name(rest)?;
        let (rest, kind) = le_u8(rest)?;

        let (rest, desc) = match kind {
            0x00 => {
                let (rest, i) = leb128_u32(rest)?;
                (rest, ImportDesc::Func(i))
            }
            0x01 => {
                let (rest, ty) = decode_table_type(rest)?;
                (rest, ImportDesc::Table(ty))
            }
            0x02 => {
                let (rest, limits) = decode_limits(rest)?;
                (rest, ImportDesc::Memory(limits))
            }
            0x03 => {
                let (rest, ty) = decode_global_type(rest)?;
                (rest, ImportDesc::Global(ty))
            }
            _ => return decode_failure(rest),
        };
        imports.push(Import { mod_name, field_name, desc });

        remaining = rest;
    }

    Ok((remaining, imports))
}
