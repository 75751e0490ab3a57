use anyhow::{bail, Result};

use crate::binary::{module::Module, types::{ExportDesc, FuncType, ImportDesc}};

/// Function arity only; value types are not distinguished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub params: u32,
    pub results: u32,
}

impl From<&FuncType> for Signature {
    fn from(ty: &FuncType) -> Self {
        Self { params: ty.params.len() as u32, results: ty.returns.len() as u32 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncImport {
    pub module: String,
    pub name: String,
    pub signature: Signature,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedImport {
    pub module: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncExport {
    pub name: String,
    pub signature: Signature,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalExport {
    pub name: String,
    pub mutable: bool,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportSet {
    pub fns: Vec<FuncImport>,
    pub globals: Vec<NamedImport>,
    pub memories: Vec<NamedImport>,
    pub tables: Vec<NamedImport>,
}

impl ImportSet {
    pub fn is_empty(&self) -> bool {
        self.fns.is_empty() && self.globals.is_empty() && self.memories.is_empty() && self.tables.is_empty()
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ExportSet {
    pub fns: Vec<FuncExport>,
    pub globals: Vec<GlobalExport>,
    pub memories: Vec<String>,
    pub tables: Vec<String>,
}

/// Normalized record of a module's resolved imports and exports.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ModuleDescriptor {
    pub imports: ImportSet,
    pub exports: ExportSet,
}

impl ModuleDescriptor {
    pub fn new(module: &Module) -> Result<Self> {
        let type_table = module.type_section.as_deref().unwrap_or_default()
            .iter()
            .map(Signature::from)
            .collect::<Vec<_>>()
        ;

        // Signatures indexed by the function index space: imported functions
        // occupy the leading slots, locally defined functions follow. The
        // global index space is unified the same way for mutability lookups.
        let mut fn_table = vec![];
        let mut global_table = vec![];

        let mut imports = ImportSet::default();

        if let Some(section) = &module.import_section {
            for import in section {
                let named = || NamedImport { module: import.mod_name.clone(), name: import.field_name.clone() };

                match &import.desc {
                    ImportDesc::Func(type_index) => {
                        let Some(signature) = type_table.get(*type_index as usize) else {
                            bail!("unresolved type index {type_index} for import {}/{}", import.mod_name, import.field_name);
                        };

                        fn_table.push(*signature);
                        imports.fns.push(FuncImport {
                            module: import.mod_name.clone(),
                            name: import.field_name.clone(),
                            signature: *signature,
                        });
                    }
                    ImportDesc::Global(ty) => {
                        global_table.push(ty.mutable);
                        imports.globals.push(named());
                    }
                    ImportDesc::Memory(_) => imports.memories.push(named()),
                    ImportDesc::Table(_) => imports.tables.push(named()),
                }
            }
        }

        if let Some(section) = &module.fn_section {
            for type_index in section {
                let Some(signature) = type_table.get(*type_index as usize) else {
                    bail!("unresolved type index {type_index} in function section");
                };

                fn_table.push(*signature);
            }
        }

        if let Some(section) = &module.global_section {
            for global in section {
                global_table.push(global.ty.mutable);
            }
        }

        let mut exports = ExportSet::default();

        if let Some(section) = &module.export_section {
            for export in section {
                match export.desc {
                    ExportDesc::Func(index) => {
                        let Some(signature) = fn_table.get(index as usize) else {
                            bail!("unresolved function index {index} for export {}", export.name);
                        };

                        exports.fns.push(FuncExport { name: export.name.clone(), signature: *signature });
                    }
                    ExportDesc::Global(index) => {
                        let Some(mutable) = global_table.get(index as usize) else {
                            bail!("unresolved global index {index} for export {}", export.name);
                        };

                        exports.globals.push(GlobalExport { name: export.name.clone(), mutable: *mutable });
                    }
                    ExportDesc::Memory(_) => exports.memories.push(export.name.clone()),
                    ExportDesc::Table(_) => exports.tables.push(export.name.clone()),
                }
            }
        }

        Ok(Self { imports, exports })
    }
}

#[cfg(test)]
mod descriptor_tests {
    use anyhow::Result;
    use pretty_assertions::assert_eq;

    use crate::binary::module::Module;
    use super::{ExportSet, FuncExport, FuncImport, GlobalExport, ImportSet, ModuleDescriptor, NamedImport, Signature};

    fn describe(wat: &str) -> Result<ModuleDescriptor> {
        let wasm = wat::parse_str(wat)?;
        let module = Module::new(&wasm)?;
        ModuleDescriptor::new(&module)
    }

    #[test]
    fn empty_module_has_empty_descriptor() -> Result<()> {
        let descriptor = describe("(module)")?;
        assert_eq!(ModuleDescriptor::default(), descriptor);
        assert!(descriptor.imports.is_empty());
        Ok(())
    }

    #[test]
    fn resolves_exported_fn_signature() -> Result<()> {
        let descriptor = describe(r#"
            (module
              (func (export "add") (param i32 i32) (result i32)
                local.get 0 local.get 1 i32.add))
        "#)?;

        let expected = ExportSet {
            fns: vec![FuncExport { name: "add".to_string(), signature: Signature { params: 2, results: 1 } }],
            ..Default::default()
        };
        assert_eq!(expected, descriptor.exports);
        Ok(())
    }

    #[test]
    fn export_index_spans_imported_functions() -> Result<()> {
        // "add" is function index 1: the import occupies slot 0
        let descriptor = describe(r#"
            (module
              (import "env" "log" (func (param i32)))
              (func (export "add") (param i32 i32) (result i32)
                local.get 0 local.get 1 i32.add))
        "#)?;

        let expected = ExportSet {
            fns: vec![FuncExport { name: "add".to_string(), signature: Signature { params: 2, results: 1 } }],
            ..Default::default()
        };
        assert_eq!(expected, descriptor.exports);

        let expected = ImportSet {
            fns: vec![FuncImport {
                module: "env".to_string(),
                name: "log".to_string(),
                signature: Signature { params: 1, results: 0 },
            }],
            ..Default::default()
        };
        assert_eq!(expected, descriptor.imports);
        Ok(())
    }

    #[test]
    fn reexported_imported_fn_resolves_against_import_slot() -> Result<()> {
        let descriptor = describe(r#"
            (module
              (import "env" "log" (func $log (param i32)))
              (export "log" (func $log)))
        "#)?;

        let expected = vec![
            FuncExport { name: "log".to_string(), signature: Signature { params: 1, results: 0 } }
        ];
        assert_eq!(expected, descriptor.exports.fns);
        Ok(())
    }

    #[test]
    fn records_global_export_mutability() -> Result<()> {
        let descriptor = describe(r#"
            (module
              (global (export "fixed") i32 (i32.const 1))
              (global (export "counter") (mut i32) (i32.const 0)))
        "#)?;

        let expected = vec![
            GlobalExport { name: "fixed".to_string(), mutable: false },
            GlobalExport { name: "counter".to_string(), mutable: true },
        ];
        assert_eq!(expected, descriptor.exports.globals);
        // a global export must not leak into the memory category
        assert!(descriptor.exports.memories.is_empty());
        Ok(())
    }

    #[test]
    fn global_export_index_spans_imported_globals() -> Result<()> {
        let descriptor = describe(r#"
            (module
              (import "env" "base" (global i32))
              (global (export "counter") (mut i32) (i32.const 0)))
        "#)?;

        let expected = vec![GlobalExport { name: "counter".to_string(), mutable: true }];
        assert_eq!(expected, descriptor.exports.globals);
        Ok(())
    }

    #[test]
    fn classifies_memory_and_table_exports_by_name() -> Result<()> {
        let descriptor = describe(r#"
            (module
              (memory (export "mem") 1)
              (table (export "tbl") 2 funcref))
        "#)?;

        assert_eq!(vec!["mem".to_string()], descriptor.exports.memories);
        assert_eq!(vec!["tbl".to_string()], descriptor.exports.tables);
        assert!(descriptor.exports.fns.is_empty());
        assert!(descriptor.exports.globals.is_empty());
        Ok(())
    }

    #[test]
    fn groups_imports_by_kind() -> Result<()> {
        let descriptor = describe(r#"
            (module
              (import "env" "mem" (memory 1))
              (import "env" "tbl" (table 2 funcref))
              (import "env" "base" (global i32))
              (import "host" "now" (func (result i32))))
        "#)?;

        let expected = ImportSet {
            fns: vec![FuncImport { module: "host".to_string(), name: "now".to_string(), signature: Signature { params: 0, results: 1 } }],
            globals: vec![NamedImport { module: "env".to_string(), name: "base".to_string() }],
            memories: vec![NamedImport { module: "env".to_string(), name: "mem".to_string() }],
            tables: vec![NamedImport { module: "env".to_string(), name: "tbl".to_string() }],
        };
        assert_eq!(expected, descriptor.imports);
        Ok(())
    }

    #[test]
    fn multi_result_signature_keeps_result_count() -> Result<()> {
        let descriptor = describe(r#"
            (module
              (func (export "pair") (result i32 i32)
                i32.const 1 i32.const 2))
        "#)?;

        let expected = vec![
            FuncExport { name: "pair".to_string(), signature: Signature { params: 0, results: 2 } }
        ];
        assert_eq!(expected, descriptor.exports.fns);
        Ok(())
    }
}
