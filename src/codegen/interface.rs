use super::descriptor::{ExportSet, ImportSet, Signature};
use super::names::to_b26;

// `(a:number,b:number)=>number`; a single result is `number`, anything else `void`
fn render_signature(signature: &Signature) -> String {
    let params = (1..=signature.params)
        .map(|i| format!("{}:number", to_b26(i)))
        .collect::<Vec<_>>()
        .join(",")
    ;
    let returns = match signature.results {
        1 => "number",
        _ => "void",
    };

    format!("({params})=>{returns}")
}

fn render_fields(fields: &[String], indent: &str) -> String {
    fields.iter()
        .map(|field| format!("{indent}{field}\n"))
        .collect()
}

pub fn render_exports(exports: &ExportSet) -> String {
    let mut fields = vec![];

    for name in &exports.memories {
        fields.push(format!("\"{name}\": WebAssembly.Memory;"));
    }
    for global in &exports.globals {
        fields.push(format!("\"{}\": WebAssembly.Global;", global.name));
    }
    for name in &exports.tables {
        fields.push(format!("\"{name}\": WebAssembly.Table;"));
    }
    for func in &exports.fns {
        fields.push(format!("\"{}\": {};", func.name, render_signature(&func.signature)));
    }

    format!("export type ModuleExports = {{\n{}}};", render_fields(&fields, "  "))
}

// one nested field per namespace; None when the module imports nothing
pub fn render_imports(imports: &ImportSet) -> Option<String> {
    if imports.is_empty() {
        return None;
    }

    let mut groups: Vec<(&str, Vec<String>)> = vec![];

    for entry in &imports.memories {
        push_member(&mut groups, &entry.module, format!("\"{}\": WebAssembly.Memory;", entry.name));
    }
    for entry in &imports.globals {
        push_member(&mut groups, &entry.module, format!("\"{}\": WebAssembly.Global;", entry.name));
    }
    for entry in &imports.tables {
        push_member(&mut groups, &entry.module, format!("\"{}\": WebAssembly.Table;", entry.name));
    }
    for func in &imports.fns {
        push_member(&mut groups, &func.module, format!("\"{}\": {};", func.name, render_signature(&func.signature)));
    }

    let fields = groups.iter()
        .map(|(namespace, members)| format!("  \"{namespace}\": {{\n{}  }};\n", render_fields(members, "    ")))
        .collect::<String>()
    ;

    Some(format!("export type ModuleImports = {{\n{fields}}};"))
}

fn push_member<'a>(groups: &mut Vec<(&'a str, Vec<String>)>, namespace: &'a str, member: String) {
    match groups.iter_mut().find(|(existing, _)| *existing == namespace) {
        Some((_, members)) => members.push(member),
        None => groups.push((namespace, vec![member])),
    }
}
