use anyhow::Result;
use tracing::debug;

use crate::binary::module::Module;

use super::{descriptor::ModuleDescriptor, embed::EmbeddedPayload, interface::{render_exports, render_imports}};

const FACTORY: &str = r#"export default async function (): Promise<ModuleExports> {
  const { exports } = await WebAssembly.instantiate(await modp);
  return exports as unknown as ModuleExports;
}"#;

const FACTORY_WITH_IMPORTS: &str = r#"export default async function (imports: ModuleImports): Promise<ModuleExports> {
  const { exports } = await WebAssembly.instantiate(await modp, imports);
  return exports as unknown as ModuleExports;
}"#;

/// Generates the complete artifact for one compiled module: type
/// declarations, embedded payload, and the factory.
#[tracing::instrument(skip(wasm), level = "debug")]
pub fn compile(wasm: &[u8]) -> Result<String> {
    let module = Module::new(wasm)?;
    let descriptor = ModuleDescriptor::new(&module)?;

    let imports_decl = render_imports(&descriptor.imports);
    let exports_decl = render_exports(&descriptor.exports);
    let payload = EmbeddedPayload::new(wasm);

    debug!(
        bytes = wasm.len(),
        encoding = ?payload.encoding(),
        has_imports = imports_decl.is_some(),
        "composing loader"
    );

    let mut out = String::new();
    if let Some(decl) = &imports_decl {
        out.push_str(decl);
        out.push('\n');
    }
    out.push_str(&exports_decl);
    out.push_str("\n\n");
    out.push_str(&payload.render());
    out.push_str("\n\n");
    out.push_str(match imports_decl {
        Some(_) => FACTORY_WITH_IMPORTS,
        None => FACTORY,
    });
    out.push('\n');

    Ok(out)
}
