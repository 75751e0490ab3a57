use std::{fs, path::Path};

use anyhow::Result;
use tracing::info;
use wat2ts::{codegen::loader::compile, get_args};

const SOURCE_TEXT_EXT: &str = "wat";
const SOURCE_BINARY_EXT: &str = "wasm";
const TARGET_EXT: &str = "ts";

fn main() -> Result<()> {
    tracing_subscriber::fmt().init();

    let config = get_args()?;

    // strictly sequential: the first failure aborts the remaining queue
    for path in &config.paths {
        process_path(Path::new(path))?;
    }

    Ok(())
}

fn process_path(path: &Path) -> Result<()> {
    if path.is_dir() {
        return process_dir(path);
    }
    if has_source_ext(path) {
        return compile_file(path);
    }

    Ok(())
}

fn process_dir(dir: &Path) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();

        if path.is_dir() {
            process_dir(&path)?;
        } else if has_source_ext(&path) {
            compile_file(&path)?;
        }
    }

    Ok(())
}

fn has_source_ext(path: &Path) -> bool {
    let ext = path.extension().and_then(|ext| ext.to_str());
    ext == Some(SOURCE_TEXT_EXT) || ext == Some(SOURCE_BINARY_EXT)
}

fn compile_file(path: &Path) -> Result<()> {
    info!("compiling {}", path.display());

    let src = fs::read(path)?;
    // parse_bytes passes already-binary .wasm input through unchanged
    let wasm = wat::parse_bytes(&src)?;
    let generated = compile(&wasm)?;

    fs::write(path.with_extension(TARGET_EXT), generated)?;

    Ok(())
}
