use anyhow::Result;
use clap::Parser;

pub mod binary;
pub mod codegen;

#[derive(Debug, Parser)]
#[command(version, about)]
pub struct CmdConfig {
    #[arg(value_name="PATH", help="wat/wasm files or directories to transform", required=true, num_args=1..)]
    pub paths: Vec<String>,
}

pub fn get_args() -> Result<CmdConfig> {
    Ok(CmdConfig::parse())
}
