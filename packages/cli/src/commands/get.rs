use super::{render_value, value_to_json, XmlFile};
use crate::config;
use anyhow::Result;
use clap::Args;
use std::path::{Path, PathBuf};
use xdynamic_engine::MemberPath;

#[derive(Debug, Args)]
pub struct GetArgs {
    /// XML file to read
    pub file: PathBuf,

    /// Member path, e.g. Customer.Address[1].City
    pub path: String,

    /// Print the value as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn get(args: GetArgs, cwd: &Path, config: Option<&Path>) -> Result<()> {
    println!("{}", read(&args, cwd, config)?);
    Ok(())
}

fn read(args: &GetArgs, cwd: &Path, config: Option<&Path>) -> Result<String> {
    let options = config::load(cwd, config)?;
    let file = XmlFile::open(cwd, &args.file, options)?;
    let path = MemberPath::parse(&args.path)?;
    let value = path.resolve(&file.root)?;

    if args.json {
        return Ok(serde_json::to_string_pretty(&value_to_json(&value)?)?);
    }
    render_value(&value)
}
