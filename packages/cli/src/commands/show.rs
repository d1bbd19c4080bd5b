use super::{render_value, XmlFile};
use crate::config;
use anyhow::Result;
use clap::Args;
use std::path::{Path, PathBuf};
use xdynamic_engine::MemberPath;

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// XML file to print
    pub file: PathBuf,

    /// Member path to print instead of the whole file
    pub path: Option<String>,
}

pub fn show(args: ShowArgs, cwd: &Path, config: Option<&Path>) -> Result<()> {
    let options = config::load(cwd, config)?;
    let file = XmlFile::open(cwd, &args.file, options)?;

    let output = match &args.path {
        Some(path) => render_value(&MemberPath::parse(path)?.resolve(&file.root)?)?,
        None => file.render(true)?,
    };
    println!("{}", output);
    Ok(())
}
