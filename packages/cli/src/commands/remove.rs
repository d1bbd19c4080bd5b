use super::XmlFile;
use crate::config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};
use xdynamic_engine::{MemberPath, Value};

#[derive(Debug, Args)]
pub struct RemoveArgs {
    /// XML file to edit
    pub file: PathBuf,

    /// Member path, e.g. Customer.Phone
    pub path: String,

    /// Indent the saved file
    #[arg(long)]
    pub pretty: bool,
}

pub fn remove(args: RemoveArgs, cwd: &Path, config: Option<&Path>) -> Result<()> {
    let options = config::load(cwd, config)?;
    let file = XmlFile::open(cwd, &args.file, options)?;
    let path = MemberPath::parse(&args.path)?;

    if path.resolve(&file.root)?.is_null() {
        println!("{} {} not found", "⚠️".yellow(), args.path);
        return Ok(());
    }

    path.assign(&file.root, Value::Null)?;
    file.save(args.pretty)?;
    println!("  {} Removed {}", "✓".green(), args.path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use xdynamic_engine::XmlObject;

    #[test]
    fn test_remove_member() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("data.xml");
        std::fs::write(&file, "<r><a>1</a><b><c>2</c></b></r>").unwrap();

        let args = RemoveArgs {
            file: PathBuf::from("data.xml"),
            path: "b.c".to_string(),
            pretty: false,
        };
        remove(args, dir.path(), None).unwrap();
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "<r><a>1</a><b /></r>");
    }

    #[test]
    fn test_remove_list_item() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("data.xml");
        std::fs::write(&file, "<r><T>a</T><T>b</T><T>c</T></r>").unwrap();

        let args = RemoveArgs {
            file: PathBuf::from("data.xml"),
            path: "T[1]".to_string(),
            pretty: false,
        };
        remove(args, dir.path(), None).unwrap();

        let saved = XmlObject::parse(&std::fs::read_to_string(&file).unwrap()).unwrap();
        assert_eq!(saved.get("T").unwrap(), Value::from(vec!["a", "c"]));
    }

    #[test]
    fn test_remove_missing_member_keeps_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("data.xml");
        std::fs::write(&file, "<r>\n  <a>1</a>\n</r>").unwrap();

        let args = RemoveArgs {
            file: PathBuf::from("data.xml"),
            path: "z".to_string(),
            pretty: false,
        };
        remove(args, dir.path(), None).unwrap();
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "<r>\n  <a>1</a>\n</r>");
    }
}
