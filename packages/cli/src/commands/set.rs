use super::XmlFile;
use crate::config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};
use xdynamic_engine::{MemberPath, Primitive, PrimitiveKind, Value};

#[derive(Debug, Args)]
pub struct SetArgs {
    /// XML file to edit
    pub file: PathBuf,

    /// Member path, e.g. Customer.Address[1].City
    pub path: String,

    /// Literal value to assign
    #[arg(required_unless_present = "null", conflicts_with = "null")]
    pub value: Option<String>,

    /// Primitive type of the value (int32, System.Double, bool, ...)
    #[arg(short = 't', long = "type", default_value = "string")]
    pub type_name: String,

    /// Remove the member instead of assigning a value
    #[arg(long)]
    pub null: bool,

    /// Indent the saved file
    #[arg(long)]
    pub pretty: bool,

    /// Print the result instead of saving the file
    #[arg(long)]
    pub stdout: bool,
}

pub fn set(args: SetArgs, cwd: &Path, config: Option<&Path>) -> Result<()> {
    let file = apply(&args, cwd, config)?;

    if args.stdout {
        println!("{}", file.render(args.pretty)?);
    } else {
        file.save(args.pretty)?;
        println!("  {} {} = {}", "✓".green(), args.path, describe(&args));
    }
    Ok(())
}

fn apply(args: &SetArgs, cwd: &Path, config: Option<&Path>) -> Result<XmlFile> {
    let options = config::load(cwd, config)?;
    let file = XmlFile::open(cwd, &args.file, options)?;
    let path = MemberPath::parse(&args.path)?;

    let value = match (&args.value, args.null) {
        (_, true) => Value::Null,
        (Some(raw), false) => Value::Primitive(parse_primitive(raw, &args.type_name)?),
        (None, false) => return Err(anyhow!("A value or --null is required")),
    };

    path.assign(&file.root, value)?;
    Ok(file)
}

/// Convert command line text into a primitive of the named kind
pub fn parse_primitive(raw: &str, type_name: &str) -> Result<Primitive> {
    let kind = PrimitiveKind::resolve(type_name)
        .ok_or_else(|| anyhow!("Unknown type {:?}", type_name))?;
    kind.parse_literal(raw)
        .ok_or_else(|| anyhow!("{:?} is not a valid {}", raw, kind.canonical_name()))
}

fn describe(args: &SetArgs) -> String {
    match &args.value {
        Some(value) if !args.null => format!("{} ({})", value, args.type_name),
        _ => "null".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup(source: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("data.xml"), source).unwrap();
        dir
    }

    fn args(path: &str, value: Option<&str>, type_name: &str) -> SetArgs {
        SetArgs {
            file: PathBuf::from("data.xml"),
            path: path.to_string(),
            value: value.map(str::to_string),
            type_name: type_name.to_string(),
            null: value.is_none(),
            pretty: false,
            stdout: false,
        }
    }

    fn saved(dir: &TempDir) -> String {
        std::fs::read_to_string(dir.path().join("data.xml")).unwrap()
    }

    #[test]
    fn test_set_typed_value_and_save() {
        let dir = setup("<root />");
        set(args("Id", Some("123"), "int32"), dir.path(), None).unwrap();
        assert_eq!(
            saved(&dir),
            r#"<root><Id _dataType="System.Int32">123</Id></root>"#
        );

        set(args("Id", None, "string"), dir.path(), None).unwrap();
        assert_eq!(saved(&dir), "<root />");
    }

    #[test]
    fn test_set_nested_path() {
        let dir = setup("<Order><Customer><Name>Ada</Name></Customer></Order>");
        set(args("Customer.Name", Some("Grace"), "string"), dir.path(), None).unwrap();
        assert_eq!(
            saved(&dir),
            r#"<Order><Customer><Name _dataType="System.String">Grace</Name></Customer></Order>"#
        );
    }

    #[test]
    fn test_invalid_literal_leaves_file() {
        let dir = setup("<root />");
        assert!(set(args("Id", Some("abc"), "int32"), dir.path(), None).is_err());
        assert!(set(args("Id", Some("1"), "decimal128"), dir.path(), None).is_err());
        assert_eq!(saved(&dir), "<root />");
    }

    #[test]
    fn test_parse_primitive() {
        assert_eq!(parse_primitive("true", "bool").unwrap(), Primitive::Bool(true));
        assert_eq!(
            parse_primitive("2.5", "System.Double").unwrap(),
            Primitive::F64(2.5)
        );
        assert_eq!(
            parse_primitive(" x ", "string").unwrap(),
            Primitive::String(" x ".to_string())
        );
    }
}
