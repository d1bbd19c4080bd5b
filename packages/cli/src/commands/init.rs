use crate::config::DEFAULT_CONFIG_NAME;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::Path;
use xdynamic_engine::ProjectionOptions;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &Path) -> Result<()> {
    let config_path = cwd.join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    let content = serde_json::to_string_pretty(&ProjectionOptions::default())?;
    fs::write(&config_path, content + "\n")?;
    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_loadable_defaults() {
        let dir = TempDir::new().unwrap();
        init(InitArgs { force: false }, dir.path()).unwrap();

        let options = crate::config::load(dir.path(), None).unwrap();
        assert_eq!(options, ProjectionOptions::default());
    }

    #[test]
    fn test_init_keeps_existing_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_NAME);
        fs::write(&path, "{}").unwrap();

        init(InitArgs { force: false }, dir.path()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");

        init(InitArgs { force: true }, dir.path()).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("typeAttribute"));
    }
}
