//! Config command

use crate::app::{ConfigArgs, OutputFormat};
use anyhow::Result;
use kbassist_core::Config;

pub async fn run(args: ConfigArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let path = Config::default_path();

    if args.init {
        if path.exists() {
            eprintln!("Config already exists: {}", path.display());
        } else {
            config.save_to(&path)?;
            eprintln!("Wrote config: {}", path.display());
        }
    }

    let shown = config.redacted();
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&shown)?),
        OutputFormat::Md => {
            println!("# Configuration\n\n`{}`\n", path.display());
            println!("```yaml\n{}```", serde_yaml::to_string(&shown)?);
        }
        OutputFormat::Cli => {
            println!("# {}", path.display());
            print!("{}", serde_yaml::to_string(&shown)?);
        }
    }
    Ok(())
}
