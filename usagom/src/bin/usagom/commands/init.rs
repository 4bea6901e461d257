use anyhow::{Context, Result};
use clap::Args;

use crate::context::{CONFIG_DIR, CONFIG_FILE, UsagomConfig, UsagomSettings};
use crate::output::{Output, Tone};

pub const EXAMPLES: &str = "\
Examples:
  usagom init                         # Create .usagom/config.toml and schemas/
  usagom init --schemas-dir models    # Keep schema documents under models/
  usagom init --force                 # Overwrite an existing configuration
";

#[derive(Args)]
pub struct InitArgs {
    /// Directory holding schema documents, relative to the project root
    #[arg(long, default_value = "schemas")]
    pub schemas_dir: String,

    /// Overwrite an existing configuration
    #[arg(long)]
    pub force: bool,
}

pub fn handle_init(args: InitArgs, output: &Output) -> Result<()> {
    let root = std::env::current_dir().context("Failed to get current directory")?;
    let config_dir = root.join(CONFIG_DIR);
    let config_path = config_dir.join(CONFIG_FILE);

    if config_path.exists() && !args.force {
        output.status(Tone::Warn, &format!("{} already exists, use --force to overwrite it", config_path.display()));
        return Ok(());
    }

    let config = UsagomConfig {
        usagom: UsagomSettings {
            schemas_dir: args.schemas_dir,
        },
    };
    let content = toml::to_string_pretty(&config).context("Failed to serialize configuration")?;

    std::fs::create_dir_all(&config_dir).with_context(|| format!("Failed to create {}", config_dir.display()))?;
    std::fs::write(&config_path, content).with_context(|| format!("Failed to write {}", config_path.display()))?;
    output.status(Tone::Ok, &format!("Wrote {}", config_path.display()));

    let schemas_dir = root.join(&config.usagom.schemas_dir);
    std::fs::create_dir_all(&schemas_dir).with_context(|| format!("Failed to create {}", schemas_dir.display()))?;
    output.status(Tone::Note, &format!("Schema documents go in {}", schemas_dir.display()));

    Ok(())
}
