use anyhow::Result;
use hufpack::config::CodecConfig;

use crate::cli::ConfigCommand;

pub fn config(command: ConfigCommand, config: &CodecConfig) -> Result<()> {
    match command {
        ConfigCommand::Save { output_path } => {
            config.save_to_file(&output_path)?;
            println!("Configuration saved to {}", output_path.display());
        }
    }
    Ok(())
}
