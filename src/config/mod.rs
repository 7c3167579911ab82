pub mod target_config;

#[cfg(feature = "cli")]
use clap::Parser;

pub use target_config::{TargetConfig, TargetSettings};

#[cfg(feature = "cli")]
use crate::utils::error::Result;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "target-csv")]
#[command(about = "Singer target that writes each stream to a CSV file")]
pub struct CliConfig {
    /// Config file (JSON, or TOML with a .toml extension)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Write every stream to this file instead of <stream>.csv
    #[arg(short, long)]
    pub output: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 讀取設定檔 (若有) 並與命令列參數合併
    pub fn settings(&self) -> Result<TargetSettings> {
        let file_config = match &self.config {
            Some(path) => TargetConfig::from_file(path)?,
            None => TargetConfig::default(),
        };
        TargetSettings::resolve(&file_config, self.output.as_deref())
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_cli_flags() {
        let cli = CliConfig::parse_from(["target-csv", "-c", "config.json", "-o", "out.csv", "-v"]);
        assert_eq!(cli.config.as_deref(), Some("config.json"));
        assert_eq!(cli.output.as_deref(), Some("out.csv"));
        assert!(cli.verbose);
        assert!(!cli.log_json);
    }

    #[test]
    fn test_settings_without_config_file() {
        let cli = CliConfig::parse_from(["target-csv", "--output", "all.csv"]);
        let settings = cli.settings().unwrap();
        assert_eq!(settings.output_file, Some(PathBuf::from("all.csv")));
        assert_eq!(settings.destination_path, PathBuf::from("."));
    }

    #[test]
    fn test_missing_config_file_is_io_error() {
        let cli = CliConfig::parse_from(["target-csv", "-c", "/nonexistent/target-csv.json"]);
        assert!(matches!(
            cli.settings(),
            Err(crate::utils::error::TargetError::IoError(_))
        ));
    }
}
