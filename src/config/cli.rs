use crate::config::toml_config::{config_base_dir, install_dir, LogFormat, TomlConfig};
use crate::utils::error::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "titanic-api")]
#[command(about = "Titanic survival probability API")]
pub struct CliArgs {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override server.host
    #[arg(long)]
    pub host: Option<String>,

    /// Override server.port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Override model.path
    #[arg(long)]
    pub model_path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit JSON log lines instead of the compact format
    #[arg(long)]
    pub json_logs: bool,

    /// Load and validate configuration and model, then exit
    #[arg(long)]
    pub check: bool,
}

impl CliArgs {
    /// 載入設定檔並套用命令列覆蓋設定
    ///
    /// `--model-path` 的相對路徑與設定檔內的路徑使用同一個基準目錄：
    /// 有設定檔時為其所在目錄，否則為執行檔所在目錄。
    pub fn load_config(&self) -> Result<TomlConfig> {
        let (mut config, base_dir) = match &self.config {
            Some(path) => (TomlConfig::from_file(path)?, config_base_dir(path)),
            None => (TomlConfig::with_defaults()?, install_dir()?),
        };

        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(model_path) = &self.model_path {
            config.set_model_path(&base_dir, model_path.clone());
        }
        if self.json_logs {
            config.logging.format = LogFormat::Json;
        }

        Ok(config)
    }
}
