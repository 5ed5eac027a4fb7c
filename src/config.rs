use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

const DEFAULT_DATA_FILE: &str = "products.json";
const DEFAULT_HTTP_BIND: &str = "127.0.0.1:5000";

/// Resolved server configuration. Precedence: CLI flag, then config file,
/// then default.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub data_file: PathBuf,
    pub http_bind_address: SocketAddr,
}

impl ServerConfig {
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let CliArgs {
            config,
            data_file: cli_data_file,
            http_bind: cli_http_bind,
        } = args;

        let file_config = if let Some(path) = config.as_ref() {
            load_config_file(path)?
        } else {
            PartialConfig::default()
        };

        let PartialConfig {
            data_file: file_data_file,
            http_bind: file_http_bind,
        } = file_config;

        let data_file = cli_data_file
            .or(file_data_file)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE));

        let http_bind_address = cli_http_bind.or(file_http_bind).unwrap_or_else(|| {
            DEFAULT_HTTP_BIND
                .parse()
                .expect("default bind address valid")
        });

        Ok(Self {
            data_file,
            http_bind_address,
        })
    }

    /// Fail fast on a data file we could never persist to.
    pub fn validate(&self) -> Result<()> {
        if self.data_file.exists() {
            anyhow::ensure!(
                self.data_file.is_file(),
                "data file {:?} is not a file",
                self.data_file
            );
        } else if let Some(parent) = self.data_file.parent() {
            if !parent.as_os_str().is_empty() {
                anyhow::ensure!(
                    parent.is_dir(),
                    "data file directory {:?} does not exist",
                    parent
                );
            }
        }
        Ok(())
    }
}

#[derive(Parser, Debug, Default, Clone)]
#[command(name = "product-grid", about = "Product catalog server", version)]
pub struct CliArgs {
    #[arg(
        long,
        value_name = "FILE",
        help = "Path to a configuration file (YAML or JSON)",
        global = true
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        env = "PRODUCT_GRID_DATA_FILE",
        value_name = "FILE",
        help = "JSON document holding the product catalog"
    )]
    pub data_file: Option<PathBuf>,

    #[arg(
        long,
        env = "PRODUCT_GRID_HTTP_BIND",
        value_name = "ADDR",
        help = "HTTP bind address"
    )]
    pub http_bind: Option<SocketAddr>,
}

#[derive(Debug, Default, Deserialize)]
struct PartialConfig {
    data_file: Option<PathBuf>,
    http_bind: Option<SocketAddr>,
}

fn load_config_file(path: &Path) -> Result<PartialConfig> {
    if !path.exists() {
        anyhow::bail!("config file {:?} does not exist", path);
    }
    let contents =
        fs::read_to_string(path).with_context(|| format!("failed to read config file {path:?}"))?;
    let ext = path
        .extension()
        .and_then(|os| os.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse YAML config {path:?}"))?,
        "json" => serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse JSON config {path:?}"))?,
        other => anyhow::bail!("unsupported config extension: {other}"),
    };
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_cli_or_file() {
        let config = ServerConfig::from_args(CliArgs::default()).unwrap();
        assert_eq!(config.data_file, PathBuf::from(DEFAULT_DATA_FILE));
        assert_eq!(
            config.http_bind_address,
            DEFAULT_HTTP_BIND.parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn cli_overrides_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("server.yaml");
        fs::write(
            &config_path,
            "data_file: from-file.json\nhttp_bind: \"127.0.0.1:6000\"\n",
        )
        .unwrap();

        let args = CliArgs {
            config: Some(config_path),
            data_file: Some(PathBuf::from("from-cli.json")),
            http_bind: None,
        };
        let config = ServerConfig::from_args(args).unwrap();
        assert_eq!(config.data_file, PathBuf::from("from-cli.json"));
        assert_eq!(
            config.http_bind_address,
            "127.0.0.1:6000".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn rejects_unknown_config_extension() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("server.toml");
        fs::write(&config_path, "data_file = \"x.json\"\n").unwrap();
        let args = CliArgs {
            config: Some(config_path),
            ..CliArgs::default()
        };
        assert!(ServerConfig::from_args(args).is_err());
    }
}
