mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./castream.toml",
        "./config.toml",
        "~/.config/castream/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if config.stream.chunk_size == 0 {
        anyhow::bail!("Stream chunk_size cannot be 0");
    }

    if config.stream.channel_depth == 0 {
        anyhow::bail!("Stream channel_depth cannot be 0");
    }

    if config.stream.chunk_size > 4 * 1024 * 1024 {
        tracing::warn!(
            "Stream chunk_size {} is unusually large; each connection buffers up to {} bytes",
            config.stream.chunk_size,
            config.stream.chunk_size * config.stream.channel_depth
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("castream.toml");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn test_load_config() {
        let (_dir, path) = write_config(
            r#"
            [server]
            host = "127.0.0.1"
            port = 8765
            "#,
        );
        let config = load_config(&path).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8765);
    }

    #[test]
    fn test_load_config_rejects_port_zero() {
        let (_dir, path) = write_config("[server]\nport = 0\n");
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("port"));
    }

    #[test]
    fn test_load_config_rejects_zero_chunk() {
        let (_dir, path) = write_config("[stream]\nchunk_size = 0\n");
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_load_config_bad_toml() {
        let (_dir, path) = write_config("[server\nport = ");
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config(Path::new("/nonexistent/castream.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }

    #[test]
    fn test_load_custom_path_takes_precedence() {
        let (_dir, path) = write_config("[server]\nport = 7001\n");
        let config = load_config_or_default(Some(&path)).unwrap();
        assert_eq!(config.server.port, 7001);
    }
}
