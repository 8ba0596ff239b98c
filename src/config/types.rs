use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub stream: StreamConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StreamConfig {
    /// Bytes read from the source per response chunk (default: 8192)
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Chunks buffered between the reader thread and the socket (default: 4)
    #[serde(default = "default_channel_depth")]
    pub channel_depth: usize,
}

fn default_chunk_size() -> usize {
    8192
}

fn default_channel_depth() -> usize {
    4
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            channel_depth: default_channel_depth(),
        }
    }
}
