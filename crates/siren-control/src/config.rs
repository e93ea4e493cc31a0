use std::path::Path;

use serde::Deserialize;

/// Channel configuration, loaded from an optional TOML file. Every
/// field has a default matching the deployed installation, so an empty
/// or missing file yields a working desktop setup.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ControlConfig {
    #[serde(default)]
    pub network: NetworkSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkSection {
    /// Initial target, the control host by default
    #[serde(default = "default_target_address")]
    pub target_address: String,
    #[serde(default = "default_control_port")]
    pub control_port: u16,
    /// Local port bound for controller replies. Multiple manager
    /// processes may share it (SO_REUSEADDR).
    #[serde(default = "default_receive_port")]
    pub receive_port: u16,
    #[serde(default = "default_proxy_url")]
    pub proxy_url: String,
    #[serde(default)]
    pub transport: TransportKind,
}

/// Which transport the channel is built with. Chosen once; a running
/// channel never switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    #[default]
    Udp,
    Tunnel,
}

fn default_target_address() -> String {
    siren_protocol::machines::MachineId::ControlHost
        .address()
        .to_string()
}
fn default_control_port() -> u16 {
    siren_protocol::CONTROL_PORT
}
fn default_receive_port() -> u16 {
    siren_protocol::RECEIVE_PORT
}
fn default_proxy_url() -> String {
    siren_protocol::DEFAULT_PROXY_URL.to_string()
}

impl Default for NetworkSection {
    fn default() -> Self {
        Self {
            target_address: default_target_address(),
            control_port: default_control_port(),
            receive_port: default_receive_port(),
            proxy_url: default_proxy_url(),
            transport: TransportKind::default(),
        }
    }
}

impl ControlConfig {
    /// Read a config file; a missing file yields the defaults.
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = tokio::fs::read_to_string(path).await?;
        Ok(toml::from_str(&text)?)
    }
}
