//! Shared constants and configuration types (`spec.md` §6: "Well-known
//! ports"; `SPEC_FULL.md` §4.3 "Config loading").
//!
//! Locating and reading a config file from disk is a concern of the two
//! `src/bin` entry points, genuinely out of the protocol core (`spec.md`
//! §1). The types themselves — and their `serde`/`toml` deserialization —
//! live here so both binaries, and tests, share one definition.

use std::net::IpAddr;
use std::path::PathBuf;

use serde::Deserialize;

/// The naming node's client-interface port, baked in so storage nodes and
/// clients can construct bootstrap proxies without discovery.
pub const DEFAULT_NAMING_SERVICE_PORT: u16 = 8085;

/// The naming node's registration-interface port.
pub const DEFAULT_NAMING_REGISTRATION_PORT: u16 = 8090;

fn default_bind_addr() -> IpAddr {
    IpAddr::from([127, 0, 0, 1])
}

fn default_service_port() -> u16 {
    DEFAULT_NAMING_SERVICE_PORT
}

fn default_registration_port() -> u16 {
    DEFAULT_NAMING_REGISTRATION_PORT
}

/// `naming_node`'s configuration: where to bind its two interfaces.
#[derive(Debug, Clone, Deserialize)]
pub struct NamingConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: IpAddr,
    #[serde(default = "default_service_port")]
    pub service_port: u16,
    #[serde(default = "default_registration_port")]
    pub registration_port: u16,
}

impl Default for NamingConfig {
    fn default() -> NamingConfig {
        NamingConfig {
            bind_addr: default_bind_addr(),
            service_port: default_service_port(),
            registration_port: default_registration_port(),
        }
    }
}

impl NamingConfig {
    pub fn service_addr(&self) -> std::net::SocketAddr {
        std::net::SocketAddr::new(self.bind_addr, self.service_port)
    }

    pub fn registration_addr(&self) -> std::net::SocketAddr {
        std::net::SocketAddr::new(self.bind_addr, self.registration_port)
    }
}

/// `storage_node`'s configuration: its local root plus where to bind its
/// two interfaces, and the naming node's registration address to announce
/// itself to on startup.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub root: PathBuf,
    #[serde(default = "default_bind_addr")]
    pub bind_addr: IpAddr,
    /// `0` means system-assigned (`spec.md` §4.1 "on a caller-specified
    /// address, or system-assigned if unspecified").
    #[serde(default)]
    pub data_port: u16,
    #[serde(default)]
    pub control_port: u16,
    pub naming_registration_addr: std::net::SocketAddr,
}

impl StorageConfig {
    pub fn data_bind_addr(&self) -> std::net::SocketAddr {
        std::net::SocketAddr::new(self.bind_addr, self.data_port)
    }

    pub fn control_bind_addr(&self) -> std::net::SocketAddr {
        std::net::SocketAddr::new(self.bind_addr, self.control_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn naming_config_defaults_to_loopback_and_well_known_ports() {
        let cfg: NamingConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.bind_addr, default_bind_addr());
        assert_eq!(cfg.service_port, DEFAULT_NAMING_SERVICE_PORT);
        assert_eq!(cfg.registration_port, DEFAULT_NAMING_REGISTRATION_PORT);
    }

    #[test]
    fn storage_config_parses_from_toml() {
        let toml_src = r#"
            root = "/srv/data"
            naming_registration_addr = "127.0.0.1:8090"
        "#;
        let cfg: StorageConfig = toml::from_str(toml_src).unwrap();
        assert_eq!(cfg.root, PathBuf::from("/srv/data"));
        assert_eq!(cfg.data_port, 0);
    }
}
