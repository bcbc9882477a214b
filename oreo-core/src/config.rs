use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Top-level configuration for the Oreo authorization library.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OreoConfig {
    /// Group (namespace) every record of this deployment is scoped to
    #[serde(default = "default_group_name")]
    pub group_name: String,

    /// Route-store variant: singleton keeps one mutable routing table and
    /// rebuilds in-place; the default concurrent variant publishes
    /// immutable snapshots and refreshes them on a timer
    #[serde(default)]
    pub singleton: bool,

    /// Seconds between route-catalog reloads (concurrent variant only)
    #[serde(default = "default_cache_interval")]
    pub cache_interval_secs: u64,

    /// etcd configuration
    #[serde(default)]
    pub etcd: EtcdConfig,

    /// REST boundary configuration
    #[serde(default)]
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EtcdConfig {
    /// etcd endpoint addresses
    #[serde(default = "default_etcd_endpoints")]
    pub endpoints: Vec<String>,

    /// Key prefix for Oreo data
    #[serde(default = "default_etcd_prefix")]
    pub prefix: String,

    /// Connection timeout (milliseconds)
    #[serde(default = "default_etcd_timeout")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// REST listener address
    #[serde(default = "default_admin_addr")]
    pub addr: SocketAddr,

    /// Enable the REST boundary
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// CORS allowed origins
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl OreoConfig {
    /// Load configuration from a YAML file + environment variables.
    ///
    /// Environment variables override file values: `OREO_GROUP_NAME`,
    /// `OREO_ETCD__PREFIX`, etc.
    pub fn load(config_path: Option<&str>) -> Result<Self, figment::Error> {
        let mut figment = Figment::new();

        if let Some(path) = config_path {
            figment = figment.merge(Yaml::file(path));
        } else {
            for default_path in &["oreo.yaml", "/etc/oreo/oreo.yaml", "config/oreo.yaml"] {
                if std::path::Path::new(default_path).exists() {
                    figment = figment.merge(Yaml::file(default_path));
                    break;
                }
            }
        }

        figment = figment.merge(Env::prefixed("OREO_").split("__"));

        figment.extract()
    }

    pub fn cache_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.cache_interval_secs)
    }
}

// Default implementations

impl Default for OreoConfig {
    fn default() -> Self {
        Self {
            group_name: default_group_name(),
            singleton: false,
            cache_interval_secs: default_cache_interval(),
            etcd: EtcdConfig::default(),
            admin: AdminConfig::default(),
        }
    }
}

impl Default for EtcdConfig {
    fn default() -> Self {
        Self {
            endpoints: default_etcd_endpoints(),
            prefix: default_etcd_prefix(),
            timeout_ms: default_etcd_timeout(),
        }
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            addr: default_admin_addr(),
            enabled: true,
            cors_origins: vec![],
        }
    }
}

// Serde default functions

fn default_group_name() -> String {
    "default".to_string()
}

fn default_cache_interval() -> u64 {
    30
}

fn default_etcd_endpoints() -> Vec<String> {
    vec!["http://127.0.0.1:2379".to_string()]
}

fn default_etcd_prefix() -> String {
    "/oreo".to_string()
}

fn default_etcd_timeout() -> u64 {
    5000
}

fn default_admin_addr() -> SocketAddr {
    "127.0.0.1:9190".parse().unwrap()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = OreoConfig::default();
        assert_eq!(cfg.group_name, "default");
        assert!(!cfg.singleton);
        assert_eq!(cfg.cache_interval_secs, 30);
        assert_eq!(cfg.etcd.prefix, "/oreo");
        assert_eq!(cfg.admin.addr.port(), 9190);
        assert!(cfg.admin.enabled);
    }

    #[test]
    fn test_cache_interval_duration() {
        let mut cfg = OreoConfig::default();
        cfg.cache_interval_secs = 5;
        assert_eq!(cfg.cache_interval(), std::time::Duration::from_secs(5));
    }
}
