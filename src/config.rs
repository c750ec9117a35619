use serde::{Deserialize, Serialize};

const REDACTED: &str = "***";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub collection: CollectionConfig,
    pub endpoints: Vec<EndpointConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Concurrent requests for the same endpoint share one in-flight poll cycle.
    #[serde(default)]
    pub single_flight: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// vCenter via the vSphere Automation REST API.
    Vsphere,
    /// JSON inventory document on disk.
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Route segment under /data/{name}.
    pub name: String,
    pub kind: SourceKind,
    /// vCenter base address; may embed credentials as userinfo.
    #[serde(default)]
    pub url: Option<String>,
    /// Overrides any username embedded in `url`.
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Accept self-signed vCenter certificates.
    #[serde(default)]
    pub insecure: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Inventory file path (kind = "file").
    #[serde(default)]
    pub path: Option<String>,
}

fn default_timeout_secs() -> u64 {
    30
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn endpoint(&self, name: &str) -> Option<&EndpointConfig> {
        self.endpoints.iter().find(|e| e.name == name)
    }

    /// Copy safe to expose over HTTP: passwords (explicit or in URL userinfo) masked.
    pub fn redacted(&self) -> Self {
        let mut out = self.clone();
        for endpoint in &mut out.endpoints {
            if endpoint.password.is_some() {
                endpoint.password = Some(REDACTED.into());
            }
            if let Some(raw) = endpoint.url.as_deref() {
                endpoint.url = Some(redact_url(raw));
            }
        }
        out
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            !self.endpoints.is_empty(),
            "endpoints must contain at least one endpoint"
        );
        for (i, endpoint) in self.endpoints.iter().enumerate() {
            anyhow::ensure!(
                !endpoint.name.is_empty(),
                "endpoints[{}].name must be non-empty",
                i
            );
            anyhow::ensure!(
                endpoint
                    .name
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')),
                "endpoints[{}].name must only contain [A-Za-z0-9._-], got {:?}",
                i,
                endpoint.name
            );
            anyhow::ensure!(
                self.endpoints[..i].iter().all(|e| e.name != endpoint.name),
                "endpoints[{}].name {:?} is not unique",
                i,
                endpoint.name
            );
            match endpoint.kind {
                SourceKind::Vsphere => {
                    anyhow::ensure!(
                        endpoint.url.as_deref().is_some_and(|u| !u.is_empty()),
                        "endpoints[{}].url must be set for kind = \"vsphere\"",
                        i
                    );
                    anyhow::ensure!(
                        endpoint.timeout_secs > 0,
                        "endpoints[{}].timeout_secs must be > 0, got {}",
                        i,
                        endpoint.timeout_secs
                    );
                }
                SourceKind::File => {
                    anyhow::ensure!(
                        endpoint.path.as_deref().is_some_and(|p| !p.is_empty()),
                        "endpoints[{}].path must be set for kind = \"file\"",
                        i
                    );
                }
            }
        }
        Ok(())
    }
}

/// Masks the userinfo password; unparsable addresses are returned as-is
/// (they fail at collection time, not here).
fn redact_url(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(mut u) if u.password().is_some() => {
            let _ = u.set_password(Some(REDACTED));
            u.to_string()
        }
        _ => raw.to_string(),
    }
}
