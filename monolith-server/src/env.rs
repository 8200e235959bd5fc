//! Named configuration values with fallback defaults

use std::collections::HashMap;

pub const APP_NAME: &str = "APP_NAME";
pub const APP_ENV: &str = "APP_ENV";
pub const DB_USER: &str = "DB_USER";
pub const HOSTNAME: &str = "HOSTNAME";

pub const DEFAULT_APP_NAME: &str = "OpenShift Rust Monolith";
pub const DEFAULT_APP_ENV: &str = "development";
pub const DEFAULT_DB_USER: &str = "not_configured";

/// Source of environment-style values.
#[derive(Debug, Clone, Default)]
pub enum EnvResolver {
    /// The live process environment
    #[default]
    Process,
    /// A fixed set of values; keys not present are absent
    Fixed(HashMap<String, String>),
}

impl EnvResolver {
    pub fn fixed<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::Fixed(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    fn lookup(&self, key: &str) -> Option<String> {
        let value = match self {
            Self::Process => std::env::var(key).ok(),
            Self::Fixed(vars) => vars.get(key).cloned(),
        };
        value.filter(|v| !v.is_empty())
    }

    /// Value for `key`, or `default` when it is unset or empty
    pub fn resolve(&self, key: &str, default: &str) -> String {
        self.lookup(key).unwrap_or_else(|| default.to_string())
    }

    pub fn app_name(&self) -> String {
        self.resolve(APP_NAME, DEFAULT_APP_NAME)
    }

    pub fn app_env(&self) -> String {
        self.resolve(APP_ENV, DEFAULT_APP_ENV)
    }

    pub fn db_user(&self) -> String {
        self.resolve(DB_USER, DEFAULT_DB_USER)
    }

    /// Host name from `HOSTNAME`, falling back to the kernel's idea of it
    /// for the process environment. `None` when nothing is available.
    pub async fn hostname(&self) -> Option<String> {
        if let Some(name) = self.lookup(HOSTNAME) {
            return Some(name);
        }
        if let Self::Fixed(_) = self {
            return None;
        }
        for path in ["/proc/sys/kernel/hostname", "/etc/hostname"] {
            if let Ok(content) = tokio::fs::read_to_string(path).await {
                let name = content.trim();
                if !name.is_empty() {
                    return Some(name.to_string());
                }
            }
        }
        None
    }
}
