use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub service_account_path: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".into()),
            port: std::env::var("APP_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(9000),
            service_account_path: std::env::var("SERVICE_ACCOUNT_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("service-account.json")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test fn so the env mutations cannot race a parallel reader.
    #[test]
    fn from_env_defaults_and_overrides() {
        std::env::remove_var("APP_HOST");
        std::env::remove_var("APP_PORT");
        std::env::remove_var("SERVICE_ACCOUNT_PATH");

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9000);
        assert_eq!(
            config.service_account_path,
            PathBuf::from("service-account.json")
        );

        std::env::set_var("APP_HOST", "0.0.0.0");
        std::env::set_var("APP_PORT", "8081");
        std::env::set_var("SERVICE_ACCOUNT_PATH", "/etc/keys/svc.json");
        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8081);
        assert_eq!(config.service_account_path, PathBuf::from("/etc/keys/svc.json"));

        std::env::set_var("APP_PORT", "not-a-port");
        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.port, 9000);

        std::env::remove_var("APP_HOST");
        std::env::remove_var("APP_PORT");
        std::env::remove_var("SERVICE_ACCOUNT_PATH");
    }
}
