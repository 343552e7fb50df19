use crate::{env_parse_or, env_required, ConfigError};

/// Connection settings for a read-only MySQL source.
///
/// Each content domain lives on its own host/database but they share one set
/// of credentials, so the variable names for host and port are supplied by the
/// caller while `MYSQL_USER` / `MYSQL_PASSWORD` are fixed.
#[derive(Clone)]
pub struct MySqlConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl MySqlConfig {
    /// Load a config using `host_var` / `port_var` for the server address.
    ///
    /// The port defaults to 3306 when its variable is unset.
    pub fn from_env_vars(
        host_var: &str,
        port_var: &str,
        database: &str,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            host: env_required(host_var)?,
            port: env_parse_or(port_var, 3306u16)?,
            user: env_required("MYSQL_USER")?,
            password: env_required("MYSQL_PASSWORD")?,
            database: database.to_string(),
        })
    }
}

impl std::fmt::Debug for MySqlConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mysql_config_from_env_vars() {
        temp_env::with_vars(
            [
                ("MYSQL_HOST", Some("db.internal")),
                ("MYSQL_PORT", Some("3307")),
                ("MYSQL_USER", Some("reader")),
                ("MYSQL_PASSWORD", Some("s3cret")),
            ],
            || {
                let config =
                    MySqlConfig::from_env_vars("MYSQL_HOST", "MYSQL_PORT", "autoinsider").unwrap();
                assert_eq!(config.host, "db.internal");
                assert_eq!(config.port, 3307);
                assert_eq!(config.user, "reader");
                assert_eq!(config.database, "autoinsider");
            },
        );
    }

    #[test]
    fn test_mysql_config_port_defaults() {
        temp_env::with_vars(
            [
                ("MYSQL_HOST_HOMESTEAD", Some("homestead")),
                ("MYSQL_PORT_HOMESTEAD", None),
                ("MYSQL_USER", Some("reader")),
                ("MYSQL_PASSWORD", Some("s3cret")),
            ],
            || {
                let config = MySqlConfig::from_env_vars(
                    "MYSQL_HOST_HOMESTEAD",
                    "MYSQL_PORT_HOMESTEAD",
                    "erg",
                )
                .unwrap();
                assert_eq!(config.port, 3306);
            },
        );
    }

    #[test]
    fn test_mysql_config_missing_host() {
        temp_env::with_var_unset("MYSQL_HOST", || {
            let err = MySqlConfig::from_env_vars("MYSQL_HOST", "MYSQL_PORT", "autoinsider")
                .unwrap_err();
            assert!(err.to_string().contains("MYSQL_HOST"));
        });
    }

    #[test]
    fn test_mysql_config_debug_hides_password() {
        let config = MySqlConfig {
            host: "h".to_string(),
            port: 3306,
            user: "u".to_string(),
            password: "topsecret".to_string(),
            database: "erg".to_string(),
        };
        assert!(!format!("{:?}", config).contains("topsecret"));
    }
}
