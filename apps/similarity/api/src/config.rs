use core_config::{
    AppInfo, FromEnv, app_info, env_optional, env_or_default, env_required, mysql::MySqlConfig,
    server::ServerConfig,
};
use domain_similarity::{Domain, EmbeddingBackend, HttpEmbeddingConfig, QdrantConfig};

pub use core_config::Environment;

/// Application configuration, composed from the shared config components.
///
/// The API token and MySQL settings are loaded on demand by the commands
/// that need them.
#[derive(Clone)]
pub struct Config {
    pub app: AppInfo,
    pub environment: Environment,
    pub server: ServerConfig,
    pub qdrant: QdrantConfig,
    pub embedding: HttpEmbeddingConfig,
    pub embedding_backend: EmbeddingBackend,
    /// Model cache for the local backend
    pub embedding_cache_dir: Option<String>,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?; // HOST=0.0.0.0, PORT=8080 by default
        let qdrant = QdrantConfig::from_env()?;
        let embedding = HttpEmbeddingConfig::from_env()?;
        let embedding_backend = env_or_default("EMBEDDING_BACKEND", "http").parse()?;

        Ok(Self {
            app: app_info!(),
            environment,
            server,
            qdrant,
            embedding,
            embedding_backend,
            embedding_cache_dir: env_optional("EMBEDDING_CACHE_DIR"),
        })
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("app", &self.app)
            .field("environment", &self.environment)
            .field("server", &self.server)
            .field("qdrant", &self.qdrant)
            .field("embedding", &self.embedding)
            .field("embedding_backend", &self.embedding_backend)
            .field("embedding_cache_dir", &self.embedding_cache_dir)
            .finish()
    }
}

/// Shared secret for the protected routes; required by `serve` only.
pub fn api_token() -> eyre::Result<String> {
    Ok(env_required("API_TOKEN")?)
}

/// Source database for a domain's bulk load.
pub fn mysql_config(domain: Domain) -> eyre::Result<MySqlConfig> {
    let config = match domain {
        Domain::AutoInsider => MySqlConfig::from_env_vars("MYSQL_HOST", "MYSQL_PORT", "autoinsider")?,
        Domain::EuropeanRailGuide => {
            MySqlConfig::from_env_vars("MYSQL_HOST_HOMESTEAD", "MYSQL_PORT_HOMESTEAD", "erg")?
        }
    };
    Ok(config)
}
