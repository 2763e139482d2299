use std::net::SocketAddr;
use std::time::Duration;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DB_PATH: &str = "./db/budgetbook.db";
const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_USER_ID: i32 = 1;
const DEFAULT_SESSION_IDLE_SECS: u64 = 30 * 60;

/// Server settings, read from `BB_*` environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    /// `["*"]` allows any origin.
    pub cors_allow_origins: Vec<String>,
    pub request_timeout: Duration,
    /// The signed-in user. Authentication happens in front of this server.
    pub user_id: i32,
    /// Sessions idle for longer than this are dropped.
    pub session_idle_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            db_path: DEFAULT_DB_PATH.to_string(),
            cors_allow_origins: vec!["*".to_string()],
            request_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            user_id: DEFAULT_USER_ID,
            session_idle_timeout: Duration::from_secs(DEFAULT_SESSION_IDLE_SECS),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = Config::default();

        let listen_addr = std::env::var("BB_LISTEN_ADDR")
            .unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_string())
            .parse()
            .unwrap_or(defaults.listen_addr);
        let db_path = std::env::var("BB_DB_PATH").unwrap_or(defaults.db_path);
        let cors_allow_origins = std::env::var("BB_CORS_ALLOW_ORIGINS")
            .map(|raw| parse_origins(&raw))
            .unwrap_or(defaults.cors_allow_origins);
        let request_timeout = std::env::var("BB_REQUEST_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.request_timeout);
        let user_id = std::env::var("BB_USER_ID")
            .ok()
            .and_then(|v| v.parse::<i32>().ok())
            .unwrap_or(defaults.user_id);
        let session_idle_timeout = std::env::var("BB_SESSION_IDLE_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.session_idle_timeout);

        Config {
            listen_addr,
            db_path,
            cors_allow_origins,
            request_timeout,
            user_id,
            session_idle_timeout,
        }
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_allow_origins.is_empty() || self.cors_allow_origins.iter().any(|o| o == "*")
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
