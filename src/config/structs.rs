use serde::{Deserialize, Serialize};

/// 默认的注册路由
pub const DEFAULT_CREATE_PATH: &str = "/create";

/// 静态配置（从 TOML 加载，启动时使用）
///
/// 包含：
/// - server: 监听地址、端口、worker 数量
/// - database: 数据库文件与打开超时
/// - seed: 启动时导入的 YAML 文件
/// - routes: 注册路由路径
/// - logging: 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub seed: SeedConfig,
    #[serde(default)]
    pub routes: RoutesConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > TOML 文件 > 默认值
    /// ENV 前缀：URLSHORT，分隔符：__
    /// 示例：URLSHORT__SERVER__PORT=9999
    pub fn load(path: Option<&str>) -> crate::errors::Result<Self> {
        use config::{Config, Environment, File};

        let path = path.unwrap_or(DEFAULT_CONFIG_FILE);

        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("URLSHORT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| crate::errors::UrlshortError::config(e.to_string()))?;

        settings
            .try_deserialize::<StaticConfig>()
            .map_err(|e| crate::errors::UrlshortError::config(e.to_string()))
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }
}

pub const DEFAULT_CONFIG_FILE: &str = "urlshort.toml";

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
}

/// Embedded database file settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: String,
    /// How long to wait for the file lock before giving up.
    #[serde(default = "default_open_timeout_ms")]
    pub open_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    #[serde(default = "default_seed_file")]
    pub file: String,
}

/// 路由配置
///
/// `create_path` is both the registration route and the one path that
/// may never be registered as a short link.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoutesConfig {
    #[serde(default = "default_create_path")]
    pub create_path: String,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default)]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions
// ============================================================

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_database_path() -> String {
    "url.db".to_string()
}

fn default_open_timeout_ms() -> u64 {
    1000
}

fn default_seed_file() -> String {
    "example.yml".to_string()
}

fn default_create_path() -> String {
    DEFAULT_CREATE_PATH.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            open_timeout_ms: default_open_timeout_ms(),
        }
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            file: default_seed_file(),
        }
    }
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            create_path: default_create_path(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: false,
        }
    }
}
