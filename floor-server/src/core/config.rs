use crate::auth::JwtConfig;
use crate::utils::{AppError, ErrorCode};

/// 服务器配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (数据库、日志) |
/// | DATABASE_PATH | {WORK_DIR}/floor.db | SQLite 数据库文件 |
/// | HTTP_PORT | 8000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | SEED_SAMPLE_DATA | 开发环境为 true | 空库时写入示例桌台和菜单 |
/// | ADMIN_EMAIL / ADMIN_PASSWORD / ADMIN_NAME | - | 首次启动创建管理员 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | - | 日志文件目录 (按天滚动) |
/// | LOG_JSON | false | JSON 格式日志 |
///
/// JWT 相关变量见 [`JwtConfig`]。
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/srv/floor HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录
    pub work_dir: String,
    /// SQLite 数据库路径
    pub database_path: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 空库时是否写入示例数据
    pub seed_sample_data: bool,
    /// 首次启动创建的管理员账号
    pub admin: Option<AdminBootstrap>,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub log_json: bool,
}

/// Bootstrap admin account, created when no admin exists yet
#[derive(Debug, Clone)]
pub struct AdminBootstrap {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 生产环境缺少合法的 JWT_SECRET 时返回错误
    pub fn from_env() -> Result<Self, AppError> {
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into());
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let is_production = environment == "production";

        let jwt = JwtConfig::from_env(is_production)
            .map_err(|e| AppError::with_message(ErrorCode::ConfigError, e.to_string()))?;

        let admin = match (
            std::env::var("ADMIN_EMAIL").ok(),
            std::env::var("ADMIN_PASSWORD").ok(),
        ) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Some(AdminBootstrap {
                    email,
                    password,
                    name: std::env::var("ADMIN_NAME").unwrap_or_else(|_| "Administrator".into()),
                })
            }
            _ => None,
        };

        Ok(Self {
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| format!("{}/floor.db", work_dir)),
            work_dir,
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            seed_sample_data: std::env::var("SEED_SAMPLE_DATA")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(environment == "development"),
            environment,
            jwt,
            admin,
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            log_json: std::env::var("LOG_JSON")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        })
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景，不读取环境变量
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let work_dir = work_dir.into();
        Self {
            database_path: format!("{}/floor.db", work_dir),
            work_dir,
            http_port,
            ..Self::default()
        }
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            work_dir: "./data".into(),
            database_path: "./data/floor.db".into(),
            http_port: 8000,
            environment: "development".into(),
            jwt: JwtConfig::default(),
            seed_sample_data: false,
            admin: None,
            log_level: "info".into(),
            log_dir: None,
            log_json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_overrides() {
        let config = Config::with_overrides("/tmp/floor", 9000);
        assert_eq!(config.database_path, "/tmp/floor/floor.db");
        assert_eq!(config.http_port, 9000);
        assert!(config.is_development());
        assert!(!config.is_production());
        assert!(!config.seed_sample_data);
    }
}
