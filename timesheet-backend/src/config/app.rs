// src/config/app.rs

use crate::utils::email::EmailConfig;
use crate::utils::jwt::JwtConfig;
use std::env;

/// データベース接続プールの設定
#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub min_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            max_connections: 20,
            min_connections: 2,
        }
    }
}

/// 通知の外部配送の設定
#[derive(Clone, Debug)]
pub struct NotificationConfig {
    /// false の場合は通知レコードだけを作り、メールは送らない
    pub email_enabled: bool,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub environment: String,
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub database: DatabaseConfig,
    pub run_migrations: bool,
    /// カンマ区切りの許可オリジン
    pub cors_allowed_origins: String,
    pub jwt: JwtConfig,
    pub notification: NotificationConfig,
    pub email: EmailConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let jwt = JwtConfig::from_env().map_err(|e| e.to_string())?;
        jwt.validate().map_err(|e| e.to_string())?;

        let email = EmailConfig::from_env().map_err(|e| e.to_string())?;

        Ok(Self {
            environment,
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .map_err(|_| "Invalid PORT value")?,
            database_url: env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?,
            database: DatabaseConfig {
                max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 20)?,
                min_connections: parse_or("DATABASE_MIN_CONNECTIONS", 2)?,
            },
            run_migrations: parse_bool("RUN_MIGRATIONS", true),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            jwt,
            notification: NotificationConfig {
                email_enabled: parse_bool("NOTIFICATION_EMAIL_ENABLED", true),
            },
            email,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// テスト用の設定を作成
    ///
    /// インメモリ SQLite、固定の JWT 秘密鍵、開発モードのメールを使う。
    pub fn for_testing() -> Self {
        Self {
            environment: "test".to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
            database_url: "sqlite::memory:".to_string(),
            // インメモリDBは接続ごとに別DBになるため1本に固定する
            database: DatabaseConfig {
                max_connections: 1,
                min_connections: 1,
            },
            run_migrations: true,
            cors_allowed_origins: "http://localhost:3000".to_string(),
            jwt: JwtConfig {
                secret_key: "test-secret-key-that-is-at-least-32-characters-long".to_string(),
                access_token_expiry_minutes: 15,
                ..Default::default()
            },
            notification: NotificationConfig {
                email_enabled: true,
            },
            email: EmailConfig::default(),
        }
    }
}

fn parse_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .and_then(|value| match value.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T, String> {
    match env::var(key) {
        Ok(value) => value
            .parse()
            .map_err(|_| format!("Invalid {} value", key)),
        Err(_) => Ok(default),
    }
}
