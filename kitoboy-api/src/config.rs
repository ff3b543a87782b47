//! Service configuration
//!
//! Command line and `KITOBOY_*` environment variables take priority over
//! `config.toml`, which takes priority over compiled defaults.

use clap::Parser;
use kitoboy_common::config::{
    default_database_path, resolve_optional, resolve_setting, TomlConfig, DEFAULT_PORT,
};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Command-line arguments for kitoboy-api
#[derive(Parser, Debug, Default)]
#[command(name = "kitoboy-api")]
#[command(about = "Case-management API for avatar post triage")]
#[command(version)]
pub struct Args {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1", env = "KITOBOY_HOST")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "KITOBOY_PORT")]
    pub port: Option<u16>,

    /// SQLite database file
    #[arg(short, long, env = "KITOBOY_DATABASE")]
    pub database: Option<PathBuf>,

    /// Config file (default: ~/.config/kitoboy/config.toml)
    #[arg(short, long, env = "KITOBOY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Token signing secret
    #[arg(long, env = "KITOBOY_AUTH_KEY", hide_env_values = true)]
    pub auth_key: Option<String>,

    /// Space-separated CORS allow-list
    #[arg(long, env = "KITOBOY_ALLOWED_ORIGINS", value_delimiter = ' ')]
    pub allowed_origins: Vec<String>,

    /// Base URL of the post classifier service
    #[arg(long, env = "KITOBOY_CLASSIFIER_URL")]
    pub classifier_url: Option<String>,

    /// Operator account created at startup when absent
    #[arg(long, env = "KITOBOY_UI_USER")]
    pub ui_user: Option<String>,

    #[arg(long, env = "KITOBOY_UI_PASSWORD", hide_env_values = true)]
    pub ui_password: Option<String>,
}

/// Fully resolved settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub auth_key: Option<String>,
    pub allowed_origins: Vec<String>,
    pub classifier_url: Option<String>,
    /// Username and password of the seeded operator account
    pub ui_user: Option<(String, String)>,
}

impl ServiceConfig {
    pub fn resolve(args: Args, file: TomlConfig) -> Self {
        let (port, port_source) = resolve_setting("port", args.port, file.port, DEFAULT_PORT);
        let (database_path, database_source) = resolve_setting(
            "database_path",
            args.database,
            file.database_path,
            default_database_path(),
        );
        debug!("port {} from {:?}", port, port_source);
        debug!("database_path {} from {:?}", database_path.display(), database_source);
        let auth_key = resolve_optional("auth_key", args.auth_key, file.auth_key);
        let command_line_origins = Some(args.allowed_origins).filter(|origins| !origins.is_empty());
        let (allowed_origins, _) = resolve_setting(
            "allowed_origins",
            command_line_origins,
            file.allowed_origins,
            Vec::new(),
        );
        let classifier_url =
            resolve_optional("classifier_url", args.classifier_url, file.classifier_url);
        let ui_user = resolve_optional("ui_user", args.ui_user, file.ui_user);
        let ui_password = resolve_optional("ui_password", args.ui_password, file.ui_password);

        let ui_user = match (ui_user, ui_password) {
            (Some(user), Some(password)) if !user.trim().is_empty() && !password.trim().is_empty() => {
                Some((user.trim().to_string(), password.trim().to_string()))
            }
            (None, None) => None,
            _ => {
                warn!("ui_user and ui_password must both be set; operator account not seeded");
                None
            }
        };

        Self {
            host: args.host,
            port,
            database_path,
            auth_key: auth_key.filter(|key| !key.is_empty()),
            allowed_origins: allowed_origins
                .into_iter()
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect(),
            classifier_url: classifier_url.filter(|url| !url.trim().is_empty()),
            ui_user,
        }
    }
}
