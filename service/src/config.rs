use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Debug, PartialEq)]
pub enum RustEnv {
    Development,
    Production,
    Staging,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RustEnvParseError;

impl FromStr for RustEnv {
    type Err = RustEnvParseError;
    fn from_str(level: &str) -> Result<RustEnv, Self::Err> {
        match level.to_lowercase().as_str() {
            "development" => Ok(RustEnv::Development),
            "production" => Ok(RustEnv::Production),
            "staging" => Ok(RustEnv::Staging),
            _ => Err(RustEnvParseError),
        }
    }
}

impl fmt::Display for RustEnv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RustEnv::Development => write!(f, "development"),
            RustEnv::Production => write!(f, "production"),
            RustEnv::Staging => write!(f, "staging"),
        }
    }
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// A list of full CORS origin URLs that allowed to receive server responses.
    #[arg(
        long,
        env,
        value_delimiter = ',',
        use_value_delimiter = true,
        default_value = "http://localhost:4200,https://localhost:4200"
    )]
    pub allowed_origins: Vec<String>,

    /// The signing secret for access tokens. Must differ from the refresh
    /// secret so that one token variant can never verify as the other.
    #[arg(long, env, default_value = "dev-access-secret-change-me")]
    jwt_access_secret: String,

    /// The signing secret for refresh tokens.
    #[arg(long, env, default_value = "dev-refresh-secret-change-me")]
    jwt_refresh_secret: String,

    /// Access token lifetime in seconds (default: 15 minutes)
    #[arg(long, env, default_value_t = 900)]
    pub access_token_expiry_seconds: u64,

    /// Refresh token lifetime in seconds (default: 7 days)
    #[arg(long, env, default_value_t = 604_800)]
    pub refresh_token_expiry_seconds: u64,

    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: Option<String>,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 4000)]
    pub port: u16,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,

    /// Set the Rust runtime environment to use.
    #[arg(
    short,
    long,
    env,
    default_value_t = RustEnv::Development,
    value_parser = clap::builder::PossibleValuesParser::new([
        "DEVELOPMENT", "PRODUCTION", "STAGING",
        "development", "production", "staging"
    ])
        .map(|s| s.parse::<RustEnv>().unwrap()),
    )]
    pub runtime_env: RustEnv,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    pub fn jwt_access_secret(&self) -> &str {
        &self.jwt_access_secret
    }

    pub fn jwt_refresh_secret(&self) -> &str {
        &self.jwt_refresh_secret
    }

    pub fn runtime_env(&self) -> RustEnv {
        self.runtime_env.clone()
    }

    pub fn is_production(&self) -> bool {
        self.runtime_env() == RustEnv::Production
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Parse from an explicit empty argv so host environment variables and
    // real CLI arguments don't leak into test assertions.
    fn default_config() -> Config {
        Config::parse_from::<[&str; 1], &str>(["test"])
    }

    #[test]
    fn default_token_lifetimes_match_documented_values() {
        let config = default_config();
        assert_eq!(config.access_token_expiry_seconds, 900);
        assert_eq!(config.refresh_token_expiry_seconds, 604_800);
    }

    #[test]
    fn access_and_refresh_secrets_differ_by_default() {
        let config = default_config();
        assert_ne!(config.jwt_access_secret(), config.jwt_refresh_secret());
    }

    #[test]
    fn rust_env_parses_case_insensitively() {
        assert_eq!("PRODUCTION".parse::<RustEnv>(), Ok(RustEnv::Production));
        assert_eq!("staging".parse::<RustEnv>(), Ok(RustEnv::Staging));
        assert!("garbage".parse::<RustEnv>().is_err());
    }
}
