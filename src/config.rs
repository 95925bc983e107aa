//! Startup configuration.
//!
//! Values come from command-line flags, then environment variables (a `.env`
//! file is loaded first by the binary), then defaults.
//!
//! | Flag | Env var | Default |
//! |---|---|---|
//! | `--host` | `HOST` | `0.0.0.0` |
//! | `--port` | `PORT` | `5000` |
//! | `--no-seed` | `KENNEL_NO_SEED` | off |
//! | `--body-limit` | `KENNEL_BODY_LIMIT` | `102400` bytes |

use clap::Parser;

use crate::server::DEFAULT_BODY_LIMIT;

#[derive(Parser, Debug, Clone)]
#[command(name = "kennel")]
#[command(about = "In-memory JSON resource server for dogs and hubs", long_about = None)]
pub struct Config {
    /// Interface to listen on
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Start with empty stores instead of the example records
    #[arg(long, env = "KENNEL_NO_SEED")]
    pub no_seed: bool,

    /// Largest request body accepted, in bytes
    #[arg(long, env = "KENNEL_BODY_LIMIT", default_value_t = DEFAULT_BODY_LIMIT)]
    pub body_limit: usize,
}

impl Config {
    /// `host:port`, bracketing IPv6 hosts.
    pub fn addr(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    pub fn seed(&self) -> bool {
        !self.no_seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let config = Config::try_parse_from(["kennel", "--port", "8080", "--no-seed"]).unwrap();
        assert_eq!(config.port, 8080);
        assert!(!config.seed());
        assert_eq!(config.addr(), format!("{}:8080", config.host));

        let config = Config::try_parse_from(["kennel", "--body-limit", "16"]).unwrap();
        assert_eq!(config.body_limit, 16);
    }

    #[test]
    fn ipv6_host_is_bracketed() {
        let config = Config::try_parse_from(["kennel", "--host", "::1", "--port", "1"]).unwrap();
        assert_eq!(config.addr(), "[::1]:1");
    }

    #[test]
    fn rejects_non_numeric_port() {
        assert!(Config::try_parse_from(["kennel", "--port", "dog"]).is_err());
    }
}
