//! Development server configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use crate::cli::DevArgs;
use crate::error::{CliError, Result};

#[derive(Debug, Clone)]
pub struct DevConfig {
    /// Server socket address (IP + port)
    pub addr: SocketAddr,

    /// Directory static files are served from
    pub root: PathBuf,

    /// Open browser automatically on start
    pub open: bool,
}

impl DevConfig {
    pub fn from_args(args: &DevArgs, root: PathBuf) -> Result<Self> {
        let ip = parse_host(&args.host)?;
        Ok(Self {
            addr: SocketAddr::new(ip, args.port),
            root,
            open: args.open,
        })
    }

    /// URL printed for humans; unspecified addresses show as `localhost`.
    pub fn server_url(&self) -> String {
        if self.addr.ip().is_unspecified() || self.addr.ip().is_loopback() {
            format!("http://localhost:{}", self.addr.port())
        } else {
            format!("http://{}", self.addr)
        }
    }
}

fn parse_host(host: &str) -> Result<IpAddr> {
    if host.eq_ignore_ascii_case("localhost") {
        return Ok(IpAddr::V4(Ipv4Addr::LOCALHOST));
    }
    host.parse().map_err(|_| {
        CliError::InvalidArgument(format!(
            "'{host}' is not an IP address\n\nHint: Use an address like 127.0.0.1 or 0.0.0.0, or 'localhost'"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(host: &str, port: u16) -> DevArgs {
        DevArgs {
            port,
            host: host.to_string(),
            strategy: vec![],
            open: false,
            config: None,
        }
    }

    #[test]
    fn test_localhost_maps_to_loopback() {
        let config = DevConfig::from_args(&args("localhost", 5173), PathBuf::from(".")).unwrap();
        assert_eq!(config.addr, "127.0.0.1:5173".parse().unwrap());
        assert_eq!(config.server_url(), "http://localhost:5173");
    }

    #[test]
    fn test_explicit_address() {
        let config = DevConfig::from_args(&args("192.168.1.20", 8080), PathBuf::from(".")).unwrap();
        assert_eq!(config.server_url(), "http://192.168.1.20:8080");
    }

    #[test]
    fn test_invalid_host() {
        assert!(DevConfig::from_args(&args("not a host", 80), PathBuf::from(".")).is_err());
    }
}
