//! Host name resolution for the transport engine

use crate::error::{AppError, Result};
use std::net::IpAddr;
use std::time::{Duration, Instant};
use trust_dns_resolver::{
    config::{ResolverConfig, ResolverOpts},
    system_conf, TokioAsyncResolver,
};
use url::Host;

/// Outcome of resolving a URL host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Address used for the connection
    pub addr: IpAddr,
    /// Time spent in the lookup; zero for IP literals
    pub elapsed: Duration,
    /// Whether the host was an IP literal and no lookup happened
    pub literal: bool,
}

/// Resolves URL hosts with the system DNS configuration
#[derive(Clone)]
pub struct HostResolver {
    resolver: TokioAsyncResolver,
}

impl HostResolver {
    /// Build a resolver from the system configuration.
    ///
    /// Must be called from within a tokio runtime.
    pub fn from_system_conf() -> Result<Self> {
        let (config, opts) = system_conf::read_system_conf().map_err(|e| {
            AppError::transport_init(format!("Failed to read system DNS config: {}", e))
        })?;

        Ok(Self::new(config, opts))
    }

    /// Build a resolver from an explicit configuration
    pub fn new(config: ResolverConfig, opts: ResolverOpts) -> Self {
        Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
        }
    }

    /// Resolve a URL host to the address the connection should use.
    ///
    /// IP literals are returned as-is. For names the first address of the
    /// lookup wins.
    pub async fn resolve<S: AsRef<str>>(&self, host: &Host<S>) -> Result<Resolution> {
        let domain = match host {
            Host::Domain(domain) => domain.as_ref(),
            _ => {
                return Resolution::from_literal(host)
                    .ok_or_else(|| AppError::internal("host is neither a name nor an address"))
            }
        };

        let start = Instant::now();
        let response = self.resolver.lookup_ip(domain).await.map_err(|e| {
            AppError::transport(format!("Could not resolve host {}: {}", domain, e))
        })?;
        let elapsed = start.elapsed();

        let addr = response
            .iter()
            .next()
            .ok_or_else(|| AppError::transport(format!("No addresses found for host {}", domain)))?;

        Ok(Resolution {
            addr,
            elapsed,
            literal: false,
        })
    }
}

impl Resolution {
    /// The resolution of an IP literal host, `None` for domain names
    pub fn from_literal<S: AsRef<str>>(host: &Host<S>) -> Option<Self> {
        match host {
            Host::Ipv4(addr) => Some(Self::literal(IpAddr::V4(*addr))),
            Host::Ipv6(addr) => Some(Self::literal(IpAddr::V6(*addr))),
            Host::Domain(_) => None,
        }
    }

    fn literal(addr: IpAddr) -> Self {
        Self {
            addr,
            elapsed: Duration::ZERO,
            literal: true,
        }
    }
}
