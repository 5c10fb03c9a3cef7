//! Blocking transport engine on top of reqwest

use super::{TransferInfo, TransferOptions, TransportEngine};
use crate::{
    dns::HostResolver,
    error::{AppError, Result},
    limits::MAX_REDIRECTS,
    models::metrics::TimingSample,
    trace::{ResponseSink, TraceEvent, TraceSink},
};
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT},
    redirect, Client, Request, Response,
};
use std::{
    future::Future,
    net::SocketAddr,
    time::{Duration, Instant},
};
use tokio::{net::TcpStream, runtime::Runtime};
use url::{Host, Url};

/// Transport engine that drives reqwest on a private current-thread runtime.
///
/// Every execution resolves the host, times a TCP handshake to the resolved
/// address, then sends a GET pinned to that address and streams the body.
/// The reported address is the peer of the final redirect hop.
/// Must not be used from inside another tokio runtime.
#[derive(Default)]
pub struct ReqwestEngine {
    runtime: Option<Runtime>,
    resolver: Option<HostResolver>,
    options: Option<TransferOptions>,
    last: Option<TransferInfo>,
}

impl ReqwestEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_started(&self) -> bool {
        self.runtime.is_some()
    }
}

impl TransportEngine for ReqwestEngine {
    fn start(&mut self) -> Result<()> {
        if self.is_started() {
            return Ok(());
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| AppError::transport_init(format!("Failed to build runtime: {}", e)))?;

        let resolver = runtime.block_on(async { HostResolver::from_system_conf() })?;

        self.runtime = Some(runtime);
        self.resolver = Some(resolver);
        Ok(())
    }

    fn configure(&mut self, options: TransferOptions) -> Result<()> {
        if !self.is_started() {
            return Err(AppError::transport("engine is not started"));
        }
        self.options = Some(options);
        Ok(())
    }

    fn perform(&mut self, body: &mut dyn ResponseSink, trace: &mut dyn TraceSink) -> Result<()> {
        self.last = None;

        let runtime = self
            .runtime
            .as_ref()
            .ok_or_else(|| AppError::transport("engine is not started"))?;
        let resolver = self
            .resolver
            .as_ref()
            .ok_or_else(|| AppError::transport("engine is not started"))?;
        let options = self
            .options
            .as_ref()
            .ok_or_else(|| AppError::transport("no transfer options configured"))?;

        let info = runtime.block_on(execute(resolver, options, body, trace))?;
        self.last = Some(info);
        Ok(())
    }

    fn transfer_info(&self) -> Result<TransferInfo> {
        self.last
            .clone()
            .ok_or_else(|| AppError::transport("no completed transfer to report on"))
    }

    fn shutdown(&mut self) {
        self.last = None;
        self.options = None;
        self.resolver = None;
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

impl Drop for ReqwestEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// One execution. Times are taken relative to `start` at each phase end.
async fn execute(
    resolver: &HostResolver,
    options: &TransferOptions,
    body: &mut dyn ResponseSink,
    trace: &mut dyn TraceSink,
) -> Result<TransferInfo> {
    let start = Instant::now();

    let url = Url::parse(&options.url)?;
    let host = url
        .host()
        .ok_or_else(|| AppError::transport(format!("URL '{}' has no host", url)))?;
    let port = url
        .port_or_known_default()
        .ok_or_else(|| AppError::transport(format!("Unsupported protocol '{}'", url.scheme())))?;

    let resolution = with_timeout(options.timeout, resolver.resolve(&host)).await??;
    let name_lookup = if resolution.literal {
        0.0
    } else {
        start.elapsed().as_secs_f64()
    };
    let addr = SocketAddr::new(resolution.addr, port);
    if !resolution.literal {
        trace.trace(TraceEvent::Text(&format!(
            "Resolved {} to {} in {:.6}s",
            host,
            resolution.addr,
            resolution.elapsed.as_secs_f64()
        )))?;
    }

    trace.trace(TraceEvent::Text(&format!("Trying {}...", addr)))?;
    let stream = with_timeout(options.timeout, TcpStream::connect(addr))
        .await?
        .map_err(|e| AppError::transport(format!("Failed to connect to {}: {}", addr, e)))?;
    let connect = start.elapsed().as_secs_f64();
    drop(stream);
    trace.trace(TraceEvent::Text(&format!(
        "Connected to {} ({}) port {}",
        host, resolution.addr, port
    )))?;

    let client = build_client(options, &host, addr)?;
    let request = client
        .get(url.clone())
        .headers(header_map(options)?)
        .build()?;
    trace.trace(TraceEvent::HeaderOut(request_head(&request).as_bytes()))?;

    let mut response = client.execute(request).await?;
    let start_transfer = start.elapsed().as_secs_f64();
    let status = response.status().as_u16();
    // Peer of the final hop; differs from the resolved address after a redirect
    let primary_ip = response
        .remote_addr()
        .map(|peer| peer.ip())
        .unwrap_or(resolution.addr);
    trace.trace(TraceEvent::HeaderIn(response_head(&response).as_bytes()))?;

    while let Some(chunk) = response.chunk().await? {
        trace.trace(TraceEvent::DataIn(&chunk))?;
        body.write_body(&chunk)?;
    }
    let total = start.elapsed().as_secs_f64();

    Ok(TransferInfo {
        timing: TimingSample::new(name_lookup, connect, start_transfer, total),
        primary_ip: primary_ip.to_string(),
        response_code: status,
    })
}

async fn with_timeout<F: Future>(limit: Option<Duration>, future: F) -> Result<F::Output> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, future)
            .await
            .map_err(|_| AppError::transport(format!("Operation timed out after {:?}", limit))),
        None => Ok(future.await),
    }
}

/// A client for one execution, pinned to the resolved address for names
fn build_client(options: &TransferOptions, host: &Host<&str>, addr: SocketAddr) -> Result<Client> {
    let policy = if options.follow_redirects {
        redirect::Policy::limited(MAX_REDIRECTS)
    } else {
        redirect::Policy::none()
    };

    let mut builder = Client::builder().redirect(policy);
    if let Some(timeout) = options.timeout {
        builder = builder.timeout(timeout);
    }
    if let Host::Domain(domain) = host {
        builder = builder.resolve(domain, addr);
    }

    builder
        .build()
        .map_err(|e| AppError::transport(format!("Failed to create HTTP client: {}", e)))
}

/// Extra headers in order, plus the user agent unless one was supplied
fn header_map(options: &TransferOptions) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    for entry in &options.headers {
        let (name, value) = entry.name_value();
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            AppError::transport(format!("Invalid header name in '{}': {}", entry, e))
        })?;
        let value = HeaderValue::from_str(value).map_err(|e| {
            AppError::transport(format!("Invalid header value in '{}': {}", entry, e))
        })?;
        headers.append(name, value);
    }

    if !headers.contains_key(USER_AGENT) {
        let agent = HeaderValue::from_str(&options.user_agent)
            .map_err(|e| AppError::transport(format!("Invalid user agent: {}", e)))?;
        headers.insert(USER_AGENT, agent);
    }

    Ok(headers)
}

fn request_head(request: &Request) -> String {
    let url = request.url();
    let target = match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    };
    let host = match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{}:{}", host, port),
        (Some(host), None) => host.to_string(),
        _ => String::new(),
    };

    let mut head = format!("{} {} HTTP/1.1\r\nHost: {}\r\n", request.method(), target, host);
    append_headers(&mut head, request.headers());
    head.push_str("\r\n");
    head
}

fn response_head(response: &Response) -> String {
    let mut head = format!("{:?} {}\r\n", response.version(), response.status());
    append_headers(&mut head, response.headers());
    head.push_str("\r\n");
    head
}

fn append_headers(head: &mut String, headers: &HeaderMap) {
    for (name, value) in headers {
        head.push_str(name.as_str());
        head.push_str(": ");
        head.push_str(&String::from_utf8_lossy(value.as_bytes()));
        head.push_str("\r\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HeaderEntry;

    #[test]
    fn test_header_map_keeps_order_and_duplicates() {
        let options = TransferOptions::new("http://x.test/").with_headers(vec![
            HeaderEntry::parse("X-Trace: one").unwrap(),
            HeaderEntry::parse("X-Trace: two").unwrap(),
            HeaderEntry::parse("Accept:text/plain").unwrap(),
        ]);

        let headers = header_map(&options).unwrap();
        let traces: Vec<&str> = headers
            .get_all("x-trace")
            .iter()
            .map(|v| v.to_str().unwrap())
            .collect();
        assert_eq!(traces, ["one", "two"]);
        assert_eq!(headers.get("accept").unwrap(), "text/plain");
        assert!(headers.get(USER_AGENT).unwrap().to_str().unwrap().starts_with("connstat/"));
    }

    #[test]
    fn test_user_supplied_agent_wins() {
        let options = TransferOptions::new("http://x.test/")
            .with_headers(vec![HeaderEntry::parse("User-Agent: probe/1").unwrap()]);

        let headers = header_map(&options).unwrap();
        assert_eq!(headers.get_all(USER_AGENT).iter().count(), 1);
        assert_eq!(headers.get(USER_AGENT).unwrap(), "probe/1");
    }

    #[test]
    fn test_invalid_header_name_is_transport_error() {
        let options = TransferOptions::new("http://x.test/")
            .with_headers(vec![HeaderEntry::parse("Bad Name: v").unwrap()]);

        assert!(matches!(header_map(&options), Err(AppError::Transport(_))));
    }

    #[test]
    fn test_empty_header_name_passes_validation_but_fails_transport() {
        let entry = HeaderEntry::parse(":abc").unwrap();
        let options = TransferOptions::new("http://x.test/").with_headers(vec![entry]);

        let error = header_map(&options).unwrap_err();
        assert!(matches!(error, AppError::Transport(ref msg) if msg.contains("':abc'")));
    }

    #[test]
    fn test_engine_requires_start() {
        let mut engine = ReqwestEngine::new();
        assert!(!engine.is_started());
        assert!(engine.configure(TransferOptions::new("http://x.test/")).is_err());
        assert!(matches!(engine.transfer_info(), Err(AppError::Transport(_))));

        let mut sink = crate::trace::DiscardSink;
        let mut trace = crate::trace::DiscardSink;
        assert!(engine.perform(&mut sink, &mut trace).is_err());
    }

    #[test]
    fn test_shutdown_is_repeatable() {
        let mut engine = ReqwestEngine::new();
        engine.shutdown();
        engine.shutdown();
        assert!(!engine.is_started());
    }

    #[test]
    fn test_request_head_rendering() {
        let client = Client::new();
        let request = client
            .get("http://127.0.0.1:8080/path?q=1")
            .header("X-A", "1")
            .build()
            .unwrap();

        let head = request_head(&request);
        assert!(head.starts_with("GET /path?q=1 HTTP/1.1\r\nHost: 127.0.0.1:8080\r\n"));
        assert!(head.contains("x-a: 1\r\n"));
        assert!(head.ends_with("\r\n\r\n"));
    }
}
