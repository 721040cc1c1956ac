//! Pull-based scrape endpoint.
//!
//! Serves the registry in Prometheus text exposition format. Binding happens
//! up front so that a port conflict is reported before any work is scheduled.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{CONTENT_TYPE, HeaderValue};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::infrastructure::observability::metrics::Metrics;

/// HTTP server exposing the metrics registry.
pub struct MetricsServer {
    listener: TcpListener,
    metrics_path: Arc<str>,
    metrics: Metrics,
}

impl MetricsServer {
    /// Bind the listening socket.
    ///
    /// Failure here is the exporter's only fatal runtime condition.
    pub async fn bind(
        addr: SocketAddr,
        metrics_path: impl Into<String>,
        metrics: Metrics,
    ) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind metrics endpoint on {}", addr))?;

        let metrics_path: String = metrics_path.into();
        Ok(Self {
            listener,
            metrics_path: Arc::from(metrics_path),
            metrics,
        })
    }

    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until the runtime shuts down.
    pub async fn run(self) {
        if let Ok(addr) = self.listener.local_addr() {
            info!("MetricsServer: Listening on {}{}", addr, self.metrics_path);
        }

        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    error!("MetricsServer: Accept failed: {}", e);
                    continue;
                }
            };
            debug!("MetricsServer: Connection from {}", peer);

            let io = TokioIo::new(stream);
            let metrics_path = self.metrics_path.clone();
            let metrics = self.metrics.clone();

            tokio::spawn(async move {
                let service = service_fn(move |req: Request<hyper::body::Incoming>| {
                    let response = handle_request(&req, &metrics_path, &metrics);
                    async move { Ok::<_, Infallible>(response) }
                });

                if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                    debug!("MetricsServer: Connection error: {}", e);
                }
            });
        }
    }

    /// Run the server on a background task.
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run())
    }
}

fn handle_request<B>(
    req: &Request<B>,
    metrics_path: &str,
    metrics: &Metrics,
) -> Response<Full<Bytes>> {
    let path = req.uri().path();

    if req.method() != Method::GET && req.method() != Method::HEAD {
        return text_response(
            StatusCode::METHOD_NOT_ALLOWED,
            "text/plain",
            "Method Not Allowed".to_string(),
        );
    }

    if path == metrics_path {
        text_response(StatusCode::OK, prometheus::TEXT_FORMAT, metrics.render())
    } else if path == "/health" || path == "/healthz" {
        text_response(StatusCode::OK, "text/plain", "OK".to_string())
    } else {
        text_response(StatusCode::NOT_FOUND, "text/plain", "Not Found".to_string())
    }
}

fn text_response(
    status: StatusCode,
    content_type: &'static str,
    body: String,
) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::{SeriesDescriptor, SourceLocator};

    fn metrics() -> Metrics {
        Metrics::new(&[SeriesDescriptor::new(
            "mortgage30us",
            "30-Year Fixed Rate Mortgage Average in the United States",
            SourceLocator::parse("MORTGAGE30US.txt"),
        )])
        .expect("Failed to create metrics")
    }

    fn get(path: &str) -> Request<()> {
        Request::builder().uri(path).body(()).unwrap()
    }

    #[test]
    fn test_metrics_path_serves_exposition() {
        let metrics = metrics();
        metrics.series_gauge("mortgage30us").unwrap().set(6.6);

        let response = handle_request(&get("/metrics"), "/metrics", &metrics);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            prometheus::TEXT_FORMAT
        );
    }

    #[test]
    fn test_health_and_unknown_paths() {
        let metrics = metrics();
        assert_eq!(
            handle_request(&get("/health"), "/metrics", &metrics).status(),
            StatusCode::OK
        );
        assert_eq!(
            handle_request(&get("/nope"), "/metrics", &metrics).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_post_is_rejected() {
        let metrics = metrics();
        let req = Request::builder()
            .method(Method::POST)
            .uri("/metrics")
            .body(())
            .unwrap();
        assert_eq!(
            handle_request(&req, "/metrics", &metrics).status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
    }

    #[tokio::test]
    async fn test_bind_conflict_is_an_error() {
        let first = MetricsServer::bind("127.0.0.1:0".parse().unwrap(), "/metrics", metrics())
            .await
            .expect("first bind should succeed");
        let taken = first.local_addr().unwrap();

        let second = MetricsServer::bind(taken, "/metrics", metrics()).await;
        assert!(second.is_err());
    }
}
