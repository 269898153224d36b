// src/server/mod.rs
use crate::metrics::MetricsRegistry;
use anyhow::{Context, Result};
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Request, Response, Server, StatusCode};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

const METRICS_PATH: &str = "/metrics";

/// Bind the exposition endpoint and serve it on a background task for the
/// lifetime of the process. Bind failure is fatal: without the endpoint the
/// probe has no way to report anything. Returns the bound address (useful
/// when binding port 0).
pub async fn start_metrics_server(addr: SocketAddr, registry: MetricsRegistry) -> Result<SocketAddr> {
    let registry = Arc::new(registry);

    let make_service = make_service_fn(move |_| {
        let registry = registry.clone();

        async move {
            Ok::<_, Infallible>(service_fn(move |req: Request<Body>| {
                let registry = registry.clone();

                async move { Ok::<_, Infallible>(handle(&req, &registry)) }
            }))
        }
    });

    let server = Server::try_bind(&addr)
        .with_context(|| format!("Failed to bind metrics endpoint on {}", addr))?
        .serve(make_service);

    let bound = server.local_addr();
    info!("Metrics server listening on http://{}{}", bound, METRICS_PATH);

    tokio::spawn(async move {
        if let Err(e) = server.await {
            error!("Metrics server error: {}", e);
        }
    });

    Ok(bound)
}

fn handle(req: &Request<Body>, registry: &MetricsRegistry) -> Response<Body> {
    if req.uri().path() == METRICS_PATH {
        Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "text/plain; version=0.0.4")
            .body(Body::from(registry.gather()))
            .unwrap()
    } else {
        Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(Body::from("Not Found"))
            .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn metrics_path_serves_exposition() {
        let registry = MetricsRegistry::new().unwrap();
        let req = Request::get("/metrics").body(Body::empty()).unwrap();

        let resp = handle(&req, &registry);
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()["Content-Type"],
            "text/plain; version=0.0.4"
        );

        let body = hyper::body::to_bytes(resp.into_body()).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("jupyterhub_db_probe_success 0"));
    }

    #[tokio::test]
    async fn other_paths_are_not_found() {
        let registry = MetricsRegistry::new().unwrap();
        let req = Request::get("/healthz").body(Body::empty()).unwrap();

        let resp = handle(&req, &registry);
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
