//! Prometheus metrics for the tg_tools CLI.
//!
//! Exposes:
//! - `tg_tools_command_duration_seconds` (histogram)
//! - `tg_tools_command_total` (counter with status)
//! - `tg_tools_command_inflight` (gauge)
//! - process metrics via `process` collector
//!
//! The endpoint is only served when `--metrics-addr` is given; recording is
//! always on and cheap.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{header, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use once_cell::sync::Lazy;
use prometheus::process_collector::ProcessCollector;
use prometheus::{
    default_registry, register_histogram_vec, register_int_counter_vec, register_int_gauge_vec,
    Encoder, HistogramVec, IntCounterVec, IntGaugeVec, TextEncoder,
};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

static PROCESS_COLLECTOR: Lazy<()> = Lazy::new(|| {
    if let Err(err) = default_registry().register(Box::new(ProcessCollector::for_self())) {
        warn!("Failed to register process collector: {}", err);
    }
});

// Login waits on a human, so buckets reach ~3 minutes.
static COMMAND_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    let buckets =
        prometheus::exponential_buckets(0.05, 2.0, 14).expect("valid histogram buckets");
    register_histogram_vec!(
        "tg_tools_command_duration_seconds",
        "CLI command duration in seconds",
        &["command"],
        buckets
    )
    .expect("register command duration histogram")
});

static COMMAND_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "tg_tools_command_total",
        "Command executions by status",
        &["command", "status"]
    )
    .expect("register command counter")
});

static COMMAND_INFLIGHT: Lazy<IntGaugeVec> = Lazy::new(|| {
    register_int_gauge_vec!(
        "tg_tools_command_inflight",
        "Commands currently running",
        &["command"]
    )
    .expect("register inflight gauge")
});

fn init_collectors() {
    Lazy::force(&PROCESS_COLLECTOR);
    Lazy::force(&COMMAND_DURATION);
    Lazy::force(&COMMAND_TOTAL);
    Lazy::force(&COMMAND_INFLIGHT);
}

/// Tracks one command execution from start to [`CommandTimer::finish`].
///
/// Dropping an unfinished timer records the command as failed.
pub struct CommandTimer {
    command: &'static str,
    started: Instant,
    finished: bool,
}

impl CommandTimer {
    pub fn start(command: &'static str) -> Self {
        init_collectors();
        COMMAND_INFLIGHT.with_label_values(&[command]).inc();
        Self {
            command,
            started: Instant::now(),
            finished: false,
        }
    }

    pub fn finish(mut self, success: bool) {
        self.record(success);
    }

    fn record(&mut self, success: bool) {
        if self.finished {
            return;
        }
        self.finished = true;
        record_command_result(self.command, self.started.elapsed(), success);
    }
}

impl Drop for CommandTimer {
    fn drop(&mut self) {
        self.record(false);
    }
}

fn record_command_result(command: &str, duration: Duration, success: bool) {
    COMMAND_INFLIGHT.with_label_values(&[command]).dec();
    COMMAND_DURATION
        .with_label_values(&[command])
        .observe(duration.as_secs_f64());
    COMMAND_TOTAL
        .with_label_values(&[command, if success { "ok" } else { "error" }])
        .inc();
}

fn respond(status: StatusCode, body: Full<Bytes>) -> Response<Full<Bytes>> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    response
}

fn metrics_response() -> Response<Full<Bytes>> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();

    if let Err(err) = encoder.encode(&prometheus::gather(), &mut buffer) {
        error!("Failed to encode metrics: {}", err);
        return respond(StatusCode::INTERNAL_SERVER_ERROR, Full::from("encode error"));
    }

    let mut response = respond(StatusCode::OK, Full::from(buffer));
    if let Ok(value) = header::HeaderValue::from_str(encoder.format_type()) {
        response.headers_mut().insert(header::CONTENT_TYPE, value);
    }
    response
}

async fn handle_request(req: Request<Incoming>) -> Result<Response<Full<Bytes>>, Infallible> {
    Ok(match req.uri().path() {
        "/metrics" => metrics_response(),
        _ => respond(StatusCode::NOT_FOUND, Full::new(Bytes::new())),
    })
}

async fn serve(listener: TcpListener) -> anyhow::Result<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        let io = TokioIo::new(stream);

        tokio::spawn(async move {
            if let Err(err) = http1::Builder::new()
                .serve_connection(io, service_fn(handle_request))
                .await
            {
                warn!(?peer, "Metrics connection error: {}", err);
            }
        });
    }
}

/// Bind the metrics endpoint and serve it in the background.
pub async fn spawn_metrics_server(addr: SocketAddr) -> anyhow::Result<SocketAddr> {
    init_collectors();
    let listener = TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    info!(addr = %local, "Prometheus metrics endpoint started");

    tokio::spawn(async move {
        if let Err(err) = serve(listener).await {
            error!(addr = %local, "Metrics server failed: {}", err);
        }
    });
    Ok(local)
}
