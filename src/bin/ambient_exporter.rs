// ambient_exporter - Prometheus metrics exporter for Ambient Weather stations
//
// Copyright 2022 Nick Pillitteri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//

use ambient_exporter::atmosphere::Elevation;
use ambient_exporter::http::RequestContext;
use ambient_exporter::metrics::PrometheusSink;
use clap::{Parser, ValueEnum};
use prometheus_client::registry::Registry;
use std::error::Error;
use std::io;
use std::net::SocketAddr;
use std::process;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal::unix::{self, SignalKind};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::Level;

const DEFAULT_LOG_LEVEL: Level = Level::INFO;
const DEFAULT_BIND_ADDR: ([u8; 4], u16) = ([0, 0, 0, 0], 9600);
const DEFAULT_TIMEOUT_MILLIS: u64 = 5000;
const METRICS_PREFIX: &str = "ambient_weather";

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LengthUnit {
    Feet,
    Meters,
}

#[derive(Debug, Parser)]
#[clap(name = "ambient_exporter", version = clap::crate_version!())]
struct AmbientExporterApplication {
    /// Elevation of the weather station. Used to correct pressure and humidity
    /// calculations. Must be non-zero.
    #[clap(long, value_parser = parse_elevation)]
    elevation: f64,

    /// Units of the station elevation.
    #[clap(long, value_enum, default_value_t = LengthUnit::Feet)]
    elevation_unit: LengthUnit,

    /// Logging verbosity. Allowed values are 'trace', 'debug', 'info', 'warn', and 'error'
    /// (case insensitive)
    #[clap(long, default_value_t = DEFAULT_LOG_LEVEL)]
    log_level: Level,

    /// Timeout for handling a single HTTP request, in milliseconds.
    #[clap(long, default_value_t = DEFAULT_TIMEOUT_MILLIS)]
    timeout_millis: u64,

    /// Address to bind to. By default, ambient_exporter will bind to public address since
    /// weather stations need to push reports to it and Prometheus (or another agent) needs
    /// to scrape it.
    #[clap(long, default_value_t = DEFAULT_BIND_ADDR.into())]
    bind: SocketAddr,
}

fn parse_elevation(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|e| format!("{}", e))?;
    if v == 0.0 || !v.is_finite() {
        return Err(format!("elevation must be a non-zero number, got {}", v));
    }

    Ok(v)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let opts = AmbientExporterApplication::parse();
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(opts.log_level)
            .finish(),
    )
    .expect("failed to set tracing subscriber");

    let elevation = match opts.elevation_unit {
        LengthUnit::Feet => Elevation::from_feet(opts.elevation),
        LengthUnit::Meters => Elevation::from_meters(opts.elevation),
    };

    let mut registry = Registry::with_prefix(METRICS_PREFIX);
    let sink = Arc::new(PrometheusSink::new(&mut registry));
    let context = Arc::new(RequestContext::new(registry, sink, elevation));
    let timeout = Duration::from_millis(opts.timeout_millis);

    let app = ambient_exporter::http::router(context)
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http());

    let server = axum::Server::try_bind(&opts.bind)
        .map(|builder| builder.serve(app.into_make_service()))
        .unwrap_or_else(|e| {
            tracing::error!(message = "error binding to address", address = %opts.bind, error = %e);
            process::exit(1)
        });

    tracing::info!(message = "server started", address = %server.local_addr(), elevation = %elevation);

    server
        .with_graceful_shutdown(async {
            // Wait for either SIGTERM or SIGINT to shutdown
            tokio::select! {
                _ = sigterm() => {}
                _ = sigint() => {}
            }
        })
        .await?;

    tracing::info!("server shutdown");
    Ok(())
}

/// Return after the first SIGTERM signal received by this process
async fn sigterm() -> io::Result<()> {
    unix::signal(SignalKind::terminate())?.recv().await;
    Ok(())
}

/// Return after the first SIGINT signal received by this process
async fn sigint() -> io::Result<()> {
    unix::signal(SignalKind::interrupt())?.recv().await;
    Ok(())
}
