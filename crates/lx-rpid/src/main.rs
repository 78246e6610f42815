//! lx-rpid: the LayerX Mesos RPI daemon.
//!
//! Wires the provider pools, dispatcher, driver supervisor, offer pump, HTTP API and
//! error supervisor together, registers with the LayerX core, then serves until Ctrl-C.

mod config;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use clap::Parser;
use lx_api::{BridgeApiAdapter, HttpApi, axum};
use lx_core::{
    BridgeApi, CoreError, DriverSupervisor, ErrorReporter, LoopbackDriver, PendingTaskPool,
    StatusBook, TaskProviderPool, dispatch_channel, error_channel,
};
use lx_discover::{DiscoverError, RegisterConfig, register};
use lx_model::ResourceUnit;
use lx_observe::{LoggerConfig, LoggerFormat, logger_init};
use tokio::{net::TcpListener, sync::mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::config::Config;

fn main() -> anyhow::Result<()> {
    let cfg = Config::parse();

    // Still single threaded here, so the logger config can read the local offset.
    let format: LoggerFormat = cfg.log_format.parse()?;
    logger_init(&LoggerConfig::verbose(cfg.debug).with_format(format))?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")?;

    let span = info_span!("rpi", rpi = %cfg.name);
    runtime.block_on(run(cfg).instrument(span))
}

async fn run(cfg: Config) -> anyhow::Result<()> {
    let local_ip = cfg.local_ip().context("detecting local address")?;
    let address = SocketAddr::new(local_ip, cfg.port);
    info!(%address, master = %cfg.master, "starting LayerX Mesos RPI");

    let cancel = CancellationToken::new();

    // 1) Error supervisor
    let (errors, error_supervisor) = error_channel();
    let errors_task = tokio::spawn(error_supervisor.run(cancel.clone()).in_current_span());

    // 2) Pools + dispatch
    let statuses = StatusBook::new();
    let (queue, commands) = dispatch_channel();
    let bridge = BridgeApi::new(
        Arc::new(TaskProviderPool::new()),
        Arc::new(PendingTaskPool::new()),
        queue,
        statuses.view(),
    );

    // 3) HTTP API
    let listener = TcpListener::bind(address)
        .await
        .with_context(|| format!("binding {address}"))?;
    let router = HttpApi::new(Arc::new(BridgeApiAdapter::new(bridge.clone()))).router();
    let server_task =
        tokio::spawn(serve(listener, router, cancel.clone(), errors.clone()).in_current_span());
    info!(%address, "http api listening");

    // 4) Registration with the LayerX core
    let registration = RegisterConfig::new(cfg.name.clone(), address.to_string(), cfg.layerx.clone());
    match register(&registration).await {
        Ok(()) => {}
        Err(DiscoverError::MissingEndpoint) => warn!("no LayerX address configured, skipping registration"),
        Err(e) => errors.report("registration", e),
    }

    // 5) Driver supervisor + offer pump
    let driver = LoopbackDriver::new(cfg.framework_info(), cfg.master.clone(), cfg.node_ids());
    let (offer_tx, offer_rx) = mpsc::unbounded_channel();
    let supervisor =
        DriverSupervisor::new(driver, commands, statuses, errors.clone()).with_offer_sink(offer_tx);
    let mut driver_task = tokio::spawn(supervisor.run(cancel.clone()).in_current_span());
    tokio::spawn(pump_offers(bridge, offer_rx, errors.clone()).in_current_span());
    drop(errors);

    // 6) Serve until interrupted or until the driver session ends
    let finished = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            match signal {
                Ok(()) => info!("interrupt received, shutting down"),
                Err(e) => error!(error = %e, "waiting for ctrl-c failed, shutting down"),
            }
            None
        }
        joined = &mut driver_task => Some(joined),
    };
    cancel.cancel();

    let joined = match finished {
        Some(joined) => joined,
        None => driver_task.await,
    };
    let outcome = joined.context("driver supervisor panicked")?;

    server_task.await.context("http server panicked")?;
    let handled = errors_task.await.context("error supervisor panicked")?;
    debug!(failures = handled, "error supervisor stopped");

    match outcome {
        Ok(report) => {
            info!(
                status = %report.status,
                launched = report.launched,
                rejected = report.rejected.len(),
                "LayerX Mesos RPI stopped"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "LayerX Mesos RPI Failed!");
            Err(e.into())
        }
    }
}

/// Dispatch pending tasks onto every offer batch the backend announces.
async fn pump_offers(
    bridge: BridgeApi,
    mut offers: mpsc::UnboundedReceiver<Vec<ResourceUnit>>,
    errors: ErrorReporter,
) {
    while let Some(units) = offers.recv().await {
        match bridge.on_offers(units) {
            Ok(0) => {}
            Ok(launched) => debug!(launched, "pending tasks dispatched onto offers"),
            Err(failure) if matches!(failure.error(), CoreError::InsufficientResources) => {
                debug!("empty offer batch ignored")
            }
            Err(failure) => errors.report("offers", failure),
        }
    }
    debug!("offer stream closed");
}

async fn serve(
    listener: TcpListener,
    router: axum::Router,
    cancel: CancellationToken,
    errors: ErrorReporter,
) {
    let shutdown = async move { cancel.cancelled().await };
    if let Err(e) = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
    {
        errors.report("http", e);
    }
}
