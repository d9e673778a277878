// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! HTTP server lifecycle: routing, listening and graceful shutdown.
//!
//! # Graceful Shutdown
//!
//! The first of a termination signal or a serve failure ends the server:
//! - No new connections are accepted once the signal arrives
//! - In-flight requests get a bounded grace period to finish
//! - When the grace period elapses, serving stops regardless

use crate::config::Config;
use crate::handlers::{ApiError, Payments, ResourceHandler};
use crate::store::Client;
use anyhow::Context;
use axum::Router;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::routing::get;
use std::future::{Future, IntoFuture};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Routes for one resource type.
///
/// | Method | Path | Handler |
/// |--------|------|---------|
/// | GET | `/{collection}` | `get_all` |
/// | GET | `/{collection}/{id}` | `get_one` |
/// | PUT | `/{collection}/{id}` | `create` |
/// | POST | `/{collection}/{id}` | `update` |
/// | DELETE | `/{collection}/{id}` | `delete` |
pub fn routes<H: ResourceHandler>(handler: Arc<H>) -> Router {
    Router::new()
        .route(&format!("/{}", H::COLLECTION), get(get_all::<H>))
        .route(
            &format!("/{}/{{id}}", H::COLLECTION),
            get(get_one::<H>)
                .put(create::<H>)
                .post(update::<H>)
                .delete(delete::<H>),
        )
        .with_state(handler)
}

/// Full application router over a shared storage client.
pub fn router(client: Arc<Client>) -> Router {
    Router::new()
        .merge(routes(Arc::new(Payments::new(client))))
        .layer(TraceLayer::new_for_http())
}

// Storage calls block, so every handler runs on the blocking pool.

async fn get_all<H: ResourceHandler>(State(handler): State<Arc<H>>) -> Result<Response, ApiError> {
    tokio::task::spawn_blocking(move || handler.get_all()).await?
}

async fn get_one<H: ResourceHandler>(
    State(handler): State<Arc<H>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    tokio::task::spawn_blocking(move || handler.get_one(&id)).await?
}

async fn create<H: ResourceHandler>(
    State(handler): State<Arc<H>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    tokio::task::spawn_blocking(move || handler.create(id, &body)).await?
}

async fn update<H: ResourceHandler>(
    State(handler): State<Arc<H>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    tokio::task::spawn_blocking(move || handler.update(id, &body)).await?
}

async fn delete<H: ResourceHandler>(
    State(handler): State<Arc<H>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    tokio::task::spawn_blocking(move || handler.delete(&id)).await?
}

/// Serves `router` on `listener` until `shutdown` resolves or serving fails.
///
/// After `shutdown` resolves the listener stops accepting and in-flight
/// connections get `grace` to finish. The call returns once they have, or
/// once `grace` elapses with connections still open.
///
/// # Errors
///
/// Returns the serve error if the server fails before or while draining.
pub async fn serve<F>(
    listener: TcpListener,
    router: Router,
    shutdown: F,
    grace: Duration,
) -> io::Result<()>
where
    F: Future<Output = ()>,
{
    let (stop, stopped) = oneshot::channel::<()>();
    let server = axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = stopped.await;
        })
        .into_future();
    tokio::pin!(server);
    tokio::pin!(shutdown);

    tokio::select! {
        result = &mut server => return result,
        () = &mut shutdown => {}
    }

    info!(grace = ?grace, "starting shutdown, draining connections");
    let _ = stop.send(());

    match tokio::time::timeout(grace, server).await {
        Ok(result) => result?,
        Err(_) => warn!("grace period elapsed with connections still open"),
    }

    Ok(())
}

/// Waits for a shutdown signal (CTRL+C or SIGTERM).
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received CTRL+C"),
        () = terminate => info!("received SIGTERM"),
    }
}

/// Runs `future` to completion on a fresh multi-threaded runtime, then gives
/// leftover tasks (including blocking-pool work) at most `grace` to finish.
///
/// # Errors
///
/// Returns the I/O error if the runtime cannot be built.
pub fn block_on_bounded<F: Future>(future: F, grace: Duration) -> io::Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
    let output = runtime.block_on(future);
    runtime.shutdown_timeout(grace);
    Ok(output)
}

/// Opens the store, binds the listener and serves until a shutdown signal.
///
/// # Errors
///
/// Fails if the store cannot be opened, the address cannot be bound, or
/// serving fails.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let client = Client::open(&config.db_path)
        .with_context(|| format!("unable to initialise database at {}", config.db_path.display()))?;
    let client = Arc::new(client);

    let listener = TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("unable to listen on {}", config.listen))?;
    info!(listen = %listener.local_addr()?, "starting HTTP server");

    serve(listener, router(Arc::clone(&client)), shutdown_signal(), config.shutdown_grace())
        .await
        .context("serve error")?;

    client.flush().context("error flushing database")?;
    info!("terminating");
    Ok(())
}
