//! Library Book Management application
//!
//! Wires the book module onto the kernel registry and the HTTP facade.

pub mod modules;
pub mod seed;

use std::sync::Arc;

use anyhow::Context;

use library_db::MemoryCollection;
use library_kernel::{settings::Settings, InitCtx, ModuleRegistry};

use modules::books::models::Book;

/// Open the stores and register every module.
pub async fn bootstrap(settings: &Settings) -> anyhow::Result<ModuleRegistry> {
    let books = MemoryCollection::<Book>::open(&settings.store)
        .await
        .context("failed to open book store")?;

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, Arc::new(books));
    Ok(registry)
}

/// Run the HTTP service until Ctrl-C, then stop every module.
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    tracing::info!(
        env = ?settings.environment,
        service = %settings.service.name,
        "library-app bootstrap starting"
    );

    let registry = bootstrap(&settings).await?;
    let ctx = InitCtx {
        settings: &settings,
    };
    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;
    tracing::info!(modules = registry.module_count(), "library-app bootstrap complete");

    let served = library_http::start_server(&registry, &settings, shutdown_signal()).await;
    let stopped = registry.stop_modules().await;

    served?;
    stopped
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
