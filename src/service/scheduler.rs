use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use super::error::ServiceError;
use super::shared::{Shared, SkyQuery};
use crate::catalog::{CatalogLoader, LoadReport};
use crate::config::Config;
use crate::elements::{ElementStore, HttpSource};
use crate::orbit::Sgp4Propagator;
use crate::precompute::Precomputer;

struct Workers {
    running_tx: watch::Sender<bool>,
    catalog: JoinHandle<()>,
    precompute: JoinHandle<()>,
}

/// Owns the published snapshot and the two refresh loops feeding it.
pub struct SkyService {
    shared: Arc<Shared>,
    catalog_interval: Duration,
    precompute_interval: Duration,
    workers: Option<Workers>,
}

impl SkyService {
    pub fn new(config: &Config, store: ElementStore, loader: CatalogLoader) -> Self {
        let observer = config.observer.location();
        let precomputer = Precomputer::new(observer, &config.trajectory);
        let shared = Shared::new(
            config.elements.source_url.clone(),
            config.query.display_max,
            store,
            loader,
            precomputer,
        );

        Self {
            shared: Arc::new(shared),
            catalog_interval: config.refresh.catalog_interval,
            precompute_interval: config.refresh.precompute_interval,
            workers: None,
        }
    }

    /// Service backed by the HTTP element source and SGP4.
    pub fn from_config(config: &Config) -> Result<Self, ServiceError> {
        let elements = &config.elements;
        let source = HttpSource::new(&elements.user_agent, elements.request_timeout)?;
        let store = ElementStore::new(
            Arc::new(source),
            elements.cache_path.clone(),
            elements.cache_max_age,
            elements.min_request_interval,
        );
        log::info!(
            "Element source {} (cache {})",
            elements.source_url,
            store.cache_path().display()
        );
        let loader = CatalogLoader::new(
            Arc::new(Sgp4Propagator),
            config.observer.location(),
            config.catalog.max_objects,
        )
        .with_progress(|p| {
            log::debug!(
                "Catalog load {}/{} ({} loaded)",
                p.processed,
                p.total,
                p.loaded
            )
        });

        Ok(Self::new(config, store, loader))
    }

    pub fn query(&self) -> SkyQuery {
        SkyQuery::new(self.shared.clone())
    }

    /// One catalog refresh, outside the background loops.
    pub async fn refresh_catalog(&self) -> LoadReport {
        self.shared.refresh_catalog().await
    }

    /// One precomputation pass, outside the background loops.
    pub async fn precompute_now(&self) -> usize {
        self.shared.precompute().await
    }

    pub fn start(&mut self) -> Result<(), ServiceError> {
        if self.workers.is_some() {
            return Err(ServiceError::AlreadyRunning);
        }

        let (running_tx, running_rx) = watch::channel(true);
        let catalog = tokio::spawn(catalog_loop(
            self.shared.clone(),
            self.catalog_interval,
            running_rx.clone(),
        ));
        let precompute = tokio::spawn(precompute_loop(
            self.shared.clone(),
            self.precompute_interval,
            running_rx,
        ));

        self.shared.running.store(true, Ordering::SeqCst);
        self.workers = Some(Workers {
            running_tx,
            catalog,
            precompute,
        });
        log::info!("Sky service started");
        Ok(())
    }

    /// Clear the running flag and wait for in-flight passes to finish.
    pub async fn stop(&mut self) {
        if let Some(workers) = self.workers.take() {
            let _ = workers.running_tx.send(false);
            let _ = workers.catalog.await;
            let _ = workers.precompute.await;
            log::info!("Sky service stopped");
        }
        self.shared.running.store(false, Ordering::SeqCst);
    }
}

async fn catalog_loop(
    shared: Arc<Shared>,
    interval: Duration,
    mut running: watch::Receiver<bool>,
) {
    loop {
        if !*running.borrow() {
            break;
        }

        let pass = shared.clone();
        match tokio::spawn(async move { pass.refresh_catalog().await }).await {
            Ok(_) => shared.precompute_requested.notify_one(),
            Err(e) => log::error!("Catalog refresh failed: {}", e),
        }

        if wait_or_stop(&mut running, interval).await {
            break;
        }
    }
    log::debug!("Catalog refresh loop exited");
}

async fn precompute_loop(
    shared: Arc<Shared>,
    interval: Duration,
    mut running: watch::Receiver<bool>,
) {
    loop {
        if !*running.borrow() {
            break;
        }

        let pass = shared.clone();
        if let Err(e) = tokio::spawn(async move { pass.precompute().await }).await {
            log::error!("Precomputation pass failed: {}", e);
        }

        let stopped = tokio::select! {
            _ = sleep(interval) => false,
            _ = shared.precompute_requested.notified() => {
                log::debug!("Precomputation requested after catalog reload");
                false
            }
            changed = running.changed() => changed.is_err() || !*running.borrow(),
        };
        if stopped {
            break;
        }
    }
    log::debug!("Precomputation loop exited");
}

/// Sleep for `interval` unless stopped first. Returns true when stopped.
async fn wait_or_stop(running: &mut watch::Receiver<bool>, interval: Duration) -> bool {
    tokio::select! {
        _ = sleep(interval) => false,
        changed = running.changed() => changed.is_err() || !*running.borrow(),
    }
}
