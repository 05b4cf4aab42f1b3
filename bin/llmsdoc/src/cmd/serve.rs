//! Serve command - HTTP server for the llms endpoints

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use color_eyre::eyre::{Result, WrapErr};
use llmsdoc_core::{CategoryRegistry, SharedRegistry};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher, event::ModifyKind};
use tokio::{net::TcpListener, sync::mpsc};

use crate::server::{AppState, create_router};

/// Debounce interval for file changes.
const DEBOUNCE_MS: u64 = 200;

/// Options for the serve command.
#[derive(Debug, Clone, Default)]
pub struct ServeOptions {
    /// Override `server.host`.
    pub host: Option<String>,
    /// Override `server.port`.
    pub port: Option<u16>,
    /// Aggregate every category before accepting requests.
    pub precompute: bool,
    /// Reload the registry when it or the content tree changes.
    pub watch: bool,
}

/// Run the serve command.
pub async fn run(config_path: &Path, options: ServeOptions) -> Result<()> {
    let (mut config, registry) = super::load(config_path)?;
    if let Some(host) = options.host {
        config.server.host = host;
    }
    if let Some(port) = options.port {
        config.server.port = port;
    }

    let registry_path = config.content.registry.clone();
    let content_root = config.content.root.clone();
    let addr = config.bind_addr();
    let index_path = format!("/{}", config.routes.prefix);

    let state = AppState::new(config, SharedRegistry::new(registry));

    if options.precompute {
        let count = precompute(&state).await?;
        println!("  Precomputed {count} categories");
    }

    // Keep the watcher alive for the lifetime of the server.
    let _watcher = if options.watch {
        Some(spawn_watcher(
            state.clone(),
            registry_path,
            content_root,
            options.precompute,
        )?)
    } else {
        None
    };

    let app = create_router(state);
    let listener = TcpListener::bind(&addr)
        .await
        .wrap_err_with(|| format!("Failed to bind to {addr}"))?;

    println!();
    println!("  Serving http://{addr}{index_path}");
    println!("  Press Ctrl+C to stop");
    println!();

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("Server error")?;

    Ok(())
}

async fn precompute(state: &AppState) -> Result<usize> {
    let state = state.clone();
    let count = tokio::task::spawn_blocking(move || state.precompute())
        .await
        .wrap_err("Precompute task failed")?
        .wrap_err("Failed to precompute artifacts")?;
    Ok(count)
}

fn spawn_watcher(
    state: AppState,
    registry_path: PathBuf,
    content_root: PathBuf,
    recompute: bool,
) -> Result<RecommendedWatcher> {
    let (tx, mut rx) = mpsc::channel::<()>(16);

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<notify::Event, notify::Error>| {
            if let Ok(event) = res
                && matches!(
                    event.kind,
                    EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Name(_))
                        | EventKind::Create(_)
                        | EventKind::Remove(_)
                )
            {
                // A full channel already holds a pending change.
                let _ = tx.try_send(());
            }
        },
        notify::Config::default(),
    )
    .wrap_err("Failed to create file watcher")?;

    // Editors often replace files instead of writing them, so watch the directory.
    let registry_dir = match registry_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    watcher
        .watch(&registry_dir, RecursiveMode::NonRecursive)
        .wrap_err("Failed to watch registry directory")?;
    if content_root.exists() {
        watcher
            .watch(&content_root, RecursiveMode::Recursive)
            .wrap_err("Failed to watch content directory")?;
    }
    tracing::info!(registry = %registry_path.display(), content = %content_root.display(), "Watching for changes");

    tokio::spawn(debounced(
        rx,
        Duration::from_millis(DEBOUNCE_MS),
        move || {
            let state = state.clone();
            let registry_path = registry_path.clone();
            async move { reload(&state, &registry_path, recompute).await }
        },
    ));

    Ok(watcher)
}

/// Run `action` once per burst of change signals.
///
/// The first signal opens a window; everything that arrives inside it is
/// folded into a single run. Signals received while `action` runs start the
/// next window, so the last change is always acted on.
async fn debounced<F, Fut>(mut rx: mpsc::Receiver<()>, window: Duration, mut action: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    while rx.recv().await.is_some() {
        tokio::time::sleep(window).await;
        while rx.try_recv().is_ok() {}
        action().await;
    }
}

async fn reload(state: &AppState, registry_path: &Path, recompute: bool) {
    match CategoryRegistry::load(registry_path) {
        Ok(registry) => {
            let categories = registry.len();
            state.registry().replace(registry);
            tracing::info!(categories, "Reloaded category registry");
            println!("  ✓ Reloaded {categories} categories");
        }
        Err(e) => {
            tracing::error!("Registry reload failed, keeping previous registry: {e}");
            eprintln!("  ✗ Registry reload failed: {e}");
            return;
        }
    }

    if recompute && let Err(e) = precompute(state).await {
        tracing::error!("Recompute failed: {e:#}");
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(20);
    const WAIT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_debounce_folds_bursts_and_keeps_late_changes() {
        let (tx, rx) = mpsc::channel(16);
        let (done_tx, mut done_rx) = mpsc::unbounded_channel();
        tokio::spawn(debounced(rx, WINDOW, move || {
            let done_tx = done_tx.clone();
            async move {
                let _ = done_tx.send(());
            }
        }));

        // A burst right after startup runs the action exactly once.
        for _ in 0..3 {
            tx.send(()).await.expect("send");
        }
        tokio::time::timeout(WAIT, done_rx.recv())
            .await
            .expect("first run")
            .expect("open");
        assert!(
            tokio::time::timeout(WINDOW * 5, done_rx.recv())
                .await
                .is_err()
        );

        // A change immediately after a run is not swallowed.
        tx.send(()).await.expect("send");
        tokio::time::timeout(WAIT, done_rx.recv())
            .await
            .expect("second run")
            .expect("open");
    }

    #[tokio::test]
    async fn test_debounce_stops_when_watcher_is_dropped() {
        let (tx, rx) = mpsc::channel::<()>(1);
        let handle = tokio::spawn(debounced(rx, WINDOW, || async {}));
        drop(tx);
        tokio::time::timeout(WAIT, handle)
            .await
            .expect("loop ends")
            .expect("no panic");
    }
}
