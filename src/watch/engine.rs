use std::{
    sync::{Arc, RwLock},
    time::Duration,
};

use tokio::{
    sync::{Mutex, broadcast, mpsc, oneshot, watch},
    task::JoinHandle,
    time::{self, Instant},
};
use tracing::{debug, error, info, warn};

use super::{
    Action, ChangeKind, ConfigEvent, WatchEvent, WatchSession,
    file_watcher::{FileWatcher, SourceMessage},
};
use crate::{
    ConfigError, Result,
    loader::Loader,
    manager::live::{replace, snapshot},
};

/// Callback invoked with the triggering event after every reload or recovery.
pub type ChangeCallback = Arc<dyn Fn(&WatchEvent) + Send + Sync>;

/// Everything the engine task needs besides its session.
pub(crate) struct EngineContext<T> {
    pub(crate) loader: Arc<dyn Loader<T>>,
    pub(crate) target: Arc<RwLock<T>>,
    pub(crate) on_change: Option<ChangeCallback>,
    pub(crate) events: broadcast::Sender<ConfigEvent>,
    pub(crate) recover_if_removed: bool,
    pub(crate) debounce: Duration,
}

/// Handle to a running watch engine.
///
/// The engine stops when [`WatchHandle::stop`] is called or when the handle is
/// dropped.
pub struct WatchHandle {
    shutdown: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl WatchHandle {
    /// Returns true while the engine task is running.
    pub fn is_running(&self) -> bool {
        !self.shutdown.is_closed()
    }

    /// Signals the engine to stop and waits for it to release its subscription.
    ///
    /// Calling this more than once is harmless.
    pub async fn stop(&self) {
        let _ = self.shutdown.send(true);

        if let Some(task) = self.task.lock().await.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "config watch task ended abnormally");
            }
        }
    }
}

/// Spawns the engine and waits until its directory subscription is registered.
///
/// No event that happens after this returns is missed.
///
/// # Errors
/// Returns `ConfigError::WatcherInit` or `ConfigError::FileWatch` if the notification
/// source cannot be set up.
pub(crate) async fn start<T>(ctx: EngineContext<T>, session: WatchSession) -> Result<WatchHandle>
where
    T: Clone + Send + Sync + 'static,
{
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (ready_tx, ready_rx) = oneshot::channel();

    let task = tokio::spawn(run(ctx, session, shutdown_rx, ready_tx));

    match ready_rx.await {
        Ok(Ok(())) => Ok(WatchHandle {
            shutdown: shutdown_tx,
            task: Mutex::new(Some(task)),
        }),
        Ok(Err(e)) => Err(e),
        Err(_) => Err(ConfigError::WatcherInit {
            details: "watch task exited before subscribing".to_string(),
        }),
    }
}

fn subscribe(
    session: &WatchSession,
) -> Result<(FileWatcher, mpsc::UnboundedReceiver<SourceMessage>)> {
    let (mut watcher, source_rx) = FileWatcher::new()?;
    watcher.watch_dir(session.config_dir())?;
    Ok((watcher, source_rx))
}

async fn run<T>(
    ctx: EngineContext<T>,
    mut session: WatchSession,
    mut shutdown: watch::Receiver<bool>,
    ready: oneshot::Sender<Result<()>>,
) where
    T: Clone + Send + Sync + 'static,
{
    let (_watcher, mut source_rx) = match subscribe(&session) {
        Ok(subscription) => subscription,
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };
    let _ = ready.send(Ok(()));

    info!(
        path = %session.config_file().display(),
        dir = %session.config_dir().display(),
        "watching config file"
    );

    loop {
        let message = tokio::select! {
            _ = shutdown.changed() => {
                debug!("config watcher shutdown requested");
                break;
            }
            message = source_rx.recv() => message,
        };

        let Some(message) = message else {
            debug!("notification channel closed");
            break;
        };

        let mut batch = Vec::new();
        let mut failure = None;
        match message {
            Ok(event) if session.is_relevant(&event) => batch.push(event),
            Ok(_) => continue,
            Err(e) => failure = Some(e),
        }

        if failure.is_none() && !ctx.debounce.is_zero() {
            let deadline = Instant::now() + ctx.debounce;
            let end =
                collect_burst(&mut source_rx, &mut shutdown, &session, deadline, &mut batch).await;
            match end {
                BurstEnd::Elapsed => {}
                BurstEnd::Shutdown => {
                    debug!("config watcher shutdown requested");
                    break;
                }
                BurstEnd::Failed(e) => failure = Some(e),
            }
        }

        process_batch(&ctx, &mut session, batch);

        if let Some(e) = failure {
            error!(error = %e, "config watcher error, no longer watching");
            break;
        }
    }

    info!(path = %session.config_file().display(), "stopped watching config file");
}

enum BurstEnd {
    Elapsed,
    Shutdown,
    Failed(notify::Error),
}

/// Gathers relevant events until `deadline`.
///
/// The deadline is fixed when the batch opens, so a steady stream of events never
/// holds a batch back. Events for unrelated paths are dropped.
async fn collect_burst(
    source_rx: &mut mpsc::UnboundedReceiver<SourceMessage>,
    shutdown: &mut watch::Receiver<bool>,
    session: &WatchSession,
    deadline: Instant,
    batch: &mut Vec<WatchEvent>,
) -> BurstEnd {
    let window = time::sleep_until(deadline);
    tokio::pin!(window);

    loop {
        tokio::select! {
            _ = &mut window => return BurstEnd::Elapsed,
            _ = shutdown.changed() => return BurstEnd::Shutdown,
            message = source_rx.recv() => match message {
                Some(Ok(event)) => {
                    if session.is_relevant(&event) {
                        batch.push(event);
                    }
                }
                Some(Err(e)) => return BurstEnd::Failed(e),
                None => return BurstEnd::Elapsed,
            },
        }
    }
}

/// Classifies a batch in order, applying each run of identical actions once.
///
/// The last event of a run is reported as the trigger.
fn process_batch<T: Clone + 'static>(
    ctx: &EngineContext<T>,
    session: &mut WatchSession,
    batch: Vec<WatchEvent>,
) {
    let mut pending: Option<(Action, WatchEvent)> = None;

    for event in batch {
        let Some(action) = session.classify(&event) else {
            debug!(event = %event, "ignoring event");
            continue;
        };
        debug!(event = %event, ?action, "config file event");

        if let Some((previous, trigger)) = pending.take() {
            if previous != action {
                apply(ctx, session, previous, trigger);
            }
        }
        pending = Some((action, event));
    }

    if let Some((action, trigger)) = pending {
        apply(ctx, session, action, trigger);
    }
}

fn apply<T: Clone + 'static>(
    ctx: &EngineContext<T>,
    session: &mut WatchSession,
    action: Action,
    trigger: WatchEvent,
) {
    let outcome = match action {
        Action::Reload => reload(ctx, session),
        Action::Recover => recover(ctx, session),
    };

    let Some(kind) = outcome else {
        return;
    };

    if let Some(callback) = &ctx.on_change {
        callback(&trigger);
    }
    let _ = ctx.events.send(ConfigEvent::new(trigger, kind));
}

fn reload<T: Clone + 'static>(
    ctx: &EngineContext<T>,
    session: &mut WatchSession,
) -> Option<ChangeKind> {
    let path = session.config_file().to_path_buf();

    if session.is_own_write(session.read_digest()) {
        debug!(path = %path.display(), "config file holds recovered contents, skipping reload");
        return None;
    }

    let mut next = snapshot(&ctx.target);
    if let Err(e) = ctx.loader.load(&path, &mut next) {
        warn!(path = %path.display(), error = %e, "failed to reload config file");
        return None;
    }

    replace(&ctx.target, next);
    session.forget_own_write();
    info!(path = %path.display(), "reloaded config file");

    Some(ChangeKind::Reloaded)
}

fn recover<T: Clone + 'static>(
    ctx: &EngineContext<T>,
    session: &mut WatchSession,
) -> Option<ChangeKind> {
    let path = session.config_file().to_path_buf();

    if !ctx.recover_if_removed {
        debug!(path = %path.display(), "config file removed, recovery disabled");
        return None;
    }

    if path.exists() {
        debug!(path = %path.display(), "config file was replaced, reloading instead");
        return reload(ctx, session);
    }

    let current = snapshot(&ctx.target);
    if let Err(e) = ctx.loader.save(&path, &current) {
        warn!(path = %path.display(), error = %e, "failed to recover config file");
        return None;
    }

    session.remember_own_write(session.read_digest());
    info!(path = %path.display(), "recovered config file from memory");

    Some(ChangeKind::Recovered)
}
