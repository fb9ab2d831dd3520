use std::{future::Future, sync::Arc, time::Duration};

use tokio::{
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::Result;

/// Periodic updater owned by one widget.
///
/// Every tick spawns a detached fetch so a slow source never delays the next
/// tick. Fetches race the collector's token, which is a child of the token the
/// collector was spawned under.
pub struct Collector {
    name: &'static str,
    handle: JoinHandle<()>,
    cancel: CancellationToken,
}

impl Collector {
    #[tracing::instrument(skip(parent, fetch, apply))]
    pub fn spawn<F, Fut, T, A>(
        name: &'static str,
        interval: Duration,
        parent: &CancellationToken,
        mut fetch: F,
        apply: A,
    ) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
        A: Fn(T) + Send + Sync + 'static,
    {
        let cancel = parent.child_token();
        let child = cancel.clone();
        let apply = Arc::new(apply);

        let handle = tokio::spawn(async move {
            let mut tick = time::interval(interval);
            tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = child.cancelled() => break,
                    _ = tick.tick() => {
                        let work = fetch();
                        let apply = Arc::clone(&apply);
                        let token = child.clone();
                        tokio::spawn(async move {
                            tokio::select! {
                                _ = token.cancelled() => {}
                                res = work => match res {
                                    Ok(snapshot) => apply(snapshot),
                                    Err(e) => warn!(error = %e, collector = name, "fetch failed"),
                                },
                            }
                        });
                    }
                }
            }
            debug!(collector = name, "collector stopped");
        });

        Self {
            name,
            handle,
            cancel,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn shutdown(self) {
        self.cancel.cancel();
        self.handle.abort();
    }
}

impl Drop for Collector {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.handle.abort();
    }
}
