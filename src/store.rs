use std::sync::Arc;

use tokio::{
    select,
    sync::{
        mpsc::{self, Receiver, Sender},
        oneshot, watch,
    },
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::{
    Config, ContextStamp, PauseEvent, PauseState, Preferences, Result, ThreadId,
    transition::transition,
};

pub(crate) struct StoreRequest {
    pub(crate) event: PauseEvent,
    pub(crate) done: Option<oneshot::Sender<Result>>,
}

/// Owner of the one mutable [`PauseState`].
///
/// The store runs as a single task; every mutation request is serialized
/// through its channel and applied via the pure transition function, so the
/// rest of the system only ever sees immutable snapshots. Applied states are
/// published through a watch channel for UI-style consumers.
///
/// Preference persistence is the store's one side effect: after a transition
/// changes `skip_pausing` or `should_log_exceptions`, the injected
/// [`Preferences`] collaborator is written to match.
pub struct PauseStore<P: Preferences> {
    state: Arc<PauseState>,
    prefs: P,
    receiver: Receiver<StoreRequest>,
    watch: watch::Sender<Arc<PauseState>>,
    cancel_token: Arc<CancellationToken>,
}

impl<P: Preferences> PauseStore<P> {
    /// Spawn the store task for a session rooted at `main_thread`.
    ///
    /// Initial preference flags are read from `prefs`. The returned handle
    /// is the only way to reach the store; the join handle resolves once the
    /// store shuts down.
    pub fn spawn(
        main_thread: ThreadId,
        prefs: P,
        config: Config,
    ) -> (StoreHandle, JoinHandle<Result>) {
        let state = Arc::new(PauseState::new(
            main_thread,
            prefs.skip_pausing(),
            prefs.log_exceptions(),
        ));
        let (sender, receiver) = mpsc::channel(config.channel_size);
        let (watch_tx, watch_rx) = watch::channel(state.clone());
        let cancel_token = Arc::new(CancellationToken::new());

        let mut store = PauseStore {
            state,
            prefs,
            receiver,
            watch: watch_tx,
            cancel_token: cancel_token.clone(),
        };
        let handle = StoreHandle {
            sender,
            watch: watch_rx,
            cancel_token,
        };
        let task = tokio::spawn(async move { store.run().await });
        (handle, task)
    }

    async fn run(&mut self) -> Result {
        loop {
            select! {
                _ = self.cancel_token.cancelled() => break,
                Some(request) = self.receiver.recv() => {
                    self.handle_request(request);
                },
                else => break,
            }
        }
        self.drain();
        Ok(())
    }

    /// Answer whatever is still queued so no dispatcher is left hanging.
    fn drain(&mut self) {
        while let Ok(request) = self.receiver.try_recv() {
            self.handle_request(request);
        }
    }

    fn handle_request(&mut self, request: StoreRequest) {
        let StoreRequest { event, done } = request;
        let result = self.apply(&event);
        if let Err(e) = &result {
            error!(event = event.name(), error = %e, "transition rejected");
        }
        if let Some(done) = done {
            let _ = done.send(result);
        }
    }

    fn apply(&mut self, event: &PauseEvent) -> Result {
        let next = transition(&self.state, event)?;
        debug!(
            event = event.name(),
            thread = %next.thread_context.thread,
            pause_counter = next.thread_context.pause_counter,
            "applied"
        );
        self.persist_prefs(&next);
        self.state = Arc::new(next);
        let _ = self.watch.send(self.state.clone());
        Ok(())
    }

    fn persist_prefs(&self, next: &PauseState) {
        if next.skip_pausing != self.state.skip_pausing {
            self.prefs.set_skip_pausing(next.skip_pausing);
        }
        if next.should_log_exceptions != self.state.should_log_exceptions {
            self.prefs.set_log_exceptions(next.should_log_exceptions);
        }
    }
}

/// Cheap-to-clone handle to a running [`PauseStore`].
///
/// `dispatch` resolves once the event has been applied (or rejected), so a
/// caller that needs read-your-writes ordering simply awaits it. Reads go
/// through `state()`, which returns the latest published snapshot.
#[derive(Clone)]
pub struct StoreHandle {
    sender: Sender<StoreRequest>,
    watch: watch::Receiver<Arc<PauseState>>,
    cancel_token: Arc<CancellationToken>,
}

impl StoreHandle {
    /// Apply one event, awaiting the outcome of the transition.
    pub async fn dispatch(&self, event: PauseEvent) -> Result {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(StoreRequest {
                event,
                done: Some(tx),
            })
            .await?;
        rx.await?
    }

    /// Apply an ordered sequence of events as one atomic transition.
    pub async fn dispatch_all(&self, events: Vec<PauseEvent>) -> Result {
        self.dispatch(PauseEvent::Batch(events)).await
    }

    /// Latest published state snapshot.
    pub fn state(&self) -> Arc<PauseState> {
        self.watch.borrow().clone()
    }

    /// Subscribe to state updates.
    pub fn changes(&self) -> watch::Receiver<Arc<PauseState>> {
        self.watch.clone()
    }

    /// Snapshot the generation counters before an async round-trip.
    pub fn stamp(&self) -> ContextStamp {
        self.state().stamp()
    }

    /// Whether a reply stamped with `stamp` may still be applied.
    pub fn is_current(&self, stamp: &ContextStamp) -> bool {
        self.state().is_current(stamp)
    }

    /// Request a graceful shutdown of the store task.
    pub fn stop(&self) {
        self.cancel_token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Frame, MemoryPrefs, SourceLocation};

    fn t(id: &str) -> ThreadId {
        ThreadId::from(id)
    }

    #[tokio::test]
    async fn test_dispatch_applies_and_publishes() {
        let (store, task) = PauseStore::spawn(t("t1"), MemoryPrefs::default(), Config::default());

        store
            .dispatch(PauseEvent::BreakOnNext { thread: t("t1") })
            .await
            .unwrap();
        assert!(store.state().is_waiting_on_break(&t("t1")));

        store.stop();
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_rejected_transition_surfaces_to_caller() {
        let (store, task) = PauseStore::spawn(t("t1"), MemoryPrefs::default(), Config::default());

        let err = store
            .dispatch(PauseEvent::AddAsyncFrames {
                thread: t("t1"),
                frames: vec![Frame::new("f1", SourceLocation::new("s1", 1, 0))],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, crate::Error::StackNotLoaded(_)));
        // The store survives and its state is unchanged.
        assert!(store.state().threads.is_empty());

        store.stop();
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_toggles_write_through_to_preferences() {
        let prefs = MemoryPrefs::default();
        let (store, task) = PauseStore::spawn(t("t1"), prefs.clone(), Config::default());

        store
            .dispatch(PauseEvent::ToggleSkipPausing { skip_pausing: true })
            .await
            .unwrap();
        assert!(prefs.skip_pausing());

        store
            .dispatch(PauseEvent::LogExceptions {
                should_log_exceptions: true,
            })
            .await
            .unwrap();
        assert!(prefs.log_exceptions());

        store.stop();
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_dispatch_all_is_one_transition() {
        let (store, task) = PauseStore::spawn(t("t1"), MemoryPrefs::default(), Config::default());
        let mut changes = store.changes();
        changes.mark_unchanged();

        store
            .dispatch_all(vec![
                PauseEvent::BreakOnNext { thread: t("t1") },
                PauseEvent::SelectThread { thread: t("t1") },
            ])
            .await
            .unwrap();

        // Both updates landed, announced as a single state change.
        changes.changed().await.unwrap();
        assert!(!changes.has_changed().unwrap());
        let state = store.state();
        assert!(state.is_waiting_on_break(&t("t1")));
        assert_eq!(state.thread_context().pause_counter, 1);

        store.stop();
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_initial_state_reads_preferences() {
        let prefs = MemoryPrefs::new(true, true);
        let (store, task) = PauseStore::spawn(t("t1"), prefs, Config::default());
        assert!(store.state().skip_pausing());
        assert!(store.state().should_log_exceptions());
        store.stop();
        task.await.unwrap().unwrap();
    }
}
