use crate::compile::{Change, ChangeSet};
use crate::internal_prelude::*;
use tokio::{
    signal,
    sync::{broadcast, RwLock},
    task::JoinHandle,
};

lazy_static::lazy_static! {
  static ref ANY_INTERRUPT: broadcast::Sender<()> = broadcast::channel(1).0;
  static ref SHUTDOWN: broadcast::Sender<()> = broadcast::channel(1).0;

  static ref SHUTDOWN_REQUESTED: RwLock<bool> = RwLock::new(false);
  static ref SOURCE_CHANGES: RwLock<ChangeSet> = RwLock::new(ChangeSet::default());
}

pub struct Interrupt {}

impl Interrupt {
    pub async fn is_shutdown_requested() -> bool {
        *SHUTDOWN_REQUESTED.read().await
    }

    pub fn subscribe_any() -> broadcast::Receiver<()> {
        ANY_INTERRUPT.subscribe()
    }

    pub fn subscribe_shutdown() -> broadcast::Receiver<()> {
        SHUTDOWN.subscribe()
    }

    /// Returns the pending changes and leaves an empty set behind.
    pub async fn take_source_changes() -> ChangeSet {
        let mut ch = SOURCE_CHANGES.write().await;
        let taken = std::mem::take(&mut *ch);
        trace!("Interrupt took {} source change(s)", taken.len());
        taken
    }

    /// Records the changes of one watcher batch. Must not be called from async code.
    pub fn send(changes: &[Change]) {
        let mut ch = SOURCE_CHANGES.blocking_write();
        let did_change = changes
            .iter()
            .fold(false, |acc, change| ch.add(change.clone()) || acc);
        drop(ch);

        if did_change {
            Self::send_any();
        } else {
            trace!("Interrupt no change");
        }
    }

    fn send_any() {
        if let Err(e) = ANY_INTERRUPT.send(()) {
            error!("Interrupt error could not send due to: {e}");
        } else {
            trace!("Interrupt send done");
        }
    }

    pub async fn request_shutdown() {
        {
            *SHUTDOWN_REQUESTED.write().await = true;
        }
        _ = SHUTDOWN.send(());
        _ = ANY_INTERRUPT.send(());
    }

    pub fn run_ctrl_c_monitor() -> JoinHandle<()> {
        tokio::spawn(async move {
            if let Err(e) = signal::ctrl_c().await {
                error!("Interrupt could not listen for ctrl-c: {e}");
                return;
            }
            info!("Sass ctrl-c received");
            Interrupt::request_shutdown().await;
        })
    }
}
