//! Helpers shared by the commands that can block a connection.
//!
//! A blocked command registers one [`Subscriber`] per key it waits on, all
//! sharing a fresh channel, then re-checks the store before it starts waiting.
//! Writers notify after they release the store lock, so a write that lands
//! between the registration and the re-check is either seen by the re-check or
//! delivered as a notification.
//!
//! Registrations belong to a [`Subscription`] and go away when it is dropped,
//! however the wait ends.

use std::sync::Arc;

use tokio::{
    runtime::Handle,
    sync::{mpsc, Mutex},
    time::{self, Instant},
};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::state::{State, Subscriber};

pub const BLPOP: &str = "BLPOP";
pub const XREAD: &str = "XREAD";

/// One attempt of a connection to wait on a set of keys.
#[derive(Debug)]
pub struct Subscription {
    state: Arc<Mutex<State>>,
    command: &'static str,
    keys: Vec<String>,
    sender: mpsc::Sender<()>,
    receiver: mpsc::Receiver<()>,
}

pub async fn subscribe(
    state: &Arc<Mutex<State>>,
    command: &'static str,
    keys: &[String],
    client_address: &str,
) -> Subscription {
    let (sender, receiver) = mpsc::channel(1);

    {
        let mut state_guard = state.lock().await;

        for key in keys {
            state_guard.add_subscriber(
                command,
                key,
                Subscriber {
                    client_address: client_address.to_string(),
                    sender: sender.clone(),
                },
            );
        }
    }

    debug!(command, ?keys, client_address, "blocking until a key is written");

    Subscription {
        state: Arc::clone(state),
        command,
        keys: keys.to_vec(),
        sender,
        receiver,
    }
}

impl Subscription {
    /// Waits for a write to one of the keys.
    ///
    /// `None` waits without a time limit. Returns `false` when `deadline`
    /// passes or `closed` is cancelled first.
    pub async fn wait(&mut self, deadline: Option<Instant>, closed: &CancellationToken) -> bool {
        let receiver = &mut self.receiver;
        let notified = async move {
            match deadline {
                None => receiver.recv().await.is_some(),
                Some(deadline) => {
                    matches!(time::timeout_at(deadline, receiver.recv()).await, Ok(Some(())))
                }
            }
        };

        tokio::select! {
            biased;
            _ = closed.cancelled() => false,
            notified = notified => notified,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        // A wake-up that arrived after the waiter stopped listening is handed
        // on, so another connection blocked on the same keys gets to look.
        let unused_wake_up = self.receiver.try_recv().is_ok();
        let keys = std::mem::take(&mut self.keys);

        if let Ok(mut state_guard) = self.state.try_lock() {
            release(&mut state_guard, self.command, &keys, &self.sender, unused_wake_up);
            return;
        }

        let Ok(handle) = Handle::try_current() else {
            return;
        };

        let state = Arc::clone(&self.state);
        let command = self.command;
        let sender = self.sender.clone();

        handle.spawn(async move {
            let mut state_guard = state.lock().await;
            release(&mut state_guard, command, &keys, &sender, unused_wake_up);
        });
    }
}

fn release(
    state: &mut State,
    command: &str,
    keys: &[String],
    sender: &mpsc::Sender<()>,
    unused_wake_up: bool,
) {
    for key in keys {
        state.remove_subscriber(command, key, sender);

        if unused_wake_up {
            state.notify_subscribers(command, key, 1);
        }
    }
}
