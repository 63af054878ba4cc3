use std::collections::{HashMap, VecDeque};

use tokio::sync::mpsc;

/// A connection blocked on a key, waiting for a write to it.
#[derive(Debug)]
pub struct Subscriber {
    pub client_address: String,
    pub sender: mpsc::Sender<()>,
}

/// Registry of blocked connections.
///
/// Subscribers are grouped by the blocking command first and by key second,
/// e.g. `"BLPOP" -> "fruits" -> [subscriber, ...]`. Each queue is served in
/// registration order.
#[derive(Debug, Default)]
pub struct State {
    pub subscribers: HashMap<String, HashMap<String, VecDeque<Subscriber>>>,
}

impl State {
    pub fn new() -> Self {
        State::default()
    }

    pub fn add_subscriber(&mut self, command: &str, key: &str, subscriber: Subscriber) {
        self.subscribers
            .entry(command.to_string())
            .or_default()
            .entry(key.to_string())
            .or_default()
            .push_back(subscriber);
    }

    /// Removes the subscriptions made through `sender` on `key`.
    ///
    /// Subscribers are matched by channel rather than by address, so a stale
    /// removal never takes out a newer registration of the same connection.
    pub fn remove_subscriber(&mut self, command: &str, key: &str, sender: &mpsc::Sender<()>) {
        let Some(keys) = self.subscribers.get_mut(command) else {
            return;
        };

        if let Some(queue) = keys.get_mut(key) {
            queue.retain(|subscriber| !subscriber.sender.same_channel(sender));

            if queue.is_empty() {
                keys.remove(key);
            }
        }

        if keys.is_empty() {
            self.subscribers.remove(command);
        }
    }

    /// Wakes up to `count` subscribers of `command` on `key`, oldest first.
    ///
    /// Subscribers that already hold a pending wake-up (from another key) or
    /// whose connection has gone away are dropped without counting.
    ///
    /// # Returns
    ///
    /// The number of subscribers actually woken.
    pub fn notify_subscribers(&mut self, command: &str, key: &str, count: usize) -> usize {
        let Some(queue) = self
            .subscribers
            .get_mut(command)
            .and_then(|keys| keys.get_mut(key))
        else {
            return 0;
        };

        let mut woken = 0;

        while woken < count {
            let Some(subscriber) = queue.pop_front() else {
                break;
            };

            if subscriber.sender.try_send(()).is_ok() {
                woken += 1;
            }
        }

        woken
    }

    /// Wakes every subscriber of `command` on `key`.
    pub fn notify_all_subscribers(&mut self, command: &str, key: &str) -> usize {
        self.notify_subscribers(command, key, usize::MAX)
    }

    pub fn subscriber_count(&self, command: &str, key: &str) -> usize {
        self.subscribers
            .get(command)
            .and_then(|keys| keys.get(key))
            .map_or(0, VecDeque::len)
    }
}
