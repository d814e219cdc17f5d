//! Topic-keyed broadcast fan-out for normalized ticks.

use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::broadcast;

use crate::Tick;

const DEFAULT_TOPIC_CAPACITY: usize = 1_024;

/// In-process pub-sub bus. Each topic is a tokio broadcast channel;
/// slow consumers lag and drop within their own receiver without
/// affecting publishers or sibling topics.
pub struct EventBus {
    capacity: usize,
    topics: Mutex<HashMap<String, broadcast::Sender<Tick>>>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            topics: Mutex::new(HashMap::new()),
        }
    }

    /// Publish a tick to a topic. Ticks published while a topic has
    /// no subscribers are dropped, matching fire-and-forget fan-out.
    pub fn publish(&self, topic: &str, tick: Tick) {
        let sender = self.sender(topic);
        let _ = sender.send(tick);
    }

    /// Subscribe to a topic, creating it if needed. Each receiver
    /// observes ticks in publish order.
    pub fn subscribe(&self, topic: &str) -> broadcast::Receiver<Tick> {
        self.sender(topic).subscribe()
    }

    /// Remove a topic; outstanding receivers observe channel close.
    pub fn remove_topic(&self, topic: &str) {
        self.topics
            .lock()
            .expect("topic map should not be poisoned")
            .remove(topic);
    }

    fn sender(&self, topic: &str) -> broadcast::Sender<Tick> {
        let mut topics = self
            .topics
            .lock()
            .expect("topic map should not be poisoned");
        topics
            .entry(topic.to_owned())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .clone()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_TOPIC_CAPACITY)
    }
}
