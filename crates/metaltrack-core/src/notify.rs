//! User-facing notices
//!
//! A small publish/subscribe hub. Notices live in a bounded queue (the oldest
//! is evicted when full) and expire after a fixed time to live.

use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Notice styling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeVariant {
    #[default]
    Default,
    Destructive,
}

/// A published notice
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub variant: NoticeVariant,
    #[serde(skip)]
    pub expires_at: Instant,
}

/// Change delivered to subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum NoticeEvent {
    Published(Notice),
    Removed(u64),
}

/// Subscription handle returned by `subscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

type Listener = Arc<dyn Fn(&NoticeEvent) + Send + Sync>;

struct Inner {
    notices: VecDeque<Notice>,
    listeners: HashMap<SubscriberId, Listener>,
    next_notice: u64,
    next_subscriber: u64,
}

/// Bounded notice hub
pub struct Notifier {
    capacity: usize,
    ttl: Duration,
    inner: Mutex<Inner>,
}

impl Notifier {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            capacity: capacity.max(1),
            ttl,
            inner: Mutex::new(Inner {
                notices: VecDeque::new(),
                listeners: HashMap::new(),
                next_notice: 1,
                next_subscriber: 1,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a listener; it sees every later publish and removal
    pub fn subscribe<F>(&self, listener: F) -> SubscriberId
    where
        F: Fn(&NoticeEvent) + Send + Sync + 'static,
    {
        let mut inner = self.lock();
        let id = SubscriberId(inner.next_subscriber);
        inner.next_subscriber += 1;
        inner.listeners.insert(id, Arc::new(listener));
        id
    }

    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.lock().listeners.remove(&id).is_some()
    }

    /// Publish a notice and return its id
    pub fn publish(
        &self,
        title: impl Into<String>,
        description: impl Into<String>,
        variant: NoticeVariant,
    ) -> u64 {
        let (notice, evicted, listeners) = {
            let mut inner = self.lock();
            let notice = Notice {
                id: inner.next_notice,
                title: title.into(),
                description: description.into(),
                variant,
                expires_at: Instant::now() + self.ttl,
            };
            inner.next_notice += 1;

            let mut evicted = Vec::new();
            while inner.notices.len() >= self.capacity {
                if let Some(old) = inner.notices.pop_front() {
                    evicted.push(old.id);
                }
            }
            inner.notices.push_back(notice.clone());
            (notice, evicted, inner.listeners.values().cloned().collect::<Vec<_>>())
        };

        log::debug!("Notice {} published: {}", notice.id, notice.title);
        for id in evicted {
            notify(&listeners, &NoticeEvent::Removed(id));
        }
        let id = notice.id;
        notify(&listeners, &NoticeEvent::Published(notice));
        id
    }

    /// Shorthand for a success notice
    pub fn info(&self, title: impl Into<String>, description: impl Into<String>) -> u64 {
        self.publish(title, description, NoticeVariant::Default)
    }

    /// Shorthand for an error notice
    pub fn error(&self, title: impl Into<String>, description: impl Into<String>) -> u64 {
        self.publish(title, description, NoticeVariant::Destructive)
    }

    pub fn dismiss(&self, id: u64) -> bool {
        let (removed, listeners) = {
            let mut inner = self.lock();
            let before = inner.notices.len();
            inner.notices.retain(|n| n.id != id);
            (inner.notices.len() != before, inner.listeners.values().cloned().collect::<Vec<_>>())
        };
        if removed {
            notify(&listeners, &NoticeEvent::Removed(id));
        }
        removed
    }

    /// Drop every notice expired at `now`; returns how many were dropped
    pub fn expire(&self, now: Instant) -> usize {
        let (expired, listeners) = {
            let mut inner = self.lock();
            let mut expired = Vec::new();
            inner.notices.retain(|n| {
                if n.expires_at <= now {
                    expired.push(n.id);
                    false
                } else {
                    true
                }
            });
            (expired, inner.listeners.values().cloned().collect::<Vec<_>>())
        };
        for id in &expired {
            notify(&listeners, &NoticeEvent::Removed(*id));
        }
        expired.len()
    }

    /// Live notices, oldest first
    pub fn snapshot(&self) -> Vec<Notice> {
        let now = Instant::now();
        self.lock()
            .notices
            .iter()
            .filter(|n| n.expires_at > now)
            .cloned()
            .collect()
    }

    /// Spawn a background task expiring notices once a second
    pub fn spawn_expiry(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let notifier = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            loop {
                interval.tick().await;
                match notifier.upgrade() {
                    Some(notifier) => {
                        notifier.expire(Instant::now());
                    }
                    None => break,
                }
            }
        })
    }
}

fn notify(listeners: &[Listener], event: &NoticeEvent) {
    for listener in listeners {
        listener(event);
    }
}
