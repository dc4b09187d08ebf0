// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Keyed fan-out: routes values into lazily created per-key sub-streams.
//!
//! Each sub-stream owns an unbounded queue, a processor task bound to it and a
//! completion flag. Routing never blocks: enqueueing into an unbounded queue
//! succeeds immediately.
//!
//! Sub-streams are never evicted. A key that stops appearing keeps its idle
//! processor until the pipeline terminates, so this fits a small, roughly
//! stable set of keys. Unbounded key cardinality grows the map without limit.

use crate::merge::Merge;
use crate::processor::{spawn_processor, KeyHandler};
use futures::channel::mpsc::{self, UnboundedSender};
use rivulet_core::{BoxError, CancellationToken};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Key extraction function.
pub type KeyFn<T, K> = Arc<dyn Fn(&T) -> K + Send + Sync>;

struct SubStream<T> {
    sender: UnboundedSender<T>,
    handle: JoinHandle<()>,
    completed: Arc<AtomicBool>,
}

/// Router from one upstream to one sub-stream per distinct key.
///
/// Keys compare by value (`Eq` + `Hash`).
pub struct KeyedFanOut<T, K> {
    key_fn: KeyFn<T, K>,
    handler: KeyHandler<K, T>,
    merge: Arc<Merge<T>>,
    cancel: CancellationToken,
    substreams: HashMap<K, SubStream<T>>,
}

impl<T, K> KeyedFanOut<T, K>
where
    T: Send + 'static,
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
{
    pub fn new(
        key_fn: KeyFn<T, K>,
        handler: KeyHandler<K, T>,
        merge: Arc<Merge<T>>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            key_fn,
            handler,
            merge,
            cancel,
            substreams: HashMap::new(),
        }
    }

    /// Convenience constructor from plain closures.
    pub fn from_fns<KF, H, E>(
        key_fn: KF,
        handler: H,
        merge: Arc<Merge<T>>,
        cancel: CancellationToken,
    ) -> Self
    where
        KF: Fn(&T) -> K + Send + Sync + 'static,
        H: Fn(&K, T) -> Result<T, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        let handler: KeyHandler<K, T> = Arc::new(move |key: &K, value: T| -> Result<T, BoxError> {
            handler(key, value).map_err(Into::into)
        });
        Self::new(Arc::new(key_fn), handler, merge, cancel)
    }

    /// Sends `value` to the sub-stream of its key, creating it on first sight.
    ///
    /// Must be called from within a Tokio runtime; a new key spawns its
    /// processor.
    pub fn route(&mut self, value: T) {
        let key = (self.key_fn)(&value);
        let substream = match self.substreams.entry(key) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let key = entry.key().clone();
                info!("creating sub-stream for key {:?}", key);
                let (sender, queue) = mpsc::unbounded();
                let completed = Arc::new(AtomicBool::new(false));
                let handle = spawn_processor(
                    key,
                    queue,
                    Arc::clone(&self.handler),
                    Arc::clone(&self.merge),
                    self.cancel.clone(),
                    Arc::clone(&completed),
                );
                entry.insert(SubStream {
                    sender,
                    handle,
                    completed,
                })
            }
        };

        // Fails only once the processor exited on cancellation
        let _ = substream.sender.unbounded_send(value);
    }

    /// Number of sub-streams created so far.
    pub fn len(&self) -> usize {
        self.substreams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.substreams.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.substreams.keys()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.substreams.contains_key(key)
    }

    /// Whether the processor of `key` has exited; `None` for an unseen key.
    pub fn is_completed(&self, key: &K) -> Option<bool> {
        self.substreams
            .get(key)
            .map(|substream| substream.completed.load(Ordering::Acquire))
    }

    /// Closes every queue and waits for all processors to drain and exit.
    pub async fn close(self) {
        let handles: Vec<JoinHandle<()>> = self
            .substreams
            .into_values()
            .map(|substream| {
                drop(substream.sender);
                substream.handle
            })
            .collect();

        for handle in handles {
            if let Err(e) = handle.await {
                warn!("processor task did not complete: {}", e);
            }
        }
    }
}

impl<T, K: Debug> Debug for KeyedFanOut<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedFanOut")
            .field("keys", &self.substreams.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
