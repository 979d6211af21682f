//! Shared analysis session and change notifications
//!
//! The session is the many-writer state object viewers subscribe to. It
//! tracks attributes and their committed axis partitions, datasets, and
//! published subsets, and fans out typed change notifications to per-
//! subscriber FIFO queues. Viewers hold it as an `Arc<Session>` handle and
//! must tolerate other actors mutating it between notification deliveries.

use std::collections::VecDeque;
use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::axis::AxisPartition;
use crate::error::SelectionError;
use crate::subset::SubsetState;

/// Identifier for a plottable attribute.
pub type AttributeId = Uuid;

/// Identifier for a data source.
pub type SourceId = Uuid;

/// Identifier for one subscription to the session's notifications.
pub type SubscriptionId = Uuid;

/// Whether a source is a full dataset or a subset selection of one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    Data,
    Subset,
}

/// Reference to a data source: identity plus kind.
///
/// Identity is by id; the kind selects which duplicate-registration policy
/// applies on the viewer side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRef {
    pub id: SourceId,
    pub kind: SourceKind,
}

impl SourceRef {
    /// Reference to a full dataset.
    pub fn data(id: SourceId) -> Self {
        Self {
            id,
            kind: SourceKind::Data,
        }
    }

    /// Reference to a subset source.
    pub fn subset(id: SourceId) -> Self {
        Self {
            id,
            kind: SourceKind::Subset,
        }
    }
}

/// What changed about a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    /// Cosmetic or positional state changed; the defining predicate is
    /// intact.
    AttributeChanged,

    /// The subset's defining predicate was replaced.
    SubsetRedefined,

    /// The subset's predicate was deleted from the session.
    SubsetDeleted,

    /// A new source appeared in the session.
    DataAdded,

    /// A source was removed from the session.
    DataRemoved,
}

/// One typed change event.
///
/// Delivered at-most-once per logical change, FIFO per subscription, so
/// events about the same source are never reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeNotification {
    pub source: SourceRef,
    pub kind: ChangeKind,
    /// The data attribute the change binds to, when one applies (e.g. the
    /// attribute a redefined predicate now constrains).
    pub attribute: Option<AttributeId>,
}

/// A named attribute registered with the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attribute {
    pub id: AttributeId,
    pub name: String,
}

/// A published subset: its label plus defining predicate.
#[derive(Debug, Clone)]
struct SubsetEntry {
    label: String,
    state: SubsetState,
}

#[derive(Default)]
struct SessionInner {
    attributes: AHashMap<AttributeId, Attribute>,
    partitions: AHashMap<AttributeId, AxisPartition>,
    datasets: AHashMap<SourceId, String>,
    subsets: AHashMap<SourceId, SubsetEntry>,
}

type NotificationQueue = Arc<Mutex<VecDeque<ChangeNotification>>>;

/// The shared session object.
///
/// Nothing here assumes exclusive ownership: any actor holding the handle
/// may register attributes, publish subsets, or remove sources, and every
/// mutation fans out to all open subscriptions.
pub struct Session {
    inner: RwLock<SessionInner>,
    subscribers: Mutex<AHashMap<SubscriptionId, NotificationQueue>>,
}

/// Shared handle to a session.
pub type SessionHandle = Arc<Session>;

impl Session {
    /// Create an empty session.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(SessionInner::default()),
            subscribers: Mutex::new(AHashMap::new()),
        }
    }

    /// Register a plottable attribute under a human-readable name.
    pub fn register_attribute(&self, name: impl Into<String>) -> AttributeId {
        let attribute = Attribute {
            id: Uuid::new_v4(),
            name: name.into(),
        };
        let id = attribute.id;
        self.inner.write().attributes.insert(id, attribute);
        id
    }

    /// Look up an attribute by id.
    pub fn resolve_attribute(&self, id: AttributeId) -> Option<Attribute> {
        self.inner.read().attributes.get(&id).cloned()
    }

    /// Commit the axis partition that selections over `attribute` snap to.
    pub fn set_axis_partition(
        &self,
        attribute: AttributeId,
        partition: AxisPartition,
    ) -> Result<(), SelectionError> {
        let mut inner = self.inner.write();
        if !inner.attributes.contains_key(&attribute) {
            return Err(SelectionError::UnresolvedAttribute);
        }
        inner.partitions.insert(attribute, partition);
        Ok(())
    }

    /// The partition currently in effect for `attribute`, if any.
    pub fn axis_partition(&self, attribute: AttributeId) -> Option<AxisPartition> {
        self.inner.read().partitions.get(&attribute).cloned()
    }

    /// Add a dataset to the session.
    pub fn add_dataset(&self, label: impl Into<String>) -> SourceRef {
        let source = SourceRef::data(Uuid::new_v4());
        self.inner.write().datasets.insert(source.id, label.into());
        self.emit(ChangeNotification {
            source,
            kind: ChangeKind::DataAdded,
            attribute: None,
        });
        source
    }

    /// Persist a new subset state, making it a subset source.
    pub fn publish_subset(&self, label: impl Into<String>, state: SubsetState) -> SourceRef {
        let source = SourceRef::subset(Uuid::new_v4());
        self.inner.write().subsets.insert(
            source.id,
            SubsetEntry {
                label: label.into(),
                state,
            },
        );
        tracing::debug!(subset = %source.id, "subset published");
        self.emit(ChangeNotification {
            source,
            kind: ChangeKind::DataAdded,
            attribute: None,
        });
        source
    }

    /// Replace the defining predicate of an existing subset.
    pub fn redefine_subset(&self, source: SourceRef, state: SubsetState) -> bool {
        if source.kind != SourceKind::Subset {
            return false;
        }
        let attribute = state.attribute;
        {
            let mut inner = self.inner.write();
            let Some(entry) = inner.subsets.get_mut(&source.id) else {
                return false;
            };
            entry.state = state;
        }
        self.emit(ChangeNotification {
            source,
            kind: ChangeKind::SubsetRedefined,
            attribute: Some(attribute),
        });
        true
    }

    /// Current predicate of a subset source.
    pub fn subset_state(&self, source: SourceRef) -> Option<SubsetState> {
        if source.kind != SourceKind::Subset {
            return None;
        }
        self.inner
            .read()
            .subsets
            .get(&source.id)
            .map(|entry| entry.state.clone())
    }

    /// Current label of a source.
    pub fn source_label(&self, source: SourceRef) -> Option<String> {
        let inner = self.inner.read();
        match source.kind {
            SourceKind::Data => inner.datasets.get(&source.id).cloned(),
            SourceKind::Subset => inner.subsets.get(&source.id).map(|e| e.label.clone()),
        }
    }

    /// Rename a source. A cosmetic change: the predicate is untouched, so
    /// subscribers see `AttributeChanged` rather than a redefinition.
    pub fn set_source_label(&self, source: SourceRef, label: impl Into<String>) -> bool {
        let label = label.into();
        let renamed = {
            let mut inner = self.inner.write();
            match source.kind {
                SourceKind::Data => {
                    if let Some(entry) = inner.datasets.get_mut(&source.id) {
                        *entry = label;
                        true
                    } else {
                        false
                    }
                }
                SourceKind::Subset => {
                    if let Some(entry) = inner.subsets.get_mut(&source.id) {
                        entry.label = label;
                        true
                    } else {
                        false
                    }
                }
            }
        };
        if renamed {
            self.emit(ChangeNotification {
                source,
                kind: ChangeKind::AttributeChanged,
                attribute: None,
            });
        }
        renamed
    }

    /// Remove a source from the session.
    ///
    /// Deleting a subset emits `SubsetDeleted` before `DataRemoved`:
    /// subscribers first see the predicate go away, then drop the layers.
    /// Removing an unknown source is a no-op.
    pub fn remove_source(&self, source: SourceRef) -> bool {
        let removed = {
            let mut inner = self.inner.write();
            match source.kind {
                SourceKind::Data => inner.datasets.remove(&source.id).is_some(),
                SourceKind::Subset => inner.subsets.remove(&source.id).is_some(),
            }
        };
        if !removed {
            return false;
        }
        if source.kind == SourceKind::Subset {
            self.emit(ChangeNotification {
                source,
                kind: ChangeKind::SubsetDeleted,
                attribute: None,
            });
        }
        self.emit(ChangeNotification {
            source,
            kind: ChangeKind::DataRemoved,
            attribute: None,
        });
        true
    }

    /// Open a new subscription to the notification stream.
    pub fn subscribe(&self) -> Subscription {
        let id = Uuid::new_v4();
        let queue: NotificationQueue = Arc::new(Mutex::new(VecDeque::new()));
        self.subscribers.lock().insert(id, queue.clone());
        Subscription { id, queue }
    }

    /// Close a subscription; its queue stops receiving.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.subscribers.lock().remove(&id);
    }

    fn emit(&self, notification: ChangeNotification) {
        let subscribers = self.subscribers.lock();
        tracing::trace!(
            kind = ?notification.kind,
            source = %notification.source.id,
            subscribers = subscribers.len(),
            "change emitted"
        );
        for queue in subscribers.values() {
            queue.lock().push_back(notification.clone());
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Token for one subscriber's view of the notification stream.
///
/// Notifications accumulate in a FIFO queue per subscription and are
/// consumed in bounded batches, which preserves per-source ordering.
pub struct Subscription {
    id: SubscriptionId,
    queue: NotificationQueue,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Remove and return up to `max` pending notifications, oldest first.
    pub fn drain_batch(&self, max: usize) -> Vec<ChangeNotification> {
        let mut queue = self.queue.lock();
        let count = queue.len().min(max);
        queue.drain(..count).collect()
    }

    /// Number of notifications waiting.
    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range_state(session: &Session, lo: f64, hi: f64) -> SubsetState {
        let attribute = session.register_attribute("x");
        SubsetState::range(Some(attribute), lo, hi).unwrap()
    }

    #[test]
    fn test_publish_subset_emits_data_added() {
        let session = Session::new();
        let subscription = session.subscribe();

        let state = range_state(&session, 1.0, 4.0);
        let source = session.publish_subset("slice", state.clone());

        let batch = subscription.drain_batch(16);
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].kind, ChangeKind::DataAdded);
        assert_eq!(batch[0].source, source);
        assert_eq!(session.subset_state(source), Some(state));
    }

    #[test]
    fn test_redefine_emits_subset_redefined() {
        let session = Session::new();
        let state = range_state(&session, 1.0, 4.0);
        let source = session.publish_subset("slice", state.clone());

        let subscription = session.subscribe();
        let wider = SubsetState::range(Some(state.attribute), 0.0, 5.0).unwrap();
        assert!(session.redefine_subset(source, wider.clone()));

        let batch = subscription.drain_batch(16);
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].kind, ChangeKind::SubsetRedefined);
        assert_eq!(batch[0].attribute, Some(wider.attribute));
        assert_eq!(session.subset_state(source), Some(wider));
    }

    #[test]
    fn test_rename_emits_attribute_changed() {
        let session = Session::new();
        let source = session.add_dataset("run-1");

        let subscription = session.subscribe();
        assert!(session.set_source_label(source, "run-1b"));

        let batch = subscription.drain_batch(16);
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].kind, ChangeKind::AttributeChanged);
        assert_eq!(session.source_label(source).as_deref(), Some("run-1b"));
    }

    #[test]
    fn test_subset_delete_emits_deleted_then_removed() {
        let session = Session::new();
        let state = range_state(&session, 1.0, 4.0);
        let source = session.publish_subset("slice", state);

        let subscription = session.subscribe();
        assert!(session.remove_source(source));

        let batch = subscription.drain_batch(16);
        let kinds: Vec<ChangeKind> = batch.iter().map(|n| n.kind).collect();
        assert_eq!(kinds, vec![ChangeKind::SubsetDeleted, ChangeKind::DataRemoved]);
        assert!(session.subset_state(source).is_none());
    }

    #[test]
    fn test_remove_unknown_source_is_noop() {
        let session = Session::new();
        let subscription = session.subscribe();
        assert!(!session.remove_source(SourceRef::data(Uuid::new_v4())));
        assert_eq!(subscription.pending(), 0);
    }

    #[test]
    fn test_per_source_order_preserved() {
        let session = Session::new();
        let subscription = session.subscribe();

        let source = session.add_dataset("run-1");
        session.set_source_label(source, "a");
        session.set_source_label(source, "b");
        session.remove_source(source);

        let kinds: Vec<ChangeKind> = subscription
            .drain_batch(16)
            .iter()
            .map(|n| n.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                ChangeKind::DataAdded,
                ChangeKind::AttributeChanged,
                ChangeKind::AttributeChanged,
                ChangeKind::DataRemoved,
            ]
        );
    }

    #[test]
    fn test_drain_batch_is_bounded() {
        let session = Session::new();
        let subscription = session.subscribe();

        for i in 0..5 {
            session.add_dataset(format!("run-{i}"));
        }

        assert_eq!(subscription.drain_batch(2).len(), 2);
        assert_eq!(subscription.pending(), 3);
        assert_eq!(subscription.drain_batch(16).len(), 3);
        assert_eq!(subscription.pending(), 0);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let session = Session::new();
        let subscription = session.subscribe();
        session.unsubscribe(subscription.id());

        session.add_dataset("run-1");
        assert_eq!(subscription.pending(), 0);
    }

    #[test]
    fn test_partition_requires_registered_attribute() {
        let session = Session::new();
        let partition = AxisPartition::new(vec![0.0, 1.0]).unwrap();
        assert_eq!(
            session.set_axis_partition(Uuid::new_v4(), partition),
            Err(SelectionError::UnresolvedAttribute)
        );
    }
}
