//! Object model and change notification
//!
//! [`DynamicObject`] is an instance of a registered type: a unique object id,
//! field slots laid out by the type's descriptor chain, and a [`ChangeHub`]
//! that member writes notify through. Observation tokens are explicit
//! [`Subscription`] values; dropping one without calling
//! [`Subscription::unsubscribe`] keeps the listener installed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};

use crate::error::{MemberError, MemberResult};
use crate::registry::TypeId;
use crate::value::Value;

/// Global counter for generating unique object IDs
static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Generate a new unique object ID
fn generate_object_id() -> u64 {
    NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Listener invoked with the name of the member that changed
pub type ChangeListener = Arc<dyn Fn(&str) + Send + Sync>;

struct ListenerEntry {
    id: u64,
    filter: Option<Arc<str>>,
    listener: ChangeListener,
}

/// Listener table for member-change notification
///
/// Listeners registered with a filter fire only when the notified member name
/// matches the filter exactly; unfiltered listeners fire for every change.
pub struct ChangeHub {
    entries: Arc<Mutex<Vec<ListenerEntry>>>,
    next_id: AtomicU64,
}

impl ChangeHub {
    /// Create an empty hub
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
            next_id: AtomicU64::new(1),
        }
    }

    /// Install a listener, optionally filtered to one member name
    pub fn subscribe(&self, filter: Option<&str>, listener: ChangeListener) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let entry = ListenerEntry {
            id,
            filter: filter.map(Arc::from),
            listener,
        };
        self.entries
            .lock().push(entry);
        Subscription {
            entries: Arc::downgrade(&self.entries),
            id,
        }
    }

    /// Notify listeners that `member` changed
    ///
    /// Listeners are invoked outside the table lock so a listener may
    /// subscribe or unsubscribe reentrantly.
    pub fn notify(&self, member: &str) {
        let matched: Vec<ChangeListener> = {
            let entries = self.entries.lock();
            entries
                .iter()
                .filter(|e| e.filter.as_deref().map_or(true, |f| f == member))
                .map(|e| e.listener.clone())
                .collect()
        };
        for listener in matched {
            listener(member);
        }
    }

    /// Number of installed listeners
    pub fn listener_count(&self) -> usize {
        self.entries.lock().len()
    }
}

impl Default for ChangeHub {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ChangeHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeHub")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Observation token returned by `subscribe`
///
/// Holds a weak reference to the listener table, so a token never keeps its
/// target alive. [`Subscription::noop`] is the token for members that accept
/// observers but never raise.
pub struct Subscription {
    entries: Weak<Mutex<Vec<ListenerEntry>>>,
    id: u64,
}

impl Subscription {
    /// Token that observes nothing
    pub fn noop() -> Self {
        Self {
            entries: Weak::new(),
            id: 0,
        }
    }

    /// Whether the listener is still installed on a live target
    pub fn is_active(&self) -> bool {
        match self.entries.upgrade() {
            Some(entries) => entries
                .lock().iter().any(|e| e.id == self.id),
            None => false,
        }
    }

    /// Remove the listener
    pub fn unsubscribe(self) {
        if let Some(entries) = self.entries.upgrade() {
            entries
                .lock().retain(|e| e.id != self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

/// Object instance of a registered type
pub struct DynamicObject {
    object_id: u64,
    type_id: TypeId,
    fields: RwLock<Vec<Value>>,
    changes: ChangeHub,
}

impl DynamicObject {
    /// Create an instance with `field_count` null-initialized slots
    ///
    /// Prefer `TypeRegistry::instantiate`, which sizes the slot vector from
    /// the descriptor chain and applies declared defaults.
    pub fn new(type_id: TypeId, field_count: usize) -> Arc<Self> {
        Self::with_fields(type_id, vec![Value::Null; field_count])
    }

    /// Create an instance with pre-populated field slots
    pub fn with_fields(type_id: TypeId, fields: Vec<Value>) -> Arc<Self> {
        Arc::new(Self {
            object_id: generate_object_id(),
            type_id,
            fields: RwLock::new(fields),
            changes: ChangeHub::new(),
        })
    }

    /// Unique object ID (assigned on creation)
    pub fn object_id(&self) -> u64 {
        self.object_id
    }

    /// The registered type this object is an instance of
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Number of field slots
    pub fn field_count(&self) -> usize {
        self.fields.read().len()
    }

    /// Get a field value by slot index
    pub fn get_field(&self, index: usize) -> Option<Value> {
        self.fields.read().get(index).cloned()
    }

    /// Set a field value by slot index
    ///
    /// Does not notify: change notification carries the member name, which
    /// only the member layer knows.
    pub fn set_field(&self, index: usize, value: Value) -> MemberResult<()> {
        let mut fields = self.fields.write();
        let len = fields.len();
        match fields.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(MemberError::IndexOutOfBounds { index, len }),
        }
    }

    /// Change hub for member notifications on this instance
    pub fn changes(&self) -> &ChangeHub {
        &self.changes
    }
}

impl std::fmt::Debug for DynamicObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicObject")
            .field("object_id", &self.object_id)
            .field("type_id", &self.type_id)
            .field("fields", &self.field_count())
            .finish()
    }
}
