//! Connection identity.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

use crate::connection::SubConnection;

/// Identity of a physical connection: the address of the connection object.
///
/// Every handle wrapping the same `Arc` shares it, and a connection can
/// compute its own from `&self`. Unique while the connection is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(usize);

impl ConnectionId {
    /// Identity of the connection behind `connection`.
    pub fn of(connection: &dyn SubConnection) -> Self {
        Self(connection as *const dyn SubConnection as *const () as usize)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn#{:x}", self.0)
    }
}

/// A pool member: the physical connection plus its identity and role name.
///
/// Cloning is cheap. Equality and hashing follow the physical connection,
/// so two handles wrapping the same `Arc` are the same member.
#[derive(Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    role: Arc<str>,
    inner: Arc<dyn SubConnection>,
}

impl ConnectionHandle {
    pub fn new(role: impl Into<Arc<str>>, inner: Arc<dyn SubConnection>) -> Self {
        Self {
            id: ConnectionId::of(inner.as_ref()),
            role: role.into(),
            inner,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Pool role name (`"primary"`, `"replica_0"`, ...).
    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn connection(&self) -> &Arc<dyn SubConnection> {
        &self.inner
    }

    /// True if this handle wraps exactly `other` (pointer identity).
    pub fn wraps(&self, other: &Arc<dyn SubConnection>) -> bool {
        same_connection(&self.inner, other)
    }
}

/// Pointer identity for trait objects, ignoring vtable differences.
pub(crate) fn same_connection(a: &Arc<dyn SubConnection>, b: &Arc<dyn SubConnection>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

impl Deref for ConnectionHandle {
    type Target = dyn SubConnection;

    fn deref(&self) -> &Self::Target {
        self.inner.as_ref()
    }
}

impl PartialEq for ConnectionHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ConnectionHandle {}

impl Hash for ConnectionHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("id", &self.id)
            .field("role", &self.role)
            .field("adapter", &self.inner.adapter_name())
            .finish()
    }
}

impl fmt::Display for ConnectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.role)
    }
}
