//! UI session registry.
//!
//! Outbound delivery is broadcast-only, which is correct only while a single
//! UI is attached. The registry enforces that: attaching a second session
//! while one is active fails with [`DaemonError::SessionRejected`].

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use crate::error::{DaemonError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Sender for encoded outbound frames of one session
pub type FrameSender = mpsc::UnboundedSender<String>;

#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, FrameSender>>,
}

impl SessionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<SessionId, FrameSender>> {
        self.sessions
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<SessionId, FrameSender>> {
        self.sessions
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Attach a session.
    ///
    /// A session whose sender is already closed counts as gone and is replaced.
    ///
    /// # Errors
    ///
    /// Returns [`DaemonError::SessionRejected`] if another live session is attached.
    pub fn attach(&self, sender: FrameSender) -> Result<SessionId> {
        let mut sessions = self.write();
        sessions.retain(|id, tx| {
            let alive = !tx.is_closed();
            if !alive {
                debug!("Dropping stale session {id}");
            }
            alive
        });
        if !sessions.is_empty() {
            warn!("Rejecting UI session: one is already attached");
            return Err(DaemonError::SessionRejected);
        }

        let id = SessionId::new();
        sessions.insert(id.clone(), sender);
        debug!("Session attached: {id}");
        Ok(id)
    }

    /// Detach a session. Returns whether it was attached.
    pub fn detach(&self, id: &SessionId) -> bool {
        let removed = self.write().remove(id).is_some();
        if removed {
            debug!("Session detached: {id}");
        }
        removed
    }

    /// Send a frame to every attached session. Returns how many accepted it.
    pub fn broadcast(&self, frame: &str) -> usize {
        let sessions = self.read();
        let mut delivered = 0;
        for (id, tx) in sessions.iter() {
            if tx.send(frame.to_string()).is_ok() {
                delivered += 1;
            } else {
                trace!("Session {id} closed, frame dropped");
            }
        }
        delivered
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        !self.read().is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_unique() {
        let id1 = SessionId::new();
        let id2 = SessionId::new();
        assert_ne!(id1, id2, "Each new ID should be unique");
    }

    #[test]
    fn test_session_id_from_str() {
        let id: SessionId = "my-session".into();
        assert_eq!(format!("{id}"), "my-session");
    }

    #[test]
    fn test_attach_and_broadcast() {
        let registry = SessionRegistry::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = registry.attach(tx).unwrap();

        assert!(registry.is_connected());
        assert_eq!(registry.broadcast("hello"), 1);
        assert_eq!(rx.try_recv().unwrap(), "hello");

        assert!(registry.detach(&id));
        assert!(!registry.detach(&id));
        assert_eq!(registry.broadcast("gone"), 0);
    }

    #[test]
    fn test_second_session_rejected() {
        let registry = SessionRegistry::new();
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();

        registry.attach(tx1).unwrap();
        assert!(matches!(
            registry.attach(tx2),
            Err(DaemonError::SessionRejected)
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_closed_session_is_replaced() {
        let registry = SessionRegistry::new();
        let (tx1, rx1) = mpsc::unbounded_channel();
        registry.attach(tx1).unwrap();
        drop(rx1);

        let (tx2, mut rx2) = mpsc::unbounded_channel();
        registry.attach(tx2).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.broadcast("x"), 1);
        assert_eq!(rx2.try_recv().unwrap(), "x");
    }

    #[test]
    fn test_attach_after_detach() {
        let registry = SessionRegistry::new();
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let id = registry.attach(tx1).unwrap();
        registry.detach(&id);

        let (tx2, _rx2) = mpsc::unbounded_channel();
        assert!(registry.attach(tx2).is_ok());
    }
}
