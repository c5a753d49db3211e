//! Per-session "alerts viewed" state.

use super::AlertStore;

/// State owned by one dashboard session.
///
/// A new session starts with the alerts unviewed. Viewing is a property of
/// the session only; it never touches the log.
#[derive(Debug, Clone, Default)]
pub struct Session {
    alerts_viewed: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while the log holds alerts and this session has not opened the
    /// alerts view.
    pub fn has_unviewed(&self, store: &AlertStore) -> bool {
        !self.alerts_viewed && !store.is_empty()
    }

    pub fn mark_viewed(&mut self) {
        self.alerts_viewed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::MemoryAlertLog;
    use chrono::Utc;
    use vitalwatch_types::AlertKind;

    #[test]
    fn test_session_lifecycle() {
        let store = AlertStore::open(Box::new(MemoryAlertLog::new()), None).unwrap();
        let mut session = Session::new();

        // Empty log: nothing to view
        assert!(!session.has_unviewed(&store));

        store.record(AlertKind::HeartRate, Utc::now()).unwrap();
        assert!(session.has_unviewed(&store));

        session.mark_viewed();
        assert!(!session.has_unviewed(&store));
        assert_eq!(store.len(), 1);

        // A fresh session starts unviewed again
        assert!(Session::new().has_unviewed(&store));
    }
}
