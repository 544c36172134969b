//! Pinned items.
//!
//! Pins are written to the cache optimistically and rolled back when the
//! backend refuses them. The number of pins is capped by [`PinningPolicy`].

use tracing::{info, warn};

use crate::config::PinningPolicy;
use crate::error::{EngineError, EngineResult};

use super::{BackendError, CacheKey, OptimisticUpdate, QueryCache};

/// The backend calls behind pinning.
pub trait PinBackend {
    /// Persists a pin.
    fn pin(&self, item_id: &str) -> Result<(), BackendError>;
    /// Removes a pin.
    fn unpin(&self, item_id: &str) -> Result<(), BackendError>;
}

/// The user's pinned items.
#[derive(Debug)]
pub struct PinBoard {
    cache: QueryCache<Vec<String>>,
    limit: usize,
}

impl PinBoard {
    /// Creates an empty board capped by `policy`.
    pub fn new(policy: &PinningPolicy) -> Self {
        Self {
            cache: QueryCache::new(1),
            limit: policy.max_pinned_items,
        }
    }

    fn key() -> CacheKey {
        CacheKey::record("pins", "me")
    }

    /// Replaces the pins with what the backend reported.
    pub fn load(&self, items: Vec<String>) {
        self.cache.insert(Self::key(), items);
    }

    /// Currently pinned item ids, oldest first.
    pub fn pinned(&self) -> Vec<String> {
        self.cache.peek(&Self::key()).unwrap_or_default()
    }

    /// Returns true if `item_id` is pinned.
    pub fn is_pinned(&self, item_id: &str) -> bool {
        self.pinned().iter().any(|id| id == item_id)
    }

    /// Pins `item_id`.
    ///
    /// Pinning an already pinned item does nothing.
    ///
    /// # Errors
    ///
    /// `PinLimitReached` when the board is full (nothing is sent to the
    /// backend); `BackendRejected` when the backend refuses, after the pin
    /// has been rolled back.
    pub fn pin(&self, item_id: &str, backend: &impl PinBackend) -> EngineResult<()> {
        let current = self.pinned();
        if current.iter().any(|id| id == item_id) {
            return Ok(());
        }
        if current.len() >= self.limit {
            warn!(item_id, limit = self.limit, "Pin refused: board is full");
            return Err(EngineError::PinLimitReached { limit: self.limit });
        }

        let update = OptimisticUpdate::apply(&self.cache, Self::key(), |pins| {
            let mut pins = pins.unwrap_or_default();
            pins.push(item_id.to_string());
            pins
        });

        match backend.pin(item_id) {
            Ok(()) => {
                update.commit();
                info!(item_id, "Item pinned");
                Ok(())
            }
            Err(err) => {
                update.revert();
                warn!(item_id, status = err.status, "Pin rolled back");
                Err(err.into_engine_error(self.limit))
            }
        }
    }

    /// Unpins `item_id`.
    ///
    /// Unpinning an item that is not pinned does nothing.
    ///
    /// # Errors
    ///
    /// `BackendRejected` when the backend refuses, after the pin has been
    /// restored.
    pub fn unpin(&self, item_id: &str, backend: &impl PinBackend) -> EngineResult<()> {
        if !self.is_pinned(item_id) {
            return Ok(());
        }

        let update = OptimisticUpdate::apply(&self.cache, Self::key(), |pins| {
            pins.unwrap_or_default()
                .into_iter()
                .filter(|id| id != item_id)
                .collect()
        });

        match backend.unpin(item_id) {
            Ok(()) => {
                update.commit();
                info!(item_id, "Item unpinned");
                Ok(())
            }
            Err(err) => {
                update.revert();
                warn!(item_id, status = err.status, "Unpin rolled back");
                Err(err.into_engine_error(self.limit))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;

    #[derive(Default)]
    struct FakeBackend {
        fail_with: Option<BackendError>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeBackend {
        fn failing(status: u16, message: &str) -> Self {
            Self {
                fail_with: Some(BackendError::new(status, json!({ "message": message }))),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn respond(&self, call: String) -> Result<(), BackendError> {
            self.calls.borrow_mut().push(call);
            match &self.fail_with {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        }
    }

    impl PinBackend for FakeBackend {
        fn pin(&self, item_id: &str) -> Result<(), BackendError> {
            self.respond(format!("pin:{}", item_id))
        }

        fn unpin(&self, item_id: &str) -> Result<(), BackendError> {
            self.respond(format!("unpin:{}", item_id))
        }
    }

    fn board() -> PinBoard {
        PinBoard::new(&PinningPolicy::default())
    }

    #[test]
    fn test_pin_and_unpin() {
        let board = board();
        let backend = FakeBackend::default();

        board.pin("prj_1", &backend).unwrap();
        board.pin("prj_2", &backend).unwrap();
        assert_eq!(board.pinned(), vec!["prj_1", "prj_2"]);

        board.unpin("prj_1", &backend).unwrap();
        assert_eq!(board.pinned(), vec!["prj_2"]);
        assert_eq!(backend.calls.borrow().len(), 3);
    }

    #[test]
    fn test_sixth_pin_refused_without_backend_call() {
        let board = board();
        let backend = FakeBackend::default();
        for i in 0..5 {
            board.pin(&format!("prj_{}", i), &backend).unwrap();
        }

        let result = board.pin("prj_5", &backend);

        assert!(matches!(result, Err(EngineError::PinLimitReached { limit: 5 })));
        assert_eq!(board.pinned().len(), 5);
        assert_eq!(backend.calls.borrow().len(), 5);
    }

    #[test]
    fn test_failed_pin_is_rolled_back() {
        let board = board();
        board.load(vec!["prj_1".to_string()]);
        let backend = FakeBackend::failing(500, "internal error");

        let result = board.pin("prj_2", &backend);

        match result {
            Err(EngineError::BackendRejected { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, crate::client::GENERIC_ERROR_MESSAGE);
            }
            other => panic!("Expected BackendRejected, got {:?}", other),
        }
        assert_eq!(board.pinned(), vec!["prj_1"]);
    }

    #[test]
    fn test_failed_unpin_restores_pin() {
        let board = board();
        board.load(vec!["prj_1".to_string(), "prj_2".to_string()]);
        let backend = FakeBackend::failing(400, "cannot unpin");

        assert!(board.unpin("prj_1", &backend).is_err());
        assert_eq!(board.pinned(), vec!["prj_1", "prj_2"]);
    }

    #[test]
    fn test_backend_limit_error_maps_to_message() {
        let board = board();
        let backend = FakeBackend::failing(400, "Cannot pin more than 5 items");

        match board.pin("prj_1", &backend) {
            Err(err) => assert_eq!(err.to_string(), "You cannot pin more than 5 items."),
            Ok(()) => panic!("Expected an error"),
        }
        assert!(board.pinned().is_empty());
    }

    #[test]
    fn test_backend_limit_message_uses_board_limit() {
        let board = PinBoard::new(&PinningPolicy { max_pinned_items: 3 });
        let backend = FakeBackend::failing(409, "Pin limit exceeded");

        match board.pin("prj_1", &backend) {
            Err(err) => assert_eq!(err.to_string(), "You cannot pin more than 3 items."),
            Ok(()) => panic!("Expected an error"),
        }
    }

    #[test]
    fn test_repeat_pin_and_missing_unpin_are_noops() {
        let board = board();
        let backend = FakeBackend::default();
        board.pin("prj_1", &backend).unwrap();
        board.pin("prj_1", &backend).unwrap();
        board.unpin("prj_9", &backend).unwrap();

        assert_eq!(board.pinned(), vec!["prj_1"]);
        assert_eq!(backend.calls.borrow().len(), 1);
    }

    #[test]
    fn test_limit_follows_policy() {
        let board = PinBoard::new(&PinningPolicy { max_pinned_items: 1 });
        let backend = FakeBackend::default();
        board.pin("a", &backend).unwrap();
        assert!(board.pin("b", &backend).is_err());
    }
}
