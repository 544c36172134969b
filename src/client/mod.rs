//! Client-side support for the console's backend contracts.
//!
//! This module provides the deterministic parts of talking to the backend:
//! list query parameters, the query cache with invalidation, optimistic
//! updates used for pinning, user-facing error messages, drive link
//! derivation and the realtime notification feed.

mod cache;
mod drive;
mod messages;
mod notifications;
mod optimistic;
mod pins;
mod query;

pub use cache::{CacheKey, CacheStats, QueryCache};
pub use drive::DriveLinks;
pub use messages::{BackendError, GENERIC_ERROR_MESSAGE, user_message};
pub use notifications::{NOTIFICATION_CREATED, Notification, NotificationFeed};
pub use optimistic::OptimisticUpdate;
pub use pins::{PinBackend, PinBoard};
pub use query::{ListQuery, SortOrder};
