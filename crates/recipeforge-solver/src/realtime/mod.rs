//! Live monitoring and cancellation of running matches.
//!
//! A run started through [`MatchManager`](crate::manager::MatchManager)
//! executes on its own thread. The caller keeps a [`MatchHandle`] to request
//! cancellation and reads [`MatchEvent`]s from a channel as assignments are
//! discovered.
//!
//! # Example
//!
//! ```
//! use recipeforge_solver::realtime::MatchHandle;
//!
//! let handle = MatchHandle::new();
//! assert!(!handle.is_cancel_requested());
//!
//! handle.request_cancel();
//! assert!(handle.is_cancel_requested());
//! ```

mod channel;
mod match_handle;

pub use channel::{ChannelEventListener, MatchEvent};
pub use match_handle::MatchHandle;
