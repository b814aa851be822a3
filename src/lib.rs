//! snaplink: the storage/lookup/expiry engine of a URL-shortening demo
//!
//! The crate owns shortcode -> destination mappings and their click logs,
//! persisting full state through an injected key-value backend on every
//! mutation. Around that core sit a collision-checked shortcode generator,
//! an on-demand statistics aggregator, a periodic expiry sweeper with an
//! explicit stop handle, and the path-based redirection contract.
//!
//! There is deliberately no server in here: the embedding application owns
//! the presentation surface and drives the engine directly.

pub mod config;
pub mod error;
pub mod location;
pub mod model;
pub mod route;
pub mod shortcode;
pub mod stats;
pub mod storage;
pub mod store;
pub mod sweeper;
pub mod validate;

pub use error::{StorageError, StoreError};
pub use model::{ClickEvent, ClickMetadata, Lookup, UrlRecord, UrlSummary};
pub use store::UrlStore;
