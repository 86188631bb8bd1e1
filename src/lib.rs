//! # Teamforge
//!
//! A crew roster service with realtime change notifications, usable both as a
//! standalone binary and as a library.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! teamforge = { version = "0.0.1", default-features = false }
//! ```
//!
//! Serving the record store:
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use teamforge::server::{AppState, create_router};
//! use teamforge::store::{SqliteStore, Store};
//!
//! let store = SqliteStore::new("./data/teamforge.db").unwrap();
//! store.initialize().unwrap();
//!
//! let router = create_router(Arc::new(AppState::new(Arc::new(store))));
//! // Serve with axum...
//! ```
//!
//! Talking to it:
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use teamforge::client::{HttpRecordStore, RecordStore};
//! use teamforge::roster::RosterView;
//!
//! let store: Arc<dyn RecordStore> = Arc::new(HttpRecordStore::new("http://127.0.0.1:8080")?);
//! let mut view = RosterView::new(store);
//! view.activate().await?;
//! while view.sync_once().await {
//!     println!("{} crewmates", view.total());
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Includes CLI module. Disable with `default-features = false`.

pub mod changes;
#[cfg(feature = "cli")]
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod roster;
pub mod server;
pub mod store;
pub mod types;
