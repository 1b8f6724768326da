//! # Courier
//!
//! Side-effect commit layer for a conversational flow backend.
//!
//! Two pieces live here:
//!
//! - [`hooks`]: flow events are routed to handlers that queue change records
//!   on their scene. At commit time the records of every scene sharing a
//!   transaction are grouped by hook and each hook writes its batch once.
//! - [`ivr`]: a worker that starts batches of contacts in an IVR flow,
//!   skipping contacts that already took part or are busy elsewhere.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use courier::hooks::{commit_scenes, DispatchPolicy, Event, EventHookRegistry, HookContext, SceneArena};
//! use courier::models::{ContactId, Database, OrgId, Urn};
//! use courier::storage::MemoryStore;
//! use std::sync::Arc;
//!
//! # async fn run() -> courier::Result<()> {
//! let store = MemoryStore::new();
//! let registry = EventHookRegistry::with_defaults();
//! let ctx = HookContext::new(store.get_org_assets(OrgId(1)).await?);
//!
//! let mut scenes = SceneArena::new();
//! let scene = scenes.add(OrgId(1), ContactId(10), uuid::Uuid::new_v4(), None);
//! let events = vec![(scene, Event::ContactUrnsChanged { urns: vec![Urn::from("tel:+250788123123")] })];
//!
//! commit_scenes(&store, &registry, &ctx, &mut scenes, events, DispatchPolicy::Strict).await?;
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod hooks;
pub mod ivr;
pub mod models;
pub mod storage;

// Re-exports for convenience
pub use crate::core::config::{CourierConfig, CourierConfigBuilder};
pub use crate::core::errors::{CourierError, Result, ResultExt};
pub use crate::core::telemetry::init_tracing;
