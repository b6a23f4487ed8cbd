//! Logical clock assignment and causal-order queries for event DAGs.
//!
//! `weft-core` reconstructs the causal structure of a distributed execution
//! from a trace recorded as events with happens-before edges across and
//! within execution timelines (threads, processes, hosts). It assigns every
//! event a Lamport counter and a per-timeline vector clock in one traversal,
//! then answers causal-order queries on top of the assigned timestamps:
//! whether one event happened before another, and which events lie on causal
//! paths between two endpoints.
//!
//! The graph itself lives behind the [`store::EventStore`] capability; the
//! bundled [`store::MemoryStore`] is one implementation, and any engine
//! satisfying the trait works the same way.
//!
//! ```
//! use weft_core::{Event, EventId, MemoryStore};
//! use weft_core::causality::assign::annotate_logical_time;
//! use weft_core::causality::order::happens_before;
//!
//! let mut store = MemoryStore::new();
//! store.insert(Event::new("send", "client"));
//! store.insert(Event::new("recv", "server"));
//! store.link(&EventId::from("send"), &EventId::from("recv"));
//!
//! annotate_logical_time(&mut store, None)?;
//! assert!(happens_before(&store, &EventId::from("send"), &EventId::from("recv"), None)?);
//! # Ok::<(), weft_core::CausalityError>(())
//! ```
//!
//! # Conventions
//!
//! - **Errors**: typed `thiserror` enums; every failure names the offending
//!   event. See [`error::CausalityError`].
//! - **Logging**: `tracing` macros (`debug!`, `trace!`); the library installs
//!   no subscriber.
//! - **Metrics**: an explicit [`stats::ExecutionStats`] collector threaded
//!   through the operations that want one; no global state.

pub mod causality;
pub mod clock;
pub mod error;
pub mod event;
pub mod stats;
pub mod store;

pub use causality::assign::annotate_logical_time;
pub use causality::order::happens_before;
pub use causality::range::{CausalNode, causal_graph, causal_nodes};
pub use clock::VectorClock;
pub use error::CausalityError;
pub use event::{Event, EventId, LOG_LABEL};
pub use stats::ExecutionStats;
pub use store::{EventStore, MemoryStore};
