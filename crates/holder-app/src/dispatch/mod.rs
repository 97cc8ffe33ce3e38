//! # Action dispatch
//!
//! Remote actions go through an [`ActionHandle`]:
//!
//! ```text
//! dispatch(call)
//!   feature := started
//!   registry.run(key)  ── joined if the key is in flight
//!     call() raced against session disconnect
//!   feature := succeeded | failed(error)
//!   leader && Ok  ── refetch snapshot
//! ```
//!
//! Coalescing is process-wide per [`DispatchKey`], through one shared
//! [`DispatchRegistry`].

mod feature;
mod handle;
mod single_flight;

pub use feature::{ActionErrorState, ActionFeature, ActionStatus};
pub use handle::{ActionHandle, ActionOutcome, DispatchKey, DispatchRegistry};
pub use single_flight::{Flight, SingleFlight};
