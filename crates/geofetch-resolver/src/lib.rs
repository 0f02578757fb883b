//! Location resolution and issue-fetch orchestration.
//!
//! A device position races an IP lookup behind a fallback timer; the winning
//! location is forwarded, through a dedup guard, to the issues service. Every
//! state change leaves this crate as a [`StateIntent`](geofetch_core::StateIntent)
//! applied to an injected sink, and no failure is ever propagated to the
//! caller: each one ends in a log line, a ui-state emission, or both.

pub mod error;
pub mod fetcher;
pub mod guard;
pub mod refresh;
pub mod resolver;
pub mod source;
pub mod startup;
pub mod store;

pub use error::{Disposition, ResolveError};
pub use fetcher::{FetchOutcome, FetchStatus, IssueFetcher};
pub use guard::{needs_fetch, FetchRequest};
pub use refresh::{group_issues_if_needed, issues_if_needed, RefreshOutcome};
pub use resolver::{LocationResolver, ResolutionOutcome, ResolverConfig};
pub use source::LocationSource;
pub use startup::{force_address_from_query, StartupLocation, StartupOrchestrator, StartupReport};
pub use store::{AppState, MemoryStore};
