//! # searchlens-cli
//!
//! Session layer for searchlens: the search-provider client, the search
//! session controller and the hover debouncer, plus the `searchlens`
//! binary built on top of them.

pub mod debounce;
pub mod provider;
pub mod session;

pub use debounce::Debouncer;
pub use provider::{GoogleSearchProvider, RawItem, SearchProvider, candidate_nodes};
pub use session::{HOVER_DELAY, SearchSession};
