//! An incremental timegraph for qualitative and quantitative temporal
//! reasoning.
//!
//! Assertions over named time points and events (`before`, `after`,
//! `during`, `between`, equality, absolute timestamps, duration bounds)
//! are folded into chains of totally-ordered points connected by a
//! metagraph, so that later queries for the strongest derivable relation or
//! the elapsed time between two names stay cheap.
//!
//! ```rust
//! use timegraph::{Effort, TimeGraph};
//!
//! let mut tg = TimeGraph::new();
//! tg.register_event("e1");
//! tg.register_event("e2");
//! tg.enter("e1", "before-1", "e2")?;
//! tg.enter("e1start", "same-time", "1997-07-02T01:01:01".parse::<timegraph::AbsTime>()?)?;
//!
//! assert_eq!(tg.relation("e1", "e2", Effort::Search).to_string(), "before-1");
//! let (min, max) = tg.elapsed("e1", "e2", Effort::Direct);
//! assert!(min >= 0.0 && min <= max);
//! # Ok::<(), timegraph::TimegraphError>(())
//! ```

pub mod abstime;
pub mod config;
pub mod error;
pub mod graph;
pub mod link;
pub mod node;
pub mod pred;

pub use abstime::AbsTime;
pub use config::{Config, GraphStats};
pub use error::{Result, TimegraphError};
pub use graph::{Effort, TimeArg, TimeGraph};
pub use link::{TimeLink, TimeLinkList};
pub use node::{ChainId, EventPoint, LinkId, MetaNode, PointId, TimePoint};
pub use pred::{Pred, Stem, Strictness};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {
    pub use crate::{AbsTime, Config, Effort, Pred, Result, Stem, Strictness, TimeArg, TimeGraph};
}
