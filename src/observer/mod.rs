// Observer pipeline for single-contact operations

pub mod context;
pub mod error;
pub mod implementations;
pub mod pipeline;
pub mod traits;

pub use context::ObserverContext;
pub use error::ObserverError;
pub use pipeline::ObserverPipeline;
pub use traits::{Observer, ObserverRing, Operation};
