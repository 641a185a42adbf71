// Routes reachable without a bearer token
pub mod health;
pub mod index;

pub use health::health;
pub use index::{api_index, root};
