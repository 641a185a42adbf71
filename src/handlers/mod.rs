pub mod fallback;
pub mod protected;
pub mod public;
