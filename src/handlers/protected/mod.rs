// Routes behind the bearer token gate
pub mod contacts;
