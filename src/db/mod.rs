//! Database layer (MySQL, with an in-memory backend for tests).

pub mod store;

pub use store::UserStore;
