//! Session log infrastructure

mod store;

pub use store::SessionStore;
