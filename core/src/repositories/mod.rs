pub mod blacklist;

pub use blacklist::{BlacklistStore, InMemoryBlacklistStore};
