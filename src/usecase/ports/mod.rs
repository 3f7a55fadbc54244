pub mod fetcher;
pub mod session_store;
