pub mod entity;
pub mod filter;
pub mod page;
pub mod resource;
pub mod search;
pub mod session;
pub mod stats;
