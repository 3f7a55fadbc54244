pub mod collection_controller;
pub mod pagination;
pub mod query_service;
pub mod session_service;
