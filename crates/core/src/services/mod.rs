pub mod mutation_service;
pub mod query_cache;
pub mod route_guard;
pub mod session_service;
pub mod strategy_service;
pub mod summary_service;
pub mod trade_service;
