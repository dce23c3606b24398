pub mod client;
pub mod rest;
pub mod traits;

pub use client::HttpClient;
pub use rest::RestJournalApi;
pub use traits::JournalApi;
