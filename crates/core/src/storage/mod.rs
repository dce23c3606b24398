pub mod token_store;

pub use token_store::{MemoryTokenStore, TokenStore};
#[cfg(not(target_arch = "wasm32"))]
pub use token_store::FileTokenStore;
