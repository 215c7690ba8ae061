mod chat_state;
mod chat_store;
mod document_state;
mod document_store;
mod qa;
#[cfg(test)]
pub mod testing;

pub use chat_state::*;
pub use chat_store::*;
pub use document_state::*;
pub use document_store::*;
pub use qa::*;
