mod action;
mod chat;
mod document;
mod error;
mod gateway;
mod message;
mod notification;
mod operation;
mod question;
mod slash_commands;
mod upload;
pub mod wire;

pub use action::*;
pub use chat::*;
pub use document::*;
pub use error::*;
pub use gateway::*;
pub use message::*;
pub use notification::*;
pub use operation::*;
pub use question::*;
pub use slash_commands::*;
pub use upload::*;
