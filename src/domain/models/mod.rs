mod command;
mod document;
mod input;
mod message;
mod stream;

pub use command::*;
pub use document::*;
pub use input::*;
pub use message::*;
pub use stream::*;
