//! Command implementations.

mod call;
mod definition;
mod info;
mod serve;

pub use call::CallCommand;
pub use definition::DefinitionCommand;
pub use info::InfoCommand;
pub use serve::ServeCommand;
