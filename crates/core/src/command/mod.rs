//! Command construction for the emulator and the builder

pub mod builder;
pub mod invocation;

// Re-export commonly used types
pub use builder::CommandBuilder;
pub use invocation::CommandInvocation;
