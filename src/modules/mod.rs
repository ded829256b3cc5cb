//! Concrete [`Module`](crate::engine::Module) variants a stage can declare.
//!
//! Each variant deserializes from its stage table, embeds a
//! [`Base`](crate::engine::Base) for graph participation, and acts on the
//! system only through the [`Context`](crate::engine::Context) collaborators.
mod developer_tools;
mod package;
mod shell;
mod ssh;

pub use developer_tools::DeveloperTools;
pub use package::{Applier, Package};
pub use shell::ShellExecution;
pub use ssh::SshKeygen;
