pub mod board;
pub mod column;
pub mod config;
pub mod group;
pub mod id;
pub mod task;
pub mod workspace;

pub use board::*;
pub use column::*;
pub use config::*;
pub use group::*;
pub use id::*;
pub use task::*;
pub use workspace::*;
