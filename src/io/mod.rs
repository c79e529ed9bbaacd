pub mod board_io;
pub mod bundle;
pub mod config_io;
pub mod lock;
pub mod migrate;
pub mod publish;
pub mod recovery;
pub mod store;
