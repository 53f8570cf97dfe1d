pub mod environment;

pub use environment::{codex_home, history_file, sessions_dir};
