pub mod config;
pub mod ingest;
pub mod playlists;
pub mod search;

pub use config::{run_config, ConfigAction};
pub use ingest::run_ingest;
pub use playlists::run_playlists;
pub use search::run_search;
