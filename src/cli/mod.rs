mod commands;
mod config;
mod crew;
pub mod pickers;

pub use commands::{ConfigCommands, CrewCommands, FormFields};
pub use config::{run_config_set_server, run_config_show};
pub use crew::{
    run_crew_categories, run_crew_delete, run_crew_edit, run_crew_list, run_crew_new,
    run_crew_show,
};

use crate::client::HttpRecordStore;
use crate::config::ClientConfig;

/// Resolve the server URL and build a client for it. Nothing is sent yet.
pub fn connect(server: Option<&str>) -> anyhow::Result<HttpRecordStore> {
    let config = ClientConfig::resolve(server)?;
    tracing::debug!(server = %config.server_url, "Using record store");
    HttpRecordStore::from_config(&config).map_err(Into::into)
}
