//! Built-in curriculum
//!
//! Each tutorial builds on the files the previous one left behind, starting
//! with a hatch project called `mcp-weather` in the workspace.

mod fastmcp_client;
mod make_project;
mod make_server;
mod modify_init;
mod modify_toml;

pub use fastmcp_client::FastMcpClient;
pub use make_project::MakeProject;
pub use make_server::MakeServer;
pub use modify_init::ModifyInit;
pub use modify_toml::ModifyToml;

use crate::tutorial::{Catalog, CatalogError, TutorialFactory};

const PROJECT_DIR: &str = "mcp-weather";
const PYPROJECT: &str = "mcp-weather/pyproject.toml";
const INIT_PY: &str = "mcp-weather/src/mcp_weather/__init__.py";

/// Every shipped tutorial, in curriculum order
pub const BUILTIN: &[TutorialFactory] = &[
    MakeProject::boxed,
    ModifyToml::boxed,
    ModifyInit::boxed,
    MakeServer::boxed,
    FastMcpClient::boxed,
];

/// Catalog of the built-in tutorials
pub fn registry() -> Result<Catalog, CatalogError> {
    Catalog::new(BUILTIN)
}
