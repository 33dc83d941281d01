pub mod config;
pub mod diff;
pub mod docker_utils;
pub mod error;
pub mod logger;
pub mod patcher;
pub mod replace;
pub mod template;

// Re-export main components for easier access
pub use config::{EngineKind, PatchConfig, Replacement};
pub use docker_utils::{connect, restart_container, ContainerEngine, ContainerStatus, DockerCli};
#[cfg(feature = "docker-api")]
pub use docker_utils::DockerApi;
pub use error::PatchError;
pub use patcher::{run_patch, PatchOutcome};
pub use replace::{apply_replacements, Replaced};
