use async_trait::async_trait;
use log::{debug, info, warn};
use std::process::Stdio;
use tokio::process::Command;

use crate::config::EngineKind;
use crate::error::{PatchError, Result};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ContainerStatus {
    Running,
    Stopped,
    NotExists,
}

/// Handle to the container engine used for the restart step
#[async_trait]
pub trait ContainerEngine: Send + Sync {
    /// Look up a container by name
    async fn status(&self, container_name: &str) -> Result<ContainerStatus>;

    /// Restart an existing container
    async fn restart(&self, container_name: &str) -> Result<()>;
}

/// Restart a named container, failing when it does not exist
pub async fn restart_container(engine: &dyn ContainerEngine, container_name: &str) -> Result<()> {
    match engine.status(container_name).await? {
        ContainerStatus::Running => info!("Restarting running container {}", container_name),
        ContainerStatus::Stopped => warn!("Container {} is stopped, restarting it anyway", container_name),
        ContainerStatus::NotExists => {
            return Err(PatchError::ContainerNotFound(container_name.to_string()));
        }
    }

    engine.restart(container_name).await?;
    info!("Container {} restarted", container_name);
    Ok(())
}

/// Build the engine selected by configuration
pub fn connect(kind: EngineKind) -> Result<Box<dyn ContainerEngine>> {
    match kind {
        #[cfg(feature = "docker-api")]
        EngineKind::Api => Ok(Box::new(DockerApi::connect()?)),
        #[cfg(not(feature = "docker-api"))]
        EngineKind::Api => Err(PatchError::InvalidConfig(
            "built without the docker-api feature, use the cli engine".to_string(),
        )),
        EngineKind::Cli => Ok(Box::new(DockerCli)),
    }
}

/// Talks to Docker through the `docker` binary
#[derive(Debug, Default, Clone, Copy)]
pub struct DockerCli;

#[async_trait]
impl ContainerEngine for DockerCli {
    async fn status(&self, container_name: &str) -> Result<ContainerStatus> {
        let running = list_containers(container_name, false).await?;
        if running.lines().any(|name| name.trim() == container_name) {
            debug!("Container {} is running", container_name);
            return Ok(ContainerStatus::Running);
        }

        let all = list_containers(container_name, true).await?;
        if all.lines().any(|name| name.trim() == container_name) {
            return Ok(ContainerStatus::Stopped);
        }

        debug!("Container {} does not exist", container_name);
        Ok(ContainerStatus::NotExists)
    }

    async fn restart(&self, container_name: &str) -> Result<()> {
        let status = Command::new("docker")
            .args(["restart", container_name])
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| engine_error(container_name, format!("failed to execute docker restart: {}", e)))?;

        if !status.success() {
            return Err(engine_error(
                container_name,
                format!("docker restart failed with exit code: {:?}", status.code()),
            ));
        }

        Ok(())
    }
}

/// Names of containers matching `container_name` exactly, one per line
async fn list_containers(container_name: &str, include_stopped: bool) -> Result<String> {
    let filter = format!("name=^{}$", container_name);
    let mut args = vec!["ps"];
    if include_stopped {
        args.push("-a");
    }
    args.extend(["--format", "{{.Names}}", "--filter", filter.as_str()]);

    let output = Command::new("docker")
        .args(&args)
        .output()
        .await
        .map_err(|e| engine_error(container_name, format!("failed to execute docker ps: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(engine_error(container_name, format!("docker ps failed: {}", stderr.trim())));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn engine_error(container_name: &str, message: String) -> PatchError {
    PatchError::Engine {
        container: container_name.to_string(),
        message,
    }
}

#[cfg(feature = "docker-api")]
pub use api::DockerApi;

#[cfg(feature = "docker-api")]
mod api {
    use async_trait::async_trait;
    use bollard::container::{InspectContainerOptions, RestartContainerOptions};
    use bollard::errors::Error as BollardError;
    use bollard::Docker;
    use log::debug;

    use super::{engine_error, ContainerEngine, ContainerStatus};
    use crate::error::{PatchError, Result};

    /// Talks to the Docker Engine API over the socket named by the environment
    pub struct DockerApi {
        docker: Docker,
    }

    impl DockerApi {
        /// Connect using `DOCKER_HOST` or the platform's default socket
        pub fn connect() -> Result<Self> {
            let docker = Docker::connect_with_local_defaults().map_err(|e| PatchError::Engine {
                container: String::new(),
                message: format!("failed to connect to Docker: {}", e),
            })?;
            Ok(Self { docker })
        }
    }

    #[async_trait]
    impl ContainerEngine for DockerApi {
        async fn status(&self, container_name: &str) -> Result<ContainerStatus> {
            match self
                .docker
                .inspect_container(container_name, None::<InspectContainerOptions>)
                .await
            {
                Ok(details) => {
                    let running = details
                        .state
                        .and_then(|state| state.running)
                        .unwrap_or(false);
                    debug!("Container {} found (running: {})", container_name, running);
                    Ok(if running {
                        ContainerStatus::Running
                    } else {
                        ContainerStatus::Stopped
                    })
                }
                Err(BollardError::DockerResponseServerError { status_code: 404, .. }) => {
                    Ok(ContainerStatus::NotExists)
                }
                Err(e) => Err(engine_error(container_name, e.to_string())),
            }
        }

        async fn restart(&self, container_name: &str) -> Result<()> {
            match self
                .docker
                .restart_container(container_name, None::<RestartContainerOptions>)
                .await
            {
                Ok(()) => Ok(()),
                Err(BollardError::DockerResponseServerError { status_code: 404, .. }) => {
                    Err(PatchError::ContainerNotFound(container_name.to_string()))
                }
                Err(e) => Err(engine_error(container_name, e.to_string())),
            }
        }
    }
}
