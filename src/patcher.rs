use log::info;

use crate::config::PatchConfig;
use crate::diff::print_preview;
use crate::docker_utils::{restart_container, ContainerEngine};
use crate::error::Result;
use crate::replace::apply_replacements;
use crate::template::{read_template, write_template};

/// How a patch run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    /// Nothing to replace; file untouched and container left alone
    Unchanged,
    /// Changes previewed only
    DryRun,
    Patched { bytes_written: u64, restarted: bool },
}

/// Load, replace, preview, write and restart, stopping at the first failure.
///
/// An unchanged template returns before the write and before the restart.
pub async fn run_patch(
    config: &PatchConfig,
    engine: &dyn ContainerEngine,
    dry_run: bool,
) -> Result<PatchOutcome> {
    config.validate()?;

    let template_path = &config.template_path;
    info!("Template path: {}", template_path.display());

    let original = read_template(template_path)?;
    let replaced = apply_replacements(&original, &config.replacements);

    if !replaced.changed() {
        info!("No changes to write");
        return Ok(PatchOutcome::Unchanged);
    }

    print_preview(&replaced.original, &replaced.updated, config.preview_lines);

    if dry_run {
        info!("Dry run, leaving {} untouched", template_path.display());
        return Ok(PatchOutcome::DryRun);
    }

    let bytes_written = write_template(template_path, &replaced.updated)?;

    if config.disable_restart {
        info!("Container restart is disabled by configuration. Skipping.");
        return Ok(PatchOutcome::Patched {
            bytes_written,
            restarted: false,
        });
    }

    restart_container(engine, &config.container_name).await?;
    info!("Container {} restarted with updated configuration", config.container_name);

    Ok(PatchOutcome::Patched {
        bytes_written,
        restarted: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docker_utils::tests::RecordingEngine;
    use crate::docker_utils::ContainerStatus;
    use crate::error::PatchError;
    use std::fs;
    use tempfile::TempDir;

    fn config_for(dir: &TempDir) -> PatchConfig {
        PatchConfig {
            template_path: dir.path().join("nginx/conf.d/default.conf.template"),
            ..PatchConfig::default()
        }
    }

    fn seed(config: &PatchConfig, content: &str) {
        fs::create_dir_all(config.template_path.parent().unwrap()).unwrap();
        fs::write(&config.template_path, content).unwrap();
    }

    #[tokio::test]
    async fn patches_and_restarts() {
        let dir = TempDir::new().unwrap();
        let config = config_for(&dir);
        seed(&config, "proxy_pass http://api:5001;\nproxy_pass http://web:3000;\n");
        let engine = RecordingEngine::new(ContainerStatus::Running);

        let outcome = run_patch(&config, &engine, false).await.unwrap();

        let written = fs::read_to_string(&config.template_path).unwrap();
        assert_eq!(written, "proxy_pass http://docker-api-1:5004;\nproxy_pass http://docker-web-1:3000;\n");
        assert_eq!(
            outcome,
            PatchOutcome::Patched {
                bytes_written: written.len() as u64,
                restarted: true
            }
        );
        assert_eq!(*engine.restarted.lock().unwrap(), vec!["docker-nginx-1".to_string()]);
    }

    #[tokio::test]
    async fn unchanged_template_skips_write_and_restart() {
        let dir = TempDir::new().unwrap();
        let config = config_for(&dir);
        seed(&config, "proxy_pass http://docker-api-1:5004;\n");
        let engine = RecordingEngine::new(ContainerStatus::Running);

        let outcome = run_patch(&config, &engine, false).await.unwrap();

        assert_eq!(outcome, PatchOutcome::Unchanged);
        assert!(engine.restarted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn dry_run_leaves_file_and_container_alone() {
        let dir = TempDir::new().unwrap();
        let config = config_for(&dir);
        seed(&config, "proxy_pass http://api:5001;\n");
        let engine = RecordingEngine::new(ContainerStatus::Running);

        let outcome = run_patch(&config, &engine, true).await.unwrap();

        assert_eq!(outcome, PatchOutcome::DryRun);
        assert_eq!(fs::read_to_string(&config.template_path).unwrap(), "proxy_pass http://api:5001;\n");
        assert!(engine.restarted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn disabled_restart_still_writes() {
        let dir = TempDir::new().unwrap();
        let mut config = config_for(&dir);
        config.disable_restart = true;
        seed(&config, "proxy_pass http://web:3000;\n");
        let engine = RecordingEngine::new(ContainerStatus::Running);

        let outcome = run_patch(&config, &engine, false).await.unwrap();

        assert!(matches!(outcome, PatchOutcome::Patched { restarted: false, .. }));
        assert!(engine.restarted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_config_fails_before_reading() {
        let dir = TempDir::new().unwrap();
        let mut config = config_for(&dir);
        config.container_name = String::new();
        let engine = RecordingEngine::new(ContainerStatus::Running);

        let err = run_patch(&config, &engine, false).await.unwrap_err();

        assert!(matches!(err, PatchError::InvalidConfig(_)));
    }
}
