// ABOUTME: Runs structured intents against an engine client.
// ABOUTME: Converts every engine failure into an OperationError.

use super::filter::{filter_containers, filter_images};
use super::intent::Intent;
use super::outcome::{OperationError, OperationResult, Payload};
use crate::connector::Backend;
use crate::runtime::{
    ContainerError, ContainerFilters, ContainerOps, Engine, ExecConfig, ExecOps, ImageOps, LogOps,
    RunConfig, StatsOps,
};
use crate::types::{ContainerId, ImageRef};

/// Split a command line with POSIX shell quoting rules.
fn split_command(intent: &'static str, command: &str) -> Result<Vec<String>, OperationError> {
    shell_words::split(command).map_err(|e| OperationError::invalid(intent, e.to_string()))
}

fn parse_image(intent: &'static str, reference: &str) -> Result<ImageRef, OperationError> {
    ImageRef::parse(reference).map_err(|e| OperationError::invalid(intent, e.to_string()))
}

/// Perform a structured intent. Callers route `RemoteCommand` elsewhere.
pub(crate) async fn perform(engine: &dyn Engine, intent: Intent) -> OperationResult {
    let name = intent.name();
    let failed = OperationError::failed(name);

    match intent {
        Intent::ListContainers {
            filter,
            include_stopped,
        } => {
            let filters = ContainerFilters {
                all: include_stopped,
                ..Default::default()
            };
            let containers = engine
                .list_containers(&filters)
                .await
                .map_err(|e| failed(e.to_string()))?;
            Ok(Payload::Containers(filter_containers(containers, &filter)))
        }
        Intent::Start { id } => {
            engine
                .start_container(&id)
                .await
                .map_err(|e| failed(e.to_string()))?;
            Ok(Payload::Done(format!("Started {}", id)))
        }
        Intent::Stop { id } => {
            engine
                .stop_container(&id, None)
                .await
                .map_err(|e| failed(e.to_string()))?;
            Ok(Payload::Done(format!("Stopped {}", id)))
        }
        Intent::Restart { id } => {
            engine
                .restart_container(&id)
                .await
                .map_err(|e| failed(e.to_string()))?;
            Ok(Payload::Done(format!("Restarted {}", id)))
        }
        Intent::Remove { id, force } => {
            engine
                .remove_container(&id, force)
                .await
                .map_err(|e| failed(e.to_string()))?;
            Ok(Payload::Done(format!("Removed {}", id)))
        }
        Intent::CreateAndRun { image, command } => {
            let image = parse_image(name, &image)?;
            let mut config = RunConfig::new(image);
            if let Some(command) = command.as_deref() {
                let argv = split_command(name, command)?;
                if !argv.is_empty() {
                    config = config.command(argv);
                }
            }
            let id = create_and_start(engine, &config)
                .await
                .map_err(|e| failed(e.to_string()))?;
            Ok(Payload::Created {
                short_id: id.short_id(),
                id,
            })
        }
        Intent::ListImages { filter } => {
            let images = engine
                .list_images()
                .await
                .map_err(|e| failed(e.to_string()))?;
            Ok(Payload::Images(filter_images(images, &filter)))
        }
        Intent::PullImage { reference } => {
            let image = parse_image(name, &reference)?;
            engine
                .pull_image(&image)
                .await
                .map_err(|e| failed(e.to_string()))?;
            Ok(Payload::Done(format!("Pulled {}", image)))
        }
        Intent::RemoveImage { image, force } => {
            if image.trim().is_empty() {
                return Err(OperationError::invalid(name, "image cannot be empty"));
            }
            engine
                .remove_image(&image, force)
                .await
                .map_err(|e| failed(e.to_string()))?;
            Ok(Payload::Done(format!("Removed image {}", image)))
        }
        Intent::FetchStats { id } => {
            let stats = engine
                .stats_snapshot(&id)
                .await
                .map_err(|e| failed(e.to_string()))?;
            Ok(Payload::Stats(stats))
        }
        Intent::TailLogs { id, lines } => {
            let text = engine
                .tail_logs(&id, lines)
                .await
                .map_err(|e| failed(e.to_string()))?;
            Ok(Payload::Text(text))
        }
        Intent::ExecInContainer { id, command } => {
            let argv = split_command(name, &command)?;
            if argv.is_empty() {
                return Err(OperationError::invalid(name, "command cannot be empty"));
            }
            let result = engine
                .exec(&id, &ExecConfig::command(argv))
                .await
                .map_err(|e| failed(e.to_string()))?;
            Ok(Payload::Text(result.stdout_lossy()))
        }
        Intent::RemoteCommand { .. } => Err(OperationError::UnsupportedByBackend {
            intent: name,
            backend: Backend::TcpApi,
        }),
    }
}

/// Create a detached container, pulling its image first if the engine lacks it.
async fn create_and_start(engine: &dyn Engine, config: &RunConfig) -> Result<ContainerId, String> {
    let id = match engine.create_container(config).await {
        Ok(id) => id,
        Err(ContainerError::ImageNotFound(_)) => {
            tracing::debug!("image {} not present, pulling", config.image);
            engine
                .pull_image(&config.image)
                .await
                .map_err(|e| e.to_string())?;
            engine
                .create_container(config)
                .await
                .map_err(|e| e.to_string())?
        }
        Err(e) => return Err(e.to_string()),
    };

    engine
        .start_container(&id)
        .await
        .map_err(|e| e.to_string())?;
    Ok(id)
}
