// ABOUTME: Bollard-based container runtime implementation.
// ABOUTME: Speaks the Docker Engine HTTP API over a TCP endpoint.

use crate::runtime::traits::sealed::Sealed;
use crate::runtime::traits::{
    ContainerError, ContainerFilters, ContainerOps, ContainerSummary, ExecConfig, ExecError,
    ExecOps, ExecResult, ImageError, ImageOps, ImageSummary, LogError, LogLine, LogLineStream,
    LogOps, LogOptions, LogStream, RunConfig, RuntimeInfo, RuntimeInfoError, StatsError,
    StatsOps, StatsSnapshot,
};
use crate::types::{ContainerId, ImageId, ImageRef};
use async_trait::async_trait;
use bollard::Docker;
use bollard::exec::StartExecOptions;
use bollard::models::ContainerCreateBody;
use bollard::query_parameters::{
    CreateContainerOptions, CreateImageOptions, ListContainersOptions, ListImagesOptions,
    LogsOptions, RemoveContainerOptions, RemoveImageOptions, RestartContainerOptions,
    StartContainerOptions, StatsOptions, StopContainerOptions,
};
use chrono::{DateTime, Utc};
use futures::StreamExt;
use std::collections::HashMap;
use std::time::Duration;

/// Default client-side timeout for engine requests, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

const UNTAGGED: &str = "<none>:<none>";

// =============================================================================
// Error Mapping Helpers
// =============================================================================

fn map_image_pull_error(e: bollard::errors::Error, image_name: &str) -> ImageError {
    ImageError::PullFailed(format!("{}: {}", image_name, e))
}

fn map_image_remove_error(e: bollard::errors::Error, image_name: &str) -> ImageError {
    match &e {
        bollard::errors::Error::DockerResponseServerError { status_code, .. }
            if *status_code == 404 =>
        {
            ImageError::NotFound(image_name.to_string())
        }
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 409 => ImageError::InUse(message.clone()),
        _ => ImageError::Runtime(format!("failed to remove {}: {}", image_name, e)),
    }
}

fn map_container_create_error(e: bollard::errors::Error) -> ContainerError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ContainerError::ImageNotFound(message.clone()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 409 => ContainerError::AlreadyExists(message.clone()),
        _ => ContainerError::Runtime(e.to_string()),
    }
}

fn map_container_start_error(e: bollard::errors::Error) -> ContainerError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ContainerError::NotFound(message.clone()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 304 => ContainerError::AlreadyRunning(message.clone()),
        _ => ContainerError::Runtime(e.to_string()),
    }
}

fn map_container_stop_error(e: bollard::errors::Error) -> ContainerError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ContainerError::NotFound(message.clone()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 304 => ContainerError::NotRunning(message.clone()),
        _ => ContainerError::Runtime(e.to_string()),
    }
}

fn map_container_not_found_error(e: bollard::errors::Error) -> ContainerError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ContainerError::NotFound(message.clone()),
        _ => ContainerError::Runtime(e.to_string()),
    }
}

fn map_exec_create_error(e: bollard::errors::Error) -> ExecError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ExecError::ContainerNotFound(message.clone()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 409 => ExecError::ContainerNotRunning(message.clone()),
        _ => ExecError::Runtime(e.to_string()),
    }
}

fn map_exec_not_found_error(e: bollard::errors::Error) -> ExecError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ExecError::ExecNotFound(message.clone()),
        _ => ExecError::Runtime(e.to_string()),
    }
}

fn map_stats_error(e: bollard::errors::Error) -> StatsError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => StatsError::ContainerNotFound(message.clone()),
        _ => StatsError::Runtime(e.to_string()),
    }
}

fn map_logs_error(e: bollard::errors::Error) -> LogError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => LogError::ContainerNotFound(message.clone()),
        _ => LogError::StreamError(e.to_string()),
    }
}

fn timestamp(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
}

// =============================================================================
// BollardRuntime
// =============================================================================

/// Engine client for a Docker-compatible API reachable over TCP.
pub struct BollardRuntime {
    client: Docker,
    endpoint: String,
}

impl std::fmt::Debug for BollardRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BollardRuntime")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl BollardRuntime {
    /// Create a new BollardRuntime from an existing Docker client.
    pub fn new(client: Docker, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Build a client for `tcp://host:port` or `http://host:port`.
    ///
    /// No request is sent; call [`RuntimeInfo::ping`] to verify the endpoint.
    pub fn connect_tcp(uri: &str, timeout: Duration) -> Result<Self, RuntimeInfoError> {
        let client = Docker::connect_with_http(uri, timeout.as_secs(), bollard::API_DEFAULT_VERSION)
            .map_err(|e| RuntimeInfoError::ConnectionFailed(e.to_string()))?;
        Ok(Self::new(client, uri))
    }

    /// The endpoint this client was built for.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Map image ids to their tags, for annotating container listings.
    async fn image_tags_by_id(&self) -> HashMap<String, Vec<String>> {
        match self.list_images().await {
            Ok(images) => images
                .into_iter()
                .map(|image| (image.id.into_inner(), image.tags))
                .collect(),
            Err(e) => {
                tracing::debug!("image lookup for container listing failed: {}", e);
                HashMap::new()
            }
        }
    }
}

impl Sealed for BollardRuntime {}

#[async_trait]
impl RuntimeInfo for BollardRuntime {
    async fn ping(&self) -> Result<(), RuntimeInfoError> {
        self.client
            .ping()
            .await
            .map_err(|e| RuntimeInfoError::ConnectionFailed(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl ImageOps for BollardRuntime {
    async fn list_images(&self) -> Result<Vec<ImageSummary>, ImageError> {
        let opts = ListImagesOptions {
            all: false,
            ..Default::default()
        };

        let images = self
            .client
            .list_images(Some(opts))
            .await
            .map_err(|e| ImageError::Runtime(e.to_string()))?;

        Ok(images
            .into_iter()
            .map(|image| {
                let id = ImageId::new(image.id);
                ImageSummary {
                    short_id: id.short_id(),
                    id,
                    tags: image
                        .repo_tags
                        .into_iter()
                        .filter(|tag| tag != UNTAGGED)
                        .collect(),
                    size: image.size,
                    created: timestamp(image.created),
                }
            })
            .collect())
    }

    async fn pull_image(&self, reference: &ImageRef) -> Result<(), ImageError> {
        let image_name = reference.to_string();

        let opts = CreateImageOptions {
            from_image: Some(reference.repository()),
            tag: Some(reference.pull_tag().to_string()),
            ..Default::default()
        };

        // Pull returns a stream of progress updates - consume it
        let mut stream = self.client.create_image(Some(opts), None, None);
        while let Some(result) = stream.next().await {
            let progress = result.map_err(|e| map_image_pull_error(e, &image_name))?;
            if let Some(detail) = progress.error_detail {
                return Err(ImageError::PullFailed(format!(
                    "{}: {}",
                    image_name,
                    detail.message.unwrap_or_default()
                )));
            }
        }

        Ok(())
    }

    async fn remove_image(&self, image: &str, force: bool) -> Result<(), ImageError> {
        let opts = RemoveImageOptions {
            force,
            ..Default::default()
        };

        self.client
            .remove_image(image, Some(opts), None)
            .await
            .map_err(|e| map_image_remove_error(e, image))?;

        Ok(())
    }
}

#[async_trait]
impl ContainerOps for BollardRuntime {
    async fn list_containers(
        &self,
        filters: &ContainerFilters,
    ) -> Result<Vec<ContainerSummary>, ContainerError> {
        let opts = ListContainersOptions {
            all: filters.all,
            ..Default::default()
        };

        let containers = self
            .client
            .list_containers(Some(opts))
            .await
            .map_err(|e| ContainerError::Runtime(e.to_string()))?;

        let tags_by_image = self.image_tags_by_id().await;

        Ok(containers
            .into_iter()
            .map(|c| {
                let id = ContainerId::new(c.id.unwrap_or_default());
                let name = c
                    .names
                    .unwrap_or_default()
                    .first()
                    .map(|n| n.trim_start_matches('/').to_string())
                    .unwrap_or_default();
                let image_tags = c
                    .image_id
                    .as_ref()
                    .and_then(|image_id| tags_by_image.get(image_id))
                    .cloned()
                    .unwrap_or_default();
                let status = c
                    .state
                    .map(|s| s.to_string())
                    .unwrap_or_default();

                ContainerSummary {
                    short_id: id.short_id(),
                    id,
                    name,
                    image: c.image.unwrap_or_default(),
                    image_tags,
                    status,
                    status_text: c.status.unwrap_or_default(),
                    created: c.created.and_then(timestamp),
                }
            })
            .collect())
    }

    async fn create_container(&self, config: &RunConfig) -> Result<ContainerId, ContainerError> {
        let body = ContainerCreateBody {
            image: Some(config.image.to_string()),
            cmd: config.command.clone(),
            ..Default::default()
        };

        let response = self
            .client
            .create_container(None::<CreateContainerOptions>, body)
            .await
            .map_err(map_container_create_error)?;

        for warning in &response.warnings {
            tracing::warn!("engine warning creating container: {}", warning);
        }

        Ok(ContainerId::new(response.id))
    }

    async fn start_container(&self, id: &ContainerId) -> Result<(), ContainerError> {
        self.client
            .start_container(id.as_str(), None::<StartContainerOptions>)
            .await
            .map_err(map_container_start_error)
    }

    async fn stop_container(
        &self,
        id: &ContainerId,
        timeout: Option<Duration>,
    ) -> Result<(), ContainerError> {
        let opts = StopContainerOptions {
            t: timeout.map(|t| t.as_secs() as i32),
            signal: None,
        };

        self.client
            .stop_container(id.as_str(), Some(opts))
            .await
            .map_err(map_container_stop_error)
    }

    async fn restart_container(&self, id: &ContainerId) -> Result<(), ContainerError> {
        self.client
            .restart_container(id.as_str(), None::<RestartContainerOptions>)
            .await
            .map_err(map_container_not_found_error)
    }

    async fn remove_container(&self, id: &ContainerId, force: bool) -> Result<(), ContainerError> {
        let opts = RemoveContainerOptions {
            force,
            ..Default::default()
        };

        self.client
            .remove_container(id.as_str(), Some(opts))
            .await
            .map_err(map_container_not_found_error)
    }
}

#[async_trait]
impl ExecOps for BollardRuntime {
    async fn exec_create(
        &self,
        container: &ContainerId,
        config: &ExecConfig,
    ) -> Result<String, ExecError> {
        let opts = bollard::models::ExecConfig {
            cmd: Some(config.cmd.clone()),
            attach_stdin: Some(false),
            attach_stdout: Some(config.attach_stdout),
            attach_stderr: Some(config.attach_stderr),
            tty: Some(config.tty),
            ..Default::default()
        };

        let response = self
            .client
            .create_exec(container.as_str(), opts)
            .await
            .map_err(map_exec_create_error)?;

        Ok(response.id)
    }

    async fn exec_start(&self, exec_id: &str) -> Result<ExecResult, ExecError> {
        let opts = StartExecOptions {
            detach: false,
            ..Default::default()
        };

        let result = self
            .client
            .start_exec(exec_id, Some(opts))
            .await
            .map_err(map_exec_not_found_error)?;

        let mut stdout = Vec::new();
        let mut stderr = Vec::new();

        if let bollard::exec::StartExecResults::Attached { mut output, .. } = result {
            while let Some(item) = output.next().await {
                match item {
                    Ok(bollard::container::LogOutput::StdOut { message })
                    | Ok(bollard::container::LogOutput::Console { message }) => {
                        stdout.extend_from_slice(&message);
                    }
                    Ok(bollard::container::LogOutput::StdErr { message }) => {
                        stderr.extend_from_slice(&message);
                    }
                    Ok(_) => {}
                    Err(e) => return Err(ExecError::Failed(e.to_string())),
                }
            }
        }

        let details = self
            .client
            .inspect_exec(exec_id)
            .await
            .map_err(map_exec_not_found_error)?;

        Ok(ExecResult {
            exit_code: details.exit_code.unwrap_or(0),
            stdout,
            stderr,
        })
    }
}

#[async_trait]
impl LogOps for BollardRuntime {
    async fn container_logs(
        &self,
        id: &ContainerId,
        opts: &LogOptions,
    ) -> Result<LogLineStream, LogError> {
        let log_opts = LogsOptions {
            stdout: opts.stdout,
            stderr: opts.stderr,
            follow: false,
            timestamps: false,
            tail: opts
                .tail
                .map(|n| n.to_string())
                .unwrap_or_else(|| "all".to_string()),
            ..Default::default()
        };

        let stream = self.client.logs(id.as_str(), Some(log_opts));

        let mapped_stream = stream.map(|result| {
            result
                .map(|output| {
                    let (stream_type, data) = match output {
                        bollard::container::LogOutput::StdErr { message } => {
                            (LogStream::Stderr, message)
                        }
                        bollard::container::LogOutput::StdOut { message }
                        | bollard::container::LogOutput::StdIn { message }
                        | bollard::container::LogOutput::Console { message } => {
                            (LogStream::Stdout, message)
                        }
                    };

                    LogLine {
                        content: String::from_utf8_lossy(&data).into_owned(),
                        stream: stream_type,
                    }
                })
                .map_err(map_logs_error)
        });

        Ok(Box::pin(mapped_stream))
    }
}

#[async_trait]
impl StatsOps for BollardRuntime {
    async fn stats_snapshot(&self, id: &ContainerId) -> Result<StatsSnapshot, StatsError> {
        let opts = StatsOptions {
            stream: false,
            one_shot: true,
        };

        let mut stream = self.client.stats(id.as_str(), Some(opts));
        let sample = stream
            .next()
            .await
            .ok_or_else(|| StatsError::Unavailable(id.to_string()))?
            .map_err(map_stats_error)?;

        let memory = sample.memory_stats.and_then(|m| m.usage);
        let cpu = sample
            .cpu_stats
            .and_then(|c| c.cpu_usage)
            .and_then(|u| u.total_usage);

        match (memory, cpu) {
            (Some(memory), Some(cpu)) => Ok(StatsSnapshot::from_raw(memory, cpu)),
            _ => Err(StatsError::Unavailable(id.to_string())),
        }
    }
}
