// ABOUTME: Dispatcher tests against an in-memory engine.
// ABOUTME: Covers lifecycle, filtering, logs, stats, and backend gating.

use super::*;
use crate::runtime::traits::sealed::Sealed;
use crate::runtime::{
    ContainerError, ContainerFilters, ContainerOps, ContainerSummary, ExecConfig, ExecError,
    ExecOps, ExecResult, ImageError, ImageOps, ImageSummary, LogError, LogLine, LogLineStream,
    LogOps, LogOptions, LogStream, RunConfig, RuntimeInfo, RuntimeInfoError, StatsError,
    StatsOps, StatsSnapshot,
};
use crate::ssh::Credential;
use crate::types::{ContainerId, ImageId, ImageRef};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::time::Duration;

#[derive(Debug, Clone)]
struct FakeContainer {
    id: ContainerId,
    name: String,
    image: String,
    running: bool,
    log_lines: Vec<String>,
    memory_bytes: u64,
    cpu_total: u64,
}

#[derive(Default)]
struct FakeEngine {
    containers: Mutex<Vec<FakeContainer>>,
    images: Mutex<Vec<ImageSummary>>,
    pulls: Mutex<Vec<String>>,
    execs: Mutex<Vec<(ContainerId, Vec<String>)>>,
}

impl FakeEngine {
    fn with_container(self, id: &str, name: &str, running: bool) -> Self {
        self.containers.lock().push(FakeContainer {
            id: ContainerId::new(id),
            name: name.to_string(),
            image: "alpine:latest".to_string(),
            running,
            log_lines: Vec::new(),
            memory_bytes: 0,
            cpu_total: 0,
        });
        self
    }

    fn with_image(self, id: &str, tags: &[&str]) -> Self {
        let id = ImageId::new(id);
        self.images.lock().push(ImageSummary {
            short_id: id.short_id(),
            id,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            size: 1024,
            created: None,
        });
        self
    }

    fn with_logs(self, id: &str, count: usize) -> Self {
        if let Some(c) = self.containers.lock().iter_mut().find(|c| c.id.as_str() == id) {
            c.log_lines = (1..=count).map(|i| format!("line {i}\n")).collect();
        }
        self
    }

    fn with_usage(self, id: &str, memory_bytes: u64, cpu_total: u64) -> Self {
        if let Some(c) = self.containers.lock().iter_mut().find(|c| c.id.as_str() == id) {
            c.memory_bytes = memory_bytes;
            c.cpu_total = cpu_total;
        }
        self
    }

    fn status_of(&self, id: &str) -> Option<bool> {
        self.containers
            .lock()
            .iter()
            .find(|c| c.id.as_str() == id)
            .map(|c| c.running)
    }

    fn update<T>(
        &self,
        id: &ContainerId,
        f: impl FnOnce(&mut FakeContainer) -> Result<T, ContainerError>,
    ) -> Result<T, ContainerError> {
        let mut containers = self.containers.lock();
        let container = containers
            .iter_mut()
            .find(|c| c.id == *id)
            .ok_or_else(|| ContainerError::NotFound(id.to_string()))?;
        f(container)
    }
}

impl Sealed for FakeEngine {}

#[async_trait]
impl ContainerOps for FakeEngine {
    async fn list_containers(
        &self,
        filters: &ContainerFilters,
    ) -> Result<Vec<ContainerSummary>, ContainerError> {
        Ok(self
            .containers
            .lock()
            .iter()
            .filter(|c| filters.all || c.running)
            .map(|c| ContainerSummary {
                id: c.id.clone(),
                short_id: c.id.short_id(),
                name: c.name.clone(),
                image: c.image.clone(),
                image_tags: vec![c.image.clone()],
                status: if c.running { "running" } else { "exited" }.to_string(),
                status_text: String::new(),
                created: None,
            })
            .collect())
    }

    async fn create_container(&self, config: &RunConfig) -> Result<ContainerId, ContainerError> {
        let image = config.image.to_string();
        let known = self
            .images
            .lock()
            .iter()
            .any(|i| i.tags.iter().any(|t| *t == image));
        if !known {
            return Err(ContainerError::ImageNotFound(image));
        }

        let mut containers = self.containers.lock();
        let n = containers.len() + 1;
        let id = ContainerId::new(format!("{:064x}", n));
        containers.push(FakeContainer {
            id: id.clone(),
            name: format!("fake_{n}"),
            image,
            running: false,
            log_lines: Vec::new(),
            memory_bytes: 0,
            cpu_total: 0,
        });
        Ok(id)
    }

    async fn start_container(&self, id: &ContainerId) -> Result<(), ContainerError> {
        self.update(id, |c| {
            c.running = true;
            Ok(())
        })
    }

    async fn stop_container(
        &self,
        id: &ContainerId,
        _timeout: Option<Duration>,
    ) -> Result<(), ContainerError> {
        self.update(id, |c| {
            c.running = false;
            Ok(())
        })
    }

    async fn restart_container(&self, id: &ContainerId) -> Result<(), ContainerError> {
        self.update(id, |c| {
            c.running = true;
            Ok(())
        })
    }

    async fn remove_container(&self, id: &ContainerId, force: bool) -> Result<(), ContainerError> {
        let mut containers = self.containers.lock();
        let index = containers
            .iter()
            .position(|c| c.id == *id)
            .ok_or_else(|| ContainerError::NotFound(id.to_string()))?;
        if containers[index].running && !force {
            return Err(ContainerError::AlreadyRunning(id.to_string()));
        }
        containers.remove(index);
        Ok(())
    }
}

#[async_trait]
impl ImageOps for FakeEngine {
    async fn list_images(&self) -> Result<Vec<ImageSummary>, ImageError> {
        Ok(self.images.lock().clone())
    }

    async fn pull_image(&self, reference: &ImageRef) -> Result<(), ImageError> {
        let tag = reference.to_string();
        self.pulls.lock().push(tag.clone());
        let mut images = self.images.lock();
        let id = ImageId::new(format!("sha256:{:064x}", images.len() + 100));
        images.push(ImageSummary {
            short_id: id.short_id(),
            id,
            tags: vec![tag],
            size: 2048,
            created: None,
        });
        Ok(())
    }

    async fn remove_image(&self, image: &str, _force: bool) -> Result<(), ImageError> {
        let mut images = self.images.lock();
        let before = images.len();
        images.retain(|i| i.id.as_str() != image && !i.tags.iter().any(|t| t == image));
        if images.len() == before {
            return Err(ImageError::NotFound(image.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ExecOps for FakeEngine {
    async fn exec_create(
        &self,
        container: &ContainerId,
        config: &ExecConfig,
    ) -> Result<String, ExecError> {
        match self.status_of(container.as_str()) {
            None => Err(ExecError::ContainerNotFound(container.to_string())),
            Some(false) => Err(ExecError::ContainerNotRunning(container.to_string())),
            Some(true) => {
                let mut execs = self.execs.lock();
                execs.push((container.clone(), config.cmd.clone()));
                Ok(format!("exec-{}", execs.len() - 1))
            }
        }
    }

    async fn exec_start(&self, exec_id: &str) -> Result<ExecResult, ExecError> {
        let index: usize = exec_id
            .trim_start_matches("exec-")
            .parse()
            .map_err(|_| ExecError::ExecNotFound(exec_id.to_string()))?;
        let execs = self.execs.lock();
        let (_, cmd) = execs
            .get(index)
            .ok_or_else(|| ExecError::ExecNotFound(exec_id.to_string()))?;
        // Behaves like `echo`.
        Ok(ExecResult {
            exit_code: 0,
            stdout: format!("{}\n", cmd[1..].join(" ")).into_bytes(),
            stderr: Vec::new(),
        })
    }
}

#[async_trait]
impl LogOps for FakeEngine {
    async fn container_logs(
        &self,
        id: &ContainerId,
        opts: &LogOptions,
    ) -> Result<LogLineStream, LogError> {
        let lines = self
            .containers
            .lock()
            .iter()
            .find(|c| c.id == *id)
            .map(|c| c.log_lines.clone())
            .ok_or_else(|| LogError::ContainerNotFound(id.to_string()))?;
        let skip = match opts.tail {
            Some(n) => lines.len().saturating_sub(n as usize),
            None => 0,
        };
        let chunks: Vec<Result<LogLine, LogError>> = lines
            .into_iter()
            .skip(skip)
            .map(|content| {
                Ok(LogLine {
                    content,
                    stream: LogStream::Stdout,
                })
            })
            .collect();
        Ok(Box::pin(futures::stream::iter(chunks)))
    }
}

#[async_trait]
impl StatsOps for FakeEngine {
    async fn stats_snapshot(&self, id: &ContainerId) -> Result<StatsSnapshot, StatsError> {
        let containers = self.containers.lock();
        let c = containers
            .iter()
            .find(|c| c.id == *id)
            .ok_or_else(|| StatsError::ContainerNotFound(id.to_string()))?;
        // Engines report an empty sample for stopped containers.
        if !c.running {
            return Err(StatsError::Unavailable(id.to_string()));
        }
        Ok(StatsSnapshot::from_raw(c.memory_bytes, c.cpu_total))
    }
}

#[async_trait]
impl RuntimeInfo for FakeEngine {
    async fn ping(&self) -> Result<(), RuntimeInfoError> {
        Ok(())
    }
}

fn dispatcher_with(engine: FakeEngine) -> (Dispatcher, Arc<FakeEngine>) {
    let engine = Arc::new(engine);
    let mut dispatcher = Dispatcher::new(Connector::default());
    dispatcher.attach(Connection::TcpApi(engine.clone()));
    (dispatcher, engine)
}

fn id(s: &str) -> ContainerId {
    ContainerId::new(s)
}

fn container_names(payload: Payload) -> Vec<String> {
    match payload {
        Payload::Containers(list) => list.into_iter().map(|c| c.name).collect(),
        other => panic!("expected containers, got {other:?}"),
    }
}

#[tokio::test]
async fn dispatch_without_connection_is_not_connected() {
    let dispatcher = Dispatcher::new(Connector::default());

    let err = dispatcher.dispatch(Intent::list_containers("")).await.unwrap_err();

    assert_eq!(err, OperationError::NotConnected);
    assert_eq!(err.kind(), OperationErrorKind::NotConnected);
}

#[tokio::test]
async fn lifecycle_round_trip_updates_listing() {
    let (dispatcher, engine) =
        dispatcher_with(FakeEngine::default().with_container("c1", "web", false));

    dispatcher.dispatch(Intent::Start { id: id("c1") }).await.unwrap();
    assert_eq!(engine.status_of("c1"), Some(true));

    dispatcher.dispatch(Intent::Stop { id: id("c1") }).await.unwrap();
    assert_eq!(engine.status_of("c1"), Some(false));

    dispatcher.dispatch(Intent::Restart { id: id("c1") }).await.unwrap();
    assert_eq!(engine.status_of("c1"), Some(true));

    dispatcher.dispatch(Intent::remove(id("c1"))).await.unwrap();
    let names = container_names(dispatcher.dispatch(Intent::list_containers("")).await.unwrap());
    assert!(names.is_empty());
}

#[tokio::test]
async fn list_containers_filters_case_insensitively() {
    let (dispatcher, _) = dispatcher_with(
        FakeEngine::default()
            .with_container("c1", "Web-Frontend", true)
            .with_container("c2", "db", false)
            .with_container("c3", "webhook", true),
    );

    let names = container_names(dispatcher.dispatch(Intent::list_containers("WEB")).await.unwrap());
    assert_eq!(names, vec!["Web-Frontend", "webhook"]);

    let all = container_names(dispatcher.dispatch(Intent::list_containers("")).await.unwrap());
    assert_eq!(all, vec!["Web-Frontend", "db", "webhook"]);

    let running = container_names(
        dispatcher
            .dispatch(Intent::ListContainers {
                filter: String::new(),
                include_stopped: false,
            })
            .await
            .unwrap(),
    );
    assert_eq!(running, vec!["Web-Frontend", "webhook"]);
}

#[tokio::test]
async fn list_images_filters_by_tag_case_sensitively() {
    let (dispatcher, _) = dispatcher_with(
        FakeEngine::default()
            .with_image("sha256:aaaaaaaaaaaaaaaa", &["nginx:latest"])
            .with_image("sha256:bbbbbbbbbbbbbbbb", &[])
            .with_image("sha256:cccccccccccccccc", &["redis:7"]),
    );

    let matched = match dispatcher
        .dispatch(Intent::ListImages {
            filter: "nginx".into(),
        })
        .await
        .unwrap()
    {
        Payload::Images(images) => images,
        other => panic!("expected images, got {other:?}"),
    };
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].tags, vec!["nginx:latest"]);

    let upper = dispatcher
        .dispatch(Intent::ListImages {
            filter: "NGINX".into(),
        })
        .await
        .unwrap();
    assert_eq!(upper, Payload::Images(Vec::new()));
}

#[tokio::test]
async fn create_and_run_pulls_missing_image() {
    let (dispatcher, engine) = dispatcher_with(FakeEngine::default());

    let payload = dispatcher
        .dispatch(Intent::CreateAndRun {
            image: "alpine:latest".into(),
            command: Some("echo 'Hello from Docker'".into()),
        })
        .await
        .unwrap();

    let Payload::Created { id, short_id } = payload else {
        panic!("expected created payload");
    };
    assert_eq!(short_id.len(), 12);
    assert_eq!(engine.status_of(id.as_str()), Some(true));
    assert_eq!(*engine.pulls.lock(), vec!["alpine:latest".to_string()]);
}

#[tokio::test]
async fn create_and_run_skips_pull_for_present_image() {
    let (dispatcher, engine) = dispatcher_with(
        FakeEngine::default().with_image("sha256:aaaaaaaaaaaaaaaa", &["alpine:latest"]),
    );

    dispatcher
        .dispatch(Intent::CreateAndRun {
            image: "alpine".into(),
            command: None,
        })
        .await
        .unwrap();

    assert!(engine.pulls.lock().is_empty());
}

#[tokio::test]
async fn create_and_run_rejects_bad_reference() {
    let (dispatcher, _) = dispatcher_with(FakeEngine::default());

    let err = dispatcher
        .dispatch(Intent::CreateAndRun {
            image: "Not An Image!".into(),
            command: None,
        })
        .await
        .unwrap_err();

    assert_eq!(err.kind(), OperationErrorKind::InvalidInput);
}

#[tokio::test]
async fn tail_logs_returns_all_lines_when_fewer_exist() {
    let (dispatcher, _) = dispatcher_with(
        FakeEngine::default()
            .with_container("c1", "web", true)
            .with_logs("c1", 10),
    );

    let Payload::Text(text) = dispatcher.dispatch(Intent::tail_logs(id("c1"))).await.unwrap()
    else {
        panic!("expected text");
    };
    assert_eq!(text.lines().count(), 10);
    assert!(text.starts_with("line 1\n"));
}

#[tokio::test]
async fn tail_logs_keeps_last_fifty_lines() {
    let (dispatcher, _) = dispatcher_with(
        FakeEngine::default()
            .with_container("c1", "web", true)
            .with_logs("c1", 100),
    );

    let Payload::Text(text) = dispatcher.dispatch(Intent::tail_logs(id("c1"))).await.unwrap()
    else {
        panic!("expected text");
    };
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 50);
    assert_eq!(lines[0], "line 51");
    assert_eq!(lines[49], "line 100");
}

#[tokio::test]
async fn stats_convert_bytes_to_mebibytes() {
    let (dispatcher, _) = dispatcher_with(
        FakeEngine::default()
            .with_container("c1", "web", true)
            .with_usage("c1", 52_428_800, 123_456_789),
    );

    let payload = dispatcher.dispatch(Intent::FetchStats { id: id("c1") }).await.unwrap();

    assert_eq!(
        payload,
        Payload::Stats(StatsSnapshot {
            memory_mb: 50.0,
            cpu_total_usage: 123_456_789,
        })
    );
}

#[tokio::test]
async fn stats_for_stopped_container_fail_instead_of_zeroes() {
    let (dispatcher, _) = dispatcher_with(
        FakeEngine::default()
            .with_container("c1", "web", false)
            .with_usage("c1", 52_428_800, 123_456_789),
    );

    let err = dispatcher
        .dispatch(Intent::FetchStats { id: id("c1") })
        .await
        .unwrap_err();

    assert_eq!(err.kind(), OperationErrorKind::EngineOperationFailed);
    assert!(err.to_string().contains("no usage figures"));
}

#[tokio::test]
async fn exec_returns_command_output() {
    let (dispatcher, _) = dispatcher_with(FakeEngine::default().with_container("c1", "web", true));

    let payload = dispatcher
        .dispatch(Intent::ExecInContainer {
            id: id("c1"),
            command: "echo hi".into(),
        })
        .await
        .unwrap();

    assert_eq!(payload, Payload::Text("hi\n".into()));
}

#[tokio::test]
async fn exec_on_stopped_container_fails_without_side_effects() {
    let (dispatcher, engine) =
        dispatcher_with(FakeEngine::default().with_container("c1", "web", false));

    let err = dispatcher
        .dispatch(Intent::ExecInContainer {
            id: id("c1"),
            command: "echo hi".into(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.kind(), OperationErrorKind::EngineOperationFailed);
    assert_eq!(engine.status_of("c1"), Some(false));
    assert!(engine.execs.lock().is_empty());
}

#[tokio::test]
async fn exec_rejects_empty_command() {
    let (dispatcher, _) = dispatcher_with(FakeEngine::default().with_container("c1", "web", true));

    let err = dispatcher
        .dispatch(Intent::ExecInContainer {
            id: id("c1"),
            command: "   ".into(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.kind(), OperationErrorKind::InvalidInput);
}

#[tokio::test]
async fn missing_container_is_an_engine_failure() {
    let (dispatcher, _) = dispatcher_with(FakeEngine::default());

    let err = dispatcher
        .dispatch(Intent::Start { id: id("nope") })
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        OperationError::EngineOperationFailed { intent: "start", .. }
    ));
    assert!(err.to_string().contains("nope"));
}

#[tokio::test]
async fn remove_image_by_tag() {
    let (dispatcher, engine) = dispatcher_with(
        FakeEngine::default().with_image("sha256:aaaaaaaaaaaaaaaa", &["nginx:latest"]),
    );

    dispatcher
        .dispatch(Intent::remove_image("nginx:latest"))
        .await
        .unwrap();

    assert!(engine.images.lock().is_empty());
}

#[tokio::test]
async fn remote_command_is_unsupported_over_engine_api() {
    let (dispatcher, _) = dispatcher_with(FakeEngine::default());

    let err = dispatcher
        .dispatch(Intent::RemoteCommand {
            command: SHELL_PROBE_COMMAND.into(),
        })
        .await
        .unwrap_err();

    assert_eq!(
        err,
        OperationError::UnsupportedByBackend {
            intent: "remote command",
            backend: Backend::TcpApi,
        }
    );
}

#[tokio::test]
async fn structured_intents_are_unsupported_over_shell() {
    let connector = Connector::default();
    let mut dispatcher = Dispatcher::new(connector);
    // Never dialed: unsupported intents are rejected before any I/O.
    let config = SessionConfig::new("192.0.2.1", "nobody", Credential::Password("x".into()));
    let session = crate::connector::ShellSession::new(config);
    dispatcher.attach(Connection::Shell(session));

    for intent in [
        Intent::list_containers(""),
        Intent::Start { id: id("c1") },
        Intent::tail_logs(id("c1")),
        Intent::ListImages {
            filter: String::new(),
        },
    ] {
        let name = intent.name();
        let err = dispatcher.dispatch(intent).await.unwrap_err();
        assert_eq!(
            err,
            OperationError::UnsupportedByBackend {
                intent: name,
                backend: Backend::Shell,
            }
        );
    }
}

#[tokio::test]
async fn failed_connect_leaves_dispatcher_disconnected() {
    let (mut dispatcher, _) = dispatcher_with(FakeEngine::default());
    assert!(dispatcher.is_connected());

    let result = dispatcher.connect_tcp("tcp://127.0.0.1:1").await;

    assert!(result.is_err());
    assert!(!dispatcher.is_connected());
    assert_eq!(
        dispatcher.dispatch(Intent::list_containers("")).await,
        Err(OperationError::NotConnected)
    );
}
