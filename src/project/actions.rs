//! Group actions over resolved services

use super::Service;
use crate::container::Container;
use crate::error::{Result, RuneCtlError};
use crate::logs::{LogAggregator, LogStream};
use crate::runtime::{ContainerRuntime, LogOptions};
use std::future::Future;

/// Action applied to every resolved service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// List containers
    Ps,
    /// Start existing containers
    Start,
    /// Stop running containers
    Stop { timeout: Option<u64> },
    /// Force stop containers
    Kill { signal: Option<String> },
    /// Remove containers
    Remove { force: bool },
    /// Merge container output
    Logs(LogOptions),
}

impl Action {
    /// Progressive verb used in progress messages
    fn verb(&self) -> &'static str {
        match self {
            Action::Ps => "Listing",
            Action::Start => "Starting",
            Action::Stop { .. } => "Stopping",
            Action::Kill { .. } => "Killing",
            Action::Remove { .. } => "Removing",
            Action::Logs(_) => "Following",
        }
    }
}

/// One row of the container listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PsRow {
    pub name: String,
    pub command: String,
    pub status: String,
    pub ports: String,
}

impl From<&Container> for PsRow {
    fn from(container: &Container) -> Self {
        Self {
            name: container.name.clone(),
            command: container.command.clone(),
            status: container.status.clone(),
            ports: container.ports.clone(),
        }
    }
}

/// Result of an action
#[derive(Debug)]
pub enum ActionOutcome {
    /// Rows of a listing
    Listed(Vec<PsRow>),
    /// Names of the containers a mutating action was applied to
    Applied(Vec<String>),
    /// Merged logs of `producers` services
    Streaming { producers: usize, stream: LogStream },
}

/// Listing over every container of every service, left to right
pub fn ps(services: &[Service]) -> Vec<PsRow> {
    services
        .iter()
        .flat_map(|s| s.containers.iter())
        .map(PsRow::from)
        .collect()
}

/// Apply `op` to every `selected` container, service by service
///
/// Stops at the first failure and reports the service it happened in.
/// Containers handled before the failure stay as they are.
pub async fn apply<'a, P, F, Fut>(
    services: &'a [Service],
    verb: &str,
    mut selected: P,
    mut op: F,
) -> Result<Vec<String>>
where
    P: FnMut(&Container) -> bool,
    F: FnMut(&'a Container) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let mut applied = Vec::new();
    for service in services {
        for container in &service.containers {
            if !selected(container) {
                tracing::info!("Skipping {} ({})", container.name, container.status);
                continue;
            }
            tracing::info!("{} {}", verb, container.name);
            op(container)
                .await
                .map_err(|e| RuneCtlError::action(&service.name, e))?;
            applied.push(container.name.clone());
        }
    }
    Ok(applied)
}

fn every(_: &Container) -> bool {
    true
}

/// Apply `action` over `services` through `runtime`
pub async fn dispatch<R>(runtime: &R, action: Action, services: &[Service]) -> Result<ActionOutcome>
where
    R: ContainerRuntime + ?Sized,
{
    let verb = action.verb();
    match action {
        Action::Ps => Ok(ActionOutcome::Listed(ps(services))),
        Action::Start => apply(services, verb, every, |c| runtime.start(c))
            .await
            .map(ActionOutcome::Applied),
        Action::Stop { timeout } => apply(services, verb, every, |c| runtime.stop(c, timeout))
            .await
            .map(ActionOutcome::Applied),
        Action::Kill { signal } => {
            let signal = signal.as_deref();
            apply(services, verb, every, |c| runtime.kill(c, signal))
                .await
                .map(ActionOutcome::Applied)
        }
        // Running containers are only removed when forced
        Action::Remove { force } => apply(
            services,
            verb,
            |c| force || !c.is_running(),
            |c| runtime.remove(c, force),
        )
        .await
        .map(ActionOutcome::Applied),
        Action::Logs(options) => {
            let (producers, stream) = LogAggregator::new(runtime, options).launch(services).await?;
            Ok(ActionOutcome::Streaming { producers, stream })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::ServiceDefinition;
    use crate::container::{NamingConvention, ProcessRecord};
    use crate::project::reconcile;
    use crate::runtime::fake::{record, FakeRuntime};

    fn resolved(records: Vec<ProcessRecord>, names: &[&str]) -> Vec<Service> {
        let mut services: Vec<Service> = names
            .iter()
            .map(|name| Service::new(name, ServiceDefinition::default()))
            .collect();
        reconcile(&mut services, records, &NamingConvention::new("app"));
        services
    }

    #[tokio::test]
    async fn test_ps_lists_every_container() {
        let runtime = FakeRuntime::default();
        let services = resolved(
            vec![record("1", "app_s1_1"), record("2", "app_s2_1"), record("3", "app_s1_2")],
            &["s1", "empty", "s2"],
        );

        let outcome = dispatch(&runtime, Action::Ps, &services).await.unwrap();
        let ActionOutcome::Listed(rows) = outcome else {
            panic!("expected a listing");
        };

        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["app_s1_1", "app_s1_2", "app_s2_1"]);
        assert_eq!(rows[0].command, "run app_s1_1");
        assert_eq!(rows[0].status, "Up 2 minutes");
    }

    #[tokio::test]
    async fn test_ps_with_no_containers_is_empty() {
        let runtime = FakeRuntime::default();
        let services = resolved(vec![], &["web"]);

        let outcome = dispatch(&runtime, Action::Ps, &services).await.unwrap();
        assert!(matches!(outcome, ActionOutcome::Listed(ref rows) if rows.is_empty()));
    }

    #[tokio::test]
    async fn test_mutating_action_stops_at_first_failure() {
        let runtime = FakeRuntime::default().fail_on("2");
        let services = resolved(
            vec![record("1", "app_s1_1"), record("2", "app_s2_1"), record("3", "app_s3_1")],
            &["s1", "s2", "s3"],
        );

        let err = dispatch(&runtime, Action::Stop { timeout: None }, &services)
            .await
            .unwrap_err();

        match err {
            RuneCtlError::ActionFailed { ref service, .. } => assert_eq!(service, "s2"),
            ref other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().starts_with("Service s2: "));
        assert_eq!(runtime.calls(), vec!["stop app_s1_1", "stop app_s2_1"]);
    }

    #[tokio::test]
    async fn test_mutating_actions_cover_every_container() {
        let runtime = FakeRuntime::default();
        let services = resolved(
            vec![record("1", "app_web_1"), record("2", "app_web_2"), record("3", "app_db_1")],
            &["db", "web", "idle"],
        );

        let outcome = dispatch(&runtime, Action::Kill { signal: Some("SIGINT".to_string()) }, &services)
            .await
            .unwrap();
        assert!(matches!(outcome, ActionOutcome::Applied(ref names) if names.len() == 3));

        dispatch(&runtime, Action::Start, &services).await.unwrap();
        dispatch(&runtime, Action::Remove { force: true }, &services).await.unwrap();

        assert_eq!(
            runtime.calls(),
            vec![
                "kill app_db_1",
                "kill app_web_1",
                "kill app_web_2",
                "start app_db_1",
                "start app_web_1",
                "start app_web_2",
                "rm app_db_1",
                "rm app_web_1",
                "rm app_web_2",
            ]
        );
    }

    #[tokio::test]
    async fn test_remove_skips_running_containers_unless_forced() {
        let mut exited = record("2", "app_web_2");
        exited.status = "Exited (0) 3 hours ago".to_string();
        let services = resolved(vec![record("1", "app_web_1"), exited], &["web"]);

        let runtime = FakeRuntime::default();
        let outcome = dispatch(&runtime, Action::Remove { force: false }, &services)
            .await
            .unwrap();
        assert!(matches!(outcome, ActionOutcome::Applied(ref names) if names == &["app_web_2"]));
        assert_eq!(runtime.calls(), vec!["rm app_web_2"]);

        let runtime = FakeRuntime::default();
        let outcome = dispatch(&runtime, Action::Remove { force: true }, &services)
            .await
            .unwrap();
        assert!(matches!(outcome, ActionOutcome::Applied(ref names) if names.len() == 2));
        assert_eq!(runtime.calls(), vec!["rm app_web_1", "rm app_web_2"]);
    }

    #[tokio::test]
    async fn test_start_on_never_started_service_is_a_no_op() {
        let runtime = FakeRuntime::default();
        let services = resolved(vec![record("9", "other_web_1")], &["web"]);

        let outcome = dispatch(&runtime, Action::Start, &services).await.unwrap();
        assert!(matches!(outcome, ActionOutcome::Applied(ref names) if names.is_empty()));
        assert!(runtime.calls().is_empty());
    }

    #[tokio::test]
    async fn test_logs_streams_every_service() {
        let runtime = FakeRuntime::default()
            .with_logs("1", &["web says hi"])
            .with_logs("2", &["db ready"]);
        let services = resolved(
            vec![record("1", "app_web_1"), record("2", "app_db_1")],
            &["web", "db", "idle"],
        );

        let outcome = dispatch(&runtime, Action::Logs(LogOptions::default()), &services)
            .await
            .unwrap();
        let ActionOutcome::Streaming { producers, stream } = outcome else {
            panic!("expected a stream");
        };
        assert_eq!(producers, 2);

        let mut rendered: Vec<String> = stream.collect().await.iter().map(|l| l.to_string()).collect();
        rendered.sort();
        assert_eq!(rendered, vec!["app_db_1 | db ready", "app_web_1 | web says hi"]);
    }
}
