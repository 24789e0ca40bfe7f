//! Project orchestration
//!
//! A project ties the declared services to the containers the runtime
//! reports: definitions are loaded and filtered, process records are
//! matched to services, and one action is applied to the result.

pub mod actions;

pub use actions::{Action, ActionOutcome, PsRow};

use crate::compose::{ComposeParser, Definitions, ServiceDefinition};
use crate::config::Settings;
use crate::container::{Container, NamingConvention, ProcessRecord};
use crate::error::{Result, RuneCtlError};
use crate::runtime::ContainerRuntime;

/// A declared service and the containers found for it
#[derive(Debug, Clone, PartialEq)]
pub struct Service {
    /// Service name
    pub name: String,
    /// Declared definition
    pub definition: ServiceDefinition,
    /// Containers in discovery order
    pub containers: Vec<Container>,
}

impl Service {
    /// Create a service with no containers
    pub fn new(name: &str, definition: ServiceDefinition) -> Self {
        Self {
            name: name.to_string(),
            definition,
            containers: Vec::new(),
        }
    }
}

/// Pick the target services
///
/// With no names every declared service is selected in name order;
/// otherwise the named services in the order given. A name that is not
/// declared is an error.
pub fn select_services(definitions: &Definitions, names: &[String]) -> Result<Vec<Service>> {
    if names.is_empty() {
        return Ok(definitions
            .iter()
            .map(|(name, def)| Service::new(name, def.clone()))
            .collect());
    }

    names
        .iter()
        .map(|name| {
            definitions
                .get(name)
                .map(|def| Service::new(name, def.clone()))
                .ok_or_else(|| RuneCtlError::ServiceNotFound(name.clone()))
        })
        .collect()
}

/// Match process records to services
///
/// Records are taken in the order given and each one goes to the first
/// service, in slice order, whose naming convention it satisfies. Records
/// matching no service are dropped. The scan is linear in records times
/// services.
pub fn reconcile<I>(services: &mut [Service], records: I, naming: &NamingConvention)
where
    I: IntoIterator<Item = ProcessRecord>,
{
    for record in records {
        let Some(name) = record.canonical_name().map(str::to_string) else {
            tracing::trace!("Dropping unnamed container {}", record.id);
            continue;
        };

        let matched = services.iter_mut().find_map(|service| {
            naming
                .match_service(&service.name, &name)
                .map(|number| (service, number))
        });

        match matched {
            Some((service, number)) => {
                service
                    .containers
                    .push(Container::from_record(record, &name, number));
            }
            None => tracing::trace!("Dropping container {} outside project {}", name, naming.project()),
        }
    }
}

/// One invocation against a project
pub struct Project<R: ContainerRuntime> {
    settings: Settings,
    naming: NamingConvention,
    runtime: R,
}

impl<R: ContainerRuntime> Project<R> {
    /// Create a project
    pub fn new(settings: Settings, runtime: R) -> Self {
        let naming = NamingConvention::new(&settings.project_name);
        Self {
            settings,
            naming,
            runtime,
        }
    }

    /// Read, interpolate and validate the definitions file
    pub fn load_definitions(&self) -> Result<Definitions> {
        let path = self.settings.definitions_path();
        tracing::debug!("Loading definitions from {}", path.display());

        let mut definitions = ComposeParser::parse_file(&path)?;
        ComposeParser::interpolate(&mut definitions, &self.settings.environment);
        ComposeParser::validate(&definitions)?;
        Ok(definitions)
    }

    /// Select the target services and attach their containers
    pub async fn resolve(&self, names: &[String]) -> Result<Vec<Service>> {
        let definitions = self.load_definitions()?;
        let mut services = select_services(&definitions, names)?;

        let records = self.runtime.list_processes().await.map_err(|e| match e {
            RuneCtlError::ProcessQuery(_) => e,
            other => RuneCtlError::ProcessQuery(other.to_string()),
        })?;
        tracing::debug!("Runtime reported {} containers", records.len());

        reconcile(&mut services, records, &self.naming);
        Ok(services)
    }

    /// Resolve the named services (all when empty) and apply `action`
    pub async fn run(&self, action: Action, names: &[String]) -> Result<ActionOutcome> {
        let services = self.resolve(names).await?;
        self.dispatch(action, &services).await
    }

    /// Apply `action` to already resolved services
    pub async fn dispatch(&self, action: Action, services: &[Service]) -> Result<ActionOutcome> {
        actions::dispatch(&self.runtime, action, services).await
    }
}
