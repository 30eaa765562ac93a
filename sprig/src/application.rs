//! Core application framework functionality.

use crate::config::ApplicationConfig;
use crate::runner::ApplicationRunnerPtr;
use derive_more::Constructor;
#[cfg(test)]
use mockall::automock;
use sprig_di::container::Container;
use sprig_di::error::{BootstrapError, ErrorPtr};
use sprig_di::instance::ComponentInstancePtr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Error, Debug)]
pub enum ApplicationError {
    #[error("Cannot read application configuration: {0}")]
    Config(ErrorPtr),
    #[error("Cannot bootstrap container: {0}")]
    Bootstrap(#[from] BootstrapError),
    #[error("Runner error: {0}")]
    RunnerError(ErrorPtr),
}

/// Source of [ApplicationRunners](crate::runner::ApplicationRunner) for an [Application].
#[cfg_attr(test, automock)]
pub trait RunnerProvider {
    fn runners(&self) -> Vec<ComponentInstancePtr<ApplicationRunnerPtr>>;
}

impl RunnerProvider for Container {
    fn runners(&self) -> Vec<ComponentInstancePtr<ApplicationRunnerPtr>> {
        self.instances::<ApplicationRunnerPtr>()
    }
}

/// Main entrypoint for the application. Bootstraps the application and runs
/// [ApplicationRunners](crate::runner::ApplicationRunner).
#[derive(Constructor)]
pub struct Application<P: RunnerProvider = Container> {
    provider: P,
}

impl<P: RunnerProvider> Application<P> {
    #[inline]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Runs all runners, ordered by descending priority. Stops at the first failing runner.
    pub fn run(&self) -> Result<(), ApplicationError> {
        info!("Searching for application runners...");

        let mut runners = self.provider.runners();
        runners.sort_by_key(|runner| -i16::from(runner.priority()));

        info!(count = runners.len(), "Running application runners...");

        for runner in &runners {
            runner.run().map_err(ApplicationError::RunnerError)?;
        }

        Ok(())
    }
}

/// Creates an application for the given `#[derive(Application)]` marker, with configuration read
/// from the environment.
pub fn create<Root: 'static>() -> Result<Application, ApplicationError> {
    let config = ApplicationConfig::init_from_environment()
        .map_err(|error| ApplicationError::Config(Arc::new(error)))?;
    create_with_config::<Root>(&config)
}

/// Creates an application for the given `#[derive(Application)]` marker and configuration.
pub fn create_with_config<Root: 'static>(
    config: &ApplicationConfig,
) -> Result<Application, ApplicationError> {
    if config.install_tracing_logger {
        install_tracing_logger();
    }

    Container::init::<Root>()
        .map(Application::new)
        .map_err(ApplicationError::Bootstrap)
}

fn install_tracing_logger() {
    if let Err(error) = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
    {
        // another subscriber is already in place
        debug!(%error, "Skipping default logger installation.");
    }
}
