//! Runners executing actual application logic.

#[cfg(test)]
use mockall::automock;
pub use sprig_di::error::ErrorPtr;
use sprig_di::injectable;

pub type ApplicationRunnerPtr = dyn ApplicationRunner + Send + Sync;

/// Runs application logic. Runners are run by the [Application](crate::application::Application)
/// and are discovered by the container: a component becomes a runner by listing this trait in its
/// `interfaces`.
#[injectable]
#[cfg_attr(test, automock)]
pub trait ApplicationRunner {
    /// Runs any application code.
    fn run(&self) -> Result<(), ErrorPtr>;

    /// Returns the priority for this runner. Higher priorities get run first. Default 0.
    fn priority(&self) -> i8 {
        0
    }
}
