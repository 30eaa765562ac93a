//! Application framework based on [sprig_di] dependency injection.
//!
//! A sprig application is a set of components discovered by the container and wired together
//! at startup. This crate provides the entrypoint for such applications in the form of
//! [Application](application::Application): it reads framework configuration, installs a default
//! logger, bootstraps the [Container](sprig_di::container::Container) and finally runs all
//! discovered [ApplicationRunners](runner::ApplicationRunner).

pub mod application;
pub mod config;
pub mod runner;
