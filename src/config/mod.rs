/// Main configuration module.
///
/// Re-exports submodules for server and user-facing text configuration.
pub mod server;
pub mod texts;
