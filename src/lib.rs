// Library surface for the binary and for headless/integration tests.
pub mod app;
pub mod app_dirs;
pub mod catalog;
pub mod celebration;
pub mod corpus;
pub mod game;
pub mod host;
pub mod metrics;
pub mod profile;
pub mod runtime;
pub mod session;
pub mod ui;
