// Library surface for the binary, headless runs and integration tests.
pub mod app;
pub mod callout;
pub mod config;
pub mod error;
pub mod install;
pub mod logging;
pub mod runtime;
pub mod scheduler;
pub mod settings;
pub mod settings_form;
pub mod speech;
pub mod timer;
pub mod ui;
pub mod util;
pub mod wake_lock;
