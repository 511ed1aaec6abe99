//! Settings use cases.

mod settings_ops;

pub use settings_ops::{
    ConnectionTest, SettingsError, SettingsOps, SettingsView, CONNECTION_TEST_PROMPT,
};
