//! Misrecall engine library.
//!
//! Sidecar service that generates false Recall Knowledge results for a
//! tabletop host.
//!
//! ## Structure
//!
//! - `use_cases/` - User story orchestration across ports
//! - `stores/` - In-memory notice log and creature directory
//! - `infrastructure/` - External dependency implementations (ports + adapters)
//! - `api/` - HTTP entry points
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod markdown;
pub mod prompt_templates;
pub mod stores;
pub mod use_cases;

pub use app::App;
