// Odoo PR Linker Library - Odoo conveniences for pull request pages
// This exposes the core components for testing and integration

pub mod augment;
pub mod cli;
pub mod config;
pub mod dom;
pub mod host;
pub mod page;
pub mod settings;
pub mod telemetry;

// Re-export key types for easy access
pub use augment::{
    create_buttons, extract_id, find_id, linkify, run, AugmentReport, ButtonKind, ClickAction,
    HeaderOutcome, IdKind, Linkifier, ResolvedIds,
};
pub use config::{Configuration, StoredSettings};
pub use dom::{parse_html, Document, DomError, NodeId};
pub use host::{BrowserHost, HostError, SystemHost};
pub use page::{ClickOutcome, Page};
pub use settings::{
    load_config, reset_settings, save_settings, FileSettingsStore, MemorySettingsStore, SaveStatus,
    SettingsError, SettingsStore,
};
pub use telemetry::{generate_correlation_id, init_telemetry};
