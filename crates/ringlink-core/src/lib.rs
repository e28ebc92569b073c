// ringlink-core: Hub controller and device model between ringlink-api and consumers.

pub mod config;
pub mod controller;
pub mod convert;
pub mod error;
pub mod model;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::HubConfig;
pub use controller::HubController;
pub use error::CoreError;
pub use model::{DeviceKind, DeviceStatus, ModeChange, PanelMode, PanelStatus};

// Configuration inputs defined by the api crate.
pub use ringlink_api::{DEFAULT_CONNECTIONS_URL, WaitPolicy};
