pub mod api;
pub mod config;
pub mod drivers;
pub mod error;
pub mod logging;
pub mod state;

pub use api::{AnalysisApi, HttpAnalysisClient, UploadedFile};
pub use drivers::{run_step1, run_step2, DriverOutcome, ViewScope, ViewToken};
pub use error::WizardError;
pub use state::{WizardState, WizardStep, WizardStore};
