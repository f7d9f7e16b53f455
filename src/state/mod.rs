pub mod app;
pub mod session;

pub use app::WizardStore;
pub use session::{ProcessedFile, UploadedFiles, WizardState, WizardStep};
