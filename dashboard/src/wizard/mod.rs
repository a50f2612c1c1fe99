//! Project wizard form state

pub mod form;
pub mod steps;

pub use form::{merge, FieldValue, ProjectForm};
pub use steps::{step_validity, StepStatus, WizardStep};
