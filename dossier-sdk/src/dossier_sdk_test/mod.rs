mod service;

pub use service::{MockDossierService, MockResult, TrackedCall};
