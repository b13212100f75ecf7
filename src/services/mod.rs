// Services module

pub mod consultations;

pub use consultations::{ConsultationService, UpdateCallStatus};
