// consultation-desk - client-side data pipeline for the consultation
// admin dashboard: fetch, decrypt, normalize, aggregate, export.

pub mod config;
pub mod encryption;
pub mod envelope;
pub mod error;
pub mod export;
pub mod filters;
pub mod models;
pub mod services;
pub mod store;

pub use config::Config;
pub use error::{Error, Result};
pub use filters::Filters;
pub use models::{Admin, CallStats, CallStatus, Consultation, StudentStats};
pub use services::{ConsultationService, UpdateCallStatus};
pub use store::{ConsultationStore, FetchTicket};
