pub mod crypto;
pub mod mailer;
pub mod models;
pub mod policy;
pub mod repo;
pub mod service;

pub use models::{Account, Flow, OtpError, OtpSlot};
pub use service::OtpService;
