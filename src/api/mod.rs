pub mod alpha_vantage;
pub mod error;
pub mod sendgrid;

pub use error::ApiError;
