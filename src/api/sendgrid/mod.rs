pub mod client;
pub mod models;

pub use client::SendGridClient;
pub use models::MailRequest;
