pub mod batch_service;
pub mod chart_service;
pub mod email_service;
pub mod price_service;
pub mod yield_service;
