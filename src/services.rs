pub mod numbering;
pub mod client_service;
pub mod quote_service;
pub mod invoice_service;
pub mod bill_service;
pub mod recurring_service;
pub mod document_service;
pub mod email;
pub mod signing;
pub mod delivery_service;
pub mod settings_service;
pub mod dashboard_service;
