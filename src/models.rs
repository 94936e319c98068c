pub mod bill;
pub mod client;
pub mod dashboard;
pub mod document;
pub mod invoice;
pub mod organization;
pub mod quote;
pub mod recurring;
