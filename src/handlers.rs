pub mod bills;
pub mod clients;
pub mod cron;
pub mod dashboard;
pub mod documents;
pub mod invoices;
pub mod quotes;
pub mod settings;
