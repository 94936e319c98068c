pub mod items_repo;
pub mod client_repo;
pub use client_repo::ClientRepository;
pub mod quote_repo;
pub use quote_repo::QuoteRepository;
pub mod invoice_repo;
pub use invoice_repo::InvoiceRepository;
pub mod bill_repo;
pub use bill_repo::BillRepository;
pub mod organization_repo;
pub use organization_repo::OrganizationRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
