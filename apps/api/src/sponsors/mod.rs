// Funding support for partners: CSR sponsor approach guidance and NGO impact reports.

pub mod csr;
pub mod handlers;
pub mod impact;
pub mod prompts;
