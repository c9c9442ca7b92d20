// Application layer: the service owning the ledger, its persistence policy,
// and the report types handed to clients.

pub mod error;
pub mod reporting;
pub mod service;

pub use error::*;
pub use reporting::*;
pub use service::*;
