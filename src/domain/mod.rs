mod insights;
mod ledger;
mod money;
mod month;
mod summary;
mod transaction;

pub use insights::*;
pub use ledger::*;
pub use money::*;
pub use month::*;
pub use summary::*;
pub use transaction::*;
