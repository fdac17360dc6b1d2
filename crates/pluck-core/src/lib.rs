pub mod config;
pub mod logging;

pub mod checksum;
pub mod destination;
pub mod error;
pub mod fetch;
mod run;
pub mod settings;

pub use error::{FetchError, TimeoutPhase};
pub use fetch::{TransferOptions, TransferSummary};
pub use run::run;
pub use settings::Settings;
