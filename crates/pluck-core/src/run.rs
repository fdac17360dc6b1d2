//! Resolve-then-download pipeline used by the shell.

use tracing::info;

use crate::destination;
use crate::error::FetchError;
use crate::fetch::{self, TransferOptions, TransferSummary};
use crate::settings::Settings;

/// Resolves the destination for `settings`, then downloads and verifies.
pub fn run(settings: &Settings, options: &TransferOptions) -> Result<TransferSummary, FetchError> {
    let target = destination::resolve(&settings.source, &settings.destination)?;

    info!(
        source = %settings.source,
        destination = %target.display(),
        "downloading file"
    );

    fetch::execute(settings, &target, options)
}
