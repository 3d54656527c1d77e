//! Concurrent archive consumption
//!
//! The multi-archive builder serializes graph mutation behind its own lock, while archive
//! listing and classification run on the caller's thread. These helpers fan archives out
//! across threads so that work overlaps.

use crate::archive::Archive;
use crate::error::TreeError;
use crate::tree::MultiPackageNodeTreeBuilder;
use std::sync::Arc;
use std::thread;
use tracing::{debug, warn};

/// An archive paired with the name it is consumed under
pub type NamedArchive = (String, Arc<dyn Archive>);

/// Consume every archive on its own scoped thread.
///
/// All archives are attempted; the first failure in input order is returned. The order of
/// children and hard node references in the result depends on thread scheduling.
pub fn consume_packages(
    builder: &MultiPackageNodeTreeBuilder,
    archives: &[NamedArchive],
) -> Result<(), TreeError> {
    debug!(archives = archives.len(), "Consuming archives in parallel");
    let results: Vec<Result<(), TreeError>> = thread::scope(|scope| {
        let handles: Vec<_> = archives
            .iter()
            .map(|(name, archive)| {
                scope.spawn(move || builder.consume_package(name, archive.as_ref()))
            })
            .collect();
        handles
            .into_iter()
            .zip(archives)
            .map(|(handle, (name, _))| {
                handle.join().unwrap_or_else(|_| {
                    Err(TreeError::Archive {
                        archive: name.clone(),
                        message: "consumer thread panicked".to_string(),
                    })
                })
            })
            .collect()
    });

    let mut first_error = None;
    for (result, (name, _)) in results.into_iter().zip(archives) {
        if let Err(e) = result {
            warn!(archive = %name, error = %e, "Archive consumption failed");
            first_error.get_or_insert(e);
        }
    }
    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Consume archives one after another, stopping at the first failure
pub fn consume_packages_sequential(
    builder: &MultiPackageNodeTreeBuilder,
    archives: &[NamedArchive],
) -> Result<(), TreeError> {
    for (name, archive) in archives {
        builder.consume_package(name, archive.as_ref())?;
    }
    Ok(())
}

/// Consume one archive on tokio's blocking pool
pub async fn consume_package_async(
    builder: Arc<MultiPackageNodeTreeBuilder>,
    name: String,
    archive: Arc<dyn Archive>,
) -> Result<(), TreeError> {
    let task_name = name.clone();
    tokio::task::spawn_blocking(move || builder.consume_package(&task_name, archive.as_ref()))
        .await
        .map_err(|e| TreeError::Archive {
            archive: name,
            message: format!("consumer task failed: {}", e),
        })?
}
