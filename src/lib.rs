use crate::{
    discard::loader::load_discards,
    manifest::loader::load_manifest,
    report::view_model::{build_view, ReportView},
    store::record_store::RecordStore,
};

pub mod aggregate;
pub mod cli;
pub mod discard;
pub mod error;
pub mod input;
pub mod key;
pub mod manifest;
pub mod report;
pub mod store;
pub mod trace;

/// Load a manifest and its discard status into a record store.
///
/// Either location may be a local path or an `http(s)://` URL. A missing
/// discard file means nothing has been discarded.
pub fn open_store(
    manifest_location: &str,
    discard_location: &str,
) -> Result<RecordStore, error::ReportError> {
    let manifest = load_manifest(manifest_location)?;
    let discards = load_discards(discard_location)?;
    Ok(RecordStore::new(manifest, discards))
}

/// Build the report view for an already-loaded store.
pub fn report_view(store: &RecordStore) -> Result<ReportView, error::ReportError> {
    build_view(store.manifest(), store.discards())
}
