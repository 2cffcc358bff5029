//! Create, update and delete flows for spots.
//!
//! Each flow validates the form, uploads new images in on-screen order and
//! writes the record. A failed upload stops the flow before anything is
//! written to the record store.

use crate::ingest::{IngestError, IngestPipeline, PreviewStore};
use crate::spot::{Spot, SpotForm, SpotRecord, ValidationError};
use crate::store::{ObjectStore, RecordStore, StoreError};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Ingest(IngestError),
    #[error("record store error: {0}")]
    Store(#[from] StoreError),
}

impl From<IngestError> for SubmitError {
    fn from(e: IngestError) -> Self {
        match e {
            IngestError::Validation(v) => SubmitError::Validation(v),
            other => SubmitError::Ingest(other),
        }
    }
}

impl SubmitError {
    /// Message for the form's error banner.
    pub fn user_message(&self) -> String {
        match self {
            SubmitError::Validation(e) => e.to_string(),
            SubmitError::Ingest(e) => e.to_string(),
            SubmitError::Store(StoreError::NotFound(_)) => {
                "スポットが見つかりません".to_string()
            }
            SubmitError::Store(_) => "データベースへの保存に失敗しました".to_string(),
        }
    }
}

fn upload_images<P: PreviewStore>(
    form: &SpotForm,
    images: &IngestPipeline<P>,
    objects: &impl ObjectStore,
) -> Result<SpotRecord, SubmitError> {
    form.validate(images.len())?;
    let urls = images.to_submission_payload()?.upload(objects)?;
    Ok(SpotRecord::from_form(form, urls)?)
}

/// Store a new spot. On success the form and image list are cleared.
pub fn create_spot<P: PreviewStore>(
    form: &mut SpotForm,
    images: &mut IngestPipeline<P>,
    objects: &impl ObjectStore,
    records: &mut impl RecordStore,
) -> Result<Spot, SubmitError> {
    let record = upload_images(form, images, objects)?;
    let spot = records.insert(record)?;
    log::info!(
        "created spot {} ({}, {} image(s))",
        spot.id,
        spot.record.title,
        spot.record.images.len()
    );
    form.reset();
    images.reset();
    Ok(spot)
}

/// Replace a stored spot. The image list is the complete new list: stored
/// images left out of it are dropped from the record.
pub fn update_spot<P: PreviewStore>(
    id: Uuid,
    form: &SpotForm,
    images: &mut IngestPipeline<P>,
    objects: &impl ObjectStore,
    records: &mut impl RecordStore,
) -> Result<Spot, SubmitError> {
    records.get(id)?;
    let record = upload_images(form, images, objects)?;
    let spot = records.update(id, record)?;
    log::info!("updated spot {} ({})", spot.id, spot.record.title);
    images.reset();
    Ok(spot)
}

pub fn delete_spot(id: Uuid, records: &mut impl RecordStore) -> Result<(), SubmitError> {
    records.delete(id)?;
    log::info!("deleted spot {}", id);
    Ok(())
}
