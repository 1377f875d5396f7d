//! Spreadsheet import with two-phase duplicate suppression.
//!
//! Phase one drops repeated phone numbers inside the uploaded file
//! ([`plan_import`]); phase two skips rows whose key already exists in
//! storage. Both counts land in the [`ImportReport`].

mod workbook;

use std::sync::Arc;

use chrono::Utc;
use smartcrm_core::import::{ColumnMapping, ImportPreview, ImportReport, Sheet, plan_import};
use smartcrm_core::{ActivityLog, AuthUser, actions};
use smartcrm_storage::StorageBackend;
use smartcrm_storage::traits::ContactStore;

use crate::{ActivityService, ServiceError};

pub struct ImportService {
    storage: Arc<StorageBackend>,
    activity: Arc<ActivityService>,
}

impl ImportService {
    #[must_use]
    pub const fn new(storage: Arc<StorageBackend>, activity: Arc<ActivityService>) -> Self {
        Self { storage, activity }
    }

    async fn parse(bytes: Vec<u8>) -> Result<Sheet, ServiceError> {
        tokio::task::spawn_blocking(move || workbook::read_first_sheet(bytes)).await?
    }

    /// Column names, the first rows and a suggested mapping.
    pub async fn preview(&self, bytes: Vec<u8>) -> Result<ImportPreview, ServiceError> {
        let sheet = Self::parse(bytes).await?;
        Ok(ImportPreview::from_sheet(&sheet))
    }

    pub async fn import(
        &self,
        bytes: Vec<u8>,
        mapping_json: &str,
        user: &AuthUser,
    ) -> Result<ImportReport, ServiceError> {
        let mapping = ColumnMapping::parse(mapping_json)?;
        let sheet = Self::parse(bytes).await?;
        let plan = plan_import(&sheet, &mapping);
        let mut report = ImportReport::for_plan(&plan);
        let now = Utc::now();

        for row in plan.rows {
            if self.storage.contact_phone_exists(&row.key).await? {
                report.record_db_duplicate();
                continue;
            }
            if !row.has_data() {
                report.record_empty();
                continue;
            }
            let index = row.index;
            match self.storage.insert_contact(&row.into_contact(now)).await {
                Ok(()) => report.imported += 1,
                Err(e) if e.is_duplicate() => {
                    tracing::debug!(row = index, "phone inserted concurrently, counted as duplicate");
                    report.record_db_duplicate();
                },
                Err(e) => return Err(e.into()),
            }
        }

        tracing::info!(
            imported = report.imported,
            db_duplicates = report.db_duplicates,
            file_duplicates = report.file_duplicates_removed,
            empty = report.empty_data_skipped,
            "contacts imported"
        );
        self.activity
            .record(ActivityLog::new(user, actions::IMPORTED_CONTACTS, now).details(report.summary()))
            .await?;
        Ok(report)
    }
}
