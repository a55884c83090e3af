use std::sync::Arc;

use dmr_schema::Device;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::transform::{extract_bm_id, talkgroup_from_entry, transform_device};
use crate::db::{DbActorHandle, NewChannel, Repeater, SyncStatus, Talkgroup, TalkgroupInput};
use crate::directory::{DirectoryApi, parse_location_terms};
use crate::error::DmrError;

/// `sync_log.sync_type` for directory talkgroup syncs.
pub const TALKGROUP_SYNC: &str = "talkgroups";

/// A directory static assignment with the local talkgroup name, if known.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StaticAssignment {
    pub talkgroup: i64,
    pub slot: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportOutcome {
    pub repeater: Repeater,
    pub channels_created: usize,
}

/// One completed write of a multi-step import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStep {
    RepeaterCreated { repeater_id: i64 },
    TalkgroupCreated { tg_id: i64 },
    ChannelCreated { channel_id: i64 },
}

/// Completed steps of an import. Nothing is undone on failure; the step count is reported
/// so the caller knows how much was written.
#[derive(Debug, Default)]
struct ImportSaga {
    steps: Vec<ImportStep>,
}

impl ImportSaga {
    fn record(&mut self, step: ImportStep) {
        debug!(?step, "import step completed");
        self.steps.push(step);
    }

    fn channels_created(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s, ImportStep::ChannelCreated { .. }))
            .count()
    }

    /// Wraps `err` with the step count when anything was already written.
    fn abort(self, err: DmrError) -> DmrError {
        if self.steps.is_empty() {
            return err;
        }
        warn!(
            steps_completed = self.steps.len(),
            error = %err,
            "import aborted after partial writes"
        );
        DmrError::IncompleteImport {
            steps_completed: self.steps.len(),
            source: Box::new(err),
        }
    }
}

/// Pulls directory records into the local store.
#[derive(Clone)]
pub struct Reconciler {
    db: DbActorHandle,
    directory: Arc<dyn DirectoryApi>,
}

impl Reconciler {
    pub fn new(db: DbActorHandle, directory: Arc<dyn DirectoryApi>) -> Self {
        Self { db, directory }
    }

    pub fn directory(&self) -> &dyn DirectoryApi {
        self.directory.as_ref()
    }

    /// Upserts every directory talkgroup by number and records the attempt in the sync log.
    ///
    /// On failure the attempt is marked failed with a count of zero; rows upserted before the
    /// failure stay.
    pub async fn sync_talkgroups(&self) -> Result<i64, DmrError> {
        let sync_id = self.db.begin_sync(TALKGROUP_SYNC).await?;
        info!(sync_id, "talkgroup sync started");

        match self.upsert_directory_talkgroups().await {
            Ok(synced) => {
                self.db
                    .complete_sync(sync_id, SyncStatus::Completed, synced)
                    .await?;
                info!(sync_id, records_synced = synced, "talkgroup sync completed");
                Ok(synced)
            }
            Err(e) => {
                if let Err(log_err) = self.db.complete_sync(sync_id, SyncStatus::Failed, 0).await {
                    warn!(sync_id, error = %log_err, "could not mark sync as failed");
                }
                warn!(sync_id, error = %e, "talkgroup sync failed");
                Err(e)
            }
        }
    }

    async fn upsert_directory_talkgroups(&self) -> Result<i64, DmrError> {
        let entries = self.directory.list_talkgroups().await?;
        let mut synced = 0_i64;
        for entry in &entries {
            self.db.upsert_talkgroup(talkgroup_from_entry(entry)).await?;
            synced += 1;
        }
        Ok(synced)
    }

    /// Fetches a device and stores it as a new repeater.
    pub async fn import_repeater(&self, bm_id: i64) -> Result<Repeater, DmrError> {
        let device = self.directory.get_device(bm_id).await?;
        let repeater = self.db.create_repeater(transform_device(&device)).await?;
        info!(
            bm_id,
            repeater_id = repeater.repeater_id,
            name = %repeater.name,
            "imported repeater"
        );
        Ok(repeater)
    }

    /// Imports the repeater, then one channel per static talkgroup assignment.
    pub async fn import_with_channels(&self, bm_id: i64) -> Result<ImportOutcome, DmrError> {
        let repeater = self.import_repeater(bm_id).await?;

        let mut saga = ImportSaga::default();
        saga.record(ImportStep::RepeaterCreated {
            repeater_id: repeater.repeater_id,
        });

        let channels_created = self.expand_channels(&repeater, bm_id, saga).await?;
        Ok(ImportOutcome {
            repeater,
            channels_created,
        })
    }

    /// Creates channels for an existing repeater from the directory id stored in its notes.
    pub async fn auto_channels(&self, repeater_id: i64) -> Result<usize, DmrError> {
        let repeater = self
            .db
            .get_repeater(repeater_id)
            .await?
            .ok_or_else(|| DmrError::not_found("Repeater not found"))?;

        let bm_id = extract_bm_id(repeater.notes.as_deref()).ok_or_else(|| {
            DmrError::validation("No BrandMeister ID found in repeater notes")
        })?;

        self.expand_channels(&repeater, bm_id, ImportSaga::default())
            .await
    }

    async fn expand_channels(
        &self,
        repeater: &Repeater,
        bm_id: i64,
        mut saga: ImportSaga,
    ) -> Result<usize, DmrError> {
        match self.expand_steps(repeater, bm_id, &mut saga).await {
            Ok(()) => {
                let created = saga.channels_created();
                info!(
                    bm_id,
                    repeater_id = repeater.repeater_id,
                    channels_created = created,
                    "channels created from static talkgroups"
                );
                Ok(created)
            }
            Err(e) => Err(saga.abort(e)),
        }
    }

    async fn expand_steps(
        &self,
        repeater: &Repeater,
        bm_id: i64,
        saga: &mut ImportSaga,
    ) -> Result<(), DmrError> {
        let assignments = self.directory.get_device_talkgroups(bm_id).await?;

        for assignment in assignments {
            let talkgroup = match self.db.get_talkgroup_by_number(assignment.talkgroup).await? {
                Some(tg) => tg,
                None => {
                    let tg = self
                        .db
                        .create_talkgroup(TalkgroupInput::placeholder(assignment.talkgroup))
                        .await?;
                    saga.record(ImportStep::TalkgroupCreated { tg_id: tg.tg_id });
                    tg
                }
            };

            let channel = self
                .db
                .create_channel(NewChannel::from_parents(repeater, &talkgroup, assignment.slot))
                .await?
                .ok_or_else(|| orphaned(repeater, &talkgroup))?;
            saga.record(ImportStep::ChannelCreated {
                channel_id: channel.channel_id,
            });
        }
        Ok(())
    }

    /// Static assignments of a device, named from the local talkgroup table.
    pub async fn static_talkgroups(&self, bm_id: i64) -> Result<Vec<StaticAssignment>, DmrError> {
        let assignments = self.directory.get_device_talkgroups(bm_id).await?;

        let mut out = Vec::with_capacity(assignments.len());
        for a in assignments {
            let name = self
                .db
                .get_talkgroup_by_number(a.talkgroup)
                .await?
                .map_or_else(|| format!("TG {}", a.talkgroup), |tg| tg.name);
            out.push(StaticAssignment {
                talkgroup: a.talkgroup,
                slot: a.slot,
                name,
            });
        }
        Ok(out)
    }

    pub async fn search_directory(&self, query: &str) -> Result<Vec<Device>, DmrError> {
        let terms = parse_location_terms(query);
        if terms.is_empty() {
            return Err(DmrError::validation("Missing search query (q)"));
        }
        Ok(self.directory.repeaters_by_location(&terms).await?)
    }

    pub async fn device_profile(&self, bm_id: i64) -> Result<Value, DmrError> {
        Ok(self.directory.get_device_profile(bm_id).await?)
    }
}

fn orphaned(repeater: &Repeater, talkgroup: &Talkgroup) -> DmrError {
    DmrError::Unexpected(format!(
        "channel for repeater {} and talkgroup {} was written but its parents are gone",
        repeater.repeater_id, talkgroup.tg_id
    ))
}
