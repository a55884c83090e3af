use crate::db::models::{ChannelView, Repeater, Stats, SyncRecord, SyncStatus, Talkgroup};
use crate::db::queries::{self, channels, repeaters, sync_log, talkgroups};
use crate::db::records::{NewChannel, RepeaterInput, TalkgroupInput};
use crate::db::schema::SQLITE_INIT;
use crate::error::DmrError;
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::fmt::Display;
use std::{str::FromStr, time::Duration};
use tracing::info;

type Reply<T> = RpcReplyPort<Result<T, DmrError>>;

#[derive(Debug)]
pub enum DbActorMessage {
    ListRepeaters(Reply<Vec<Repeater>>),
    GetRepeater(i64, Reply<Option<Repeater>>),
    SearchRepeaters(String, Reply<Vec<Repeater>>),
    CreateRepeater(RepeaterInput, Reply<Repeater>),
    /// Full replace by id; `None` when the id does not exist.
    UpdateRepeater(i64, RepeaterInput, Reply<Option<Repeater>>),
    /// Deletes the repeater row only. Callers remove its channels first.
    DeleteRepeater(i64, Reply<u64>),

    ListTalkgroups(Reply<Vec<Talkgroup>>),
    GetTalkgroup(i64, Reply<Option<Talkgroup>>),
    GetTalkgroupByNumber(i64, Reply<Option<Talkgroup>>),
    SearchTalkgroups(String, Reply<Vec<Talkgroup>>),
    CreateTalkgroup(TalkgroupInput, Reply<Talkgroup>),
    /// Insert or overwrite by talkgroup number.
    UpsertTalkgroup(TalkgroupInput, Reply<Talkgroup>),
    UpdateTalkgroup(i64, TalkgroupInput, Reply<Option<Talkgroup>>),
    DeleteTalkgroup(i64, Reply<u64>),

    /// Joined channel rows, optionally filtered by repeater id.
    ListChannels(Option<i64>, Reply<Vec<ChannelView>>),
    GetChannel(i64, Reply<Option<ChannelView>>),
    CreateChannel(NewChannel, Reply<Option<ChannelView>>),
    UpdateChannel(i64, NewChannel, Reply<Option<ChannelView>>),
    DeleteChannel(i64, Reply<u64>),
    DeleteChannelsForRepeater(i64, Reply<u64>),

    /// Insert a `running` sync record and return its id.
    BeginSync(String, Reply<i64>),
    CompleteSync(i64, SyncStatus, i64, Reply<SyncRecord>),
    LastSync(String, Reply<Option<SyncRecord>>),

    Stats(Reply<Stats>),
}

/// Cloneable handle to the single task that owns the SQLite pool.
#[derive(Clone)]
pub struct DbActorHandle {
    actor: ActorRef<DbActorMessage>,
}

fn rpc_failed(op: &str, e: impl Display) -> DmrError {
    DmrError::Actor(format!("DbActor {op} RPC failed: {e}"))
}

impl DbActorHandle {
    pub async fn list_repeaters(&self) -> Result<Vec<Repeater>, DmrError> {
        ractor::call!(self.actor, DbActorMessage::ListRepeaters)
            .map_err(|e| rpc_failed("ListRepeaters", e))?
    }

    pub async fn get_repeater(&self, id: i64) -> Result<Option<Repeater>, DmrError> {
        ractor::call!(self.actor, DbActorMessage::GetRepeater, id)
            .map_err(|e| rpc_failed("GetRepeater", e))?
    }

    pub async fn search_repeaters(&self, query: &str) -> Result<Vec<Repeater>, DmrError> {
        ractor::call!(self.actor, DbActorMessage::SearchRepeaters, query.to_string())
            .map_err(|e| rpc_failed("SearchRepeaters", e))?
    }

    pub async fn create_repeater(&self, input: RepeaterInput) -> Result<Repeater, DmrError> {
        ractor::call!(self.actor, DbActorMessage::CreateRepeater, input)
            .map_err(|e| rpc_failed("CreateRepeater", e))?
    }

    pub async fn update_repeater(
        &self,
        id: i64,
        input: RepeaterInput,
    ) -> Result<Option<Repeater>, DmrError> {
        ractor::call!(self.actor, DbActorMessage::UpdateRepeater, id, input)
            .map_err(|e| rpc_failed("UpdateRepeater", e))?
    }

    pub async fn delete_repeater(&self, id: i64) -> Result<u64, DmrError> {
        ractor::call!(self.actor, DbActorMessage::DeleteRepeater, id)
            .map_err(|e| rpc_failed("DeleteRepeater", e))?
    }

    pub async fn list_talkgroups(&self) -> Result<Vec<Talkgroup>, DmrError> {
        ractor::call!(self.actor, DbActorMessage::ListTalkgroups)
            .map_err(|e| rpc_failed("ListTalkgroups", e))?
    }

    pub async fn get_talkgroup(&self, id: i64) -> Result<Option<Talkgroup>, DmrError> {
        ractor::call!(self.actor, DbActorMessage::GetTalkgroup, id)
            .map_err(|e| rpc_failed("GetTalkgroup", e))?
    }

    pub async fn get_talkgroup_by_number(&self, number: i64) -> Result<Option<Talkgroup>, DmrError> {
        ractor::call!(self.actor, DbActorMessage::GetTalkgroupByNumber, number)
            .map_err(|e| rpc_failed("GetTalkgroupByNumber", e))?
    }

    pub async fn search_talkgroups(&self, query: &str) -> Result<Vec<Talkgroup>, DmrError> {
        ractor::call!(self.actor, DbActorMessage::SearchTalkgroups, query.to_string())
            .map_err(|e| rpc_failed("SearchTalkgroups", e))?
    }

    pub async fn create_talkgroup(&self, input: TalkgroupInput) -> Result<Talkgroup, DmrError> {
        ractor::call!(self.actor, DbActorMessage::CreateTalkgroup, input)
            .map_err(|e| rpc_failed("CreateTalkgroup", e))?
    }

    pub async fn upsert_talkgroup(&self, input: TalkgroupInput) -> Result<Talkgroup, DmrError> {
        ractor::call!(self.actor, DbActorMessage::UpsertTalkgroup, input)
            .map_err(|e| rpc_failed("UpsertTalkgroup", e))?
    }

    pub async fn update_talkgroup(
        &self,
        id: i64,
        input: TalkgroupInput,
    ) -> Result<Option<Talkgroup>, DmrError> {
        ractor::call!(self.actor, DbActorMessage::UpdateTalkgroup, id, input)
            .map_err(|e| rpc_failed("UpdateTalkgroup", e))?
    }

    pub async fn delete_talkgroup(&self, id: i64) -> Result<u64, DmrError> {
        ractor::call!(self.actor, DbActorMessage::DeleteTalkgroup, id)
            .map_err(|e| rpc_failed("DeleteTalkgroup", e))?
    }

    pub async fn list_channels(&self, repeater_id: Option<i64>) -> Result<Vec<ChannelView>, DmrError> {
        ractor::call!(self.actor, DbActorMessage::ListChannels, repeater_id)
            .map_err(|e| rpc_failed("ListChannels", e))?
    }

    pub async fn get_channel(&self, id: i64) -> Result<Option<ChannelView>, DmrError> {
        ractor::call!(self.actor, DbActorMessage::GetChannel, id)
            .map_err(|e| rpc_failed("GetChannel", e))?
    }

    /// Inserts the channel and reads it back through the parent join.
    ///
    /// `None` means the row was written but one of its parents is missing.
    pub async fn create_channel(&self, channel: NewChannel) -> Result<Option<ChannelView>, DmrError> {
        ractor::call!(self.actor, DbActorMessage::CreateChannel, channel)
            .map_err(|e| rpc_failed("CreateChannel", e))?
    }

    pub async fn update_channel(
        &self,
        id: i64,
        channel: NewChannel,
    ) -> Result<Option<ChannelView>, DmrError> {
        ractor::call!(self.actor, DbActorMessage::UpdateChannel, id, channel)
            .map_err(|e| rpc_failed("UpdateChannel", e))?
    }

    pub async fn delete_channel(&self, id: i64) -> Result<u64, DmrError> {
        ractor::call!(self.actor, DbActorMessage::DeleteChannel, id)
            .map_err(|e| rpc_failed("DeleteChannel", e))?
    }

    pub async fn delete_channels_for_repeater(&self, repeater_id: i64) -> Result<u64, DmrError> {
        ractor::call!(self.actor, DbActorMessage::DeleteChannelsForRepeater, repeater_id)
            .map_err(|e| rpc_failed("DeleteChannelsForRepeater", e))?
    }

    pub async fn begin_sync(&self, sync_type: &str) -> Result<i64, DmrError> {
        ractor::call!(self.actor, DbActorMessage::BeginSync, sync_type.to_string())
            .map_err(|e| rpc_failed("BeginSync", e))?
    }

    pub async fn complete_sync(
        &self,
        id: i64,
        status: SyncStatus,
        records_synced: i64,
    ) -> Result<SyncRecord, DmrError> {
        ractor::call!(self.actor, DbActorMessage::CompleteSync, id, status, records_synced)
            .map_err(|e| rpc_failed("CompleteSync", e))?
    }

    pub async fn last_sync(&self, sync_type: &str) -> Result<Option<SyncRecord>, DmrError> {
        ractor::call!(self.actor, DbActorMessage::LastSync, sync_type.to_string())
            .map_err(|e| rpc_failed("LastSync", e))?
    }

    pub async fn stats(&self) -> Result<Stats, DmrError> {
        ractor::call!(self.actor, DbActorMessage::Stats).map_err(|e| rpc_failed("Stats", e))?
    }
}

struct DbActorState {
    pool: SqlitePool,
}

struct DbActor;

#[ractor::async_trait]
impl Actor for DbActor {
    type Msg = DbActorMessage;
    type State = DbActorState;
    type Arguments = String;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        database_url: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        // Channels may outlive their parents, so SQLite must not enforce the declared keys.
        let connect_opts = SqliteConnectOptions::from_str(database_url.as_str())
            .map_err(|e| ActorProcessingErr::from(format!("invalid database url: {e}")))?
            .create_if_missing(true)
            .foreign_keys(false)
            .busy_timeout(Duration::from_secs(5))
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .connect_with(connect_opts)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db connect failed: {e}")))?;

        apply_schema(&pool)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db schema init failed: {e}")))?;

        info!("DbActor initialized");
        Ok(DbActorState { pool })
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        let pool = &state.pool;
        match message {
            DbActorMessage::ListRepeaters(reply) => {
                let _ = reply.send(repeaters::list(pool).await);
            }
            DbActorMessage::GetRepeater(id, reply) => {
                let _ = reply.send(repeaters::get(pool, id).await);
            }
            DbActorMessage::SearchRepeaters(query, reply) => {
                let _ = reply.send(repeaters::search(pool, &query).await);
            }
            DbActorMessage::CreateRepeater(input, reply) => {
                let _ = reply.send(repeaters::create(pool, input).await);
            }
            DbActorMessage::UpdateRepeater(id, input, reply) => {
                let _ = reply.send(repeaters::update(pool, id, input).await);
            }
            DbActorMessage::DeleteRepeater(id, reply) => {
                let _ = reply.send(repeaters::delete(pool, id).await);
            }
            DbActorMessage::ListTalkgroups(reply) => {
                let _ = reply.send(talkgroups::list(pool).await);
            }
            DbActorMessage::GetTalkgroup(id, reply) => {
                let _ = reply.send(talkgroups::get(pool, id).await);
            }
            DbActorMessage::GetTalkgroupByNumber(number, reply) => {
                let _ = reply.send(talkgroups::get_by_number(pool, number).await);
            }
            DbActorMessage::SearchTalkgroups(query, reply) => {
                let _ = reply.send(talkgroups::search(pool, &query).await);
            }
            DbActorMessage::CreateTalkgroup(input, reply) => {
                let _ = reply.send(talkgroups::create(pool, input).await);
            }
            DbActorMessage::UpsertTalkgroup(input, reply) => {
                let _ = reply.send(talkgroups::upsert(pool, input).await);
            }
            DbActorMessage::UpdateTalkgroup(id, input, reply) => {
                let _ = reply.send(talkgroups::update(pool, id, input).await);
            }
            DbActorMessage::DeleteTalkgroup(id, reply) => {
                let _ = reply.send(talkgroups::delete(pool, id).await);
            }
            DbActorMessage::ListChannels(repeater_id, reply) => {
                let _ = reply.send(channels::list(pool, repeater_id).await);
            }
            DbActorMessage::GetChannel(id, reply) => {
                let _ = reply.send(channels::get(pool, id).await);
            }
            DbActorMessage::CreateChannel(channel, reply) => {
                let res = match channels::create(pool, channel).await {
                    Ok(id) => channels::get(pool, id).await,
                    Err(e) => Err(e),
                };
                let _ = reply.send(res);
            }
            DbActorMessage::UpdateChannel(id, channel, reply) => {
                let res = match channels::update(pool, id, channel).await {
                    Ok(true) => channels::get(pool, id).await,
                    Ok(false) => Ok(None),
                    Err(e) => Err(e),
                };
                let _ = reply.send(res);
            }
            DbActorMessage::DeleteChannel(id, reply) => {
                let _ = reply.send(channels::delete(pool, id).await);
            }
            DbActorMessage::DeleteChannelsForRepeater(repeater_id, reply) => {
                let _ = reply.send(channels::delete_for_repeater(pool, repeater_id).await);
            }
            DbActorMessage::BeginSync(sync_type, reply) => {
                let _ = reply.send(sync_log::begin(pool, &sync_type).await);
            }
            DbActorMessage::CompleteSync(id, status, records_synced, reply) => {
                let _ = reply.send(sync_log::complete(pool, id, status, records_synced).await);
            }
            DbActorMessage::LastSync(sync_type, reply) => {
                let _ = reply.send(sync_log::last(pool, &sync_type).await);
            }
            DbActorMessage::Stats(reply) => {
                let _ = reply.send(queries::stats(pool).await);
            }
        }
        Ok(())
    }
}

/// Spawn the database actor and return a cloneable handle.
pub async fn spawn(database_url: &str) -> Result<DbActorHandle, DmrError> {
    // Unnamed: ractor names are process-global and several stores may coexist in one process.
    let (actor, _jh) = ractor::Actor::spawn(None, DbActor, database_url.to_string())
        .await
        .map_err(|e| DmrError::Actor(format!("failed to spawn DbActor: {e}")))?;

    Ok(DbActorHandle { actor })
}

async fn apply_schema(pool: &SqlitePool) -> Result<(), DmrError> {
    for stmt in SQLITE_INIT.split(';') {
        let s = stmt.trim();
        if s.is_empty() {
            continue;
        }
        sqlx::query(s).execute(pool).await?;
    }
    Ok(())
}
