//! Bucket contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide keyed CRUD, filtered/ordered queries, listener fan-out and
//!   off-thread execution over the `todos` property-bag storage.
//! - Keep SQL details inside the store persistence boundary.
//!
//! # Invariants
//! - Filters compare against the encoded property value with SQLite's
//!   `json_extract` semantics: JSON booleans extract as integers 1/0, and
//!   numeric comparison treats `1.0` as equal to `1`.
//! - Save is an upsert; delete of an absent key is a silent no-op.
//! - Listener callbacks fire after the row change committed, outside any
//!   internal lock.

use crate::db::DbError;
use crate::model::schema;
use crate::model::todo::{Todo, TodoKey};
use crate::store::listener::{BucketListener, ChangeType, ListenerId};
use crate::store::query::{ObjectCursor, ObjectQuery};
use log::{debug, error};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, Row};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use uuid::Uuid;

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level error for bucket persistence and query operations.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    NotFound(TodoKey),
    InvalidData(String),
    UnsupportedFilter(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(key) => write!(f, "record not found: {key}"),
            Self::InvalidData(message) => write!(f, "invalid persisted record data: {message}"),
            Self::UnsupportedFilter(message) => write!(f, "unsupported filter value: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) | Self::UnsupportedFilter(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Synced object store contract required by the service layer.
///
/// The store owns all record state and is safe to call from multiple
/// threads; the trait seam keeps callers independent of the concrete
/// backing (local SQLite here, a remote-synced service in production).
pub trait ObjectBucket: Send + Sync {
    /// Mints a record with a fresh store-assigned key and schema defaults.
    /// The record is not persisted until the first `save`.
    fn new_object(&self) -> Todo;

    /// Loads one record by key. Fails with `StoreError::NotFound` when the
    /// key is absent.
    fn get(&self, key: &TodoKey) -> StoreResult<Todo>;

    /// Durably persists the record (insert or update) and notifies
    /// save listeners.
    fn save(&self, todo: &Todo) -> StoreResult<()>;

    /// Removes the record and notifies delete listeners. Deleting a record
    /// that no longer exists is a no-op.
    fn delete(&self, todo: &Todo) -> StoreResult<()>;

    /// Counts records matching the query filters.
    fn count(&self, query: &ObjectQuery) -> StoreResult<u64>;

    /// Executes the query and returns a cursor over matching records.
    fn find(&self, query: &ObjectQuery) -> StoreResult<ObjectCursor>;

    /// Registers a change listener. The bucket holds a strong handle until
    /// `remove_listener` is called with the returned id.
    fn add_listener(&self, listener: Arc<dyn BucketListener>) -> ListenerId;

    /// Deregisters a listener. Unknown ids are ignored.
    fn remove_listener(&self, id: ListenerId);

    /// Runs work on a background thread, detached from the caller.
    fn execute_async(&self, task: Box<dyn FnOnce() + Send + 'static>);
}

/// Change arriving from the sync transport.
#[derive(Debug, Clone)]
pub struct RemoteChange {
    pub kind: ChangeType,
    pub key: TodoKey,
    /// Full property bag after the change; `None` for removals.
    pub properties: Option<Map<String, Value>>,
}

/// SQLite-backed bucket. Cheap to clone; clones share one connection and
/// one listener registry.
#[derive(Clone)]
pub struct SqliteBucket {
    inner: Arc<BucketInner>,
}

struct BucketInner {
    conn: Mutex<Connection>,
    listeners: Mutex<Vec<(ListenerId, Arc<dyn BucketListener>)>>,
    next_listener_id: AtomicU64,
}

impl SqliteBucket {
    /// Wraps an opened, migrated connection (see `db::open_db`).
    pub fn new(conn: Connection) -> Self {
        Self {
            inner: Arc::new(BucketInner {
                conn: Mutex::new(conn),
                listeners: Mutex::new(Vec::new()),
                next_listener_id: AtomicU64::new(1),
            }),
        }
    }

    /// Applies a change delivered by the sync transport.
    ///
    /// Fires `on_before_network_update` ahead of the row change and
    /// `on_network_change` after it. Local-save listeners are not invoked;
    /// remote changes are not local saves.
    ///
    /// The incoming property bag is stored verbatim, so properties this
    /// schema does not know about survive untouched.
    pub fn apply_remote_change(&self, change: &RemoteChange) -> StoreResult<()> {
        self.notify(|listener| listener.on_before_network_update(&change.key));

        match change.kind {
            ChangeType::Insert | ChangeType::Modify => {
                let properties = change.properties.as_ref().ok_or_else(|| {
                    StoreError::InvalidData(format!(
                        "remote {:?} for {} carried no properties",
                        change.kind, change.key
                    ))
                })?;
                self.upsert(&change.key, properties)?;
            }
            ChangeType::Remove => {
                let conn = self.lock_conn();
                conn.execute(
                    "DELETE FROM todos WHERE key = ?1;",
                    [change.key.to_string()],
                )?;
            }
        }

        self.notify(|listener| listener.on_network_change(change.kind, &change.key));
        Ok(())
    }

    fn upsert(&self, key: &TodoKey, properties: &Map<String, Value>) -> StoreResult<()> {
        let encoded = serde_json::to_string(properties).map_err(|err| {
            StoreError::InvalidData(format!("unencodable properties for {key}: {err}"))
        })?;

        let conn = self.lock_conn();
        conn.execute(
            "INSERT INTO todos (key, properties) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                properties = excluded.properties,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key.to_string(), encoded],
        )?;
        Ok(())
    }

    fn lock_conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.inner
            .conn
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, invoke: impl Fn(&Arc<dyn BucketListener>)) {
        // Snapshot under the lock, invoke outside it: a callback may call
        // back into the bucket or remove itself.
        let snapshot: Vec<Arc<dyn BucketListener>> = self
            .inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in &snapshot {
            invoke(listener);
        }
    }
}

impl ObjectBucket for SqliteBucket {
    fn new_object(&self) -> Todo {
        Todo::with_key(Uuid::new_v4())
    }

    fn get(&self, key: &TodoKey) -> StoreResult<Todo> {
        let conn = self.lock_conn();
        let mut stmt = conn.prepare("SELECT key, properties FROM todos WHERE key = ?1;")?;
        let mut rows = stmt.query([key.to_string()])?;

        match rows.next()? {
            Some(row) => parse_todo_row(row),
            None => Err(StoreError::NotFound(*key)),
        }
    }

    fn save(&self, todo: &Todo) -> StoreResult<()> {
        let properties = schema::to_properties(todo);
        debug!(
            "event=todo_save module=store key={} properties={}",
            todo.key,
            Value::Object(properties.clone())
        );
        self.upsert(&todo.key, &properties)?;
        self.notify(|listener| listener.on_save_object(todo));
        Ok(())
    }

    fn delete(&self, todo: &Todo) -> StoreResult<()> {
        let changed = {
            let conn = self.lock_conn();
            conn.execute("DELETE FROM todos WHERE key = ?1;", [todo.key.to_string()])?
        };

        if changed > 0 {
            debug!("event=todo_delete module=store key={}", todo.key);
            self.notify(|listener| listener.on_delete_object(todo));
        }
        Ok(())
    }

    fn count(&self, query: &ObjectQuery) -> StoreResult<u64> {
        let (where_sql, bind_values) = filter_clause(query)?;
        let sql = format!("SELECT COUNT(*) FROM todos{where_sql};");

        let conn = self.lock_conn();
        let count =
            conn.query_row(&sql, params_from_iter(bind_values), |row| row.get::<_, u64>(0))?;
        Ok(count)
    }

    fn find(&self, query: &ObjectQuery) -> StoreResult<ObjectCursor> {
        let (where_sql, mut bind_values) = filter_clause(query)?;
        let order_sql = match query.order_property() {
            Some(property) => {
                bind_values.push(SqlValue::Text(json_path(property)));
                // Records missing the order property extract NULL and sort
                // first; equal values tie-break by ascending key.
                " ORDER BY json_extract(properties, ?) ASC, key ASC"
            }
            None => " ORDER BY key ASC",
        };
        let sql = format!("SELECT key, properties FROM todos{where_sql}{order_sql};");

        let conn = self.lock_conn();
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;

        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_todo_row(row)?);
        }
        Ok(ObjectCursor::new(records))
    }

    fn add_listener(&self, listener: Arc<dyn BucketListener>) -> ListenerId {
        let id = ListenerId(self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed));
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(registered, _)| *registered != id);
    }

    fn execute_async(&self, task: Box<dyn FnOnce() + Send + 'static>) {
        let spawned = thread::Builder::new()
            .name("bucket-worker".to_string())
            .spawn(task);
        if let Err(err) = spawned {
            error!("event=bucket_async module=store status=error error={err}");
        }
    }
}

fn parse_todo_row(row: &Row<'_>) -> StoreResult<Todo> {
    let key_text: String = row.get::<_, String>(0)?;
    let key = Uuid::parse_str(&key_text).map_err(|_| {
        StoreError::InvalidData(format!("invalid key value `{key_text}` in todos.key"))
    })?;

    let properties_text: String = row.get::<_, String>(1)?;
    let properties: Map<String, Value> = serde_json::from_str(&properties_text).map_err(|err| {
        StoreError::InvalidData(format!("invalid property bag for {key}: {err}"))
    })?;

    Ok(schema::build(key, &properties))
}

fn filter_clause(query: &ObjectQuery) -> StoreResult<(String, Vec<SqlValue>)> {
    if query.filters().is_empty() {
        return Ok((String::new(), Vec::new()));
    }

    let mut clauses = Vec::new();
    let mut bind_values = Vec::new();
    for (property, value) in query.filters() {
        clauses.push("json_extract(properties, ?) = ?");
        bind_values.push(SqlValue::Text(json_path(property)));
        bind_values.push(encode_filter_value(property, value)?);
    }

    Ok((format!(" WHERE {}", clauses.join(" AND ")), bind_values))
}

fn encode_filter_value(property: &str, value: &Value) -> StoreResult<SqlValue> {
    match value {
        // json_extract yields integer 1/0 for JSON booleans, so a boolean
        // filter compares as its integer projection.
        Value::Bool(flag) => Ok(SqlValue::Integer(i64::from(*flag))),
        Value::Number(number) => number
            .as_i64()
            .map(SqlValue::Integer)
            .or_else(|| number.as_f64().map(SqlValue::Real))
            .ok_or_else(|| {
                StoreError::UnsupportedFilter(format!(
                    "property `{property}` number {number} exceeds supported range"
                ))
            }),
        Value::String(text) => Ok(SqlValue::Text(text.clone())),
        other => Err(StoreError::UnsupportedFilter(format!(
            "property `{property}` cannot be compared to {other}"
        ))),
    }
}

fn json_path(property: &str) -> String {
    format!("$.{property}")
}
