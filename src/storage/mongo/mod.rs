//! `MongoDB` storage backend.
//!
//! Collections:
//! ```text
//! {database}/
//! ├── users       { _id, username }
//! └── exercises   { _id, userId, description, duration, date }
//! ```
//!
//! `exercises` carries a compound index on `(userId, date)` serving the log query.

mod documents;

use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{DateTime as BsonDateTime, Document, doc};
use mongodb::options::{ClientOptions, FindOptions, IndexOptions};
use mongodb::{Client, Collection, Database, IndexModel};

use crate::config::MongoStorageConfig;
use crate::domain::{Exercise, LogFilter, NewExercise, NewUser, User, UserId};
use crate::error::{StorageError, StorageResult};
use crate::storage::traits::{ExerciseStorage, Storage, UserStorage};

use documents::{ExerciseDocument, UserDocument, start_of_day};

const USERS: &str = "users";
const EXERCISES: &str = "exercises";

/// `MongoDB`-backed storage.
pub struct MongoStorage {
    client: Client,
    db: Database,
}

impl MongoStorage {
    /// Connect to the configured deployment.
    ///
    /// The driver connects lazily; call [`Storage::health_check`] to verify
    /// the server is reachable.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection string is invalid.
    pub async fn connect(config: &MongoStorageConfig) -> StorageResult<Self> {
        let mut options = ClientOptions::parse(&config.uri)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let timeout = Duration::from_secs(config.connect_timeout);
        options.connect_timeout = Some(timeout);
        options.server_selection_timeout = Some(timeout);
        options
            .app_name
            .get_or_insert_with(|| env!("CARGO_PKG_NAME").to_string());

        let database = config
            .resolve_database(options.default_database.as_deref())
            .to_string();
        tracing::info!(hosts = ?options.hosts, %database, "Connecting to MongoDB");

        let client =
            Client::with_options(options).map_err(|e| StorageError::Connection(e.to_string()))?;
        let db = client.database(&database);

        Ok(Self { client, db })
    }

    /// Create the indexes used by the log query. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the index definition.
    pub async fn initialize_indexes(&self) -> StorageResult<()> {
        let user_date_index = IndexModel::builder()
            .keys(doc! { "userId": 1, "date": 1 })
            .options(
                IndexOptions::builder()
                    .name("user_date_idx".to_string())
                    .build(),
            )
            .build();

        self.exercises()
            .create_index(user_date_index, None)
            .await
            .map_err(|e| query_failed("create exercises index", &e))?;

        tracing::debug!("MongoDB indexes ready");
        Ok(())
    }

    /// Name of the database in use.
    #[must_use]
    pub fn database_name(&self) -> &str {
        self.db.name()
    }

    fn users(&self) -> Collection<UserDocument> {
        self.db.collection(USERS)
    }

    fn exercises(&self) -> Collection<ExerciseDocument> {
        self.db.collection(EXERCISES)
    }
}

fn query_failed(action: &str, err: &mongodb::error::Error) -> StorageError {
    tracing::error!(action, error = %err, "MongoDB operation failed");
    StorageError::Query(format!("{action}: {err}"))
}

fn inserted_object_id(id: &mongodb::bson::Bson) -> StorageResult<ObjectId> {
    id.as_object_id()
        .ok_or_else(|| StorageError::Serialization(format!("unexpected inserted id {id}")))
}

fn parse_object_id(id: &UserId) -> StorageResult<ObjectId> {
    ObjectId::parse_str(id.as_str()).map_err(|_| StorageError::InvalidId(id.to_string()))
}

/// Build the `exercises` query for a log filter.
///
/// Bounds cover whole days: `to` becomes an exclusive bound at the start of
/// the following day, so entries stored with a time of day still match.
fn log_query(filter: &LogFilter) -> Document {
    let mut query = doc! { "userId": filter.user_id.as_str() };

    let mut date = Document::new();
    if let Some(from) = filter.from {
        date.insert("$gte", BsonDateTime::from_chrono(start_of_day(from)));
    }
    if let Some(to) = filter.to {
        match to.succ_opt() {
            Some(next) => date.insert("$lt", BsonDateTime::from_chrono(start_of_day(next))),
            None => date.insert("$lte", BsonDateTime::from_chrono(start_of_day(to))),
        };
    }
    if !date.is_empty() {
        query.insert("date", date);
    }

    query
}

#[async_trait]
impl UserStorage for MongoStorage {
    async fn insert_user(&self, user: NewUser) -> StorageResult<User> {
        let mut doc = UserDocument::from(user);
        let result = self
            .users()
            .insert_one(&doc, None)
            .await
            .map_err(|e| query_failed("insert user", &e))?;

        doc.id = Some(inserted_object_id(&result.inserted_id)?);
        User::try_from(doc)
    }

    async fn find_user(&self, id: &UserId) -> StorageResult<Option<User>> {
        let oid = parse_object_id(id)?;
        self.users()
            .find_one(doc! { "_id": oid }, None)
            .await
            .map_err(|e| query_failed("find user", &e))?
            .map(User::try_from)
            .transpose()
    }

    async fn list_users(&self) -> StorageResult<Vec<User>> {
        let options = FindOptions::builder().sort(doc! { "_id": 1 }).build();

        let docs: Vec<UserDocument> = self
            .users()
            .find(doc! {}, options)
            .await
            .map_err(|e| query_failed("list users", &e))?
            .try_collect()
            .await
            .map_err(|e| query_failed("collect users", &e))?;

        docs.into_iter().map(User::try_from).collect()
    }
}

#[async_trait]
impl ExerciseStorage for MongoStorage {
    async fn insert_exercise(&self, exercise: NewExercise) -> StorageResult<Exercise> {
        let mut doc = ExerciseDocument::from(exercise);
        let result = self
            .exercises()
            .insert_one(&doc, None)
            .await
            .map_err(|e| query_failed("insert exercise", &e))?;

        doc.id = Some(inserted_object_id(&result.inserted_id)?);
        Exercise::try_from(doc)
    }

    async fn find_exercises(&self, filter: &LogFilter) -> StorageResult<Vec<Exercise>> {
        let mut options = FindOptions::builder().sort(doc! { "_id": 1 }).build();
        options.limit = filter
            .limit
            .map(|limit| i64::try_from(limit).unwrap_or(i64::MAX));

        let docs: Vec<ExerciseDocument> = self
            .exercises()
            .find(log_query(filter), options)
            .await
            .map_err(|e| query_failed("find exercises", &e))?
            .try_collect()
            .await
            .map_err(|e| query_failed("collect exercises", &e))?;

        docs.into_iter().map(Exercise::try_from).collect()
    }
}

#[async_trait]
impl Storage for MongoStorage {
    async fn health_check(&self) -> StorageResult<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "MongoDB health check failed");
                StorageError::Unavailable
            })?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "mongodb"
    }

    async fn shutdown(&self) {
        self.client.clone().shutdown().await;
        tracing::info!("MongoDB client shut down");
    }
}
