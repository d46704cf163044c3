//! MongoDB task storage implementation
//!
//! One document per task in a single collection:
//! `{ _id, name, completed, createdAt }`, with `createdAt` stored as a BSON
//! datetime. New documents get a native ObjectId which is handed to clients
//! as its hex string. Collections keyed by plain strings are also served,
//! including string keys that happen to be 24 hex characters.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Bson, DateTime as BsonDateTime, Document};
use mongodb::options::{ClientOptions, ReturnDocument};
use mongodb::{Client, Collection};

use super::model::{NewTask, Task, TaskDraft};
use super::repository::TaskRepository;
use crate::{Error, Result};

const APP_NAME: &str = "tasks-api";

/// Where to find the task collection
#[derive(Debug, Clone)]
pub struct MongoTaskStoreConfig {
    pub uri: String,
    pub database: String,
    pub collection: String,
}

/// Task store backed by a MongoDB collection.
///
/// The client pools connections internally and is shared by all requests.
pub struct MongoTaskStore {
    client: Client,
    collection: Collection<Document>,
}

impl MongoTaskStore {
    /// Connect to the server and check it answers.
    ///
    /// The driver connects lazily, so a `ping` is issued against the
    /// configured database to surface an unreachable server at startup.
    pub async fn connect(config: &MongoTaskStoreConfig) -> Result<Self> {
        let mut options = ClientOptions::parse(&config.uri)
            .await
            .map_err(|e| Error::Connection(format!("Invalid MongoDB URI: {}", e)))?;
        options.app_name = Some(APP_NAME.to_string());

        let client = Client::with_options(options).map_err(|e| Error::Connection(e.to_string()))?;
        let database = client.database(&config.database);
        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;

        tracing::info!(
            database = %config.database,
            collection = %config.collection,
            "Connected to MongoDB"
        );

        Ok(Self {
            collection: database.collection(&config.collection),
            client,
        })
    }
}

#[async_trait]
impl TaskRepository for MongoTaskStore {
    async fn find_all(&self) -> Result<Vec<Task>> {
        let mut cursor = self.collection.find(doc! {}).await.map_err(query_error)?;

        let mut tasks = Vec::new();
        while let Some(document) = cursor.try_next().await.map_err(query_error)? {
            tasks.push(task_from_document(document)?);
        }
        Ok(tasks)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Task>> {
        let document = self
            .collection
            .find_one(id_filter(id))
            .await
            .map_err(query_error)?;
        document.map(task_from_document).transpose()
    }

    async fn insert(&self, task: &NewTask) -> Result<String> {
        let result = self
            .collection
            .insert_one(task_to_document(task))
            .await
            .map_err(query_error)?;
        id_to_string(&result.inserted_id)
    }

    async fn replace_by_id(&self, id: &str, draft: &TaskDraft) -> Result<Option<Task>> {
        let update = doc! {
            "$set": {
                "name": draft.name.as_str(),
                "completed": draft.completed,
            }
        };
        let document = self
            .collection
            .find_one_and_update(id_filter(id), update)
            .return_document(ReturnDocument::After)
            .await
            .map_err(query_error)?;
        document.map(task_from_document).transpose()
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool> {
        let result = self
            .collection
            .delete_one(id_filter(id))
            .await
            .map_err(query_error)?;
        Ok(result.deleted_count > 0)
    }

    fn backend(&self) -> &'static str {
        "mongodb"
    }

    async fn shutdown(&self) -> Result<()> {
        self.client.clone().shutdown().await;
        tracing::info!("MongoDB client shut down");
        Ok(())
    }
}

fn query_error(err: mongodb::error::Error) -> Error {
    Error::Query(err.to_string())
}

/// Ids that look like an ObjectId match either that ObjectId or a string key
/// with the same 24 hex characters; anything else is taken as a string key.
fn id_filter(id: &str) -> Document {
    match ObjectId::parse_str(id) {
        Ok(oid) => doc! { "_id": { "$in": [oid, id] } },
        Err(_) => doc! { "_id": id },
    }
}

fn id_to_string(id: &Bson) -> Result<String> {
    match id {
        Bson::ObjectId(oid) => Ok(oid.to_hex()),
        Bson::String(s) if !s.is_empty() => Ok(s.clone()),
        other => Err(Error::Decode(format!("Unsupported _id value: {}", other))),
    }
}

fn task_to_document(task: &NewTask) -> Document {
    doc! {
        "name": task.name.as_str(),
        "completed": task.completed,
        "createdAt": BsonDateTime::from_millis(task.created_at.timestamp_millis()),
    }
}

fn task_from_document(document: Document) -> Result<Task> {
    let id = match document.get("_id") {
        Some(id) => id_to_string(id)?,
        None => return Err(Error::Decode("Document has no _id".to_string())),
    };
    let decode = |field: &str, e: mongodb::bson::document::ValueAccessError| {
        Error::Decode(format!("Document {} field `{}`: {}", id, field, e))
    };

    let name = document
        .get_str("name")
        .map_err(|e| decode("name", e))?
        .to_string();
    let completed = document
        .get_bool("completed")
        .map_err(|e| decode("completed", e))?;
    let millis = document
        .get_datetime("createdAt")
        .map_err(|e| decode("createdAt", e))?
        .timestamp_millis();
    let created_at = DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| {
        Error::Decode(format!("Document {} has out-of-range createdAt", id))
    })?;

    Ok(Task {
        id,
        name,
        completed,
        created_at,
    })
}
