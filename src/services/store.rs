use async_trait::async_trait;
use futures_util::StreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::options::FindOptions;
use mongodb::Database;
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::models::{Alert, Subscriber, Symbol};

/// Durable mapping of subscribers and alerts. The engine and both background
/// loops only ever talk to this trait; the Mongo implementation backs the
/// running bot, the in-memory one backs tests.
#[async_trait]
pub trait Store: Send + Sync {
    async fn ping(&self) -> Result<(), StoreError>;

    async fn find_subscriber(&self, chat_id: i64) -> Result<bool, StoreError>;
    async fn insert_subscriber(&self, chat_id: i64) -> Result<(), StoreError>;
    async fn subscriber_ids(&self) -> Result<Vec<i64>, StoreError>;

    async fn insert_alert(&self, alert: &Alert) -> Result<(), StoreError>;
    async fn active_alerts(&self) -> Result<Vec<Alert>, StoreError>;
    async fn active_alerts_for(&self, owner: i64) -> Result<Vec<Alert>, StoreError>;

    /// Flips `triggered` on a not-yet-triggered alert. Returns false when the
    /// alert is gone or a concurrent cycle already flipped it.
    async fn mark_triggered(&self, id: ObjectId) -> Result<bool, StoreError>;

    async fn delete_alert(&self, id: ObjectId) -> Result<bool, StoreError>;
    async fn delete_active_alerts(&self, owner: i64, symbol: Symbol) -> Result<u64, StoreError>;
}

// ---------------- Mongo ----------------

pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn subscribers(&self) -> mongodb::Collection<Subscriber> {
        self.db.collection::<Subscriber>("subscribers")
    }

    fn alerts(&self) -> mongodb::Collection<Alert> {
        self.db.collection::<Alert>("alerts")
    }
}

#[async_trait]
impl Store for MongoStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.db.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }

    async fn find_subscriber(&self, chat_id: i64) -> Result<bool, StoreError> {
        let found = self
            .subscribers()
            .find_one(doc! { "chat_id": chat_id }, None)
            .await?;
        Ok(found.is_some())
    }

    async fn insert_subscriber(&self, chat_id: i64) -> Result<(), StoreError> {
        let sub = Subscriber {
            id: ObjectId::new(),
            chat_id,
        };
        self.subscribers().insert_one(&sub, None).await?;
        Ok(())
    }

    async fn subscriber_ids(&self) -> Result<Vec<i64>, StoreError> {
        let mut cursor = self.subscribers().find(doc! {}, None).await?;

        let mut ids = Vec::new();
        while let Some(res) = cursor.next().await {
            ids.push(res.map_err(StoreError::from)?.chat_id);
        }
        Ok(ids)
    }

    async fn insert_alert(&self, alert: &Alert) -> Result<(), StoreError> {
        self.alerts().insert_one(alert, None).await?;
        Ok(())
    }

    async fn active_alerts(&self) -> Result<Vec<Alert>, StoreError> {
        let mut cursor = self.alerts().find(doc! { "triggered": false }, None).await?;

        let mut items = Vec::new();
        while let Some(res) = cursor.next().await {
            items.push(res.map_err(StoreError::from)?);
        }
        Ok(items)
    }

    async fn active_alerts_for(&self, owner: i64) -> Result<Vec<Alert>, StoreError> {
        let find_opts = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .build();

        let mut cursor = self
            .alerts()
            .find(doc! { "owner": owner, "triggered": false }, find_opts)
            .await?;

        let mut items = Vec::new();
        while let Some(res) = cursor.next().await {
            items.push(res.map_err(StoreError::from)?);
        }
        Ok(items)
    }

    async fn mark_triggered(&self, id: ObjectId) -> Result<bool, StoreError> {
        let res = self
            .alerts()
            .update_one(
                doc! { "_id": id, "triggered": false },
                doc! { "$set": { "triggered": true } },
                None,
            )
            .await?;
        Ok(res.matched_count > 0)
    }

    async fn delete_alert(&self, id: ObjectId) -> Result<bool, StoreError> {
        let res = self.alerts().delete_one(doc! { "_id": id }, None).await?;
        Ok(res.deleted_count > 0)
    }

    async fn delete_active_alerts(&self, owner: i64, symbol: Symbol) -> Result<u64, StoreError> {
        let res = self
            .alerts()
            .delete_many(
                doc! { "owner": owner, "symbol": symbol.as_str(), "triggered": false },
                None,
            )
            .await?;
        Ok(res.deleted_count)
    }
}

// ---------------- In-memory ----------------

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    subscribers: Vec<i64>,
    alerts: Vec<Alert>,
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn find_subscriber(&self, chat_id: i64) -> Result<bool, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.subscribers.contains(&chat_id))
    }

    async fn insert_subscriber(&self, chat_id: i64) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        // Same effect as the unique index on chat_id.
        if !inner.subscribers.contains(&chat_id) {
            inner.subscribers.push(chat_id);
        }
        Ok(())
    }

    async fn subscriber_ids(&self) -> Result<Vec<i64>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.subscribers.clone())
    }

    async fn insert_alert(&self, alert: &Alert) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.alerts.push(alert.clone());
        Ok(())
    }

    async fn active_alerts(&self) -> Result<Vec<Alert>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.alerts.iter().filter(|a| !a.triggered).cloned().collect())
    }

    async fn active_alerts_for(&self, owner: i64) -> Result<Vec<Alert>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .alerts
            .iter()
            .filter(|a| a.owner == owner && !a.triggered)
            .cloned()
            .collect())
    }

    async fn mark_triggered(&self, id: ObjectId) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().await;
        match inner.alerts.iter_mut().find(|a| a.id == id && !a.triggered) {
            Some(a) => {
                a.triggered = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_alert(&self, id: ObjectId) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().await;
        let before = inner.alerts.len();
        inner.alerts.retain(|a| a.id != id);
        Ok(inner.alerts.len() < before)
    }

    async fn delete_active_alerts(&self, owner: i64, symbol: Symbol) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().await;
        let before = inner.alerts.len();
        inner
            .alerts
            .retain(|a| !(a.owner == owner && a.symbol == symbol && !a.triggered));
        Ok((before - inner.alerts.len()) as u64)
    }
}
