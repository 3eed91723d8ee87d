use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use super::Values;

#[async_trait]
pub trait Datastore {
    /// Values of a live session; expired sessions are gone.
    async fn fetch_session(&self, key: &str) -> Result<Option<Values>>;

    async fn save_session(&self, key: &str, values: Values, expires_in: u64) -> Result<()>;

    async fn remove_session(&self, key: &str) -> Result<()>;
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryDatastore {
    data: Arc<Mutex<HashMap<String, InMemoryValue>>>,
}

#[derive(Debug)]
struct InMemoryValue {
    values: Values,
    expiry: i64,
}

impl InMemoryDatastore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.lock().map(|data| data.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl Datastore for InMemoryDatastore {
    async fn fetch_session(&self, key: &str) -> Result<Option<Values>> {
        let mut data = self
            .data
            .lock()
            .map_err(|_| anyhow!("Failed to lock data for key: {}", key))?;
        let now = chrono::Utc::now().timestamp();
        match data.get(key) {
            Some(session) if session.expiry > now => Ok(Some(session.values.clone())),
            Some(_) => {
                data.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn save_session(&self, key: &str, values: Values, expires_in: u64) -> Result<()> {
        let mut data = self
            .data
            .lock()
            .map_err(|_| anyhow!("Failed to lock data for key: {}", key))?;
        let now = chrono::Utc::now().timestamp();
        // sessions whose clients never came back
        data.retain(|_, session| session.expiry > now);
        let expires_in = i64::try_from(expires_in).unwrap_or(i64::MAX);
        data.insert(
            key.to_string(),
            InMemoryValue {
                values,
                expiry: now.saturating_add(expires_in),
            },
        );
        Ok(())
    }

    async fn remove_session(&self, key: &str) -> Result<()> {
        self.data
            .lock()
            .map_err(|_| anyhow!("Failed to lock data for key: {}", key))?
            .remove(key);
        Ok(())
    }
}
