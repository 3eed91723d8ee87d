//! Per-request sessions.
//!
//! A [Session] is loaded from a [Datastore] before dispatch, handed to the
//! application by `&mut`, and saved back once the response is ready.

pub mod datastore;

use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

pub use datastore::{Datastore, InMemoryDatastore};

const AUTHENTICATED_KEY: &str = "_authenticated";

pub type Values = HashMap<String, Value>;

#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    values: Values,
    /// The id the client presented, when it has to be dropped from the store.
    replaced: Option<String>,
    is_new: bool,
    destroyed: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// A fresh session with a new id.
    pub fn new() -> Self {
        Self {
            id: generate_id(),
            values: Values::new(),
            replaced: None,
            is_new: true,
            destroyed: false,
        }
    }

    pub fn restore(id: impl Into<String>, values: Values) -> Self {
        Self {
            id: id.into(),
            values,
            replaced: None,
            is_new: false,
            destroyed: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn values(&self) -> &Values {
        &self.values
    }

    /// True when the client has to be sent a new cookie.
    pub fn needs_cookie(&self) -> bool {
        self.is_new || self.replaced.is_some()
    }

    /// Ids that must be removed from the store.
    pub fn replaced_id(&self) -> Option<&str> {
        self.replaced.as_deref()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.values.remove(name)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Empties the session and drops it from the store.
    pub fn destroy(&mut self) {
        self.values.clear();
        self.destroyed = true;
    }

    /// Moves the session to a new id, keeping its values.
    pub fn regenerate_id(&mut self) {
        let previous = std::mem::replace(&mut self.id, generate_id());
        if !self.is_new && self.replaced.is_none() {
            self.replaced = Some(previous);
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.get(AUTHENTICATED_KEY)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Changing the authentication state always issues a new id.
    pub fn set_authenticated(&mut self, status: bool) {
        self.set(AUTHENTICATED_KEY, status);
        self.regenerate_id();
    }
}

fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn new_sessions_need_a_cookie() {
        let session = Session::new();
        assert!(session.needs_cookie());
        assert!(!session.is_authenticated());
        assert_eq!(session.id().len(), 32);
    }

    #[test]
    fn authentication_regenerates_the_id() {
        let mut session = Session::restore("old", Values::from([("name".to_string(), json!("me"))]));
        assert!(!session.needs_cookie());
        session.set_authenticated(true);
        assert!(session.is_authenticated());
        assert_ne!(session.id(), "old");
        assert_eq!(session.replaced_id(), Some("old"));
        assert_eq!(session.get_str("name"), Some("me"));
        assert!(session.needs_cookie());

        session.regenerate_id();
        assert_eq!(session.replaced_id(), Some("old"));
    }

    #[test]
    fn values() {
        let mut session = Session::new();
        session.set("count", 3);
        session.set("tags", json!(["a", "b"]));
        assert_eq!(session.get("count"), Some(&json!(3)));
        assert_eq!(session.remove("count"), Some(json!(3)));
        assert_eq!(session.get("count"), None);
        session.clear();
        assert!(session.values().is_empty());
        session.set("x", true);
        session.destroy();
        assert!(session.is_destroyed());
        assert!(session.values().is_empty());
    }
}
