use std::collections::HashSet;

use crate::Session;

/// Which actions of a controller need an authenticated session.
#[derive(Debug, Clone, Default)]
pub enum Auth {
    #[default]
    None,
    All,
    Actions(HashSet<String>),
}

impl Auth {
    pub fn all() -> Self {
        Self::All
    }

    pub fn actions<I, S>(actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Actions(actions.into_iter().map(Into::into).collect())
    }

    pub fn add_action(&mut self, action: impl Into<String>) {
        match self {
            Self::All => {}
            Self::Actions(actions) => {
                actions.insert(action.into());
            }
            Self::None => *self = Self::actions([action]),
        }
    }

    pub fn needs_authentication(&self, action: &str) -> bool {
        match self {
            Self::None => false,
            Self::All => true,
            Self::Actions(actions) => actions.contains(action),
        }
    }

    pub fn is_authenticated(&self, session: &Session) -> bool {
        session.is_authenticated()
    }

    pub fn set_authenticated(&self, session: &mut Session, status: bool) {
        session.set_authenticated(status);
    }
}
