//! Controllers and the registry the dispatcher looks them up in.
//!
//! A controller is registered under the name used by the `controller`
//! routing parameter. The registry keeps a factory per name, so every
//! request gets its own controller instance.

mod context;

use std::{collections::HashMap, fmt::Debug};

use crate::{router::RoutingParams, Application, Auth, Result};

pub use context::Context;

pub trait Controller {
    /// Runs `action`; unknown actions should end in [Context::forward_404].
    fn dispatch_action(
        &mut self,
        ctx: &mut Context<'_>,
        action: &str,
        params: &RoutingParams,
    ) -> Result<String>;

    /// Which actions require an authenticated session.
    fn auth(&self) -> Option<&Auth> {
        None
    }
}

pub type ControllerService = Box<dyn Controller + Send + 'static>;

pub type ControllerFactory = dyn Fn(&Application) -> ControllerService + Send + Sync + 'static;

#[derive(Default)]
pub struct ControllerRegistry {
    factories: HashMap<String, Box<ControllerFactory>>,
}

impl Debug for ControllerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerRegistry")
            .field("controllers", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `factory` under `name`, replacing any earlier one.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&Application) -> ControllerService + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn create(&self, name: &str, application: &Application) -> Option<ControllerService> {
        self.factories
            .get(name)
            .map(|factory| factory(application))
    }
}

/// `user` -> `UserController`, used in diagnostics.
pub fn controller_class_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => format!("{}{}Controller", first.to_uppercase(), chars.as_str()),
        None => "Controller".to_string(),
    }
}
