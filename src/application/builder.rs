use essentials::debug;

use crate::{
    controller::{ControllerRegistry, ControllerService},
    Application, Router, Settings,
};

/// A builder for an [Application].
pub struct ApplicationBuilder {
    router: Router,
    settings: Settings,
    controllers: ControllerRegistry,
}

impl ApplicationBuilder {
    pub(super) fn new(router: Router) -> Self {
        Self {
            router,
            settings: Settings::default(),
            controllers: ControllerRegistry::new(),
        }
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Register a controller under the name routes refer to it by.
    pub fn register_controller<F>(mut self, name: &str, factory: F) -> Self
    where
        F: Fn(&Application) -> ControllerService + Send + Sync + 'static,
    {
        self.controllers.register(name, factory);
        self
    }

    /// Build the application. Pending route changes are compiled here, the
    /// table is read-only afterwards.
    pub fn build(mut self) -> Application {
        if self.router.is_dirty() {
            debug!("compiling {} routes", self.router.routes().len());
            self.router.compile_routes();
        }
        Application {
            settings: self.settings,
            router: self.router,
            controllers: self.controllers,
        }
    }
}
