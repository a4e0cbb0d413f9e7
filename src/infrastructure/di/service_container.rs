//! Service container for dependency injection
//!
//! Wires the record source, the tree builder and the layout controller
//! together according to the settings.

use std::sync::Arc;

use tracing::instrument;

use crate::application::LayoutController;
use crate::config::Settings;
use crate::domain::{DisplayTree, TreeBuilder};
use crate::infrastructure::source::JsonFileSource;
use crate::infrastructure::traits::{RecordSource, RenderSurface};
use crate::infrastructure::InfraResult;

/// Container holding the session's collaborators.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Where node records come from
    pub source: Arc<dyn RecordSource>,
}

impl ServiceContainer {
    /// Create a container reading `settings.data_file`.
    pub fn new(settings: Settings) -> Self {
        let source = Arc::new(JsonFileSource::new(settings.data_file.clone()));
        Self::with_deps(settings, source)
    }

    /// Create a service container with a custom source (for testing).
    pub fn with_deps(settings: Settings, source: Arc<dyn RecordSource>) -> Self {
        let settings = Arc::new(settings);

        Self { settings, source }
    }

    pub fn tree_builder(&self) -> TreeBuilder {
        TreeBuilder::new().with_empty_leaf_policy(self.settings.empty_leaf)
    }

    /// Load the records once and build the display tree at `root_id`
    /// (settings value when None). Fails before anything is rendered.
    #[instrument(level = "debug", skip(self))]
    pub fn load_tree(&self, root_id: Option<i64>) -> InfraResult<DisplayTree> {
        let records = self.source.load()?;
        let root_id = root_id.unwrap_or(self.settings.root_id);
        Ok(self.tree_builder().build(&records, root_id)?)
    }

    /// Controller for `tree` configured from the settings.
    pub fn controller<S: RenderSurface>(&self, tree: DisplayTree, surface: S) -> LayoutController<S> {
        LayoutController::new(tree, surface)
            .with_layout_config(self.settings.layout)
            .with_viewport(self.settings.viewport)
            .with_transition_ms(self.settings.transition_ms)
    }
}
