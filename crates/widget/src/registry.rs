use std::rc::Rc;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::config::WidgetConfig;
use crate::error::RegistryError;
use crate::widget::{Capabilities, Widget, WidgetControls};

/// The widgets of one page, keyed by the id of their input control.
///
/// All widgets share the same configuration and capabilities.
pub struct WidgetRegistry {
    config: Rc<WidgetConfig>,
    caps: Capabilities,
    widgets: FxHashMap<String, Widget>,
}

impl WidgetRegistry {
    pub fn new(config: WidgetConfig, caps: Capabilities) -> Self {
        WidgetRegistry {
            config: Rc::new(config),
            caps,
            widgets: FxHashMap::default(),
        }
    }

    /// Creates the widget for `controls` and renders its initial state.
    ///
    /// Each input control can be registered only once.
    pub fn register(&mut self, controls: WidgetControls) -> Result<Widget, RegistryError> {
        if self.widgets.contains_key(&controls.input) {
            return Err(RegistryError::DuplicateControl(controls.input));
        }
        let id = controls.input.clone();
        let widget = Widget::new(controls, Rc::clone(&self.config), self.caps.clone());
        self.widgets.insert(id.clone(), widget.clone());
        debug!(control = %id, "widget registered");
        widget.initialize();
        Ok(widget)
    }

    #[inline]
    pub fn get(&self, control_id: &str) -> Option<&Widget> {
        self.widgets.get(control_id)
    }

    /// Forwards an edit event. Returns `false` for unknown controls and unchanged input.
    pub fn handle_edit(&self, control_id: &str) -> bool {
        self.get(control_id).is_some_and(Widget::handle_edit)
    }

    /// Forwards a form submission. Returns the markup written to the output field.
    pub fn handle_submit(&self, control_id: &str) -> Option<String> {
        self.get(control_id).map(Widget::handle_submit)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    #[inline]
    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }
}
