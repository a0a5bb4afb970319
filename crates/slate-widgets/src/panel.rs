use std::sync::Arc;

use slate_core::{
    Canvas, Color, Component, ComponentCore, Container, ContainerCore, Platform, Rect,
};

/// A plain grouping container with an optional solid background.
pub struct Panel {
    core: ContainerCore,
    background: Option<Color>,
}

impl Panel {
    /// Construct a panel. `background` of `None` leaves the panel's area
    /// untouched so whatever is behind it shows through.
    pub fn new(background: Option<Color>) -> Arc<Self> {
        Arc::new(Self {
            core: ContainerCore::default(),
            background,
        })
    }
}

impl Component for Panel {
    fn core(&self) -> &ComponentCore {
        self.core.component_core()
    }

    fn draw(&self, canvas: &Canvas, platform: &mut dyn Platform) {
        if let Some(color) = self.background {
            let b = self.bounds();
            let (px, py) = canvas.physical_point(0, 0);
            platform.fill_rect(Rect::new(px, py, b.w, b.h), color);
        }
    }

    fn as_container(&self) -> Option<&dyn Container> {
        Some(self)
    }
}

impl Container for Panel {
    fn container_core(&self) -> &ContainerCore {
        &self.core
    }
}
