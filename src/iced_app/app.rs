//! App struct definition and initialization.

use std::sync::Arc;
use std::time::Instant;

use iced::Task;

use crate::assets::AssetRoots;
use crate::cards::VariantSet;

use super::Message;

pub struct App {
    pub(crate) variants: Arc<VariantSet>,
    pub(crate) roots: AssetRoots,
    pub(crate) selected: usize,
    pub(crate) started: Instant,
}

impl App {
    pub fn new(variants: Arc<VariantSet>, roots: AssetRoots) -> Self {
        Self {
            variants,
            roots,
            selected: 0,
            started: Instant::now(),
        }
    }

    pub fn boot(variants: Arc<VariantSet>, roots: AssetRoots) -> (Self, Task<Message>) {
        (Self::new(variants, roots), Task::none())
    }

    pub fn title(state: &Self) -> String {
        match state.selected_name() {
            Some(name) => {
                format!("divfx - {name} ({}/{})", state.selected() + 1, state.variants.len())
            }
            None => "divfx - no cards".to_string(),
        }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_name(&self) -> Option<&str> {
        self.variants.names().get(self.selected).copied()
    }

    /// Seconds since boot; drives every card's time constant.
    pub fn elapsed(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }
}
