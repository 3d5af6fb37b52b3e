//! Interactive runner: every card drawn in a grid inside one iced window.
//!
//! - `app`: App struct and initialization
//! - `layout`: card grid placement and selection cycling
//! - `view`: App::view() and subscription
//! - `update`: App::update()
//! - `render`: shader widget program, primitive and pipeline

mod app;
pub mod layout;
mod render;
mod update;
mod view;

use std::sync::Arc;

use crate::assets::AssetRoots;
use crate::cards::VariantSet;
use crate::error::Result;

pub use app::App;
pub use layout::{card_origin, step_selection};
pub use render::{CardsPipeline, CardsPrimitive};

/// Application messages.
#[derive(Debug, Clone)]
pub enum Message {
    /// PageDown released.
    NextCard,
    /// PageUp released.
    PrevCard,
    /// Frame timer.
    Tick,
}

/// Open a `window_size` window and animate every compiled variant.
pub fn run_iced_ui(
    variants: Arc<VariantSet>,
    roots: AssetRoots,
    window_size: [u32; 2],
) -> Result<()> {
    tracing::info!("Starting interactive runner with {} card(s)", variants.len());

    iced::application(
        move || App::boot(Arc::clone(&variants), roots.clone()),
        App::update,
        App::view,
    )
    .title(App::title)
    .subscription(App::subscription)
    .window_size((window_size[0] as f32, window_size[1] as f32))
    .resizable(false)
    .run()?;

    Ok(())
}
