//! App::update() and message handling.

use iced::Task;

use super::app::App;
use super::layout::step_selection;
use super::Message;

impl App {
    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::NextCard => self.cycle(1),
            Message::PrevCard => self.cycle(-1),
            // Redraw only; time is read when the primitive is built.
            Message::Tick => {}
        }
        Task::none()
    }

    fn cycle(&mut self, delta: isize) {
        self.selected = step_selection(self.selected, delta, self.variants.len());
        if let Some(name) = self.selected_name() {
            tracing::info!("Selected card {}: {name}", self.selected());
        }
    }
}
