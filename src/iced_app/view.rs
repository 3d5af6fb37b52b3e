//! App::view() and subscription.

use std::time::Duration;

use iced::widget::{container, Shader};
use iced::{Element, Length, Subscription};

use super::app::App;
use super::Message;

const FRAME_INTERVAL: Duration = Duration::from_millis(16);

impl App {
    pub fn view(&self) -> Element<'_, Message> {
        let shader: Shader<Message, &App> =
            Shader::new(self).width(Length::Fill).height(Length::Fill);

        container(shader)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    pub fn subscription(&self) -> Subscription<Message> {
        iced::time::every(FRAME_INTERVAL).map(|_| Message::Tick)
    }
}
