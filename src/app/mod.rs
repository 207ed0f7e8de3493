mod messages;
mod state;
mod update;
mod view;

pub use state::App;

use crate::config::AppConfig;
use crate::theme;
use iced::{Size, window};

/// Launch the app against the configured extraction backend.
pub fn run_app(config: AppConfig) -> iced::Result {
    let window_settings = window::Settings {
        size: Size::new(config.window_width, config.window_height),
        ..window::Settings::default()
    };

    iced::application("Shadowing Practice", App::update, App::view)
        .window(window_settings)
        .subscription(App::subscription)
        .theme(|app: &App| theme::iced_theme(app.theme_mode()))
        .run_with(move || App::bootstrap(config))
}
