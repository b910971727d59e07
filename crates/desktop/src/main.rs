mod app;
mod settings;
mod theme;
mod widgets;
mod workers;

use app::App;

fn main() -> iced::Result {
    env_logger::init();

    iced::application(App::new, App::update, App::view)
        .title("FaceCam")
        .theme(App::theme)
        .subscription(App::subscription)
        .window(iced::window::Settings {
            size: app::WINDOW_SIZE,
            min_size: Some(iced::Size::new(360.0, 420.0)),
            ..Default::default()
        })
        .run()
}
