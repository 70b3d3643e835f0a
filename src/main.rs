mod app;
mod application;
mod domain;
mod runner;
mod settings;
mod ui;
mod utils;

use iced::{window, Point, Size};
use tracing::{info, warn};

use settings::Settings;

/// Log level comes from `RUST_LOG` (default: warn).
fn init_tracing() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .compact(),
        )
        .try_init()
        .ok();
}

fn load_icon() -> Option<window::Icon> {
    let icon_data = include_bytes!("../assets/icon.png");

    match image::load_from_memory(icon_data) {
        Ok(img) => {
            let rgba = img.to_rgba8();
            let (width, height) = rgba.dimensions();
            window::icon::from_rgba(rgba.into_raw(), width, height).ok()
        }
        Err(e) => {
            warn!("Failed to decode window icon: {}", e);
            None
        }
    }
}

fn window_settings(settings: &Settings) -> window::Settings {
    let geometry = settings.window.sanitized();
    let position = match (geometry.x, geometry.y) {
        (Some(x), Some(y)) => window::Position::Specific(Point::new(x, y)),
        _ => window::Position::default(),
    };

    window::Settings {
        size: Size::new(geometry.width, geometry.height),
        position,
        icon: load_icon(),
        // Settings are written before the window goes away
        exit_on_close_request: false,
        ..Default::default()
    }
}

fn main() -> iced::Result {
    init_tracing();

    let settings_path = match settings::settings_path() {
        Ok(path) => Some(path),
        Err(e) => {
            warn!("Settings will not be persisted: {}", e);
            None
        }
    };
    let settings = Settings::load_or_default(settings_path.as_deref());
    info!(script = %settings.script_path.display(), "Starting Simple MP3 Downloader");

    let window = window_settings(&settings);

    iced::application(
        move || app::DownloadApp::new(settings.clone(), settings_path.clone()),
        app::update,
        app::view,
    )
    .title("Simple MP3 Downloader")
    .subscription(app::subscription)
    .window(window)
    .run()
}
