use std::path::PathBuf;
use std::time::Duration;

use iced::{event, window, Event, Point, Size, Subscription, Task};
use tracing::{debug, info, warn};

use crate::application::DownloadCoordinator;
use crate::domain::{DownloadPhase, DownloadRequest, RunResult, DOWNLOADING_MESSAGE};
use crate::settings::Settings;
use crate::ui::{DownloadMessage, DownloadView};

const CLIPBOARD_POLL_INTERVAL: Duration = Duration::from_secs(1);

pub struct DownloadApp {
    view: DownloadView,
    coordinator: DownloadCoordinator,
    settings: Settings,
    // None when the platform has no config dir; nothing is persisted then
    settings_path: Option<PathBuf>,
    last_clipboard: Option<String>,
}

impl DownloadApp {
    pub fn new(settings: Settings, settings_path: Option<PathBuf>) -> Self {
        let mut view = DownloadView::default();
        if let Some(folder) = &settings.last_folder {
            view.folder = folder.display().to_string();
        }

        Self {
            view,
            coordinator: DownloadCoordinator::new(settings.script_path.clone()),
            settings,
            settings_path,
            last_clipboard: None,
        }
    }

    fn save_settings(&self) {
        let Some(path) = &self.settings_path else {
            return;
        };
        if let Err(e) = self.settings.save_to(path) {
            warn!("Failed to save settings: {}", e);
        }
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    UiMessage(DownloadMessage),
    FolderSelected(Option<PathBuf>),
    /// Outcome of the external script for the current request
    DownloadFinished(RunResult),
    ClipboardTick,
    ClipboardRead(Option<String>),
    WindowMoved(Point),
    WindowResized(Size),
    CloseRequested(window::Id),
}

pub fn update(app: &mut DownloadApp, message: Message) -> Task<Message> {
    match message {
        Message::UiMessage(ui_msg) => {
            app.view.update(ui_msg.clone());

            match ui_msg {
                DownloadMessage::DownloadPressed => return start_download(app),
                DownloadMessage::BrowsePressed => {
                    let start_dir = Some(PathBuf::from(&app.view.folder)).filter(|dir| dir.is_dir());

                    return Task::perform(
                        async move {
                            let mut dialog = rfd::AsyncFileDialog::new();
                            if let Some(dir) = start_dir {
                                dialog = dialog.set_directory(dir);
                            }
                            dialog
                                .pick_folder()
                                .await
                                .map(|handle| handle.path().to_path_buf())
                        },
                        Message::FolderSelected,
                    );
                }
                _ => {}
            }
        }
        Message::FolderSelected(folder) => {
            if let Some(folder) = folder {
                app.view.folder = folder.display().to_string();
            }
        }
        Message::DownloadFinished(result) => {
            app.view.phase = if result.is_success() {
                DownloadPhase::Completed
            } else {
                DownloadPhase::Failed
            };
            app.view.status_message = result.status_message();
        }
        Message::ClipboardTick => {
            if !app.view.is_downloading() {
                return iced::clipboard::read().map(Message::ClipboardRead);
            }
        }
        Message::ClipboardRead(contents) => {
            let Some(contents) = contents else {
                return Task::none();
            };
            if app.last_clipboard.as_deref() == Some(contents.as_str()) {
                return Task::none();
            }
            if let Some(url) = crate::utils::normalize_youtube_url(&contents) {
                debug!(%url, "Picked up video URL from clipboard");
                app.view.youtube_url = url;
            }
            app.last_clipboard = Some(contents);
        }
        Message::WindowMoved(position) => {
            if !app.settings.window.record_position(position.x, position.y) {
                debug!(?position, "Ignoring off-screen window position");
            }
        }
        Message::WindowResized(size) => {
            if !app.settings.window.record_size(size.width, size.height) {
                debug!(?size, "Ignoring empty window size");
            }
        }
        Message::CloseRequested(id) => {
            app.save_settings();
            return window::close(id);
        }
    }
    Task::none()
}

fn start_download(app: &mut DownloadApp) -> Task<Message> {
    // One run at a time; the button is disabled meanwhile
    if app.view.is_downloading() {
        debug!("Download already in progress, ignoring press");
        return Task::none();
    }
    if app.view.youtube_url.trim().is_empty() {
        app.view.status_message = "Please enter a video URL".to_string();
        return Task::none();
    }
    if app.view.folder.trim().is_empty() {
        app.view.status_message = "Please choose a destination folder".to_string();
        return Task::none();
    }

    let request = DownloadRequest::new(&app.view.youtube_url, &app.view.folder);

    app.settings.last_folder = Some(PathBuf::from(app.view.folder.trim()));
    app.save_settings();

    app.view.phase = DownloadPhase::Downloading;
    app.view.status_message = DOWNLOADING_MESSAGE.to_string();
    info!(url = %request.url, "Download requested");

    let coordinator = app.coordinator.clone();
    Task::perform(
        async move { coordinator.run(request).await },
        Message::DownloadFinished,
    )
}

pub fn subscription(_app: &DownloadApp) -> Subscription<Message> {
    Subscription::batch([
        iced::time::every(CLIPBOARD_POLL_INTERVAL).map(|_| Message::ClipboardTick),
        event::listen_with(window_event),
    ])
}

fn window_event(event: Event, _status: event::Status, id: window::Id) -> Option<Message> {
    match event {
        Event::Window(window::Event::Moved(position)) => Some(Message::WindowMoved(position)),
        Event::Window(window::Event::Resized(size)) => Some(Message::WindowResized(size)),
        Event::Window(window::Event::CloseRequested) => Some(Message::CloseRequested(id)),
        _ => None,
    }
}

pub fn view(app: &DownloadApp) -> iced::Element<'_, Message> {
    app.view.view().map(Message::UiMessage)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_with_script(script: &str) -> DownloadApp {
        let settings = Settings {
            script_path: PathBuf::from(script),
            ..Settings::default()
        };
        DownloadApp::new(settings, None)
    }

    fn fill_form(app: &mut DownloadApp, url: &str, folder: &str) {
        let _ = update(
            app,
            Message::UiMessage(DownloadMessage::UrlChanged(url.to_string())),
        );
        let _ = update(
            app,
            Message::UiMessage(DownloadMessage::FolderChanged(folder.to_string())),
        );
    }

    fn press_download(app: &mut DownloadApp) {
        let _ = update(app, Message::UiMessage(DownloadMessage::DownloadPressed));
    }

    #[test]
    fn test_press_shows_downloading_first() {
        let mut app = app_with_script("true");
        fill_form(&mut app, "https://youtu.be/abc", "/tmp/out");

        press_download(&mut app);

        assert_eq!(app.view.status_message, DOWNLOADING_MESSAGE);
        assert!(app.view.is_downloading());
        assert_eq!(app.settings.last_folder, Some(PathBuf::from("/tmp/out")));
    }

    #[test]
    fn test_press_while_downloading_is_ignored() {
        let mut app = app_with_script("true");
        fill_form(&mut app, "https://youtu.be/abc", "/tmp/out");
        press_download(&mut app);

        let _ = update(
            &mut app,
            Message::UiMessage(DownloadMessage::FolderChanged("/tmp/other".to_string())),
        );
        press_download(&mut app);

        assert_eq!(app.settings.last_folder, Some(PathBuf::from("/tmp/out")));
        assert_eq!(app.view.status_message, DOWNLOADING_MESSAGE);
    }

    #[test]
    fn test_empty_inputs_do_not_start() {
        let mut app = app_with_script("true");
        press_download(&mut app);
        assert_eq!(app.view.status_message, "Please enter a video URL");
        assert_eq!(app.view.phase, DownloadPhase::Idle);

        fill_form(&mut app, "https://youtu.be/abc", "  ");
        press_download(&mut app);
        assert_eq!(app.view.status_message, "Please choose a destination folder");
        assert_eq!(app.view.phase, DownloadPhase::Idle);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_successful_run_ends_completed() {
        let mut app = app_with_script("true");
        fill_form(&mut app, "https://youtu.be/abc", "/tmp/out");
        press_download(&mut app);
        assert_eq!(app.view.status_message, DOWNLOADING_MESSAGE);

        let request = DownloadRequest::new("https://youtu.be/abc", "/tmp/out");
        let result = app.coordinator.run(request).await;
        let _ = update(&mut app, Message::DownloadFinished(result));

        assert!(app.view.status_message.ends_with("completed successfully"));
        assert_eq!(app.view.phase, DownloadPhase::Completed);
        assert!(!app.view.is_downloading());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_run_ends_with_error() {
        let mut app = app_with_script("false");
        fill_form(&mut app, "https://youtu.be/abc", "/tmp/out");
        press_download(&mut app);

        let request = DownloadRequest::new("https://youtu.be/abc", "/tmp/out");
        let result = app.coordinator.run(request).await;
        let _ = update(&mut app, Message::DownloadFinished(result));

        assert!(app.view.status_message.ends_with("an error occurred"));
        assert_eq!(app.view.phase, DownloadPhase::Failed);
    }

    #[test]
    fn test_not_found_message_names_script() {
        let mut app = app_with_script("/nowhere/yt-downloader.py");
        let script = app.coordinator.script_name();
        let _ = update(&mut app, Message::DownloadFinished(RunResult::NotFound(script)));
        assert_eq!(app.view.status_message, "yt-downloader.py: File not found");
    }

    #[test]
    fn test_clipboard_youtube_link_fills_url() {
        let mut app = app_with_script("true");
        let _ = update(
            &mut app,
            Message::ClipboardRead(Some("http://www.youtube.com/watch?v=abc".to_string())),
        );
        assert_eq!(app.view.youtube_url, "https://www.youtube.com/watch?v=abc");
    }

    #[test]
    fn test_clipboard_other_text_is_ignored() {
        let mut app = app_with_script("true");
        let _ = update(
            &mut app,
            Message::ClipboardRead(Some("just some notes".to_string())),
        );
        assert!(app.view.youtube_url.is_empty());
    }

    #[test]
    fn test_unchanged_clipboard_does_not_override_edits() {
        let mut app = app_with_script("true");
        let link = "https://youtu.be/abc".to_string();
        let _ = update(&mut app, Message::ClipboardRead(Some(link.clone())));
        let _ = update(
            &mut app,
            Message::UiMessage(DownloadMessage::UrlChanged("typed by hand".to_string())),
        );
        let _ = update(&mut app, Message::ClipboardRead(Some(link)));

        assert_eq!(app.view.youtube_url, "typed by hand");
    }

    #[test]
    fn test_close_persists_window_geometry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut app = DownloadApp::new(Settings::default(), Some(path.clone()));

        let _ = update(&mut app, Message::WindowMoved(Point::new(40.0, 60.0)));
        let _ = update(&mut app, Message::WindowResized(Size::new(700.0, 380.0)));
        let _ = update(&mut app, Message::CloseRequested(window::Id::unique()));

        let saved = Settings::load_from(&path).unwrap();
        assert_eq!(saved.window.x, Some(40.0));
        assert_eq!(saved.window.y, Some(60.0));
        assert_eq!(saved.window.width, 700.0);
        assert_eq!(saved.window.height, 380.0);
    }

    #[test]
    fn test_minimize_then_close_keeps_last_real_geometry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut app = DownloadApp::new(Settings::default(), Some(path.clone()));

        let _ = update(&mut app, Message::WindowMoved(Point::new(40.0, 60.0)));
        let _ = update(&mut app, Message::WindowResized(Size::new(700.0, 380.0)));
        let _ = update(&mut app, Message::WindowMoved(Point::new(-32000.0, -32000.0)));
        let _ = update(&mut app, Message::WindowResized(Size::new(0.0, 0.0)));
        let _ = update(&mut app, Message::CloseRequested(window::Id::unique()));

        let saved = Settings::load_from(&path).unwrap();
        assert_eq!(saved.window.x, Some(40.0));
        assert_eq!(saved.window.y, Some(60.0));
        assert_eq!(saved.window.width, 700.0);
        assert_eq!(saved.window.height, 380.0);
    }

    #[test]
    fn test_last_folder_prefills_form() {
        let settings = Settings {
            last_folder: Some(PathBuf::from("/music")),
            ..Settings::default()
        };
        let app = DownloadApp::new(settings, None);
        assert_eq!(app.view.folder, "/music");
    }
}
