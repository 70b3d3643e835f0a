use iced::{
    widget::{button, column, row, text, text_input, Space},
    Element, Length,
};

use crate::domain::DownloadPhase;

/// Main view state
pub struct DownloadView {
    pub youtube_url: String,
    pub folder: String,
    pub status_message: String,
    pub phase: DownloadPhase,
}

impl Default for DownloadView {
    fn default() -> Self {
        Self {
            youtube_url: String::new(),
            folder: String::new(),
            status_message: "Enter a video URL and a destination folder".to_string(),
            phase: DownloadPhase::Idle,
        }
    }
}

#[derive(Debug, Clone)]
pub enum DownloadMessage {
    UrlChanged(String),
    FolderChanged(String),
    BrowsePressed,
    DownloadPressed,
}

impl DownloadView {
    pub fn is_downloading(&self) -> bool {
        self.phase == DownloadPhase::Downloading
    }

    pub fn update(&mut self, message: DownloadMessage) {
        match message {
            DownloadMessage::UrlChanged(url) => {
                self.youtube_url = url;
            }
            DownloadMessage::FolderChanged(folder) => {
                self.folder = folder;
            }
            DownloadMessage::BrowsePressed | DownloadMessage::DownloadPressed => {
                // Will be handled by the app
            }
        }
    }

    pub fn view(&self) -> Element<'_, DownloadMessage> {
        let download = button("Download MP3")
            .on_press_maybe((!self.is_downloading()).then_some(DownloadMessage::DownloadPressed))
            .padding([10, 20]);

        column![
            text("MP3 Downloader").size(32),
            Space::new().height(Length::Fixed(10.0)),
            text("Video URL:").size(16),
            text_input("https://www.youtube.com/watch?v=...", &self.youtube_url)
                .on_input(DownloadMessage::UrlChanged)
                .padding(10),
            text("Save to folder:").size(16),
            row![
                text_input("Choose a folder...", &self.folder)
                    .on_input(DownloadMessage::FolderChanged)
                    .padding(10)
                    .width(Length::Fill),
                button("Browse...")
                    .on_press(DownloadMessage::BrowsePressed)
                    .padding([10, 20]),
            ]
            .spacing(10),
            Space::new().height(Length::Fixed(10.0)),
            text(&self.status_message).size(14),
            download,
        ]
        .padding(20)
        .spacing(10)
        .into()
    }
}
