use super::messages::Message;
use super::state::{App, SENTENCE_SCROLL_ID};
use crate::player::PlayerState;
use crate::theme::{sentence_style, to_color};
use crate::transcript::Lesson;
use iced::alignment::Vertical;
use iced::widget::{Column, button, column, container, progress_bar, row, scrollable, text, text_input};
use iced::{Element, Length};

impl App {
    pub fn view(&self) -> Element<'_, Message> {
        let screen: Element<'_, Message> = match &self.lesson {
            Some(lesson) => self.practice_view(lesson),
            None => self.browse_view(),
        };

        let mut content = column![text("Shadowing Practice").size(24)]
            .spacing(12)
            .padding(16)
            .height(Length::Fill);

        if let Some(error) = &self.error {
            content = content.push(text(format!("Error: {error}")).style(text::danger));
        }

        content.push(screen).into()
    }

    fn browse_view(&self) -> Element<'_, Message> {
        let url_row = row![
            text_input("Video URL...", &self.url_input)
                .on_input(Message::UrlInputChanged)
                .on_submit(Message::SubmitUrl)
                .width(Length::Fill),
            if self.acquiring {
                button("Processing...")
            } else {
                button("Extract").on_press(Message::SubmitUrl)
            },
        ]
        .spacing(8)
        .align_y(Vertical::Center);

        let mut content = column![url_row].spacing(12);

        if self.acquiring {
            let label = if self.acquire_message.is_empty() {
                "Processing...".to_string()
            } else {
                self.acquire_message.clone()
            };
            content = content.push(
                column![
                    text(label),
                    progress_bar(0.0..=100.0, self.acquire_progress),
                    text(format!("{:.0}%", self.acquire_progress)),
                ]
                .spacing(4),
            );
            if self.acquire_progress < 50.0 {
                content = content.push(
                    text("Audio and subtitle extraction can take a few minutes.").size(13),
                );
            }
        }

        content = content.push(
            row![
                text("Saved transcripts").size(18),
                button("Refresh").on_press(Message::RefreshFiles),
            ]
            .spacing(8)
            .align_y(Vertical::Center),
        );

        let mut files: Column<'_, Message> = Column::new().spacing(4);
        if self.output_files.is_empty() {
            files = files.push(text("No saved transcripts yet.").size(14));
        }
        for filename in &self.output_files {
            let is_recent = self.recent_file.as_deref() == Some(filename.as_str());
            let label = if is_recent {
                format!("{filename}  (last opened)")
            } else {
                filename.clone()
            };
            let mut load = button(text(label).size(14)).width(Length::Fill);
            if !self.acquiring {
                load = load.on_press(Message::LoadFile(filename.clone()));
            }
            files = files.push(load);
        }

        content
            .push(scrollable(files).height(Length::Fill))
            .into()
    }

    fn practice_view<'a>(&'a self, lesson: &'a Lesson) -> Element<'a, Message> {
        let title = lesson
            .title
            .as_deref()
            .unwrap_or(lesson.video_id.as_str());

        let pause_label = match self.player.as_ref().map(|_| self.last_player_state) {
            Some(PlayerState::Playing) => "Pause",
            Some(_) => "Play",
            None => "Loading audio...",
        };
        let mut pause = button(pause_label);
        if self.player.is_some() {
            pause = pause.on_press(Message::TogglePlayPause);
        }

        let mut controls = row![button("Back").on_press(Message::BackToBrowse), pause]
            .spacing(8)
            .align_y(Vertical::Center);
        if self.controls.has_range() {
            controls = controls.push(button("Play selection").on_press(Message::PlaySelection));
        }
        controls = controls.push(button("Stop loop").on_press(Message::StopLoop));

        let progress = self.controls.progress_percent();
        let progress_row = column![
            text(format!("Progress: {progress:.0}%")).size(14),
            progress_bar(0.0..=100.0, progress),
        ]
        .spacing(4);

        let active_tint = to_color(self.config.active_highlight);
        let selection_tint = to_color(self.config.selection_highlight);

        let mut sentences: Column<'_, Message> = Column::new().spacing(2);
        for (index, sentence) in self.controls.sentences().iter().enumerate() {
            let tint = if self.controls.is_active(index) {
                Some(active_tint)
            } else if self.controls.is_in_range(index) {
                Some(selection_tint)
            } else {
                None
            };
            sentences = sentences.push(
                button(text(&sentence.text).size(15))
                    .style(sentence_style(tint))
                    .width(Length::Fill)
                    .on_press(Message::SentenceClicked(index)),
            );
        }

        column![
            text(title).size(18),
            controls,
            progress_row,
            scrollable(container(sentences).width(Length::Fill).padding(8))
                .id(SENTENCE_SCROLL_ID.clone())
                .height(Length::Fill),
        ]
        .spacing(12)
        .height(Length::Fill)
        .into()
    }
}
