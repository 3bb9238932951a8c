use crossterm::event::KeyCode;
use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Gauge, Paragraph},
};
use tui_dispatch::EventKind;
use tui_dispatch_components::{
    StatusBar, StatusBarHint, StatusBarProps, StatusBarSection, StatusBarStyle,
};

use super::Component;
use crate::action::Action;
use crate::art;

const ACCENT: Color = Color::Rgb(220, 68, 68);
const GAUGE_BG: Color = Color::Rgb(52, 56, 66);

/// The generation wait screen - pure projection of `GenerationState`.
#[derive(Default)]
pub struct LoadingScreen;

pub struct LoadingScreenProps<'a> {
    pub topic: &'a str,
    /// Simulated progress in [0, 99].
    pub progress: u16,
    pub message: &'a str,
    pub remaining_secs: u64,
    pub tick: u64,
    pub is_focused: bool,
}

impl Component<Action> for LoadingScreen {
    type Props<'a> = LoadingScreenProps<'a>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = Action> {
        if !props.is_focused {
            return None;
        }

        match event {
            EventKind::Key(key) => match key.code {
                KeyCode::Esc => Some(Action::GenerationAbort),
                KeyCode::Char('q') => Some(Action::Quit),
                _ => None,
            },
            _ => None,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let chunks = Layout::vertical([
            Constraint::Min(1),    // Content
            Constraint::Length(1), // Help bar
        ])
        .split(area);

        let rows = Layout::vertical([
            Constraint::Length(1), // title
            Constraint::Length(1), // topic
            Constraint::Length(1),
            Constraint::Length(1), // message
            Constraint::Length(1), // spinner
            Constraint::Length(1),
            Constraint::Length(1), // gauge
            Constraint::Length(1), // wait note
            Constraint::Length(1), // eta
        ])
        .flex(Flex::Center)
        .split(chunks[0]);

        frame.render_widget(
            Paragraph::new(
                Line::from(Span::styled(
                    "Creating Your Battle",
                    Style::default().add_modifier(Modifier::BOLD),
                ))
                .centered(),
            ),
            rows[0],
        );

        frame.render_widget(
            Paragraph::new(
                Line::from(vec![
                    Span::raw("Topic: "),
                    Span::styled(
                        props.topic.to_string(),
                        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
                    ),
                ])
                .centered(),
            ),
            rows[1],
        );

        // The status line pulses on the heartbeat.
        let message_style = if props.tick % 6 < 3 {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        frame.render_widget(
            Paragraph::new(
                Line::from(Span::styled(props.message.to_string(), message_style)).centered(),
            ),
            rows[3],
        );

        frame.render_widget(
            Paragraph::new(
                Line::from(Span::styled(
                    art::spinner_frame(props.tick),
                    Style::default().fg(ACCENT),
                ))
                .centered(),
            ),
            rows[4],
        );

        let gauge_area = Layout::horizontal([Constraint::Length(50)])
            .flex(Flex::Center)
            .split(rows[6])[0];
        frame.render_widget(
            Gauge::default()
                .gauge_style(Style::default().fg(ACCENT).bg(GAUGE_BG))
                .percent(props.progress.min(100)),
            gauge_area,
        );

        frame.render_widget(
            Paragraph::new(
                Line::from(Span::styled(
                    "Please wait while we generate your battle...",
                    Style::default().fg(Color::DarkGray),
                ))
                .centered(),
            ),
            rows[7],
        );

        frame.render_widget(
            Paragraph::new(
                Line::from(Span::styled(
                    format!(
                        "Estimated time remaining: {} seconds",
                        props.remaining_secs
                    ),
                    Style::default().fg(Color::DarkGray),
                ))
                .centered(),
            ),
            rows[8],
        );

        let mut status_bar = StatusBar::new();
        <StatusBar as Component<Action>>::render(
            &mut status_bar,
            frame,
            chunks[1],
            StatusBarProps {
                left: StatusBarSection::empty(),
                center: StatusBarSection::hints(&[
                    StatusBarHint::new("esc", "cancel"),
                    StatusBarHint::new("q", "quit"),
                ]),
                right: StatusBarSection::empty(),
                style: StatusBarStyle::default(),
                is_focused: false,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tui_dispatch::testing::*;

    fn props(topic: &str) -> LoadingScreenProps<'_> {
        LoadingScreenProps {
            topic,
            progress: 42,
            message: "Creating move sets...",
            remaining_secs: 35,
            tick: 0,
            is_focused: true,
        }
    }

    #[test]
    fn test_esc_aborts_generation() {
        let mut component = LoadingScreen;

        let actions: Vec<_> = component
            .handle_event(&EventKind::Key(key("esc")), props("robots"))
            .into_iter()
            .collect();

        actions.assert_first(Action::GenerationAbort);
    }

    #[test]
    fn test_render_shows_topic_and_message() {
        let mut render = RenderHarness::new(70, 24);
        let mut component = LoadingScreen;

        let output = render.render_to_string_plain(|frame| {
            component.render(frame, frame.area(), props("robots vs dinosaurs"));
        });

        assert!(output.contains("Creating Your Battle"));
        assert!(output.contains("robots vs dinosaurs"));
        assert!(output.contains("Creating move sets..."));
        assert!(output.contains("Estimated time remaining: 35 seconds"));
    }
}
