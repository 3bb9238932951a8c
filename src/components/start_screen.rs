use crossterm::event::KeyCode;
use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use tui_dispatch::EventKind;
use tui_dispatch_components::{
    BaseStyle, Padding, StatusBar, StatusBarHint, StatusBarProps, StatusBarSection,
    StatusBarStyle, TextInput, TextInputProps, TextInputStyle,
};

use super::Component;
use crate::action::Action;
use crate::art;

const ACCENT: Color = Color::Rgb(220, 68, 68);
const INPUT_BG: Color = Color::Rgb(45, 48, 58);
const TOPIC_PLACEHOLDER: &str = "e.g., rappers in 2025, anime heroes, video game bosses";

pub struct StartScreen {
    input: TextInput,
    was_active: bool,
}

pub struct StartScreenProps<'a> {
    pub topic: &'a str,
    pub error: Option<&'a str>,
    pub is_focused: bool,
    // Action constructors
    pub on_change: fn(String) -> Action,
    pub on_submit: fn(String) -> Action,
}

impl Default for StartScreen {
    fn default() -> Self {
        Self {
            input: TextInput::new(),
            was_active: false,
        }
    }
}

impl StartScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the input's cursor when the screen regains ownership.
    pub fn set_active(&mut self, is_active: bool) {
        if is_active && !self.was_active {
            self.input = TextInput::new();
        }
        self.was_active = is_active;
    }
}

fn input_style() -> TextInputStyle {
    TextInputStyle {
        base: BaseStyle {
            border: None,
            padding: Padding::all(1),
            bg: Some(INPUT_BG),
            fg: None,
        },
        placeholder_style: None,
        cursor_style: None,
    }
}

impl Component<Action> for StartScreen {
    type Props<'a> = StartScreenProps<'a>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = Action> {
        if !props.is_focused {
            return Vec::new();
        }
        let EventKind::Key(key) = event else {
            return Vec::new();
        };
        if key.code == KeyCode::Esc {
            return vec![Action::Quit];
        }

        let input_props = TextInputProps {
            value: props.topic,
            placeholder: TOPIC_PLACEHOLDER,
            is_focused: true,
            style: input_style(),
            on_change: props.on_change,
            on_submit: props.on_submit,
            on_cursor_move: Some(|_| Action::Render),
        };
        self.input
            .handle_event(event, input_props)
            .into_iter()
            .collect()
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let chunks = Layout::vertical([
            Constraint::Min(1),    // Content
            Constraint::Length(1), // Help bar
        ])
        .split(area);

        let banner_height = art::TITLE_BANNER.len() as u16;
        let rows = Layout::vertical([
            Constraint::Length(banner_height),
            Constraint::Length(1), // tagline
            Constraint::Length(1),
            Constraint::Length(1), // prompt
            Constraint::Length(3), // input
            Constraint::Length(1),
            Constraint::Length(2), // hints
            Constraint::Length(1), // error
        ])
        .flex(Flex::Center)
        .split(chunks[0]);

        let banner: Vec<Line> = art::TITLE_BANNER
            .iter()
            .map(|line| {
                Line::from(Span::styled(
                    *line,
                    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
                ))
                .centered()
            })
            .collect();
        frame.render_widget(Paragraph::new(banner), rows[0]);

        frame.render_widget(
            Paragraph::new(Line::from(art::TITLE_TAGLINE).centered()),
            rows[1],
        );

        frame.render_widget(
            Paragraph::new(
                Line::from(Span::styled(
                    "Enter your topic here!",
                    Style::default().add_modifier(Modifier::BOLD),
                ))
                .centered(),
            ),
            rows[3],
        );

        let input_area = Layout::horizontal([Constraint::Length(60)])
            .flex(Flex::Center)
            .split(rows[4])[0];
        let input_props = TextInputProps {
            value: props.topic,
            placeholder: TOPIC_PLACEHOLDER,
            is_focused: props.is_focused,
            style: input_style(),
            on_change: props.on_change,
            on_submit: props.on_submit,
            on_cursor_move: Some(|_| Action::Render),
        };
        self.input.render(frame, input_area, input_props);

        let hints = vec![
            Line::from(Span::styled(
                "Choose any topic and we'll create a battle between two characters!",
                Style::default().fg(Color::DarkGray),
            ))
            .centered(),
            Line::from(Span::styled(
                "The more specific your topic, the more interesting the battle.",
                Style::default().fg(Color::DarkGray),
            ))
            .centered(),
        ];
        frame.render_widget(Paragraph::new(hints), rows[6]);

        if let Some(error) = props.error {
            frame.render_widget(
                Paragraph::new(
                    Line::from(Span::styled(
                        error.to_string(),
                        Style::default().fg(Color::Red),
                    ))
                    .centered(),
                ),
                rows[7],
            );
        }

        let mut status_bar = StatusBar::new();
        <StatusBar as Component<Action>>::render(
            &mut status_bar,
            frame,
            chunks[1],
            StatusBarProps {
                left: StatusBarSection::empty(),
                center: StatusBarSection::hints(&[
                    StatusBarHint::new("enter", "battle!"),
                    StatusBarHint::new("esc", "quit"),
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

    fn props(topic: &str) -> StartScreenProps<'_> {
        StartScreenProps {
            topic,
            error: None,
            is_focused: true,
            on_change: Action::TopicChange,
            on_submit: Action::TopicSubmit,
        }
    }

    #[test]
    fn test_typing_emits_topic_change() {
        let mut component = StartScreen::new();

        let actions: Vec<_> = component
            .handle_event(&EventKind::Key(key("r")), props(""))
            .into_iter()
            .collect();

        actions.assert_count(1);
        actions.assert_first(Action::TopicChange("r".into()));
    }

    #[test]
    fn test_enter_submits_topic() {
        let mut component = StartScreen::new();

        let actions: Vec<_> = component
            .handle_event(&EventKind::Key(key("enter")), props("robots"))
            .into_iter()
            .collect();

        actions.assert_first(Action::TopicSubmit("robots".into()));
    }

    #[test]
    fn test_esc_quits() {
        let mut component = StartScreen::new();

        let actions: Vec<_> = component
            .handle_event(&EventKind::Key(key("esc")), props(""))
            .into_iter()
            .collect();

        actions.assert_first(Action::Quit);
    }

    #[test]
    fn test_unfocused_ignores_events() {
        let mut component = StartScreen::new();
        let mut p = props("");
        p.is_focused = false;

        let actions: Vec<_> = component
            .handle_event(&EventKind::Key(key("r")), p)
            .into_iter()
            .collect();

        actions.assert_empty();
    }
}
