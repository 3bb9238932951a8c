use crossterm::event::KeyCode;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Paragraph},
};
use tui_dispatch::{DataResource, EventKind};
use tui_dispatch_components::{
    BaseStyle, Padding, StatusBar, StatusBarHint, StatusBarProps, StatusBarSection,
    StatusBarStyle, TextInput, TextInputProps, TextInputStyle,
};

use super::Component;
use crate::action::Action;
use crate::art;
use crate::portrait::Portrait;
use crate::state::VICTORY_SLIDE_TICKS;

const ACCENT: Color = Color::Rgb(220, 68, 68);
const BG_STAGE: Color = Color::Rgb(16, 20, 30);
const BG_PANEL: Color = Color::Rgb(28, 32, 44);
const INPUT_BG: Color = Color::Rgb(45, 48, 58);
const TEXT_DIM: Color = Color::Rgb(150, 158, 172);
const REMATCH_PLACEHOLDER: &str = "e.g., historical figures, cartoon characters";

pub struct VictoryScreen {
    input: TextInput,
    was_active: bool,
}

pub struct VictoryScreenProps<'a> {
    pub winner_name: &'a str,
    pub loser_name: &'a str,
    pub winner_portrait: &'a DataResource<Portrait>,
    /// Heartbeats spent on this screen; drives the loser slide-away.
    pub slide_ticks: u16,
    pub topic: &'a str,
    pub is_focused: bool,
    // Action constructors
    pub on_change: fn(String) -> Action,
    pub on_submit: fn(String) -> Action,
}

impl Default for VictoryScreen {
    fn default() -> Self {
        Self {
            input: TextInput::new(),
            was_active: false,
        }
    }
}

impl VictoryScreen {
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

impl Component<Action> for VictoryScreen {
    type Props<'a> = VictoryScreenProps<'a>;

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
            return vec![Action::PlayAgain];
        }

        let input_props = TextInputProps {
            value: props.topic,
            placeholder: REMATCH_PLACEHOLDER,
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
            Constraint::Min(6),    // Winner stage
            Constraint::Length(7), // Play again panel
            Constraint::Length(1), // Help bar
        ])
        .split(area);

        render_stage(frame, chunks[0], &props);
        self.render_play_again(frame, chunks[1], &props);

        let mut status_bar = StatusBar::new();
        <StatusBar as Component<Action>>::render(
            &mut status_bar,
            frame,
            chunks[2],
            StatusBarProps {
                left: StatusBarSection::empty(),
                center: StatusBarSection::hints(&[
                    StatusBarHint::new("enter", "rematch"),
                    StatusBarHint::new("esc", "back to start"),
                ]),
                right: StatusBarSection::empty(),
                style: StatusBarStyle::default(),
                is_focused: false,
            },
        );
    }
}

fn render_stage(frame: &mut Frame, area: Rect, props: &VictoryScreenProps<'_>) {
    frame.render_widget(Block::default().style(Style::default().bg(BG_STAGE)), area);

    let rows = Layout::vertical([
        Constraint::Length(1), // headline
        Constraint::Length(1), // defeated line
        Constraint::Length(1),
        Constraint::Min(1), // winner portrait
    ])
    .flex(Flex::Center)
    .split(area);

    frame.render_widget(
        Paragraph::new(
            Line::from(Span::styled(
                format!("{} wins!", props.winner_name),
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            ))
            .centered(),
        ),
        rows[0],
    );
    frame.render_widget(
        Paragraph::new(
            Line::from(format!("{} has been defeated!", props.loser_name)).centered(),
        ),
        rows[1],
    );

    let winner_lines = match props.winner_portrait {
        DataResource::Loaded(portrait) => portrait.to_lines(),
        _ => art::FIGHTER_SILHOUETTE
            .iter()
            .map(|row| Line::from(Span::styled(*row, Style::default().fg(ACCENT))))
            .collect(),
    };
    frame.render_widget(
        Paragraph::new(Text::from(winner_lines)).alignment(Alignment::Center),
        rows[3],
    );

    // The loser sinks off the right side of the stage, then vanishes.
    if props.slide_ticks < VICTORY_SLIDE_TICKS && area.height > 4 {
        let drop = (props.slide_ticks as u32 * area.height as u32
            / VICTORY_SLIDE_TICKS.max(1) as u32) as u16;
        let slide_area = Rect {
            x: area.right().saturating_sub(area.width / 4),
            y: (area.y + drop).min(area.bottom().saturating_sub(1)),
            width: area.width / 4,
            height: area.height.saturating_sub(drop).max(1),
        };
        let faded: Vec<Line> = art::FIGHTER_SILHOUETTE
            .iter()
            .map(|row| Line::from(Span::styled(*row, Style::default().fg(TEXT_DIM))))
            .collect();
        frame.render_widget(Paragraph::new(faded), slide_area);
    }
}

impl VictoryScreen {
    fn render_play_again(&mut self, frame: &mut Frame, area: Rect, props: &VictoryScreenProps<'_>) {
        frame.render_widget(Block::default().style(Style::default().bg(BG_PANEL)), area);

        let rows = Layout::vertical([
            Constraint::Length(1), // title
            Constraint::Length(1), // label
            Constraint::Length(3), // input
        ])
        .flex(Flex::Center)
        .split(area);

        frame.render_widget(
            Paragraph::new(
                Line::from(Span::styled(
                    "Play Again?",
                    Style::default().add_modifier(Modifier::BOLD),
                ))
                .centered(),
            ),
            rows[0],
        );
        frame.render_widget(
            Paragraph::new(
                Line::from(Span::styled(
                    "Enter your topic here!",
                    Style::default().fg(TEXT_DIM),
                ))
                .centered(),
            ),
            rows[1],
        );

        let input_area = Layout::horizontal([Constraint::Length(56)])
            .flex(Flex::Center)
            .split(rows[2])[0];
        let input_props = TextInputProps {
            value: props.topic,
            placeholder: REMATCH_PLACEHOLDER,
            is_focused: props.is_focused,
            style: input_style(),
            on_change: props.on_change,
            on_submit: props.on_submit,
            on_cursor_move: Some(|_| Action::Render),
        };
        self.input.render(frame, input_area, input_props);
    }
}
