use crossterm::event::KeyCode;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Paragraph, Wrap},
};
use tui_dispatch::{DataResource, EventKind};
use tui_dispatch_components::{
    StatusBar, StatusBarHint, StatusBarProps, StatusBarSection, StatusBarStyle,
};

use super::Component;
use crate::action::Action;
use crate::art;
use crate::state::{BattleState, Fighter, MAX_HP};

const BG_SCENE: Color = Color::Rgb(16, 20, 30);
const BG_PANEL: Color = Color::Rgb(28, 32, 44);
const BG_SELECTED: Color = Color::Rgb(54, 60, 80);
const TEXT_DIM: Color = Color::Rgb(150, 158, 172);
const ACCENT_GREEN: Color = Color::Rgb(96, 200, 112);
const ACCENT_GOLD: Color = Color::Rgb(228, 176, 88);
const ACCENT_RED: Color = Color::Rgb(220, 96, 96);

/// How far the attacker lunges toward the opponent mid-swing.
const ATTACK_OFFSET: u16 = 2;

/// The battle scene - pure projection of `BattleState`.
#[derive(Default)]
pub struct BattleScreen;

pub struct BattleScreenProps<'a> {
    pub battle: &'a BattleState,
    pub is_focused: bool,
}

impl Component<Action> for BattleScreen {
    type Props<'a> = BattleScreenProps<'a>;

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

        let selected = props.battle.selected_move;
        match key.code {
            KeyCode::Char(c @ '1'..='4') => {
                vec![Action::MoveUse(c as usize - '1' as usize)]
            }
            // The grid is 2x2: left/right swap columns, up/down swap rows.
            KeyCode::Left | KeyCode::Right => vec![Action::MoveSelect(selected ^ 1)],
            KeyCode::Up | KeyCode::Down => vec![Action::MoveSelect(selected ^ 2)],
            KeyCode::Enter | KeyCode::Char('z') | KeyCode::Char('Z') => {
                vec![Action::MoveConfirm]
            }
            KeyCode::Char('q') | KeyCode::Esc => vec![Action::Quit],
            _ => Vec::new(),
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let battle = props.battle;
        let chunks = Layout::vertical([
            Constraint::Min(6),    // Scene
            Constraint::Length(8), // Move grid
            Constraint::Length(1), // Help bar
        ])
        .split(area);

        render_scene(frame, chunks[0], battle);
        render_move_grid(frame, chunks[1], battle);

        let mut status_bar = StatusBar::new();
        <StatusBar as Component<Action>>::render(
            &mut status_bar,
            frame,
            chunks[2],
            StatusBarProps {
                left: StatusBarSection::empty(),
                center: StatusBarSection::hints(&[
                    StatusBarHint::new("1-4", "use move"),
                    StatusBarHint::new("arrows", "select"),
                    StatusBarHint::new("enter", "confirm"),
                    StatusBarHint::new("q", "quit"),
                ]),
                right: StatusBarSection::empty(),
                style: StatusBarStyle::default(),
                is_focused: false,
            },
        );
    }
}

fn render_scene(frame: &mut Frame, area: Rect, battle: &BattleState) {
    frame.render_widget(Block::default().style(Style::default().bg(BG_SCENE)), area);
    if let Some(backdrop) = battle.backdrop.data() {
        let lines = backdrop.to_lines();
        frame.render_widget(
            Paragraph::new(Text::from(lines)).alignment(Alignment::Center),
            area,
        );
    }

    let rows = Layout::vertical([
        Constraint::Length(2), // Stat panels
        Constraint::Min(1),    // Fighters
        Constraint::Length(3), // Narrative
    ])
    .split(area);

    let panels = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);
    render_stat_panel(frame, panels[0], battle, Fighter::One, Alignment::Left);
    render_stat_panel(frame, panels[1], battle, Fighter::Two, Alignment::Right);

    let halves = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);
    // Player sits bottom-left, opponent top-right.
    render_fighter(frame, halves[0], battle, Fighter::One);
    render_fighter(frame, halves[1], battle, Fighter::Two);

    if let Some(narrative) = battle.narrative.as_deref() {
        let box_area = Layout::horizontal([Constraint::Percentage(70)])
            .flex(Flex::Center)
            .split(rows[2])[0];
        frame.render_widget(
            Paragraph::new(narrative.to_string())
                .style(Style::default().bg(BG_PANEL))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            box_area,
        );
    }
}

fn render_stat_panel(
    frame: &mut Frame,
    area: Rect,
    battle: &BattleState,
    who: Fighter,
    alignment: Alignment,
) {
    let name_line = Line::from(Span::styled(
        battle.name_of(who).to_string(),
        Style::default().add_modifier(Modifier::BOLD),
    ));
    let lines = vec![name_line, hp_line(battle.hp_of(who), MAX_HP)];
    frame.render_widget(
        Paragraph::new(lines)
            .style(Style::default().bg(BG_PANEL))
            .alignment(alignment),
        area,
    );
}

fn render_fighter(frame: &mut Frame, half: Rect, battle: &BattleState, who: Fighter) {
    let swinging = battle.attacker == Some(who) && battle.is_animating();
    let lines = match &battle.portraits[who.index()] {
        DataResource::Loaded(portrait) => portrait.to_lines(),
        _ => silhouette_lines(),
    };
    let height = (lines.len() as u16).min(half.height);
    let width = lines
        .iter()
        .map(|line| line.width() as u16)
        .max()
        .unwrap_or(0)
        .min(half.width);

    // Mid-swing the fighter lunges toward the middle of the stage.
    let offset = if swinging { ATTACK_OFFSET } else { 0 };
    let target = match who {
        Fighter::One => Rect {
            x: (half.x + 2 + offset).min(half.right().saturating_sub(width)),
            y: half.y + half.height.saturating_sub(height),
            width,
            height,
        },
        Fighter::Two => Rect {
            x: half
                .right()
                .saturating_sub(width + 2 + offset)
                .max(half.x),
            y: half.y,
            width,
            height,
        },
    };
    frame.render_widget(Paragraph::new(Text::from(lines)), target);
}

fn silhouette_lines() -> Vec<Line<'static>> {
    art::FIGHTER_SILHOUETTE
        .iter()
        .map(|row| Line::from(Span::styled(*row, Style::default().fg(TEXT_DIM))))
        .collect()
}

fn render_move_grid(frame: &mut Frame, area: Rect, battle: &BattleState) {
    frame.render_widget(Block::default().style(Style::default().bg(BG_PANEL)), area);
    let locked = battle.input_locked();

    let rows = Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    let moves = &battle.data.fighter(Fighter::One).moves;
    for (index, move_info) in moves.iter().enumerate() {
        let row = rows[index / 2];
        let cols = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(row);
        let cell = cols[index % 2];

        let selected = index == battle.selected_move;
        let base = if selected && !locked {
            Style::default().bg(BG_SELECTED)
        } else {
            Style::default()
        };
        let title_style = if locked {
            base.fg(TEXT_DIM)
        } else {
            base.add_modifier(Modifier::BOLD)
        };

        let lines = vec![
            Line::from(Span::styled(
                format!("{}) {}", index + 1, move_info.name),
                title_style,
            )),
            Line::from(vec![
                Span::styled(
                    move_info.description.clone(),
                    base.fg(TEXT_DIM),
                ),
                Span::styled(
                    format!("  DMG: {:.0}", move_info.damage),
                    base.fg(ACCENT_GOLD).add_modifier(Modifier::BOLD),
                ),
            ]),
        ];
        frame.render_widget(
            Paragraph::new(lines)
                .style(base)
                .wrap(Wrap { trim: true }),
            cell,
        );
    }
}

fn hp_line(current: f32, max: f32) -> Line<'static> {
    let width: usize = 20;
    let ratio = if max <= 0.0 {
        0.0
    } else {
        (current / max).clamp(0.0, 1.0)
    };
    let filled = ((ratio * width as f32).round() as usize).min(width);
    let empty = width.saturating_sub(filled);
    let color = if ratio > 0.5 {
        ACCENT_GREEN
    } else if ratio > 0.2 {
        ACCENT_GOLD
    } else {
        ACCENT_RED
    };
    Line::from(vec![
        Span::raw("HP "),
        Span::styled(
            "█".repeat(filled),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled("░".repeat(empty), Style::default().fg(TEXT_DIM)),
        Span::raw(format!(" {:.0}/{:.0}", current, max)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{BattleData, Character, MoveInfo};
    use tui_dispatch::testing::*;

    fn mv(name: &str, damage: f32) -> MoveInfo {
        MoveInfo {
            name: name.into(),
            description: format!("{name} description"),
            damage,
        }
    }

    fn sample_battle() -> BattleState {
        BattleState::new(BattleData {
            fighters: [
                Character {
                    name: "Mechazilla".into(),
                    moves: [
                        mv("Laser Sweep", 120.0),
                        mv("Tail Whip", 80.0),
                        mv("Stomp", 60.0),
                        mv("Overcharge", 150.0),
                    ],
                },
                Character {
                    name: "Raptor Prime".into(),
                    moves: [
                        mv("Claw Flurry", 90.0),
                        mv("Screech", 40.0),
                        mv("Pounce", 110.0),
                        mv("Pack Call", 70.0),
                    ],
                },
            ],
            background: None,
        })
    }

    #[test]
    fn test_number_keys_use_moves() {
        let mut component = BattleScreen;
        let battle = sample_battle();

        let actions: Vec<_> = component
            .handle_event(
                &EventKind::Key(key("3")),
                BattleScreenProps {
                    battle: &battle,
                    is_focused: true,
                },
            )
            .into_iter()
            .collect();

        actions.assert_first(Action::MoveUse(2));
    }

    #[test]
    fn test_arrows_navigate_grid() {
        let mut component = BattleScreen;
        let battle = sample_battle();

        let actions: Vec<_> = component
            .handle_event(
                &EventKind::Key(key("right")),
                BattleScreenProps {
                    battle: &battle,
                    is_focused: true,
                },
            )
            .into_iter()
            .collect();
        actions.assert_first(Action::MoveSelect(1));

        let actions: Vec<_> = component
            .handle_event(
                &EventKind::Key(key("down")),
                BattleScreenProps {
                    battle: &battle,
                    is_focused: true,
                },
            )
            .into_iter()
            .collect();
        actions.assert_first(Action::MoveSelect(2));
    }

    #[test]
    fn test_enter_confirms_selection() {
        let mut component = BattleScreen;
        let battle = sample_battle();

        let actions: Vec<_> = component
            .handle_event(
                &EventKind::Key(key("enter")),
                BattleScreenProps {
                    battle: &battle,
                    is_focused: true,
                },
            )
            .into_iter()
            .collect();

        actions.assert_first(Action::MoveConfirm);
    }

    #[test]
    fn test_render_shows_fighters_and_moves() {
        let mut render = RenderHarness::new(90, 30);
        let mut component = BattleScreen;
        let mut battle = sample_battle();
        battle.hp = [100.0, 70.0];
        battle.narrative = Some("Mechazilla used Overcharge!".into());

        let output = render.render_to_string_plain(|frame| {
            component.render(
                frame,
                frame.area(),
                BattleScreenProps {
                    battle: &battle,
                    is_focused: true,
                },
            );
        });

        assert!(output.contains("Mechazilla"));
        assert!(output.contains("Raptor Prime"));
        assert!(output.contains("Laser Sweep"));
        assert!(output.contains("DMG: 150"));
        assert!(output.contains("70/100"));
        assert!(output.contains("Mechazilla used Overcharge!"));
    }
}
