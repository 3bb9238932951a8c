//! Battlegen - turn-based topic battle TUI

use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Frame, Terminal};
use tui_dispatch::{
    EffectContext, EffectStoreLike, EffectStoreWithMiddleware, EventBus, EventContext, EventKind,
    EventRoutingState, HandlerResponse, Keybindings, RenderContext, TaskKey,
};
use tui_dispatch_debug::debug::DebugLayer;
use tui_dispatch_debug::{
    DebugCliArgs, DebugRunOutput, DebugSession, DebugSessionError, ReplayItem,
};

use battlegen::action::Action;
use battlegen::api;
use battlegen::art;
use battlegen::components::{
    BattleScreen, BattleScreenProps, Component, LoadingScreen, LoadingScreenProps, StartScreen,
    StartScreenProps, VictoryScreen, VictoryScreenProps,
};
use battlegen::effect::Effect;
use battlegen::portrait;
use battlegen::reducer::reducer;
use battlegen::state::{AppState, Fighter, Screen, TICK_MS};

/// Battlegen - topic battle TUI client
#[derive(Parser, Debug)]
#[command(name = "battlegen")]
#[command(about = "Turn-based topic battles from a generation service")]
struct Args {
    /// Base URL of the battle generation API
    #[arg(long, default_value = "http://127.0.0.1:8000/api")]
    server: String,

    /// Submit this topic immediately instead of waiting for input
    #[arg(long, short)]
    topic: Option<String>,

    /// Initial delay between status checks in milliseconds (minimum 250)
    #[arg(long, default_value = "2000", value_parser = clap::value_parser!(u64).range(250..))]
    poll_interval: u64,

    #[command(flatten)]
    debug: DebugCliArgs,
}

#[derive(tui_dispatch::ComponentId, Clone, Copy, PartialEq, Eq, Hash, Debug)]
enum ScreenComponentId {
    Start,
    Loading,
    Battle,
    Victory,
}

#[derive(tui_dispatch::BindingContext, Clone, Copy, PartialEq, Eq, Hash)]
enum ScreenContext {
    Form,
    Waiting,
    Combat,
    Aftermath,
}

impl EventRoutingState<ScreenComponentId, ScreenContext> for AppState {
    fn focused(&self) -> Option<ScreenComponentId> {
        Some(match self.screen {
            Screen::Start => ScreenComponentId::Start,
            Screen::Loading => ScreenComponentId::Loading,
            Screen::Battle => ScreenComponentId::Battle,
            Screen::Victory => ScreenComponentId::Victory,
        })
    }

    fn modal(&self) -> Option<ScreenComponentId> {
        None
    }

    fn binding_context(&self, id: ScreenComponentId) -> ScreenContext {
        match id {
            ScreenComponentId::Start => ScreenContext::Form,
            ScreenComponentId::Loading => ScreenContext::Waiting,
            ScreenComponentId::Battle => ScreenContext::Combat,
            ScreenComponentId::Victory => ScreenContext::Aftermath,
        }
    }

    fn default_context(&self) -> ScreenContext {
        ScreenContext::Form
    }
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let Args {
        server,
        topic,
        poll_interval,
        debug: debug_args,
    } = Args::parse();

    let debug = DebugSession::new(debug_args);

    // Export JSON schemas if requested
    debug.save_state_schema::<AppState>().map_err(debug_error)?;
    debug.save_actions_schema::<Action>().map_err(debug_error)?;

    let state = debug
        .load_state_or_else_async(move || async move {
            Ok::<AppState, io::Error>(AppState::new(poll_interval))
        })
        .await
        .map_err(debug_error)?;

    let replay_actions = debug.load_replay_items().map_err(debug_error)?;

    let (middleware, action_recorder) = debug.middleware_with_recorder();
    let store = EffectStoreWithMiddleware::new(state, reducer, middleware);

    // ===== Terminal setup =====
    let use_alt_screen = debug.use_alt_screen();
    let mut stdout = io::stdout();
    if use_alt_screen {
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &debug, store, server, topic, replay_actions).await;

    // ===== Cleanup =====
    if use_alt_screen {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
    }

    let run_output = result?;
    run_output.write_render_output()?;
    debug
        .save_actions(action_recorder.as_ref())
        .map_err(debug_error)?;

    Ok(())
}

struct AppUi {
    start: StartScreen,
    loading: LoadingScreen,
    battle: BattleScreen,
    victory: VictoryScreen,
}

impl AppUi {
    fn new() -> Self {
        Self {
            start: StartScreen::new(),
            loading: LoadingScreen,
            battle: BattleScreen,
            victory: VictoryScreen::new(),
        }
    }

    fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        state: &AppState,
        render_ctx: RenderContext,
        event_ctx: &mut EventContext<ScreenComponentId>,
    ) {
        for id in [
            ScreenComponentId::Start,
            ScreenComponentId::Loading,
            ScreenComponentId::Battle,
            ScreenComponentId::Victory,
        ] {
            event_ctx.component_areas.remove(&id);
        }

        self.start.set_active(state.screen == Screen::Start);
        self.victory.set_active(state.screen == Screen::Victory);

        let is_focused = render_ctx.is_focused();
        match state.screen {
            Screen::Start => {
                event_ctx.set_component_area(ScreenComponentId::Start, area);
                self.start
                    .render(frame, area, start_props(state, is_focused));
            }
            Screen::Loading => {
                event_ctx.set_component_area(ScreenComponentId::Loading, area);
                self.loading
                    .render(frame, area, loading_props(state, is_focused));
            }
            Screen::Battle => {
                event_ctx.set_component_area(ScreenComponentId::Battle, area);
                let Some(props) = battle_props(state, is_focused) else {
                    return;
                };
                self.battle.render(frame, area, props);
            }
            Screen::Victory => {
                event_ctx.set_component_area(ScreenComponentId::Victory, area);
                let Some(props) = victory_props(state, is_focused) else {
                    return;
                };
                self.victory.render(frame, area, props);
            }
        }
    }

    fn handle_start_event(&mut self, event: &EventKind, state: &AppState) -> HandlerResponse<Action> {
        let actions: Vec<_> = self
            .start
            .handle_event(event, start_props(state, true))
            .into_iter()
            .collect();
        respond(actions)
    }

    fn handle_loading_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        let actions: Vec<_> = self
            .loading
            .handle_event(event, loading_props(state, true))
            .into_iter()
            .collect();
        respond(actions)
    }

    fn handle_battle_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        let Some(props) = battle_props(state, true) else {
            return HandlerResponse::ignored();
        };
        let actions: Vec<_> = self.battle.handle_event(event, props).into_iter().collect();
        respond(actions)
    }

    fn handle_victory_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        let Some(props) = victory_props(state, true) else {
            return HandlerResponse::ignored();
        };
        let actions: Vec<_> = self.victory.handle_event(event, props).into_iter().collect();
        respond(actions)
    }
}

fn respond(actions: Vec<Action>) -> HandlerResponse<Action> {
    if actions.is_empty() {
        HandlerResponse::ignored()
    } else {
        HandlerResponse {
            actions,
            consumed: true,
            needs_render: false,
        }
    }
}

fn start_props(state: &AppState, is_focused: bool) -> StartScreenProps<'_> {
    StartScreenProps {
        topic: &state.topic_input,
        error: state.last_error.as_deref(),
        is_focused,
        on_change: Action::TopicChange,
        on_submit: Action::TopicSubmit,
    }
}

fn loading_props(state: &AppState, is_focused: bool) -> LoadingScreenProps<'_> {
    let (progress, message, remaining_secs) = match state.generation.as_ref() {
        Some(generation) => (
            generation.progress_percent(),
            generation.message(),
            generation.remaining_secs(),
        ),
        None => (0, art::LOADING_MESSAGES[0], 60),
    };
    LoadingScreenProps {
        topic: &state.topic,
        progress,
        message,
        remaining_secs,
        tick: state.tick,
        is_focused,
    }
}

fn battle_props(state: &AppState, is_focused: bool) -> Option<BattleScreenProps<'_>> {
    let battle = state.battle.as_ref()?;
    Some(BattleScreenProps { battle, is_focused })
}

fn victory_props(state: &AppState, is_focused: bool) -> Option<VictoryScreenProps<'_>> {
    let battle = state.battle.as_ref()?;
    let winner = state.winner?;
    let loser = winner.opponent();
    Some(VictoryScreenProps {
        winner_name: battle.name_of(winner),
        loser_name: battle.name_of(loser),
        winner_portrait: &battle.portraits[winner.index()],
        slide_ticks: battle.victory_ticks,
        topic: &state.topic_input,
        is_focused,
        on_change: Action::TopicChange,
        on_submit: Action::TopicSubmit,
    })
}

fn debug_error(error: DebugSessionError) -> io::Error {
    io::Error::other(format!("debug session error: {error}"))
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    debug: &DebugSession,
    store: impl EffectStoreLike<AppState, Action, Effect>,
    server: String,
    topic: Option<String>,
    replay_actions: Vec<ReplayItem<Action>>,
) -> io::Result<DebugRunOutput<AppState>> {
    let ui = Rc::new(RefCell::new(AppUi::new()));
    let mut bus: EventBus<AppState, Action, ScreenComponentId, ScreenContext> = EventBus::new();
    let keybindings: Keybindings<ScreenContext> = Keybindings::new();

    let ui_start = Rc::clone(&ui);
    bus.register(ScreenComponentId::Start, move |event, state| {
        ui_start.borrow_mut().handle_start_event(&event.kind, state)
    });

    let ui_loading = Rc::clone(&ui);
    bus.register(ScreenComponentId::Loading, move |event, state| {
        ui_loading
            .borrow_mut()
            .handle_loading_event(&event.kind, state)
    });

    let ui_battle = Rc::clone(&ui);
    bus.register(ScreenComponentId::Battle, move |event, state| {
        ui_battle
            .borrow_mut()
            .handle_battle_event(&event.kind, state)
    });

    let ui_victory = Rc::clone(&ui);
    bus.register(ScreenComponentId::Victory, move |event, state| {
        ui_victory
            .borrow_mut()
            .handle_victory_event(&event.kind, state)
    });

    // Ctrl-C always exits; resizes just redraw.
    bus.register_global(|event, _state| match &event.kind {
        EventKind::Resize(_, _) => HandlerResponse::ignored().with_render(),
        EventKind::Key(key)
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            HandlerResponse {
                actions: vec![Action::Quit],
                consumed: true,
                needs_render: false,
            }
        }
        _ => HandlerResponse::ignored(),
    });

    let initial_action = topic.map(Action::TopicSubmit);

    debug
        .run_effect_app_with_bus(
            terminal,
            store,
            DebugLayer::simple(),
            replay_actions,
            initial_action,
            Some(Action::Quit),
            |runtime| {
                if debug.render_once() {
                    return;
                }

                runtime.subscriptions().interval(
                    "tick",
                    Duration::from_millis(TICK_MS),
                    || Action::Tick,
                );
            },
            &mut bus,
            &keybindings,
            |frame, area, state, render_ctx, event_ctx| {
                ui.borrow_mut()
                    .render(frame, area, state, render_ctx, event_ctx);
            },
            |action| matches!(action, Action::Quit),
            move |effect, ctx| handle_effect(&server, effect, ctx),
        )
        .await
}

/// Handle effects by spawning tasks
fn handle_effect(server: &str, effect: Effect, ctx: &mut EffectContext<Action>) {
    match effect {
        Effect::CreateBattle { topic } => {
            let server = server.to_string();
            ctx.tasks().spawn(TaskKey::new("create_battle"), async move {
                match api::create_battle(&server, &topic).await {
                    Ok(battle_id) => Action::GenerationDidStart { battle_id },
                    Err(e) => Action::GenerationDidError(e.to_string()),
                }
            });
        }
        Effect::PollStatus {
            battle_id,
            delay_ms,
        } => {
            let server = server.to_string();
            // One check per task: sleeping before the request serializes
            // ticks and keeps the chain cancellable by key.
            ctx.tasks().spawn(TaskKey::new("battle_status"), async move {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                match api::check_battle_status(&server, &battle_id).await {
                    Ok(api::BattleStatus::Completed(data)) => {
                        Action::GenerationDidComplete(Box::new(data))
                    }
                    Ok(api::BattleStatus::Processing) => Action::GenerationStillRunning,
                    Ok(api::BattleStatus::Failed(error)) => Action::GenerationDidFail(error),
                    Err(e) => Action::GenerationCheckFailed(e.to_string()),
                }
            });
        }
        Effect::CancelPoll => {
            ctx.tasks().cancel(&TaskKey::new("create_battle"));
            ctx.tasks().cancel(&TaskKey::new("battle_status"));
        }
        Effect::FetchNarrative { seq, request } => {
            let server = server.to_string();
            ctx.tasks().spawn(TaskKey::new("narrative"), async move {
                let text = api::generate_narrative(&server, &request).await;
                Action::NarrativeDidLoad { seq, text }
            });
        }
        Effect::LoadPortrait { fighter } => {
            let server = server.to_string();
            let key = format!("portrait_{}", fighter.label());
            ctx.tasks().spawn(TaskKey::new(key), async move {
                match load_portrait(&server, fighter).await {
                    Ok(portrait) => Action::PortraitDidLoad { fighter, portrait },
                    Err(error) => Action::PortraitDidError { fighter, error },
                }
            });
        }
        Effect::LoadBackdrop => {
            let server = server.to_string();
            ctx.tasks().spawn(TaskKey::new("backdrop"), async move {
                match load_backdrop(&server).await {
                    Ok(portrait) => Action::BackdropDidLoad(portrait),
                    Err(error) => Action::BackdropDidError(error),
                }
            });
        }
    }
}

async fn load_portrait(server: &str, fighter: Fighter) -> Result<portrait::Portrait, String> {
    let bytes = match api::fetch_character_image(server, fighter).await {
        Ok(bytes) => bytes,
        // Character art may not be generated yet; a sized placeholder
        // stands in.
        Err(_) => {
            let url = api::placeholder_image_url(server, 150, 200);
            api::fetch_image(&url).await.map_err(|e| e.to_string())?
        }
    };
    portrait::decode(&bytes, portrait::PORTRAIT_COLS, portrait::PORTRAIT_ROWS)
}

async fn load_backdrop(server: &str) -> Result<portrait::Portrait, String> {
    let bytes = api::fetch_background_image(server)
        .await
        .map_err(|e| e.to_string())?;
    portrait::decode(&bytes, portrait::BACKDROP_COLS, portrait::BACKDROP_ROWS)
}
