pub mod battle_screen;
pub mod loading_screen;
pub mod start_screen;
pub mod victory_screen;

// Re-export core Component trait
pub use tui_dispatch::Component;

pub use battle_screen::{BattleScreen, BattleScreenProps};
pub use loading_screen::{LoadingScreen, LoadingScreenProps};
pub use start_screen::{StartScreen, StartScreenProps};
pub use victory_screen::{VictoryScreen, VictoryScreenProps};
