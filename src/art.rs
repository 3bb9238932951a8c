//! Built-in ASCII art and loading copy

/// Start screen banner.
pub const TITLE_BANNER: &[&str] = &[
    r" ____    _  _____ _____ _     _____ _ ",
    r"| __ )  / \|_   _|_   _| |   | ____| |",
    r"|  _ \ / _ \ | |   | | | |   |  _| | |",
    r"| |_) / ___ \| |   | | | |___| |___|_|",
    r"|____/_/   \_\_|   |_| |_____|_____(_)",
];

pub const TITLE_TAGLINE: &str = "Create epic battles on any topic!";

/// Braille spinner for the loading screen.
pub const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn spinner_frame(tick: u64) -> &'static str {
    SPINNER_FRAMES[(tick as usize) % SPINNER_FRAMES.len()]
}

/// Rotating status lines while generation runs, ordered by progress.
pub const LOADING_MESSAGES: &[&str] = &[
    "Searching for champions...",
    "Finding the perfect match...",
    "Analyzing their strengths...",
    "Creating move sets...",
    "Determining battle stats...",
    "Setting the battlefield...",
    "The battle is cooking...",
    "Almost ready...",
    "Finalizing the details...",
];

/// Stand-in fighter when the portrait fetch fails or is still loading.
pub const FIGHTER_SILHOUETTE: &[&str] = &[
    r"    ____    ",
    r"   /    \   ",
    r"  | @  @ |  ",
    r"   \ __ /   ",
    r"  __|  |__  ",
    r" /  |  |  \ ",
    r" |  |  |  | ",
    r"    |  |    ",
    r"   _|  |_   ",
    r"  /__/\__\  ",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_wraps() {
        assert_eq!(spinner_frame(0), SPINNER_FRAMES[0]);
        assert_eq!(spinner_frame(SPINNER_FRAMES.len() as u64), SPINNER_FRAMES[0]);
    }

    #[test]
    fn test_loading_copy_is_ordered() {
        assert_eq!(LOADING_MESSAGES.len(), 9);
        assert_eq!(LOADING_MESSAGES[0], "Searching for champions...");
        assert_eq!(LOADING_MESSAGES[8], "Finalizing the details...");
    }
}
