//! Operator interaction capability.
//!
//! The pipeline never touches stdin, the clipboard, or a browser directly —
//! it talks to this trait, so tests drive it with a scripted implementation
//! and no real user. [`Console`] is the production implementation.

use std::io::{self, BufRead, Write};

/// Everything the pipeline may ask of the human running it.
pub trait Interact {
    /// Ask a yes/no question; anything other than `y`/`Y` means no.
    fn ask_yes_no(&mut self, prompt: &str) -> bool;

    /// Show a prompt and block until ENTER.
    fn wait_enter(&mut self, prompt: &str);

    /// Show a prompt and return one trimmed line of input.
    fn read_line(&mut self, prompt: &str) -> String;

    /// Current clipboard text, if a clipboard is available and holds text.
    fn clipboard_text(&mut self) -> Option<String>;

    /// Open `url` in the operator's browser; `false` when launching failed.
    fn open_browser(&mut self, url: &str) -> bool;
}

/// Interactive terminal + system clipboard + default browser.
pub struct Console;

impl Console {
    fn prompt_line(prompt: &str) -> String {
        print!("{prompt}");
        let _ = io::stdout().flush();
        let mut line = String::new();
        let _ = io::stdin().lock().read_line(&mut line);
        line.trim().to_string()
    }
}

impl Interact for Console {
    fn ask_yes_no(&mut self, prompt: &str) -> bool {
        Self::prompt_line(prompt).eq_ignore_ascii_case("y")
    }

    fn wait_enter(&mut self, prompt: &str) {
        Self::prompt_line(prompt);
    }

    fn read_line(&mut self, prompt: &str) -> String {
        Self::prompt_line(prompt)
    }

    fn clipboard_text(&mut self) -> Option<String> {
        let text = arboard::Clipboard::new().ok()?.get_text().ok()?;
        let text = text.trim().to_string();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    fn open_browser(&mut self, url: &str) -> bool {
        open::that(url).is_ok()
    }
}
