//! Terminal implementations of the host UI traits used by `autosave-plus run`
//! and `autosave-plus clean`.

use std::io::{self, BufRead, Write};

use crate::host::{Confirmation, ConfirmationUi, NotificationSink, NotificationStyle};

/// Writes notifications as text lines (human mode) or JSON lines.
pub struct TerminalSink<W: Write> {
    out: W,
    human: bool,
}

impl TerminalSink<io::Stdout> {
    pub fn stdout(human: bool) -> Self {
        Self::new(io::stdout(), human)
    }
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W, human: bool) -> Self {
        Self { out, human }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> NotificationSink for TerminalSink<W> {
    fn show_transient(&mut self, text: &str, style: NotificationStyle) {
        let line = if self.human {
            match style {
                NotificationStyle::Info | NotificationStyle::Countdown => text.to_string(),
                NotificationStyle::Warning => format!("Warning: {}", text),
                NotificationStyle::Error => format!("Error: {}", text),
            }
        } else {
            serde_json::json!({
                "event": "notification",
                "style": style.label(),
                "color": style.color(),
                "text": text,
            })
            .to_string()
        };

        // A closed pipe must not take the scheduler down.
        if let Err(e) = writeln!(self.out, "{}", line).and_then(|()| self.out.flush()) {
            tracing::debug!(error = %e, "failed to write notification");
        }
    }
}

/// Asks yes/no questions on a line-based reader.
///
/// Anything other than `y`/`yes` (case-insensitive), including end of input,
/// counts as no.
pub struct PromptConfirmation<R: BufRead, W: Write> {
    input: R,
    prompt: W,
}

impl PromptConfirmation<io::StdinLock<'static>, io::Stderr> {
    pub fn stdin() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> PromptConfirmation<R, W> {
    pub fn new(input: R, prompt: W) -> Self {
        Self { input, prompt }
    }
}

impl<R: BufRead, W: Write> ConfirmationUi for PromptConfirmation<R, W> {
    fn ask_yes_no(&mut self, title: &str, message: &str) -> Confirmation {
        if let Err(e) = write!(self.prompt, "{}: {} [y/N] ", title, message)
            .and_then(|()| self.prompt.flush())
        {
            tracing::debug!(error = %e, "failed to write confirmation prompt");
        }

        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(_) => match answer.trim().to_ascii_lowercase().as_str() {
                "y" | "yes" => Confirmation::Yes,
                _ => Confirmation::No,
            },
            Err(e) => {
                tracing::warn!(error = %e, "failed to read confirmation");
                Confirmation::No
            }
        }
    }
}
