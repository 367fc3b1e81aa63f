use crate::backup::data::CopyProgress;
use std::io::{self, BufRead, Write};

/// Receives progress while files are streamed.
pub trait ProgressObserver {
    fn on_copy_progress(&mut self, progress: &CopyProgress<'_>);
}

/// Ignores progress updates.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentProgress;

impl ProgressObserver for SilentProgress {
    fn on_copy_progress(&mut self, _progress: &CopyProgress<'_>) {}
}

/// Confirmation, reporting and text entry, as offered by the menu.
pub trait Frontend: ProgressObserver {
    /// Asks a yes/no question.
    fn confirm(&mut self, prompt: &str) -> bool;

    fn report_error(&mut self, code: i32, message: &str);

    fn report_info(&mut self, title: &str, message: &str);

    /// Asks for a backup name, pre-filled with `suggestion`. `None` means cancelled.
    fn request_name(&mut self, suggestion: &str) -> Option<String>;
}

/// Line-based front end for terminals.
pub struct ConsoleFrontend<R, W> {
    input: R,
    output: W,
    assume_yes: bool,
    preset_name: Option<String>,
}

impl ConsoleFrontend<io::StdinLock<'static>, io::Stdout> {
    /// Front end on the process's stdin and stdout.
    pub fn stdio(assume_yes: bool, preset_name: Option<String>) -> Self {
        Self::new(io::stdin().lock(), io::stdout(), assume_yes, preset_name)
    }
}

impl<R: BufRead, W: Write> ConsoleFrontend<R, W> {
    pub fn new(input: R, output: W, assume_yes: bool, preset_name: Option<String>) -> Self {
        Self {
            input,
            output,
            assume_yes,
            preset_name,
        }
    }

    /// Reads one trimmed line. End of input or a read error yields `None`.
    fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
            Err(e) => {
                log::error!("Failed to read from input: {}", e);
                None
            }
        }
    }

    /// Consumes the front end and returns its output sink.
    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> ProgressObserver for ConsoleFrontend<R, W> {
    fn on_copy_progress(&mut self, progress: &CopyProgress<'_>) {
        let _ = write!(
            self.output,
            "\rCopying {} ({}/{} bytes)",
            progress.file_name, progress.copied, progress.total
        );
        if progress.copied >= progress.total {
            let _ = writeln!(self.output);
        }
        let _ = self.output.flush();
    }
}

impl<R: BufRead, W: Write> Frontend for ConsoleFrontend<R, W> {
    fn confirm(&mut self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        let _ = write!(self.output, "{} [y/N] ", prompt);
        let _ = self.output.flush();
        self.read_line()
            .map(|answer| matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
            .unwrap_or(false)
    }

    fn report_error(&mut self, code: i32, message: &str) {
        log::error!("{} (code {})", message.replace('\n', ": "), code);
        let _ = writeln!(self.output, "Error {}: {}", code, message);
    }

    fn report_info(&mut self, title: &str, message: &str) {
        let _ = writeln!(self.output, "{}\n{}", title, message);
    }

    fn request_name(&mut self, suggestion: &str) -> Option<String> {
        if let Some(name) = self.preset_name.take() {
            return Some(name);
        }
        let _ = write!(self.output, "Backup name [{}]: ", suggestion);
        let _ = self.output.flush();
        let answer = self.read_line()?;
        if answer.trim().is_empty() {
            Some(suggestion.to_string())
        } else {
            Some(answer)
        }
    }
}
