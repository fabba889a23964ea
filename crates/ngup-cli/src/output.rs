//! Console output for the CLI
//!
//! The session core reports through a [`StatusSink`]; `ConsoleSink` is the
//! terminal implementation. Status lines with a `Label: value` shape get a
//! green label, the way the rest of the output in this tool is styled.

use crossterm::style::Stylize;

use ngup_session::StatusSink;

/// Terminal-backed status sink: informational lines to stdout, error lines
/// to stderr in red.
pub struct ConsoleSink;

impl StatusSink for ConsoleSink {
    fn line(&mut self, line: &str) {
        match line.split_once(": ") {
            Some((label, value)) => {
                println!("{} {}", format!("{}:", label).green(), value)
            }
            None => println!("{}", line),
        }
    }

    fn error(&mut self, line: &str) {
        eprintln!("{}", line.red());
    }
}

/// Print an error message in red with an X prefix
///
/// Outputs to stderr with red coloring for error feedback to the user.
pub fn print_error(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Red),
        Print("✗ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}
