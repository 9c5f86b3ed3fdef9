//! Terminal command parsing.

use doctopdf_core::Msg;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Msg(Msg),
    Help,
    Quit,
    Unknown(String),
}

pub const HELP_TEXT: &str = "\
Commands:
  url <URL>        set the documentation URL (a bare http(s) URL works too)
  generate         create the clean copy and compliance report PDFs
  retry            repeat the last failed generation
  history          show or hide recent conversions
  clear            delete all saved conversions
  sample on|off    show demo data instead of live results
  reset            recover after an error screen
  help             show this list
  quit             exit";

pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Msg(Msg::Tick);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match (word.to_ascii_lowercase().as_str(), rest) {
        ("url", url) => Command::Msg(Msg::InputChanged(url.to_string())),
        ("generate", "") => Command::Msg(Msg::GenerateClicked),
        ("retry", "") => Command::Msg(Msg::RetryClicked),
        ("history", "") => Command::Msg(Msg::HistoryPanelToggled),
        ("clear", "") => Command::Msg(Msg::ClearHistoryClicked),
        ("sample", flag) => match flag.to_ascii_lowercase().as_str() {
            "on" => Command::Msg(Msg::SampleModeToggled(true)),
            "off" => Command::Msg(Msg::SampleModeToggled(false)),
            _ => Command::Unknown(line.to_string()),
        },
        ("reset", "") => Command::Msg(Msg::Reset),
        ("help" | "?", "") => Command::Help,
        ("quit" | "exit", "") => Command::Quit,
        _ if rest.is_empty() && line.contains("://") => {
            Command::Msg(Msg::InputChanged(line.to_string()))
        }
        _ => Command::Unknown(line.to_string()),
    }
}
