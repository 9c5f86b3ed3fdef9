use std::fmt::Write;

use chrono::{DateTime, Local, TimeZone};
use doctopdf_core::{
    plain_text, AppViewModel, ArtifactCard, HistoryRowView, MarkdownLine, ResultView, StepStatus,
};

const RULE: &str = "------------------------------------------------------------";

pub const RECOVERY_SCREEN: &str = "\
Something went wrong
An unexpected error occurred while displaying this screen.
Type `reset` to start over.";

pub fn render(view: &AppViewModel) -> String {
    render_with_zone(view, &Local)
}

pub fn render_with_zone<Tz: TimeZone>(view: &AppViewModel, zone: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let mut out = String::new();
    let sample = if view.sample_mode { "  [sample data]" } else { "" };
    let _ = writeln!(
        out,
        "Doc to PDF | Agent: {} | History: {}{}",
        view.agent_status.label(),
        view.history_count,
        sample
    );
    let _ = writeln!(out, "{RULE}");

    render_input(&mut out, view);

    if let Some(loading) = &view.loading {
        let _ = writeln!(out);
        for step in &loading.steps {
            let marker = match step.status {
                StepStatus::Complete => "[x]",
                StepStatus::Active => "[>]",
                StepStatus::Pending => "[ ]",
            };
            let _ = writeln!(out, "  {marker} {}", step.label);
        }
    }

    if let Some(error) = &view.error {
        let _ = writeln!(out);
        let _ = writeln!(out, "Error: {error}");
        let _ = writeln!(out, "  Type `retry` to try again.");
    }

    if let Some(result) = &view.result {
        let _ = writeln!(out);
        render_result(&mut out, result);
    }

    if view.show_empty_state {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Enter a documentation URL to generate a clean copy and a compliance report."
        );
    }

    if view.history_open {
        let _ = writeln!(out);
        render_history(&mut out, &view.history, zone);
    }

    out
}

fn render_input(out: &mut String, view: &AppViewModel) {
    let shown = if view.url_input.is_empty() {
        "(none)"
    } else {
        view.url_input.as_str()
    };
    let _ = writeln!(out, "URL: {shown}");
    if let Some(hint) = view.url_hint {
        let _ = writeln!(out, "  ! {hint}");
    }
    if view.input_locked {
        let _ = writeln!(out, "  Generating PDFs...");
    } else if view.can_generate {
        let _ = writeln!(out, "  Ready: type `generate`.");
    }
}

fn render_result(out: &mut String, result: &ResultView) {
    let _ = writeln!(out, "{}", result.title);
    let badges: Vec<&str> = [&result.section_badge, &result.word_badge]
        .into_iter()
        .filter_map(|badge| badge.as_deref())
        .collect();
    if !badges.is_empty() {
        let _ = writeln!(out, "  {}", badges.join(" | "));
    }
    if let Some(source) = &result.source_url {
        let _ = writeln!(out, "  Source: {source}");
    }
    if !result.summary.is_empty() {
        let _ = writeln!(out, "  Extraction summary:");
        render_markdown(out, &result.summary, "    ");
    }
    for card in &result.cards {
        render_card(out, card);
    }
}

fn render_card(out: &mut String, card: &ArtifactCard) {
    let _ = writeln!(out);
    let _ = writeln!(out, "  {}", card.slot.label());
    match (&card.download_url, &card.file_name) {
        (Some(url), Some(name)) => {
            let _ = writeln!(out, "    Download {name}: {url}");
        }
        (Some(url), None) => {
            let _ = writeln!(out, "    Download PDF: {url}");
        }
        (None, _) => {
            let _ = writeln!(out, "    PDF not available");
        }
    }
    render_markdown(out, &card.info, "    ");
}

fn render_markdown(out: &mut String, lines: &[MarkdownLine], indent: &str) {
    let mut ordinal = 0;
    for line in lines {
        if !matches!(line, MarkdownLine::Numbered(_)) {
            ordinal = 0;
        }
        let _ = match line {
            MarkdownLine::Heading { level: 1, text } => {
                writeln!(out, "{indent}{}", text.to_uppercase())
            }
            MarkdownLine::Heading { text, .. } => writeln!(out, "{indent}{text}"),
            MarkdownLine::Bullet(spans) => writeln!(out, "{indent}- {}", plain_text(spans)),
            MarkdownLine::Numbered(spans) => {
                ordinal += 1;
                writeln!(out, "{indent}{ordinal}. {}", plain_text(spans))
            }
            MarkdownLine::Blank => writeln!(out),
            MarkdownLine::Paragraph(spans) => writeln!(out, "{indent}{}", plain_text(spans)),
        };
    }
}

fn render_history<Tz: TimeZone>(out: &mut String, rows: &[HistoryRowView], zone: &Tz)
where
    Tz::Offset: std::fmt::Display,
{
    let _ = writeln!(out, "Recent conversions");
    if rows.is_empty() {
        let _ = writeln!(out, "  No conversions yet.");
        return;
    }
    for row in rows {
        let _ = writeln!(out, "  {}", row.title);
        let _ = writeln!(
            out,
            "    {} | {}",
            row.display_url,
            format_timestamp(&row.created_at, zone)
        );
        for link in &row.downloads {
            let _ = writeln!(out, "    {}: {}", link.label, link.url);
        }
    }
}

/// Formats an RFC 3339 timestamp for display; unparseable input is shown as-is.
pub fn format_timestamp<Tz: TimeZone>(raw: &str, zone: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match DateTime::parse_from_rfc3339(raw) {
        Ok(parsed) => parsed
            .with_timezone(zone)
            .format("%b %-d, %Y %H:%M")
            .to_string(),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use doctopdf_core::{
        present_history_row, sample_artifacts, sample_history, sample_result, update,
        AppState, Msg,
    };

    fn screen(state: &AppState) -> String {
        render_with_zone(&state.view(), &Utc)
    }

    fn with(msgs: Vec<Msg>) -> AppState {
        msgs.into_iter()
            .fold(AppState::new(), |state, msg| update(state, msg).0)
    }

    #[test]
    fn empty_state_invites_a_url() {
        let text = screen(&AppState::new());
        assert!(text.contains("Agent: Ready"));
        assert!(text.contains("URL: (none)"));
        assert!(text.contains("Enter a documentation URL"));
    }

    #[test]
    fn invalid_url_shows_the_inline_hint() {
        let text = screen(&with(vec![Msg::InputChanged("not-a-url".into())]));
        assert!(text.contains("! Please enter a valid URL starting with http:// or https://"));
        assert!(!text.contains("type `generate`"));
    }

    #[test]
    fn loading_panel_marks_the_active_step() {
        let state = with(vec![
            Msg::InputChanged("https://docs.example.com".into()),
            Msg::GenerateClicked,
        ]);
        let text = screen(&state);
        assert!(text.contains("Agent: Processing"));
        assert!(text.contains("[>]"));
        assert_eq!(text.matches("[ ]").count(), 2);
    }

    #[test]
    fn sample_result_renders_cards_and_history() {
        let state = with(vec![Msg::SampleModeToggled(true), Msg::HistoryPanelToggled]);
        let text = screen(&state);
        let result = sample_result();

        assert!(text.contains("[sample data]"));
        if let Some(title) = &result.document_title {
            assert!(text.contains(title.as_str()));
        }
        assert!(text.contains("Clean Copy"));
        assert!(text.contains("Compliance Report"));
        assert!(text.contains(&sample_artifacts()[0].url));
        for record in sample_history() {
            assert!(text.contains(&present_history_row(&record).display_url));
        }
    }

    #[test]
    fn missing_artifact_url_is_reported() {
        let card = ArtifactCard {
            slot: doctopdf_core::ArtifactSlot::ComplianceReport,
            info: Vec::new(),
            download_url: None,
            file_name: None,
        };
        let mut out = String::new();
        render_card(&mut out, &card);
        assert!(out.contains("PDF not available"));
    }

    #[test]
    fn timestamps_are_formatted_or_passed_through() {
        assert_eq!(
            format_timestamp("2026-03-01T12:05:00.000Z", &Utc),
            "Mar 1, 2026 12:05"
        );
        assert_eq!(format_timestamp("yesterday", &Utc), "yesterday");
    }

    #[test]
    fn numbered_items_restart_after_other_lines() {
        let lines = doctopdf_core::format_markdown("1. one\n2. two\n\n7. again");
        let mut out = String::new();
        render_markdown(&mut out, &lines, "");
        assert_eq!(out, "1. one\n2. two\n\n1. again\n");
    }
}
