use url::Url;

use crate::markdown::{format_markdown, MarkdownLine};
use crate::model::{Artifact, ConversionRecord, ParsedResult, UNTITLED};

/// Title shown for a result that carried no document title.
pub const UNTITLED_DOCUMENT: &str = "Untitled Document";

const HISTORY_URL_WIDTH: usize = 40;

/// Semantic slot an artifact is displayed in.
///
/// Slots are assigned by position only: the first artifact is the clean copy
/// and the second the compliance report. The agent reply carries no role tag,
/// so a reordered or missing artifact is shown under the wrong label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactSlot {
    CleanCopy,
    ComplianceReport,
}

impl ArtifactSlot {
    pub const ALL: [ArtifactSlot; 2] = [ArtifactSlot::CleanCopy, ArtifactSlot::ComplianceReport];

    pub fn label(self) -> &'static str {
        match self {
            ArtifactSlot::CleanCopy => "Clean Copy",
            ArtifactSlot::ComplianceReport => "Compliance Report",
        }
    }

    pub fn for_index(index: usize) -> Self {
        if index == 0 {
            ArtifactSlot::CleanCopy
        } else {
            ArtifactSlot::ComplianceReport
        }
    }

    fn index(self) -> usize {
        match self {
            ArtifactSlot::CleanCopy => 0,
            ArtifactSlot::ComplianceReport => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactCard {
    pub slot: ArtifactSlot,
    pub info: Vec<MarkdownLine>,
    /// `None` renders as "PDF not available".
    pub download_url: Option<String>,
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultView {
    pub title: String,
    pub section_badge: Option<String>,
    pub word_badge: Option<String>,
    pub source_url: Option<String>,
    pub summary: Vec<MarkdownLine>,
    pub cards: Vec<ArtifactCard>,
}

pub fn present_result(parsed: &ParsedResult, artifacts: &[Artifact]) -> ResultView {
    let cards = ArtifactSlot::ALL
        .into_iter()
        .filter_map(|slot| {
            let artifact = artifacts.get(slot.index());
            let info = match slot {
                ArtifactSlot::CleanCopy => non_empty(&parsed.clean_copy_info),
                ArtifactSlot::ComplianceReport => non_empty(&parsed.compliance_report_info),
            };
            if artifact.is_none() && info.is_none() {
                return None;
            }
            Some(ArtifactCard {
                slot,
                info: info.map(format_markdown).unwrap_or_default(),
                download_url: artifact.filter(|a| a.has_url()).map(|a| a.url.clone()),
                file_name: artifact.and_then(|a| a.name.clone()),
            })
        })
        .collect();

    ResultView {
        title: parsed
            .document_title
            .clone()
            .unwrap_or_else(|| UNTITLED_DOCUMENT.to_string()),
        section_badge: positive(parsed.section_count).map(|n| format!("{n} sections")),
        word_badge: positive(parsed.word_count)
            .map(|n| format!("{} words", format_with_commas(n))),
        source_url: non_empty(&parsed.source_url).map(ToOwned::to_owned),
        summary: non_empty(&parsed.extraction_summary)
            .map(format_markdown)
            .unwrap_or_default(),
        cards,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadLink {
    pub label: &'static str,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRowView {
    pub id: u64,
    pub title: String,
    pub display_url: String,
    pub source_url: String,
    pub created_at: String,
    pub downloads: Vec<DownloadLink>,
}

pub fn present_history_row(record: &ConversionRecord) -> HistoryRowView {
    let title = if record.title.is_empty() {
        UNTITLED.to_string()
    } else {
        record.title.clone()
    };
    let downloads = record
        .artifacts
        .iter()
        .enumerate()
        .filter(|(_, artifact)| artifact.has_url())
        .map(|(index, artifact)| DownloadLink {
            label: ArtifactSlot::for_index(index).label(),
            url: artifact.url.clone(),
        })
        .collect();
    HistoryRowView {
        id: record.id,
        title,
        display_url: truncate_url(&record.source_url, HISTORY_URL_WIDTH),
        source_url: record.source_url.clone(),
        created_at: record.created_at.clone(),
        downloads,
    }
}

/// Shortens a URL to `max_len` characters, preferring `host/path` without `www.`.
pub fn truncate_url(url: &str, max_len: usize) -> String {
    if url.chars().count() <= max_len {
        return url.to_string();
    }
    match Url::parse(url) {
        Ok(parsed) => {
            let host = parsed.host_str().unwrap_or_default().replacen("www.", "", 1);
            let display = format!("{host}{}", parsed.path());
            ellipsize(&display, max_len)
        }
        Err(_) => ellipsize_always(url, max_len),
    }
}

fn ellipsize(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        ellipsize_always(text, max_len)
    } else {
        text.to_string()
    }
}

fn ellipsize_always(text: &str, max_len: usize) -> String {
    let kept: String = text.chars().take(max_len.saturating_sub(3)).collect();
    format!("{kept}...")
}

pub fn format_with_commas(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn positive(value: Option<u64>) -> Option<u64> {
    value.filter(|n| *n > 0)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|text| !text.is_empty())
}
