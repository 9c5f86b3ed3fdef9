//! Fixed demo data shown while sample mode is on.

use crate::model::{Artifact, ConversionRecord, ParsedResult};

pub fn sample_result() -> ParsedResult {
    ParsedResult {
        source_url: Some("https://docs.example.com/api/getting-started".to_string()),
        document_title: Some("API Getting Started Guide".to_string()),
        section_count: Some(12),
        word_count: Some(3450),
        extraction_summary: Some(
            "Successfully extracted 12 sections from the API Getting Started Guide including \
             authentication, endpoints, rate limiting, and error handling documentation."
                .to_string(),
        ),
        clean_copy_info: Some(
            "A clean, faithful reproduction of the original documentation content formatted as \
             a professional PDF with preserved heading hierarchy, code blocks, and tables."
                .to_string(),
        ),
        compliance_report_info: Some(
            "Structured compliance report with document metadata, extraction timestamps, \
             section inventory, word counts per section, and content integrity verification \
             checksums."
                .to_string(),
        ),
    }
}

pub fn sample_artifacts() -> Vec<Artifact> {
    vec![
        Artifact::new("#sample-clean-copy")
            .with_name("clean_copy.pdf")
            .with_format("pdf"),
        Artifact::new("#sample-compliance-report")
            .with_name("compliance_report.pdf")
            .with_format("pdf"),
    ]
}

pub fn sample_history() -> Vec<ConversionRecord> {
    vec![
        ConversionRecord {
            id: 1,
            source_url: "https://docs.example.com/api/getting-started".to_string(),
            title: "API Getting Started Guide".to_string(),
            created_at: "2026-02-28T10:30:00.000Z".to_string(),
            artifacts: sample_artifacts(),
        },
        ConversionRecord {
            id: 2,
            source_url: "https://docs.example.com/sdk/python".to_string(),
            title: "Python SDK Reference".to_string(),
            created_at: "2026-02-27T14:15:00.000Z".to_string(),
            artifacts: vec![Artifact::new("#sample")
                .with_name("python_sdk.pdf")
                .with_format("pdf")],
        },
    ]
}
