//! Composition of alert notification emails.
//!
//! Bodies are rendered twice, as plain text and as HTML, so the mailer can
//! send a `multipart/alternative` message.

use chrono::NaiveDate;

use crate::severity::Severity;
use crate::types::DbId;

/// The fields of an alert and its scan result that go into an email.
#[derive(Debug, Clone)]
pub struct AlertSummary {
    pub alert_id: DbId,
    pub scan_result_id: DbId,
    pub severity: Severity,
    pub message: String,
    pub source: String,
    pub details: String,
    pub recommendations: String,
}

/// A composed email, ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedEmail {
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

pub fn compose_alert_email(summary: &AlertSummary) -> ComposedEmail {
    let subject = format!(
        "[Veille OSINT] {} severity alert on result #{}",
        summary.severity.as_str().to_uppercase(),
        summary.scan_result_id
    );

    let text_body = format!(
        "A new alert was raised.\n\n\
         Scan result: #{}\n\
         Severity: {}\n\
         Message: {}\n\
         Source: {}\n\
         Details: {}\n\n\
         Recommendations:\n{}\n",
        summary.scan_result_id,
        summary.severity,
        summary.message,
        summary.source,
        summary.details,
        recommendation_lines(&summary.recommendations),
    );

    let html_body = format!(
        "<html><body>\
         <h2>New {severity} severity alert</h2>\
         <table>\
         <tr><th align=\"left\">Scan result</th><td>#{result_id}</td></tr>\
         <tr><th align=\"left\">Severity</th><td>{severity}</td></tr>\
         <tr><th align=\"left\">Message</th><td>{message}</td></tr>\
         <tr><th align=\"left\">Source</th><td><a href=\"{source}\">{source}</a></td></tr>\
         <tr><th align=\"left\">Details</th><td>{details}</td></tr>\
         </table>\
         <h3>Recommendations</h3>\
         <p>{recommendations}</p>\
         </body></html>",
        severity = summary.severity,
        result_id = summary.scan_result_id,
        message = escape_html(&summary.message),
        source = escape_html(&summary.source),
        details = escape_html(&summary.details),
        recommendations = escape_html(&summary.recommendations),
    );

    ComposedEmail {
        subject,
        text_body,
        html_body,
    }
}

/// What a compiled report covers, for its cover email.
#[derive(Debug, Clone)]
pub struct ReportSummary {
    pub report_id: DbId,
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub scan_count: usize,
    pub alert_count: usize,
    pub has_attachment: bool,
}

pub fn compose_report_email(summary: &ReportSummary) -> ComposedEmail {
    let subject = format!(
        "[Veille OSINT] Report \"{}\" ({} to {})",
        summary.name, summary.start, summary.end
    );
    let attachment_line = if summary.has_attachment {
        "The PDF report is attached."
    } else {
        "The PDF report could not be generated; only the summary is included."
    };

    let text_body = format!(
        "Report #{id}: {name}\n\
         Period: {start} to {end}\n\
         Scans: {scans}\n\
         Alerts: {alerts}\n\n\
         {attachment_line}\n",
        id = summary.report_id,
        name = summary.name,
        start = summary.start,
        end = summary.end,
        scans = summary.scan_count,
        alerts = summary.alert_count,
    );

    let html_body = format!(
        "<html><body>\
         <h2>{name}</h2>\
         <p>Period: {start} to {end}</p>\
         <ul><li>Scans: {scans}</li><li>Alerts: {alerts}</li></ul>\
         <p>{attachment_line}</p>\
         </body></html>",
        name = escape_html(&summary.name),
        start = summary.start,
        end = summary.end,
        scans = summary.scan_count,
        alerts = summary.alert_count,
    );

    ComposedEmail {
        subject,
        text_body,
        html_body,
    }
}

fn recommendation_lines(recommendations: &str) -> String {
    if recommendations.trim().is_empty() {
        return "- none".to_string();
    }
    format!("- {recommendations}")
}

/// Escape the five HTML-significant characters.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
