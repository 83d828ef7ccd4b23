//! Plain-text and HTML bodies for outgoing summaries.

use chrono::{DateTime, Utc};

pub const TEST_TITLE: &str = "Test Email - Meeting Notes Summarizer";

/// Subject line for a shared summary
pub fn summary_subject(title: &str) -> String {
    format!("Meeting Summary: {}", title)
}

/// Plain-text alternative
pub fn summary_text(title: &str, summary: &str) -> String {
    format!(
        "Meeting Summary: {title}\n\
\n\
{summary}\n\
\n\
---\n\
This summary was generated by precis, the AI-powered meeting notes summarizer.\n"
    )
}

/// HTML alternative; the summary is escaped and line breaks preserved
pub fn summary_html(title: &str, summary: &str) -> String {
    let title = escape_html(title);
    let body = escape_html(summary).replace('\n', "<br>\n");

    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>{title}</title></head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
  <h2 style="color: #2563eb;">Meeting Summary: {title}</h2>
  <div style="background: #f8fafc; padding: 16px; border-radius: 8px;">
{body}
  </div>
  <p style="font-size: 12px; color: #64748b;">This summary was generated by precis, the AI-powered meeting notes summarizer.</p>
</body>
</html>
"#
    )
}

/// Body of the relay self-test message
pub fn test_message(recipient: &str, sent_at: DateTime<Utc>) -> String {
    format!(
        "This is a test email from the AI-Powered Meeting Notes Summarizer.\n\
\n\
If you received this email, the email sharing functionality is working correctly.\n\
\n\
Test Details:\n\
- Sent at: {}\n\
- Recipient: {}\n\
- Service Status: Operational",
        sent_at.to_rfc3339(),
        recipient
    )
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
