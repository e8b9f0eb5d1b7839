//! Telegram message bodies (HTML parse mode).

use crate::models::{ClickEvent, Lead, VisitorRecord};
use chrono::{DateTime, Utc};

const BRAND: &str = "Fintra UK";

/// Collection sizes reported by `/status`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub visitors: usize,
    pub loan_leads: usize,
    pub debt_leads: usize,
    pub contact_leads: usize,
    pub subscribers: usize,
}

pub fn visitor(record: &VisitorRecord) -> String {
    let mut lines = vec![
        "🌐 <b>New Visitor</b>".to_string(),
        String::new(),
        format!(
            "📍 <b>Location:</b> {}, {}",
            escape(&record.location.city),
            escape(&record.location.country)
        ),
        record.device_label().to_string(),
        format!(
            "🌐 <b>Browser:</b> {} {}",
            escape(&record.browser),
            escape(&record.browser_version)
        ),
        format!("💻 <b>OS:</b> {}", escape(&record.os)),
        format!("📄 <b>Page:</b> {}", escape(&record.page)),
        format!("🔗 <b>Referrer:</b> {}", escape(&record.referrer)),
    ];
    if let Some(campaign) = &record.utm_campaign {
        lines.push(format!("📧 <b>Campaign:</b> {}", escape(campaign)));
    }
    lines.push(format!("🕐 <b>Time:</b> {}", format_time(&record.timestamp)));
    lines.join("\n")
}

pub fn click(event: &ClickEvent) -> String {
    [
        "🖱️ <b>Button Click</b>".to_string(),
        String::new(),
        format!("🔘 <b>Button:</b> {}", escape(or_undefined(&event.button))),
        format!("📄 <b>Page:</b> {}", escape(or_undefined(&event.page))),
        format!("🕐 <b>Time:</b> {}", format_time(&event.timestamp)),
    ]
    .join("\n")
}

pub fn loan_lead(lead: &Lead, lead_number: usize) -> String {
    [
        "🎉 <b>NEW LOAN APPLICATION!</b>".to_string(),
        String::new(),
        name_line(lead),
        format!("📧 <b>Email:</b> {}", escape(&lead.field("email"))),
        format!("📞 <b>Phone:</b> {}", escape(&lead.field("phone"))),
        location_line(lead),
        format!("💼 <b>Employment:</b> {}", escape(&lead.optional_field("employmentStatus"))),
        format!("💰 <b>Monthly Income:</b> £{}", escape(&lead.optional_field("monthlyIncome"))),
        format!("💷 <b>Loan Amount:</b> £{}", escape(&lead.optional_field("requestedAmount"))),
        format!("📝 <b>Purpose:</b> {}", escape(&lead.optional_field("loanPurpose"))),
        format!("🕐 <b>Time:</b> {}", format_time(&lead.timestamp)),
        String::new(),
        format!("✅ Lead #{lead_number}"),
    ]
    .join("\n")
}

pub fn debt_lead(lead: &Lead, lead_number: usize) -> String {
    [
        "🎉 <b>NEW DEBT MANAGEMENT LEAD!</b>".to_string(),
        String::new(),
        name_line(lead),
        format!("📧 <b>Email:</b> {}", escape(&lead.field("email"))),
        format!("📞 <b>Phone:</b> {}", escape(&lead.field("phone"))),
        location_line(lead),
        format!("💰 <b>Total Debt:</b> £{}", escape(&lead.optional_field("totalDebt"))),
        format!("👥 <b>Creditors:</b> {}", escape(&lead.optional_field("numCreditors"))),
        format!("💼 <b>Employment:</b> {}", escape(&lead.optional_field("employmentStatus"))),
        format!("💵 <b>Monthly Income:</b> £{}", escape(&lead.optional_field("monthlyIncome"))),
        format!("🕐 <b>Time:</b> {}", format_time(&lead.timestamp)),
        String::new(),
        format!("✅ Lead #{lead_number}"),
    ]
    .join("\n")
}

pub fn contact_lead(lead: &Lead) -> String {
    [
        "📬 <b>NEW CONTACT MESSAGE</b>".to_string(),
        String::new(),
        format!("👤 <b>Name:</b> {}", escape(&lead.field("name"))),
        format!("📧 <b>Email:</b> {}", escape(&lead.field("email"))),
        format!("📞 <b>Phone:</b> {}", escape(&lead.field("phone"))),
        format!("💬 <b>Message:</b> {}", escape(&lead.field("message"))),
        format!("🕐 <b>Time:</b> {}", format_time(&lead.timestamp)),
    ]
    .join("\n")
}

pub fn welcome() -> String {
    format!(
        "✅ <b>Welcome to {BRAND} Notifications!</b>\n\n\
         You are now subscribed to receive real-time alerts for:\n\
         👁 New website visitors\n\
         📝 Form submissions\n\
         🖱 Button clicks\n\n\
         Use /stop to unsubscribe."
    )
}

pub fn already_subscribed() -> String {
    "ℹ️ You are already subscribed! Use /stop to unsubscribe.".to_string()
}

pub fn unsubscribed() -> String {
    format!(
        "👋 You have been unsubscribed from {BRAND} notifications.\n\nUse /start to subscribe again."
    )
}

pub fn not_subscribed() -> String {
    "ℹ️ You are not currently subscribed. Use /start to subscribe.".to_string()
}

pub fn status(counts: StatusCounts) -> String {
    format!(
        "📊 <b>{BRAND} Dashboard Status</b>\n\n\
         👥 Total Visitors: {}\n\
         💰 Loan Applications: {}\n\
         📋 Debt Consultations: {}\n\
         📞 Contact Requests: {}\n\
         🔔 Active Subscribers: {}",
        counts.visitors, counts.loan_leads, counts.debt_leads, counts.contact_leads, counts.subscribers
    )
}

pub fn help() -> String {
    format!(
        "🤖 <b>{BRAND} Bot Commands</b>\n\n\
         /start - Subscribe to notifications\n\
         /stop - Unsubscribe from notifications\n\
         /status - View current statistics\n\
         /help - Show this help message"
    )
}

fn name_line(lead: &Lead) -> String {
    format!(
        "👤 <b>Name:</b> {} {}",
        escape(&lead.field("firstName")),
        escape(&lead.field("lastName"))
    )
}

fn location_line(lead: &Lead) -> String {
    format!(
        "📍 <b>Location:</b> {}, {}",
        escape(&lead.field("city")),
        escape(&lead.field("postcode"))
    )
}

fn or_undefined(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("undefined")
}

/// `17 Oct 2026, 14:05 UTC`; unparsable timestamps are shown as stored.
pub fn format_time(timestamp: &str) -> String {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|time| time.with_timezone(&Utc).format("%d %b %Y, %H:%M UTC").to_string())
        .unwrap_or_else(|_| timestamp.to_string())
}

/// Submitted values go out in HTML parse mode, where a stray `<` makes
/// Telegram reject the whole message.
fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LeadKind;
    use serde_json::{json, Value};

    fn lead(kind: LeadKind, body: Value) -> Lead {
        let Value::Object(fields) = body else {
            unreachable!()
        };
        Lead::new(kind, fields, "1.2.3.4".to_string())
    }

    #[test]
    fn loan_message_uses_placeholders() {
        let lead = lead(
            LeadKind::Loan,
            json!({ "firstName": "A", "lastName": "B", "email": "a@b.com", "requestedAmount": "5000" }),
        );
        let text = loan_lead(&lead, 3);

        assert!(text.contains("👤 <b>Name:</b> A B"));
        assert!(text.contains("💷 <b>Loan Amount:</b> £5000"));
        assert!(text.contains("📞 <b>Phone:</b> undefined"));
        assert!(text.contains("💼 <b>Employment:</b> N/A"));
        assert!(text.ends_with("✅ Lead #3"));
    }

    #[test]
    fn submitted_markup_is_escaped() {
        let lead = lead(LeadKind::Contact, json!({ "name": "<script>", "message": "a & b" }));
        let text = contact_lead(&lead);
        assert!(text.contains("&lt;script&gt;"));
        assert!(text.contains("a &amp; b"));
    }

    #[test]
    fn status_lists_every_count() {
        let text = status(StatusCounts {
            visitors: 10,
            loan_leads: 4,
            debt_leads: 3,
            contact_leads: 2,
            subscribers: 1,
        });
        assert!(text.contains("Total Visitors: 10"));
        assert!(text.contains("Loan Applications: 4"));
        assert!(text.contains("Debt Consultations: 3"));
        assert!(text.contains("Contact Requests: 2"));
        assert!(text.contains("Active Subscribers: 1"));
    }

    #[test]
    fn time_is_rendered_in_utc() {
        assert_eq!(format_time("2026-10-17T14:05:09.000Z"), "17 Oct 2026, 14:05 UTC");
        assert_eq!(format_time("garbage"), "garbage");
    }
}
