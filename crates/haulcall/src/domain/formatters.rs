//! Display Formatters
//!
//! Pure helpers turning raw record values into operator-facing text.

use chrono::{DateTime, Local, Utc};

use crate::domain::entities::FieldValue;
use crate::domain::value_objects::CallStatus;

/// Visual tone of a status badge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Pending,
    Active,
    Success,
    Danger,
    Neutral,
}

/// Label and tone for a call status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusDisplay {
    pub label: String,
    pub tone: Tone,
}

pub fn status_display(status: CallStatus) -> StatusDisplay {
    let (label, tone) = match status {
        CallStatus::Initiated => ("Initiated", Tone::Pending),
        CallStatus::InProgress => ("In Progress", Tone::Active),
        CallStatus::Completed => ("Completed", Tone::Success),
        CallStatus::Failed => ("Failed", Tone::Danger),
    };
    StatusDisplay {
        label: label.to_string(),
        tone,
    }
}

/// Like [`status_display`] but for a raw status code, unknown codes shown as-is
pub fn status_display_raw(status: &str) -> StatusDisplay {
    match status.parse::<CallStatus>() {
        Ok(status) => status_display(status),
        Err(_) => StatusDisplay {
            label: status.to_string(),
            tone: Tone::Neutral,
        },
    }
}

/// Local time, or "N/A" when absent
pub fn format_date(date: Option<&DateTime<Utc>>) -> String {
    match date {
        Some(date) => date
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => "N/A".to_string(),
    }
}

/// `load_number` -> `Load Number`
pub fn format_field_name(field_name: &str) -> String {
    field_name
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn format_boolean(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

pub fn format_field_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Bool(flag) => format_boolean(*flag).to_string(),
        FieldValue::Number(number) if number.fract() == 0.0 && number.abs() < 1e15 => {
            format!("{}", *number as i64)
        }
        FieldValue::Number(number) => number.to_string(),
        FieldValue::Text(text) => text.clone(),
        FieldValue::Null => "N/A".to_string(),
    }
}

/// Truncate string safely for UTF-8 (by char count, not bytes)
pub fn truncate_string(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        format!("{}...", s.chars().take(max_chars).collect::<String>())
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_names() {
        assert_eq!(format_field_name("load_number"), "Load Number");
        assert_eq!(format_field_name("eta"), "Eta");
        assert_eq!(format_field_name("pod_reminder_acknowledged"), "Pod Reminder Acknowledged");
        assert_eq!(format_field_name(""), "");
    }

    #[test]
    fn test_field_values() {
        assert_eq!(format_field_value(&FieldValue::Bool(false)), "No");
        assert_eq!(format_field_value(&FieldValue::Number(4.0)), "4");
        assert_eq!(format_field_value(&FieldValue::Number(2.5)), "2.5");
        assert_eq!(format_field_value(&FieldValue::Null), "N/A");
        assert_eq!(
            format_field_value(&FieldValue::Text("Delayed".to_string())),
            "Delayed"
        );
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(status_display(CallStatus::InProgress).label, "In Progress");
        assert_eq!(status_display(CallStatus::Failed).tone, Tone::Danger);

        let unknown = status_display_raw("queued");
        assert_eq!(unknown.label, "queued");
        assert_eq!(unknown.tone, Tone::Neutral);
    }

    #[test]
    fn test_missing_date() {
        assert_eq!(format_date(None), "N/A");
    }

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate_string("héllo world", 5), "héllo...");
        assert_eq!(truncate_string("short", 10), "short");
    }
}
