//! Tranche summary reports.
//!
//! Four files describe an extracted tranche: the full message list as a
//! JSON side-car, a tab-separated overview (sender, recipients, subject,
//! normalized date, page count), and frequency-sorted sender/recipient
//! tallies for a quick view of who the tranche is about.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{info, warn};

use crate::error::{Result, ShredError};
use crate::model::email::Email;
use crate::model::header::HeaderLabel;

/// Leading day-of-week prefix, abbreviated or spelled out.
static DAY_OF_WEEK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(monday|tuesday|wednesday|thursday|friday|saturday|sunday|mon|tue|wed|thu|fri|sat|sun),?\s+")
        .expect("dow regex")
});

/// Write the four report files for a finished tranche.
///
/// Produces `<base>-emails.json`, `<base>-emails.txt`, `<base>-senders.txt`
/// and `<base>-recipients.txt` inside `out_dir`.
pub fn generate(emails: &[Email], out_dir: &Path, base_name: &str) -> Result<()> {
    std::fs::create_dir_all(out_dir).map_err(|e| ShredError::io(out_dir, e))?;

    let json_path = out_dir.join(format!("{base_name}-emails.json"));
    let json = serde_json::to_string_pretty(emails)
        .map_err(|e| ShredError::Report(format!("serializing message list: {e}")))?;
    std::fs::write(&json_path, json).map_err(|e| ShredError::io(&json_path, e))?;

    let mut senders: HashMap<String, u64> = HashMap::new();
    let mut recipients: HashMap<String, u64> = HashMap::new();
    let mut overview = String::new();

    for email in emails {
        let from = header_value(email, HeaderLabel::From).trim().to_string();
        let to = header_value(email, HeaderLabel::To);
        let subject = header_value(email, HeaderLabel::Subject).trim().to_string();
        // Tranches spell the date either way; prefer Date, fall back to Sent.
        let raw_date = {
            let d = header_value(email, HeaderLabel::Date);
            if d.trim().is_empty() {
                header_value(email, HeaderLabel::Sent)
            } else {
                d
            }
        };
        let date = normalize_date(&raw_date);
        let num_pages = email.num_pages().unwrap_or(0);

        *senders.entry(from.clone()).or_insert(0) += 1;
        for recipient in to.split(';') {
            let recipient = recipient.trim();
            *recipients.entry(recipient.to_string()).or_insert(0) += 1;
        }

        let to_joined = to
            .split(';')
            .map(str::trim)
            .collect::<Vec<_>>()
            .join("; ");
        let _ = writeln!(
            overview,
            "{from}\t{to_joined}\t{subject}\t{date}\t{num_pages}"
        );
    }

    let overview_path = out_dir.join(format!("{base_name}-emails.txt"));
    std::fs::write(&overview_path, overview).map_err(|e| ShredError::io(&overview_path, e))?;

    write_tally(&senders, &out_dir.join(format!("{base_name}-senders.txt")))?;
    write_tally(
        &recipients,
        &out_dir.join(format!("{base_name}-recipients.txt")),
    )?;

    info!(
        out_dir = %out_dir.display(),
        base = base_name,
        count = emails.len(),
        "report written"
    );
    Ok(())
}

fn header_value(email: &Email, label: HeaderLabel) -> String {
    email
        .headers
        .get(label)
        .map(|h| h.value.clone())
        .unwrap_or_default()
}

/// Write a `value<TAB>count` file, most frequent first.
fn write_tally(tally: &HashMap<String, u64>, path: &Path) -> Result<()> {
    let mut entries: Vec<(&str, u64)> = tally
        .iter()
        .filter(|(k, _)| !k.is_empty())
        .map(|(k, v)| (k.as_str(), *v))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let mut out = String::new();
    for (key, count) in entries {
        let _ = writeln!(out, "{key}\t{count}");
    }
    std::fs::write(path, out).map_err(|e| ShredError::io(path, e))
}

/// Normalize a header date to `YYYY-MM-DD HH:MM:SS`.
///
/// Unparseable dates pass through trimmed, so the overview never loses the
/// original text.
pub fn normalize_date(raw: &str) -> String {
    match parse_date(raw) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => raw.trim().to_string(),
    }
}

/// Parse an email date header in the formats email PDF dumps actually use.
///
/// Tries RFC 2822 and RFC 3339 first, then the Outlook/Gmail display
/// formats with the day-of-week stripped.
pub fn parse_date(date_str: &str) -> Option<DateTime<Utc>> {
    let trimmed = date_str.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    let no_dow = DAY_OF_WEEK_RE.replace(trimmed, "").into_owned();

    const ZONED_FORMATS: [&str; 2] = ["%d %b %Y %H:%M:%S %z", "%Y-%m-%d %H:%M:%S %z"];
    for fmt in ZONED_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&no_dow, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    const DATETIME_FORMATS: [&str; 7] = [
        "%B %d, %Y %I:%M %p",
        "%B %d, %Y %I:%M:%S %p",
        "%B %d, %Y %H:%M:%S",
        "%m/%d/%Y %I:%M %p",
        "%m/%d/%Y %I:%M:%S %p",
        "%m/%d/%Y %H:%M:%S",
        "%d %b %Y %H:%M:%S",
    ];
    for fmt in DATETIME_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(&no_dow, fmt) {
            return Some(Utc.from_utc_datetime(&ndt));
        }
    }

    const DATE_FORMATS: [&str; 4] = ["%B %d, %Y", "%b %d, %Y", "%m/%d/%Y", "%Y-%m-%d"];
    for fmt in DATE_FORMATS {
        if let Ok(nd) = NaiveDate::parse_from_str(&no_dow, fmt) {
            return Some(Utc.from_utc_datetime(&nd.and_hms_opt(0, 0, 0)?));
        }
    }

    warn!(date = trimmed, "could not parse date");
    None
}
