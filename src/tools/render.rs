//! Text rendering for tool results.
//!
//! Records are rendered as short human-readable summaries; raw JSON never
//! reaches the assistant.

use serde_json::Value;

use crate::envelope::Record;

/// Stringifies a field value for display. Missing and null fields render as
/// the fallback.
pub(crate) fn field_or(record: &Record, name: &str, fallback: &str) -> String {
    match record.get(name) {
        None | Some(Value::Null) => fallback.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn id_of(record: &Record) -> String {
    field_or(record, "id", "?")
}

fn member_name(record: &Record) -> String {
    let first = field_or(record, "first_name", "");
    let last = field_or(record, "last_name", "");
    let name = format!("{first} {last}").trim().to_string();
    if name.is_empty() {
        "Unnamed Member".to_string()
    } else {
        name
    }
}

pub(crate) fn team_list(records: &[Record]) -> String {
    let mut out = format!("Found {} team(s):\n\n", records.len());
    for record in records {
        out += &format!(
            "{} (ID: {})\n  - Sport: {}\n  - Season: {}\n  - Division: {}\n\n",
            field_or(record, "name", "Unnamed Team"),
            id_of(record),
            field_or(record, "sport_name", "N/A"),
            field_or(record, "season_name", "N/A"),
            field_or(record, "division_name", "N/A"),
        );
    }
    out.trim_end().to_string()
}

pub(crate) fn team_details(record: &Record) -> String {
    format!(
        "Team: {}\n\nID: {}\nSport: {}\nSeason: {}\nDivision: {}\nTime Zone: {}",
        field_or(record, "name", "Unnamed"),
        id_of(record),
        field_or(record, "sport_name", "N/A"),
        field_or(record, "season_name", "N/A"),
        field_or(record, "division_name", "N/A"),
        field_or(record, "time_zone", "N/A"),
    )
}

pub(crate) fn member_list(team_id: u64, records: &[Record]) -> String {
    let mut out = format!("Found {} member(s) in team {}:\n\n", records.len(), team_id);
    for record in records {
        out += &format!("{} (ID: {})\n", member_name(record), id_of(record));
        if let Some(email) = record.get_str("email") {
            out += &format!("  - Email: {email}\n");
        }
        if let Some(phone) = record.get_str("phone") {
            out += &format!("  - Phone: {phone}\n");
        }
        if record.get_bool("is_manager").unwrap_or(false) {
            out += "  - Manager\n";
        }
        out += "\n";
    }
    out.trim_end().to_string()
}

fn event_type(record: &Record) -> &'static str {
    if record.get_bool("is_game").unwrap_or(false) {
        "Game"
    } else {
        "Practice/Event"
    }
}

pub(crate) fn event_list(team_id: u64, records: &[Record]) -> String {
    let mut out = format!("Found {} event(s) for team {}:\n\n", records.len(), team_id);
    for record in records {
        out += &format!(
            "{} (ID: {})\n  - Type: {}\n  - Start: {}\n  - Location: {}\n",
            field_or(record, "name", "Unnamed Event"),
            id_of(record),
            event_type(record),
            field_or(record, "start_date", "N/A"),
            field_or(record, "location_name", "TBD"),
        );
        if let Some(opponent) = record.get_str("opponent_name") {
            out += &format!("  - Opponent: {opponent}\n");
        }
        out += "\n";
    }
    out.trim_end().to_string()
}

pub(crate) fn event_details(record: &Record) -> String {
    let mut out = format!(
        "Event: {}\n\nID: {}\nType: {}\nStart: {}\nEnd: {}\nLocation: {}",
        field_or(record, "name", "Unnamed"),
        id_of(record),
        event_type(record),
        field_or(record, "start_date", "N/A"),
        field_or(record, "end_date", "N/A"),
        field_or(record, "location_name", "TBD"),
    );
    if let Some(opponent) = record.get_str("opponent_name") {
        out += &format!("\nOpponent: {opponent}");
    }
    if let Some(notes) = record.get_str("notes") {
        out += &format!("\n\nNotes:\n{notes}");
    }
    out
}

pub(crate) fn availability_summary(event_id: u64, records: &[Record]) -> String {
    let mut yes = Vec::new();
    let mut no = Vec::new();
    let mut maybe = Vec::new();
    let mut unknown = Vec::new();

    for record in records {
        let name = field_or(record, "member_name", "Unknown Member");
        let status = field_or(record, "status_code", "unknown").to_ascii_lowercase();
        match status.as_str() {
            "yes" => yes.push(name),
            "no" => no.push(name),
            "maybe" => maybe.push(name),
            _ => unknown.push(name),
        }
    }

    let mut out = format!("Availability for event {event_id}:\n");
    for (label, names) in [
        ("Available", &yes),
        ("Not available", &no),
        ("Maybe", &maybe),
        ("No response", &unknown),
    ] {
        out += &format!("\n{} ({}):\n", label, names.len());
        for name in names {
            out += &format!("  - {name}\n");
        }
    }
    out.trim_end().to_string()
}

pub(crate) fn assignment_list(event_id: u64, records: &[Record]) -> String {
    let mut out = format!(
        "Found {} assignment(s) for event {}:\n\n",
        records.len(),
        event_id
    );
    for record in records {
        out += &format!(
            "- {} (ID: {}, member {})\n",
            field_or(record, "description", "No description"),
            id_of(record),
            field_or(record, "member_id", "?"),
        );
    }
    out.trim_end().to_string()
}

pub(crate) fn location_list(team_id: u64, records: &[Record]) -> String {
    let mut out = format!("Found {} location(s) for team {}:\n\n", records.len(), team_id);
    for record in records {
        out += &format!(
            "- {} (ID: {})",
            field_or(record, "name", "Unnamed Location"),
            id_of(record),
        );
        if let Some(address) = record.get_str("address") {
            out += &format!(", {address}");
        }
        out += "\n";
    }
    out.trim_end().to_string()
}

pub(crate) fn created(noun: &str, record: &Record) -> String {
    match record.get_str("name") {
        Some(name) if !name.is_empty() => {
            format!("Created {} {:?} (ID: {}).", noun, name, id_of(record))
        }
        _ => format!("Created {} (ID: {}).", noun, id_of(record)),
    }
}

pub(crate) fn updated(noun: &str, record: &Record) -> String {
    format!("Updated {} {}.", noun, id_of(record))
}
