use chrono::{DateTime, Utc};
use colored::Colorize;
use notekeep::api::{CmdMessage, MessageLevel};
use notekeep::commands::helpers::short_id;
use notekeep::config::NotesConfig;
use notekeep::model::Note;
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 100;
const TIME_WIDTH: usize = 14;
const PREVIEW_CHARS: usize = 50;
const PIN_MARKER: &str = "⚲";

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

pub(super) fn print_full_notes(notes: &[Note]) {
    for (i, note) in notes.iter().enumerate() {
        if i > 0 {
            println!("\n================================\n");
        }
        let marker = if note.pinned { PIN_MARKER } else { " " };
        println!(
            "{} {} {}",
            marker,
            short_id(&note.id).yellow(),
            display_title(note).bold()
        );
        let mut details = vec![format!("edited {}", note.last_edited.format("%Y-%m-%d %H:%M"))];
        if let Some(color) = &note.color {
            details.push(format!("color {}", color));
        }
        if !note.images.is_empty() {
            details.push(format!("{} image(s)", note.images.len()));
        }
        println!("{}", details.join(" · ").dimmed());
        if !note.tags.is_empty() {
            println!("{}", format_tags(&note.tags).cyan());
        }
        println!("--------------------------------");
        println!("{}", note.content);
    }
}

pub(super) fn print_notes(notes: &[Note]) {
    if notes.is_empty() {
        println!("No notes found.");
        return;
    }

    let mut last_was_pinned = false;
    for note in notes {
        if last_was_pinned && !note.pinned {
            println!();
        }
        last_was_pinned = note.pinned;

        let left_prefix = if note.pinned {
            format!("  {} ", PIN_MARKER)
        } else {
            "    ".to_string()
        };
        let id_str = format!("{}  ", short_id(&note.id));

        let preview: String = note
            .content
            .chars()
            .take(PREVIEW_CHARS)
            .map(|c| if c == '\n' { ' ' } else { c })
            .collect();
        let mut line = display_title(note).to_string();
        if !note.tags.is_empty() {
            line.push(' ');
            line.push_str(&format_tags(&note.tags));
        }
        if !preview.is_empty() {
            line.push(' ');
            line.push_str(&preview);
        }

        let fixed_width = left_prefix.width() + id_str.width() + TIME_WIDTH;
        let available = LINE_WIDTH.saturating_sub(fixed_width);
        let line = truncate_to_width(&line, available);
        let padding = available.saturating_sub(line.width());

        let id_colored = if note.pinned {
            id_str.yellow()
        } else {
            id_str.normal()
        };

        println!(
            "{}{}{}{}{}",
            left_prefix,
            id_colored,
            line,
            " ".repeat(padding),
            format_time_ago(note.last_edited).dimmed()
        );
    }
}

pub(super) fn print_config(config: &NotesConfig) {
    println!("export-prefix = {}", config.export_prefix);
    println!("import-extensions = {}", config.import_extensions.join(","));
}

fn display_title(note: &Note) -> &str {
    if note.title.trim().is_empty() {
        "(untitled)"
    } else {
        &note.title
    }
}

fn format_tags(tags: &[String]) -> String {
    tags.iter()
        .map(|t| format!("#{}", t))
        .collect::<Vec<_>>()
        .join(" ")
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let time_str = Formatter::new().convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}
