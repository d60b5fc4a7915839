//! Terminal rendering of chats, sessions and classes

use crate::models::{ChatMessage, ChatSession, ClassRecord, Sender};
use crate::sidebar::relative_label;

use chrono::{DateTime, Local, Utc};
use colored::Colorize;
use prettytable::{format, Table};

/// Shown when a chat has no messages yet
pub const EMPTY_CHAT: &str = "Start a conversation! Ask a question about your classes.";

const TITLE_WIDTH: usize = 40;
const PREVIEW_WIDTH: usize = 50;

/// Part of a message body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Plain prose
    Text(&'a str),
    /// Fenced code, with the language tag if one was given
    Code {
        /// Language tag after the opening fence
        language: Option<&'a str>,
        /// Code between the fences
        body: &'a str,
    },
}

/// Split a message body on triple-backtick fences
///
/// An unterminated fence turns the rest of the text into code.
pub fn split_segments(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    for (i, part) in text.split("```").enumerate() {
        if i % 2 == 0 {
            if !part.trim().is_empty() {
                segments.push(Segment::Text(part.trim_matches('\n')));
            }
            continue;
        }

        let (first_line, rest) = part.split_once('\n').unwrap_or((part, ""));
        let tag = first_line.trim();
        let (language, body) = if !tag.is_empty() && !tag.contains(char::is_whitespace) && !rest.is_empty() {
            (Some(tag), rest)
        } else {
            (None, part)
        };
        segments.push(Segment::Code {
            language,
            body: body.trim_matches('\n'),
        });
    }
    segments
}

/// Shorten to `max` characters, ending in `...` when cut
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Leading characters of a chat id, as shown in the session table
pub fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

/// Render one chat message with its time and sources
pub fn format_message(message: &ChatMessage) -> String {
    let time = message
        .timestamp
        .with_timezone(&Local)
        .format("%H:%M")
        .to_string();
    let header = match message.sender() {
        Sender::User => format!("{} {}", "You".green().bold(), time.dimmed()),
        Sender::Bot => format!("{} {}", "Assistant".cyan().bold(), time.dimmed()),
    };

    let mut out = header;
    for segment in split_segments(&message.text) {
        out.push('\n');
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Code { language, body } => {
                if let Some(language) = language {
                    out.push_str(&format!("  [{}]\n", language).dimmed().to_string());
                }
                let indented: Vec<String> = body.lines().map(|l| format!("    {}", l)).collect();
                out.push_str(&indented.join("\n").yellow().to_string());
            }
        }
    }

    if !message.sources.is_empty() {
        out.push('\n');
        out.push_str(&"Sources:".dimmed().to_string());
        for source in &message.sources {
            out.push_str(&format!("\n  - {}", source));
        }
    }
    out
}

/// Render a whole chat, or the empty state
pub fn format_transcript(messages: &[ChatMessage]) -> String {
    if messages.is_empty() {
        return EMPTY_CHAT.dimmed().to_string();
    }
    messages
        .iter()
        .map(format_message)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Build the session table, marking the open chat with `*`
pub fn session_table(sessions: &[ChatSession], current: Option<&str>, now: DateTime<Utc>) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "",
        "ID".bold(),
        "Title".bold(),
        "Last Message".bold(),
        "Messages".bold(),
        "Updated".bold()
    ]);

    for session in sessions {
        let marker = if current == Some(session.id.as_str()) { "*" } else { "" };
        let preview = session
            .last_message
            .as_deref()
            .map(|m| truncate(m, PREVIEW_WIDTH))
            .unwrap_or_else(|| "-".to_string());

        table.add_row(prettytable::row![
            marker,
            short_id(&session.id).cyan(),
            truncate(&session.title, TITLE_WIDTH),
            preview,
            session.message_count,
            relative_label(session.updated_at, now)
        ]);
    }
    table
}

/// Build the class list table
pub fn class_table(classes: &[ClassRecord]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "ID".bold(),
        "Code".bold(),
        "Name".bold(),
        "Instructor".bold(),
        "Schedule".bold()
    ]);
    for class in classes {
        table.add_row(prettytable::row![
            class.id.cyan(),
            class.code,
            truncate(&class.name, TITLE_WIDTH),
            class.instructor,
            class.schedule
        ]);
    }
    table
}

/// Render the full details of one class
pub fn format_class_detail(class: &ClassRecord) -> String {
    let mut lines = vec![
        format!("{} {}", class.code.bold(), class.name),
        format!("  Instructor: {}", class.instructor),
        format!("  Schedule:   {}", class.schedule),
        format!("  Semester:   {}", class.semester),
    ];
    if let Some(description) = class.description.as_deref().filter(|d| !d.trim().is_empty()) {
        lines.push(String::new());
        lines.push(description.to_string());
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MessageId, Role};
    use crate::test_utils::sample_class;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_split_plain_text() {
        assert_eq!(split_segments("just text"), vec![Segment::Text("just text")]);
    }

    #[test]
    fn test_split_code_block_with_language() {
        let segments = split_segments("Try this:\n```python\nprint('hi')\n```\nDone.");
        assert_eq!(
            segments,
            vec![
                Segment::Text("Try this:"),
                Segment::Code {
                    language: Some("python"),
                    body: "print('hi')",
                },
                Segment::Text("Done."),
            ]
        );
    }

    #[test]
    fn test_split_unterminated_fence() {
        let segments = split_segments("See ```x = 1");
        assert_eq!(
            segments,
            vec![
                Segment::Text("See "),
                Segment::Code {
                    language: None,
                    body: "x = 1",
                },
            ]
        );
    }

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("ééééééééééé", 6), "ééé...");
    }

    #[test]
    fn test_format_message_with_sources() {
        plain();
        let message = ChatMessage::new(MessageId(1), Role::Assistant, "Chapters 4-5", Utc::now())
            .with_sources(vec!["syllabus.pdf".to_string()]);
        let out = format_message(&message);

        assert!(out.starts_with("Assistant"));
        assert!(out.contains("Chapters 4-5"));
        assert!(out.contains("Sources:\n  - syllabus.pdf"));
    }

    #[test]
    fn test_format_user_message_without_sources() {
        plain();
        let message = ChatMessage::new(MessageId(2), Role::User, "hello", Utc::now());
        let out = format_message(&message);
        assert!(out.starts_with("You"));
        assert!(!out.contains("Sources:"));
    }

    #[test]
    fn test_empty_transcript() {
        plain();
        assert_eq!(format_transcript(&[]), EMPTY_CHAT);
    }

    #[test]
    fn test_session_table_marks_current() {
        plain();
        let now = Utc::now();
        let sessions = vec![ChatSession {
            id: "abcdef1234567890".to_string(),
            title: "Midterm prep".to_string(),
            last_message: None,
            created_at: now,
            updated_at: now,
            message_count: 2,
        }];
        let rendered = session_table(&sessions, Some("abcdef1234567890"), now).to_string();

        assert!(rendered.contains("abcdef12"));
        assert!(!rendered.contains("abcdef123"));
        assert!(rendered.contains("Midterm prep"));
        assert!(rendered.contains("Today"));
        assert!(rendered.contains('*'));
    }

    #[test]
    fn test_class_detail_includes_description() {
        plain();
        let mut class = sample_class("cs101", "CMPSC 131");
        class.description = Some("Intro to programming".to_string());
        let out = format_class_detail(&class);
        assert!(out.contains("CMPSC 131"));
        assert!(out.contains("Dr. Smith"));
        assert!(out.contains("Intro to programming"));
    }
}
