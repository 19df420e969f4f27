use crate::note::{CLOCK_FMT, DISPLAY_TIME_FMT, Note, NoteKind, NoteType, Status};
use chrono::{DateTime, FixedOffset};
use yansi::Paint;

/// Color palette for consistent theming
pub struct ColorPalette {
    pub muted: (u8, u8, u8),     // Times, labels, hints
    pub header: (u8, u8, u8),    // Titles, emphasis
    pub timestamp: (u8, u8, u8), // Dates in previews
    pub alert: (u8, u8, u8),     // Errors, pending reminders
    pub done: (u8, u8, u8),      // Completed status
    pub task: (u8, u8, u8),
    pub contact: (u8, u8, u8),
    pub idea: (u8, u8, u8),
    pub reminder: (u8, u8, u8),
}

impl ColorPalette {
    pub const CATPPUCCIN: Self = Self {
        muted: (108, 112, 134),     // Gray
        header: (148, 226, 213),    // Teal
        timestamp: (137, 180, 250), // Blue
        alert: (243, 139, 168),     // Pink
        done: (166, 227, 161),      // Green
        task: (250, 179, 135),      // Peach
        contact: (203, 166, 247),   // Mauve
        idea: (249, 226, 175),      // Yellow
        reminder: (243, 139, 168),  // Pink
    };
}

/// Formatting context passed through rendering pipeline
pub struct FormatContext {
    pub use_color: bool,
    pub palette: ColorPalette,
}

impl FormatContext {
    pub fn new(use_color: bool) -> Self {
        Self { use_color, palette: ColorPalette::CATPPUCCIN }
    }

    fn paint(&self, text: &str, (r, g, b): (u8, u8, u8)) -> String {
        if self.use_color {
            Paint::rgb(text, r, g, b).to_string()
        } else {
            text.to_string()
        }
    }

    pub fn format_header(&self, text: &str) -> String {
        if self.use_color {
            let (r, g, b) = self.palette.header;
            Paint::rgb(text, r, g, b).bold().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn format_muted(&self, text: &str) -> String {
        self.paint(text, self.palette.muted)
    }

    pub fn format_timestamp(&self, ts: &str) -> String {
        self.paint(ts, self.palette.timestamp)
    }

    pub fn format_error(&self, text: &str) -> String {
        self.paint(text, self.palette.alert)
    }

    /// Fixed-width type badge, e.g. `task    `.
    pub fn format_type(&self, note_type: NoteType) -> String {
        let label = format!("{:<8}", note_type.as_str());
        let color = match note_type {
            NoteType::Text => return self.format_muted(&label),
            NoteType::Task => self.palette.task,
            NoteType::Contact => self.palette.contact,
            NoteType::Idea => self.palette.idea,
            NoteType::Reminder => self.palette.reminder,
        };
        self.paint(&label, color)
    }

    pub fn format_status(&self, status: &Status) -> String {
        match status {
            Status::Completed => self.paint(status.as_str(), self.palette.done),
            Status::ToDo => self.paint(status.as_str(), self.palette.alert),
            Status::Other(s) => s.clone(),
        }
    }

    /// Reverse-video for the row under the cursor; a `>` marker without color.
    pub fn format_selected(&self, line: &str) -> String {
        if self.use_color {
            Paint::new(line).invert().to_string()
        } else {
            format!("> {line}")
        }
    }

    /// One browser row: clock, type badge, first content line and the
    /// kind-specific summary, cut to `width` visible columns.
    pub fn summary_line(&self, note: &Note, width: usize) -> String {
        let clock = note.created_at.format(CLOCK_FMT).to_string();
        let first_line = note
            .content
            .lines()
            .find(|l| !l.trim().is_empty())
            .unwrap_or("")
            .trim();
        let mut text = first_line.to_string();
        if let Some(summary) = note.kind.summary() {
            text.push_str(&format!(" [{summary}]"));
        }

        // clock(8) + 2 spaces + badge(8) + 1 space
        let room = width.saturating_sub(19);
        let text = truncate_with_ellipsis(&text, room.max(1));
        let text = if note.is_pending_reminder() {
            self.paint(&text, self.palette.alert)
        } else {
            text
        };
        format!(
            "{}  {} {}",
            self.format_muted(&clock),
            self.format_type(note.note_type()),
            text
        )
    }

    /// Label/value pairs shown under the content in a preview.
    pub fn detail_lines(&self, note: &Note, now: DateTime<FixedOffset>) -> Vec<String> {
        let mut fields: Vec<(&str, String)> = vec![
            ("Type", note.note_type().as_str().to_string()),
            (
                "Created",
                self.format_timestamp(&note.created_at.format(DISPLAY_TIME_FMT).to_string()),
            ),
            (
                "Updated",
                format!(
                    "{} ({})",
                    self.format_timestamp(
                        &note.updated_at.format(DISPLAY_TIME_FMT).to_string()
                    ),
                    relative_age(now, note.updated_at)
                ),
            ),
            ("Date", note.date.to_string()),
        ];

        match &note.kind {
            NoteKind::Task(t) => {
                if let Some(p) = t.priority {
                    fields.push(("Priority", p.as_str().to_string()));
                }
                fields.push(("Status", self.format_status(&t.status)));
                if let Some(due) = t.due_date {
                    fields.push(("Due", due.format(DISPLAY_TIME_FMT).to_string()));
                }
                if let Some(who) = &t.assignee {
                    fields.push(("Assignee", who.clone()));
                }
                if let Some(hours) = t.estimated_hours {
                    fields.push(("Estimate", format!("{hours}h")));
                }
            }
            NoteKind::Contact(c) => {
                for (label, value) in
                    [("Phone", &c.phone), ("Email", &c.email), ("Address", &c.address)]
                {
                    if let Some(v) = value {
                        fields.push((label, v.clone()));
                    }
                }
            }
            NoteKind::Reminder(r) => {
                if let Some(time) = &r.reminder_time {
                    fields.push(("Time", time.clone()));
                }
                fields.push(("Status", self.format_status(&r.status)));
            }
            NoteKind::Text | NoteKind::Idea => {}
        }
        if !note.tags.is_empty() {
            fields.push(("Tags", note.tags.join(", ")));
        }
        if let Some(category) = &note.category {
            fields.push(("Category", category.clone()));
        }

        fields
            .into_iter()
            .map(|(label, value)| {
                format!("{} {}", self.format_muted(&format!("{label:<9}")), value)
            })
            .collect()
    }
}

/// Coarse age like `3h ago`, `2d 4h ago`, `5mo ago`.
pub fn relative_age(now: DateTime<FixedOffset>, then: DateTime<FixedOffset>) -> String {
    let dur = now.signed_duration_since(then);
    let minutes = dur.num_minutes().max(0);
    let hours = dur.num_hours().max(0);
    let days = dur.num_days().max(0);

    if hours == 0 {
        if minutes == 0 { "just now".to_string() } else { format!("{minutes}m ago") }
    } else if days == 0 {
        format!("{hours}h ago")
    } else if days < 30 {
        match hours - days * 24 {
            0 => format!("{days}d ago"),
            h => format!("{days}d {h}h ago"),
        }
    } else if days < 365 {
        format!("{}mo ago", days / 30)
    } else {
        format!("{}y ago", days / 365)
    }
}

/// Truncate text to a width, appending an ellipsis when needed.
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    if text.chars().count() <= max_width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_width - 1).collect();
    out.push('…');
    out
}

/// Split a styled line into rows of at most `width` visible columns.
/// Escape sequences ride along without counting toward the width.
pub fn wrap_styled(line: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![line.to_string()];
    }
    let mut rows = Vec::new();
    let mut row = String::new();
    let mut used = 0;
    let mut chars = line.chars();
    while let Some(ch) = chars.next() {
        if ch == '\x1b' {
            row.push(ch);
            for next in chars.by_ref() {
                row.push(next);
                if next == 'm' {
                    break;
                }
            }
            continue;
        }
        if used == width {
            rows.push(std::mem::take(&mut row));
            used = 0;
        }
        row.push(ch);
        used += 1;
    }
    rows.push(row);
    rows
}
