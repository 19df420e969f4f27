use chrono::{DateTime, FixedOffset, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Mutex, OnceLock};

pub const DATE_FMT: &str = "%Y-%m-%d";
pub const CLOCK_FMT: &str = "%H:%M:%S";
pub const DISPLAY_TIME_FMT: &str = "%Y-%m-%d %H:%M:%S";
pub const DEFAULT_REMINDER_TIME: &str = "09:00";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteType {
    Text,
    Task,
    Contact,
    Idea,
    Reminder,
}

impl NoteType {
    pub fn as_str(self) -> &'static str {
        match self {
            NoteType::Text => "text",
            NoteType::Task => "task",
            NoteType::Contact => "contact",
            NoteType::Idea => "idea",
            NoteType::Reminder => "reminder",
        }
    }
}

impl fmt::Display for NoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::High => "high",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

/// Progress of a task or reminder. Unknown spellings found on disk are kept
/// verbatim so a rewrite never loses them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    ToDo,
    Completed,
    Other(String),
}

impl Status {
    /// Empty means "to-do"; `por_hacer` and `pending` are older spellings.
    pub fn from_wire(s: &str) -> Self {
        match s.trim() {
            "" | "to-do" | "todo" | "por_hacer" | "pending" => Status::ToDo,
            "completed" => Status::Completed,
            other => Status::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Status::ToDo => "to-do",
            Status::Completed => "completed",
            Status::Other(s) => s,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskFields {
    pub priority: Option<Priority>,
    pub status: Status,
    pub due_date: Option<DateTime<FixedOffset>>,
    pub assignee: Option<String>,
    pub estimated_hours: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContactFields {
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReminderFields {
    pub reminder_time: Option<String>,
    pub status: Status,
}

/// What a note is, carrying only the fields that make sense for that kind.
#[derive(Debug, Clone, PartialEq)]
pub enum NoteKind {
    Text,
    Idea,
    Task(TaskFields),
    Contact(ContactFields),
    Reminder(ReminderFields),
}

impl NoteKind {
    pub fn note_type(&self) -> NoteType {
        match self {
            NoteKind::Text => NoteType::Text,
            NoteKind::Idea => NoteType::Idea,
            NoteKind::Task(_) => NoteType::Task,
            NoteKind::Contact(_) => NoteType::Contact,
            NoteKind::Reminder(_) => NoteType::Reminder,
        }
    }

    pub fn status(&self) -> Option<&Status> {
        match self {
            NoteKind::Task(t) => Some(&t.status),
            NoteKind::Reminder(r) => Some(&r.status),
            _ => None,
        }
    }

    pub fn is_completable(&self) -> bool {
        matches!(self, NoteKind::Task(_) | NoteKind::Reminder(_))
    }

    /// Kind-specific fields shown next to the content in listings:
    /// `priority, status` for tasks, the phone (else email) of a contact and
    /// `time, status` for reminders.
    pub fn summary(&self) -> Option<String> {
        match self {
            NoteKind::Task(t) => Some(format!(
                "{}, {}",
                t.priority.map(Priority::as_str).unwrap_or(""),
                t.status.as_str()
            )),
            NoteKind::Contact(c) => c.phone.clone().or_else(|| c.email.clone()),
            NoteKind::Reminder(r) => Some(format!(
                "{}, {}",
                r.reminder_time.as_deref().unwrap_or(DEFAULT_REMINDER_TIME),
                r.status.as_str()
            )),
            NoteKind::Text | NoteKind::Idea => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "NoteRecord", into = "NoteRecord")]
pub struct Note {
    pub id: String,
    pub kind: NoteKind,
    pub content: String,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
    pub date: NaiveDate,
    pub tags: Vec<String>,
    pub category: Option<String>,
}

impl Note {
    fn stamped(kind: NoteKind, content: impl Into<String>) -> Self {
        let now = now_fixed();
        Note {
            id: generate_id(),
            kind,
            content: content.into(),
            created_at: now,
            updated_at: now,
            date: now.date_naive(),
            tags: Vec::new(),
            category: None,
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::stamped(NoteKind::Text, content)
    }

    /// A text note filed under `date` instead of today.
    pub fn text_on(content: impl Into<String>, date: NaiveDate) -> Self {
        let mut note = Self::text(content);
        note.date = date;
        note
    }

    pub fn idea(content: impl Into<String>) -> Self {
        Self::stamped(NoteKind::Idea, content)
    }

    pub fn task(content: impl Into<String>, priority: Priority) -> Self {
        Self::stamped(
            NoteKind::Task(TaskFields {
                priority: Some(priority),
                ..TaskFields::default()
            }),
            content,
        )
    }

    pub fn contact(name: impl Into<String>, phone: &str, email: &str) -> Self {
        Self::stamped(
            NoteKind::Contact(ContactFields {
                phone: non_empty(phone),
                email: non_empty(email),
                address: None,
            }),
            name,
        )
    }

    pub fn reminder(content: impl Into<String>, reminder_time: &str) -> Self {
        let time = non_empty(reminder_time)
            .unwrap_or_else(|| DEFAULT_REMINDER_TIME.to_string());
        Self::stamped(
            NoteKind::Reminder(ReminderFields {
                reminder_time: Some(time),
                status: Status::ToDo,
            }),
            content,
        )
    }

    pub fn note_type(&self) -> NoteType {
        self.kind.note_type()
    }

    pub fn is_pending_reminder(&self) -> bool {
        matches!(&self.kind, NoteKind::Reminder(r) if r.status == Status::ToDo)
    }

    pub fn touch(&mut self) {
        self.updated_at = now_fixed();
    }

    /// Mark a task or reminder as completed. Returns false for other kinds.
    pub fn complete(&mut self) -> bool {
        match &mut self.kind {
            NoteKind::Task(t) => t.status = Status::Completed,
            NoteKind::Reminder(r) => r.status = Status::Completed,
            _ => return false,
        }
        true
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.created_at.format(CLOCK_FMT), self.content)?;
        match self.kind.summary() {
            Some(summary) => write!(f, " [{summary}]"),
            None => Ok(()),
        }
    }
}

pub fn now_fixed() -> DateTime<FixedOffset> {
    let now = Local::now();
    now.with_timezone(now.offset())
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub(crate) fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
}

#[derive(Default)]
struct IdState {
    last_ts: i64,
}

/// Nanosecond timestamp ids; never repeats within a process even when the
/// clock stalls or steps backwards.
pub fn generate_id() -> String {
    static ID_STATE: OnceLock<Mutex<IdState>> = OnceLock::new();
    let state = ID_STATE.get_or_init(|| Mutex::new(IdState::default()));

    let mut guard = state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let now = Local::now();
    let nanos = now
        .timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp_micros().saturating_mul(1000));
    let ts = if nanos <= guard.last_ts { guard.last_ts + 1 } else { nanos };
    guard.last_ts = ts;
    ts.to_string()
}

/// On-disk shape: one flat metadata object shared by every note type.
#[derive(Serialize, Deserialize)]
struct NoteRecord {
    id: String,
    #[serde(rename = "type")]
    note_type: NoteType,
    content: String,
    created_at: DateTime<FixedOffset>,
    updated_at: DateTime<FixedOffset>,
    date: NaiveDate,
    #[serde(default)]
    metadata: MetadataRecord,
}

#[derive(Default, Serialize, Deserialize)]
struct MetadataRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    due_date: Option<DateTime<FixedOffset>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    estimated_hours: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reminder_time: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    category: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value.as_deref().and_then(non_empty)
}

impl From<NoteRecord> for Note {
    fn from(record: NoteRecord) -> Self {
        let m = record.metadata;
        let status = || Status::from_wire(m.status.as_deref().unwrap_or(""));
        let kind = match record.note_type {
            NoteType::Text => NoteKind::Text,
            NoteType::Idea => NoteKind::Idea,
            NoteType::Task => NoteKind::Task(TaskFields {
                priority: m.priority,
                status: status(),
                due_date: m.due_date,
                assignee: present(m.assignee),
                estimated_hours: m.estimated_hours.filter(|h| *h > 0),
            }),
            NoteType::Contact => NoteKind::Contact(ContactFields {
                phone: present(m.phone),
                email: present(m.email),
                address: present(m.address),
            }),
            NoteType::Reminder => NoteKind::Reminder(ReminderFields {
                reminder_time: present(m.reminder_time),
                status: status(),
            }),
        };
        Note {
            id: record.id,
            kind,
            content: record.content,
            created_at: record.created_at,
            updated_at: record.updated_at,
            date: record.date,
            tags: m.tags,
            category: present(m.category),
        }
    }
}

impl From<Note> for NoteRecord {
    fn from(note: Note) -> Self {
        let note_type = note.note_type();
        let mut metadata = MetadataRecord {
            tags: note.tags,
            category: note.category,
            ..MetadataRecord::default()
        };
        match note.kind {
            NoteKind::Text | NoteKind::Idea => {}
            NoteKind::Task(t) => {
                metadata.priority = t.priority;
                metadata.status = Some(t.status.as_str().to_string());
                metadata.due_date = t.due_date;
                metadata.assignee = t.assignee;
                metadata.estimated_hours = t.estimated_hours;
            }
            NoteKind::Contact(c) => {
                metadata.phone = c.phone;
                metadata.email = c.email;
                metadata.address = c.address;
            }
            NoteKind::Reminder(r) => {
                metadata.reminder_time = r.reminder_time;
                metadata.status = Some(r.status.as_str().to_string());
            }
        }
        NoteRecord {
            id: note.id,
            note_type,
            content: note.content,
            created_at: note.created_at,
            updated_at: note.updated_at,
            date: note.date,
            metadata,
        }
    }
}
