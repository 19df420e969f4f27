use super::Key;
use crate::note::{
    DEFAULT_REMINDER_TIME, Note, NoteKind, NoteType, Priority, non_empty,
};
use chrono::NaiveTime;

const PHONE_CHARS: &str = "0123456789+-() ";

pub struct Field {
    pub label: &'static str,
    pub placeholder: &'static str,
    pub value: String,
    pub multiline: bool,
    /// Characters accepted from the keyboard; `None` accepts anything.
    allowed: Option<&'static str>,
}

impl Field {
    fn line(label: &'static str, placeholder: &'static str, value: &str) -> Self {
        Self {
            label,
            placeholder,
            value: value.to_string(),
            multiline: false,
            allowed: None,
        }
    }

    fn restricted(mut self, allowed: &'static str) -> Self {
        self.allowed = Some(allowed);
        self
    }
}

#[derive(Debug)]
pub enum FormEvent {
    Pending,
    Submitted(Note),
    Cancelled,
}

/// Input form shared by creation and editing of every note type.
pub struct NoteForm {
    note_type: NoteType,
    fields: Vec<Field>,
    focus: usize,
    error: Option<String>,
    original: Option<Note>,
}

impl NoteForm {
    pub fn create(note_type: NoteType) -> Self {
        Self::build(note_type, None)
    }

    pub fn edit(note: &Note) -> Self {
        Self::build(note.note_type(), Some(note.clone()))
    }

    fn build(note_type: NoteType, original: Option<Note>) -> Self {
        let content = original.as_ref().map(|n| n.content.as_str()).unwrap_or("");
        let fields = match (note_type, original.as_ref().map(|n| &n.kind)) {
            (NoteType::Text | NoteType::Idea, _) => vec![Field {
                label: "Content",
                placeholder: "Write your note...",
                value: content.to_string(),
                multiline: true,
                allowed: None,
            }],
            (NoteType::Task, kind) => {
                let (priority, assignee) = match kind {
                    Some(NoteKind::Task(t)) => (
                        t.priority.unwrap_or(Priority::Low).as_str(),
                        t.assignee.as_deref().unwrap_or(""),
                    ),
                    _ => ("low", ""),
                };
                vec![
                    Field::line("Description", "What needs doing?", content),
                    Field::line("Priority", "low | high", priority),
                    Field::line("Assignee", "optional", assignee),
                ]
            }
            (NoteType::Contact, kind) => {
                let (phone, email) = match kind {
                    Some(NoteKind::Contact(c)) => (
                        c.phone.as_deref().unwrap_or(""),
                        c.email.as_deref().unwrap_or(""),
                    ),
                    _ => ("", ""),
                };
                vec![
                    Field::line("Name", "Full name", content),
                    Field::line("Phone", "+1 (555) 010-0100", phone).restricted(PHONE_CHARS),
                    Field::line("Email", "name@example.com", email),
                ]
            }
            (NoteType::Reminder, kind) => {
                let time = match kind {
                    Some(NoteKind::Reminder(r)) => {
                        r.reminder_time.as_deref().unwrap_or(DEFAULT_REMINDER_TIME)
                    }
                    _ => DEFAULT_REMINDER_TIME,
                };
                vec![
                    Field::line("Description", "What should you remember?", content),
                    Field::line("Time", "HH:MM", time),
                ]
            }
        };
        Self { note_type, fields, focus: 0, error: None, original }
    }

    pub fn title(&self) -> String {
        let verb = if self.original.is_some() { "Edit" } else { "New" };
        format!("{verb} {}", self.note_type)
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_multiline(&self) -> bool {
        self.fields.iter().any(|f| f.multiline)
    }

    pub fn handle_key(&mut self, key: Key) -> FormEvent {
        let last = self.fields.len() - 1;
        match key {
            Key::Esc | Key::CtrlC => return FormEvent::Cancelled,
            Key::CtrlS => return self.try_submit(),
            Key::Tab | Key::Down => self.focus = (self.focus + 1).min(last),
            Key::BackTab | Key::Up => self.focus = self.focus.saturating_sub(1),
            Key::Enter if self.fields[self.focus].multiline => {
                self.fields[self.focus].value.push('\n');
            }
            Key::Enter if self.focus == last => return self.try_submit(),
            Key::Enter => self.focus += 1,
            Key::Backspace => {
                self.fields[self.focus].value.pop();
            }
            Key::Char(c) => {
                let field = &mut self.fields[self.focus];
                if field.allowed.is_none_or(|set| set.contains(c)) {
                    field.value.push(c);
                }
            }
        }
        FormEvent::Pending
    }

    fn try_submit(&mut self) -> FormEvent {
        match self.submit() {
            Ok(note) => {
                self.error = None;
                FormEvent::Submitted(note)
            }
            Err(message) => {
                self.error = Some(message);
                FormEvent::Pending
            }
        }
    }

    fn value(&self, index: usize) -> &str {
        self.fields[index].value.trim()
    }

    /// Validate the inputs and build the resulting note. Edits keep the
    /// id, timestamps, status and any fields the form does not show.
    pub fn submit(&self) -> Result<Note, String> {
        match self.note_type {
            NoteType::Text | NoteType::Idea => {
                let content = self.fields[0].value.trim_end();
                if content.trim().is_empty() {
                    return Err("Content is required".to_string());
                }
                Ok(match &self.original {
                    Some(note) => Note { content: content.to_string(), ..note.clone() },
                    None if self.note_type == NoteType::Idea => Note::idea(content),
                    None => Note::text(content),
                })
            }
            NoteType::Task => {
                let content = required(self.value(0), "Description")?;
                let priority = match self.value(1) {
                    "" => Priority::Low,
                    raw => Priority::parse(raw)
                        .ok_or_else(|| "Priority must be low or high".to_string())?,
                };
                let assignee = non_empty(self.value(2));
                let mut note = match &self.original {
                    Some(note) => Note { content: content.to_string(), ..note.clone() },
                    None => Note::task(content, priority),
                };
                if let NoteKind::Task(t) = &mut note.kind {
                    t.priority = Some(priority);
                    t.assignee = assignee;
                }
                Ok(note)
            }
            NoteType::Contact => {
                let name = required(self.value(0), "Name")?;
                let (phone, email) = (self.value(1), self.value(2));
                if phone.is_empty() && email.is_empty() {
                    return Err("Provide a phone number or an email".to_string());
                }
                if !phone.chars().all(|c| PHONE_CHARS.contains(c)) {
                    return Err(
                        "Phone may only contain digits, spaces and + - ( )".to_string()
                    );
                }
                if !email.is_empty() && !(email.contains('@') && email.contains('.')) {
                    return Err("Email must contain @ and a domain".to_string());
                }
                let mut note = match &self.original {
                    Some(note) => Note { content: name.to_string(), ..note.clone() },
                    None => Note::contact(name, phone, email),
                };
                if let NoteKind::Contact(c) = &mut note.kind {
                    c.phone = non_empty(phone);
                    c.email = non_empty(email);
                }
                Ok(note)
            }
            NoteType::Reminder => {
                let content = required(self.value(0), "Description")?;
                let time = match self.value(1) {
                    "" => DEFAULT_REMINDER_TIME,
                    raw if is_clock(raw) => raw,
                    _ => return Err("Time must be HH:MM (24-hour)".to_string()),
                };
                let mut note = match &self.original {
                    Some(note) => Note { content: content.to_string(), ..note.clone() },
                    None => Note::reminder(content, time),
                };
                if let NoteKind::Reminder(r) = &mut note.kind {
                    r.reminder_time = Some(time.to_string());
                }
                Ok(note)
            }
        }
    }
}

/// Strict 24-hour `HH:MM`.
fn is_clock(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() == 5
        && bytes[2] == b':'
        && bytes.iter().enumerate().all(|(i, b)| i == 2 || b.is_ascii_digit())
        && NaiveTime::parse_from_str(raw, "%H:%M").is_ok()
}

fn required<'a>(value: &'a str, label: &str) -> Result<&'a str, String> {
    if value.is_empty() {
        Err(format!("{label} is required"))
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::Status;

    fn type_text(form: &mut NoteForm, text: &str) {
        for c in text.chars() {
            form.handle_key(Key::Char(c));
        }
    }

    fn submitted(event: FormEvent) -> Note {
        match event {
            FormEvent::Submitted(note) => note,
            other => panic!("expected submission, got {other:?}"),
        }
    }

    #[test]
    fn task_defaults_to_low_priority() {
        let mut form = NoteForm::create(NoteType::Task);
        type_text(&mut form, "file taxes");
        form.handle_key(Key::Tab);
        // Clear the prefilled "low".
        for _ in 0..3 {
            form.handle_key(Key::Backspace);
        }
        form.handle_key(Key::Enter);
        type_text(&mut form, "me");
        let note = submitted(form.handle_key(Key::Enter));

        assert_eq!(note.content, "file taxes");
        match note.kind {
            NoteKind::Task(t) => {
                assert_eq!(t.priority, Some(Priority::Low));
                assert_eq!(t.assignee.as_deref(), Some("me"));
                assert_eq!(t.status, Status::ToDo);
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn task_rejects_unknown_priority() {
        let mut form = NoteForm::create(NoteType::Task);
        type_text(&mut form, "thing");
        form.handle_key(Key::Tab);
        type_text(&mut form, "ish");
        assert!(matches!(form.handle_key(Key::CtrlS), FormEvent::Pending));
        assert_eq!(form.error(), Some("Priority must be low or high"));
    }

    #[test]
    fn contact_needs_phone_or_email() {
        let mut form = NoteForm::create(NoteType::Contact);
        type_text(&mut form, "Ada Lovelace");
        assert!(matches!(form.handle_key(Key::CtrlS), FormEvent::Pending));
        assert_eq!(form.error(), Some("Provide a phone number or an email"));

        form.handle_key(Key::Tab);
        form.handle_key(Key::Tab);
        type_text(&mut form, "ada@invalid");
        assert!(matches!(form.handle_key(Key::CtrlS), FormEvent::Pending));
        assert_eq!(form.error(), Some("Email must contain @ and a domain"));

        type_text(&mut form, ".org");
        let note = submitted(form.handle_key(Key::Enter));
        match note.kind {
            NoteKind::Contact(c) => {
                assert_eq!(c.email.as_deref(), Some("ada@invalid.org"));
                assert_eq!(c.phone, None);
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn phone_field_ignores_letters() {
        let mut form = NoteForm::create(NoteType::Contact);
        type_text(&mut form, "Bob");
        form.handle_key(Key::Tab);
        type_text(&mut form, "+1 (555) abc-0100");
        assert_eq!(form.fields()[1].value, "+1 (555) -0100");
    }

    #[test]
    fn clock_times_are_strict() {
        for good in ["00:00", "09:05", "23:59"] {
            assert!(is_clock(good), "{good} should be accepted");
        }
        for bad in ["9:30", " 9:30", "+9:30", "09: 5", "24:00", "09-30", "0930", ""] {
            assert!(!is_clock(bad), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn reminder_time_is_validated_and_defaulted() {
        let mut form = NoteForm::create(NoteType::Reminder);
        type_text(&mut form, "standup");
        form.handle_key(Key::Tab);
        type_text(&mut form, "x");
        assert!(matches!(form.handle_key(Key::Enter), FormEvent::Pending));
        assert!(form.error().unwrap().starts_with("Time must be HH:MM"));

        for _ in 0..6 {
            form.handle_key(Key::Backspace);
        }
        let note = submitted(form.handle_key(Key::Enter));
        match note.kind {
            NoteKind::Reminder(r) => assert_eq!(r.reminder_time.as_deref(), Some("09:00")),
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn editing_a_reminder_keeps_id_and_status() {
        let mut original = Note::reminder("old text", "07:30");
        original.complete();
        let mut form = NoteForm::edit(&original);
        assert_eq!(form.title(), "Edit reminder");
        assert_eq!(form.fields()[1].value, "07:30");

        type_text(&mut form, " updated");
        let note = submitted(form.handle_key(Key::CtrlS));
        assert_eq!(note.id, original.id);
        assert_eq!(note.content, "old text updated");
        assert_eq!(note.kind.status(), Some(&Status::Completed));
    }

    #[test]
    fn textarea_enter_adds_newline_and_esc_cancels() {
        let mut form = NoteForm::create(NoteType::Text);
        assert!(form.is_multiline());
        type_text(&mut form, "line one");
        assert!(matches!(form.handle_key(Key::Enter), FormEvent::Pending));
        type_text(&mut form, "line two");
        assert_eq!(form.fields()[0].value, "line one\nline two");
        assert!(matches!(form.handle_key(Key::Esc), FormEvent::Cancelled));

        let mut empty = NoteForm::create(NoteType::Idea);
        empty.handle_key(Key::Enter);
        assert!(matches!(empty.handle_key(Key::CtrlS), FormEvent::Pending));
        assert_eq!(empty.error(), Some("Content is required"));
    }
}
