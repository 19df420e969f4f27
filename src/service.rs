use crate::error::{NoteError, Result};
use crate::note::{DATE_FMT, Note, now_fixed};
use crate::store::NoteRepository;
use chrono::{Datelike, NaiveDate};

/// Validation and orchestration in front of a [`NoteRepository`].
pub struct NoteService<R> {
    repo: R,
}

impl<R: NoteRepository> NoteService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Create and persist a text note dated today.
    pub fn create_note(&self, content: &str) -> Result<Note> {
        if content.trim().is_empty() {
            return Err(NoteError::EmptyContent);
        }
        let note = Note::text(content);
        self.repo.save(&note)?;
        Ok(note)
    }

    /// Persist a note of any kind, refreshing `updated_at`.
    pub fn save_note(&self, note: &mut Note) -> Result<()> {
        if note.content.trim().is_empty() {
            return Err(NoteError::EmptyContent);
        }
        note.updated_at = now_fixed();
        self.repo.save(note)
    }

    pub fn notes_by_date(&self, date: &str) -> Result<Vec<Note>> {
        self.repo.notes_by_date(parse_date(date)?)
    }

    pub fn notes_by_month(&self, month: &str) -> Result<Vec<Note>> {
        let first = parse_month(month)?;
        self.repo.notes_by_month(first.year(), first.month())
    }

    pub fn notes_by_date_range(&self, start: &str, end: &str) -> Result<Vec<Note>> {
        self.repo.notes_by_date_range(parse_date(start)?, parse_date(end)?)
    }

    pub fn today_notes(&self) -> Result<Vec<Note>> {
        self.repo.today_notes()
    }

    /// Mark a task or reminder completed and save it.
    pub fn complete_note(&self, note: &mut Note) -> Result<()> {
        if !note.complete() {
            return Err(NoteError::NotCompletable(
                note.id.clone(),
                note.note_type().as_str(),
            ));
        }
        self.save_note(note)
    }

    pub fn delete_note(&self, note: &Note) -> Result<()> {
        self.repo.delete_from_bucket(note.date, &note.id)
    }

    /// Numbered plain text listing.
    pub fn list_notes(&self, notes: &[Note]) -> String {
        list_notes(notes)
    }
}

pub fn list_notes(notes: &[Note]) -> String {
    if notes.is_empty() {
        return "No notes found.".to_string();
    }
    let mut out = format!("Notes ({} found):\n", notes.len());
    for (i, note) in notes.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, note));
    }
    out
}

/// Strict `YYYY-MM-DD`.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let bytes = input.as_bytes();
    let digits = bytes
        .iter()
        .enumerate()
        .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' || !digits {
        return Err(NoteError::InvalidDateFormat(input.to_string()));
    }
    NaiveDate::parse_from_str(input, DATE_FMT)
        .map_err(|_| NoteError::InvalidDateFormat(input.to_string()))
}

/// Strict `YYYY-MM`, returned as the first day of that month.
pub fn parse_month(input: &str) -> Result<NaiveDate> {
    let invalid = || NoteError::InvalidMonthFormat(input.to_string());
    let bytes = input.as_bytes();
    if bytes.len() != 7 || bytes[4] != b'-' {
        return Err(invalid());
    }
    let (year, month) = input.split_at(4);
    if !year.bytes().all(|b| b.is_ascii_digit())
        || !month[1..].bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid());
    }
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month[1..].parse().map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)
}
