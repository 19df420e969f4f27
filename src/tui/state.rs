use super::Key;
use super::form::{FormEvent, NoteForm};
use crate::note::Note;

pub enum Screen {
    List,
    Preview,
    ContextMenu,
    /// Typing a content filter after `/`.
    Filtering,
    Editing(NoteForm),
}

/// Work the driver performs through the note service.
#[derive(Debug)]
pub enum Action {
    Quit,
    Save(Note),
    Complete(Note),
    Delete(Note),
}

/// Result of an [`Action`], fed back into the browser.
#[derive(Debug)]
pub enum Outcome {
    Saved(Note),
    Completed(Note),
    Deleted(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusLine {
    Info(String),
    Error(String),
}

/// Interactive note list: one key in, at most one action out.
pub struct Browser {
    title: String,
    notes: Vec<Note>,
    cursor: usize,
    filter: String,
    screen: Screen,
    status: Option<StatusLine>,
}

impl Browser {
    pub fn new(title: impl Into<String>, notes: Vec<Note>) -> Self {
        Self {
            title: title.into(),
            notes,
            cursor: 0,
            filter: String::new(),
            screen: Screen::List,
            status: None,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Notes whose content contains the filter, ignoring case. The cursor
    /// indexes into this view.
    pub fn visible(&self) -> Vec<&Note> {
        let needle = self.filter.to_lowercase();
        self.notes
            .iter()
            .filter(|n| needle.is_empty() || n.content.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn status(&self) -> Option<&StatusLine> {
        self.status.as_ref()
    }

    pub fn selected(&self) -> Option<&Note> {
        self.visible().get(self.cursor).copied()
    }

    pub fn handle_key(&mut self, key: Key) -> Option<Action> {
        match &mut self.screen {
            Screen::List => self.on_list_key(key),
            Screen::Preview => {
                if matches!(key, Key::Esc | Key::Char('q') | Key::CtrlC) {
                    self.screen = Screen::List;
                }
                None
            }
            Screen::ContextMenu => self.on_menu_key(key),
            Screen::Filtering => {
                self.on_filter_key(key);
                None
            }
            Screen::Editing(form) => match form.handle_key(key) {
                FormEvent::Pending => None,
                FormEvent::Cancelled => {
                    self.screen = Screen::List;
                    None
                }
                FormEvent::Submitted(note) => {
                    self.screen = Screen::List;
                    Some(Action::Save(note))
                }
            },
        }
    }

    fn on_list_key(&mut self, key: Key) -> Option<Action> {
        match key {
            Key::Char('/') => {
                self.screen = Screen::Filtering;
                return None;
            }
            Key::Esc if !self.filter.is_empty() => {
                self.filter.clear();
                self.cursor = 0;
                return None;
            }
            _ => {}
        }
        if matches!(key, Key::Char('q') | Key::Esc | Key::CtrlC) {
            return Some(Action::Quit);
        }
        let note = self.selected()?.clone();
        self.status = None;
        match key {
            Key::Up | Key::Char('k') => self.cursor = self.cursor.saturating_sub(1),
            Key::Down | Key::Char('j') => {
                self.cursor = (self.cursor + 1).min(self.visible().len() - 1);
            }
            Key::Enter => self.screen = Screen::Preview,
            Key::Char('o') => self.screen = Screen::ContextMenu,
            Key::Char('e') => self.screen = Screen::Editing(NoteForm::edit(&note)),
            Key::Char('c') => return self.request_complete(note),
            Key::Char('x') | Key::Backspace => return Some(Action::Delete(note)),
            _ => {}
        }
        None
    }

    fn on_filter_key(&mut self, key: Key) {
        match key {
            Key::Enter => self.screen = Screen::List,
            Key::Esc | Key::CtrlC => {
                self.filter.clear();
                self.screen = Screen::List;
            }
            Key::Backspace => {
                self.filter.pop();
            }
            Key::Char(c) => self.filter.push(c),
            _ => return,
        }
        self.cursor = 0;
    }

    fn on_menu_key(&mut self, key: Key) -> Option<Action> {
        match key {
            Key::Esc | Key::Char('q') => self.screen = Screen::List,
            Key::Char('1') => {
                let form = NoteForm::edit(self.selected()?);
                self.screen = Screen::Editing(form);
            }
            Key::Char('2') => {
                let note = self.selected()?.clone();
                if note.kind.is_completable() {
                    self.screen = Screen::List;
                    return self.request_complete(note);
                }
            }
            _ => {}
        }
        None
    }

    fn request_complete(&mut self, note: Note) -> Option<Action> {
        if note.kind.is_completable() {
            Some(Action::Complete(note))
        } else {
            self.status = Some(StatusLine::Error(
                "Only tasks and reminders can be completed".to_string(),
            ));
            None
        }
    }

    pub fn apply(&mut self, outcome: Outcome) {
        self.status = Some(match outcome {
            Outcome::Saved(note) => {
                self.replace(note);
                StatusLine::Info("Note updated".to_string())
            }
            Outcome::Completed(note) => {
                self.replace(note);
                StatusLine::Info("Marked as completed".to_string())
            }
            Outcome::Deleted(id) => {
                self.notes.retain(|n| n.id != id);
                StatusLine::Info("Note deleted".to_string())
            }
            Outcome::Failed(message) => StatusLine::Error(message),
        });
        // Edits can drop a note out of the filtered view.
        self.cursor = self.cursor.min(self.visible().len().saturating_sub(1));
    }

    fn replace(&mut self, note: Note) {
        match self.notes.iter_mut().find(|n| n.id == note.id) {
            Some(slot) => *slot = note,
            None => self.notes.push(note),
        }
    }
}
