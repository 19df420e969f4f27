//! Interactive terminal front-end: a crossterm driver around the pure
//! [`state::Browser`] state machine and [`form::NoteForm`].

pub mod form;
pub mod state;
pub mod view;

use crate::formatting::FormatContext;
use crate::note::Note;
use crate::service::NoteService;
use crate::store::NoteRepository;
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::Print;
use crossterm::terminal::{
    self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{execute, queue};
use form::{FormEvent, NoteForm};
use state::{Action, Browser, Outcome};
use std::io::{self, Stdout, Write};
use tracing::debug;

/// Keys the browser and forms react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Enter,
    Esc,
    Tab,
    BackTab,
    Backspace,
    CtrlC,
    CtrlS,
    Char(char),
}

fn map_key(code: KeyCode, modifiers: KeyModifiers) -> Option<Key> {
    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') => Some(Key::CtrlC),
            KeyCode::Char('s') => Some(Key::CtrlS),
            _ => None,
        };
    }
    Some(match code {
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Enter => Key::Enter,
        KeyCode::Esc => Key::Esc,
        KeyCode::Tab => Key::Tab,
        KeyCode::BackTab => Key::BackTab,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Char(c) => Key::Char(c),
        _ => return None,
    })
}

/// Blocks for the next key press; `None` for anything to ignore (resize,
/// releases, mouse), which still triggers a redraw.
fn read_key() -> io::Result<Option<Key>> {
    match event::read()? {
        Event::Key(KeyEvent { code, modifiers, kind, .. })
            if kind != KeyEventKind::Release =>
        {
            Ok(map_key(code, modifiers))
        }
        _ => Ok(None),
    }
}

/// Raw mode on the alternate screen for as long as the value lives.
struct Terminal {
    out: Stdout,
}

impl Terminal {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut out = io::stdout();
        if let Err(e) = execute!(out, EnterAlternateScreen, Hide) {
            let _ = terminal::disable_raw_mode();
            return Err(e);
        }
        Ok(Self { out })
    }

    fn draw(
        &mut self,
        frame: impl FnOnce(usize, usize) -> Vec<String>,
    ) -> io::Result<()> {
        let (width, height) = terminal::size()?;
        let lines = frame(width as usize, height as usize);
        for (row, line) in lines.iter().enumerate() {
            queue!(
                self.out,
                MoveTo(0, row as u16),
                Print(line),
                Clear(ClearType::UntilNewLine)
            )?;
        }
        queue!(self.out, MoveTo(0, lines.len() as u16), Clear(ClearType::FromCursorDown))?;
        self.out.flush()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = execute!(self.out, Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

/// Run the list browser until the user quits. Every action goes through the
/// service and its outcome is reported back to the browser.
pub fn run_browser<R: NoteRepository>(
    service: &NoteService<R>,
    browser: &mut Browser,
    ctx: &FormatContext,
) -> io::Result<()> {
    let mut term = Terminal::enter()?;
    loop {
        term.draw(|w, h| view::browser_lines(&*browser, ctx, w, h))?;
        let Some(key) = read_key()? else { continue };
        let Some(action) = browser.handle_key(key) else { continue };
        debug!(?action, "browser action");
        let outcome = match action {
            Action::Quit => break,
            Action::Save(mut note) => match service.save_note(&mut note) {
                Ok(()) => Outcome::Saved(note),
                Err(e) => Outcome::Failed(e.to_string()),
            },
            Action::Complete(mut note) => match service.complete_note(&mut note) {
                Ok(()) => Outcome::Completed(note),
                Err(e) => Outcome::Failed(e.to_string()),
            },
            Action::Delete(note) => match service.delete_note(&note) {
                Ok(()) => Outcome::Deleted(note.id),
                Err(e) => Outcome::Failed(e.to_string()),
            },
        };
        browser.apply(outcome);
    }
    Ok(())
}

/// Show a form until it is submitted (`Some`) or cancelled (`None`).
pub fn run_form(mut form: NoteForm, ctx: &FormatContext) -> io::Result<Option<Note>> {
    let mut term = Terminal::enter()?;
    loop {
        term.draw(|w, _| view::form_lines(&form, ctx, w))?;
        let Some(key) = read_key()? else { continue };
        match form.handle_key(key) {
            FormEvent::Pending => {}
            FormEvent::Submitted(note) => return Ok(Some(note)),
            FormEvent::Cancelled => return Ok(None),
        }
    }
}
