pub mod args;
pub mod config;
pub mod error;
pub mod formatting;
pub mod logging;
pub mod note;
pub mod render;
pub mod service;
pub mod store;
pub mod tui;

use args::{Command, ListScope, MonthArg, parse_command};
use chrono::Datelike;
use config::Config;
use formatting::FormatContext;
use note::{Note, NoteType, today};
use service::NoteService;
use std::env;
use std::error::Error;
use std::io::{self, IsTerminal};
use std::path::Path;
use store::FileStore;
use tracing::{debug, warn};
use tui::form::NoteForm;
use tui::state::Browser;

const TTY_REQUIRED: &str = "Interactive mode requires a TTY environment";

pub fn entry() -> Result<(), Box<dyn Error>> {
    logging::init_logging();

    let mut argv = env::args();
    let program = argv
        .next()
        .as_deref()
        .and_then(|p| Path::new(p).file_name())
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| "jtx".to_string());

    let command = parse_command(argv.collect(), &program)?;
    if command == Command::Help {
        print_help(&program);
        return Ok(());
    }

    let config = Config::from_env()?;
    debug!(dir = %config.notes_dir.display(), ?command, "starting");
    let app = App {
        service: NoteService::new(FileStore::new(&config.notes_dir)),
        ctx: config.format_context(),
        program,
    };

    match command {
        Command::Help => print_help(&app.program),
        Command::Add(content) => {
            app.service.create_note(&content)?;
            println!("Note saved successfully!");
        }
        Command::List(scope) => app.list(scope)?,
        Command::Browse => app.browse()?,
        Command::Create(note_type) => app.create(note_type)?,
    }
    Ok(())
}

fn print_help(program: &str) {
    println!(
        "\
JotterXpress - quick notes, tasks, contacts and reminders from the terminal
Usage:
  {program} \"note text\"              Save a text note for today
  {program} -l, --list               List today's notes
  {program} --list-date YYYY-MM-DD   List notes for a date
  {program} --list-month MM          List notes for a month of this year (or YYYY-MM)
  {program} -n, --note               Write a note in an interactive editor
  {program} -t, --task               Create a task
  {program} -c, --contact            Create a contact
  {program} -r, --reminder           Create a reminder
  {program} -i, --interactive        Browse today's notes
  {program} -h, --help               Show this message

In the list: ↑/↓ or k/j move, enter preview, e edit, c complete, x delete,
o actions menu, / filter by content, q quit.

Environment:
  JOTTERXPRESS_DIR                Override notes directory (default: ~/.jotterxpress/notes)
  JOTTERXPRESS_LOG                Log filter for stderr diagnostics (default: warn)
  NO_COLOR                        Disable colored output
"
    );
}

struct App {
    service: NoteService<FileStore>,
    ctx: FormatContext,
    program: String,
}

impl App {
    fn list(&self, scope: ListScope) -> Result<(), Box<dyn Error>> {
        let (notes, title, empty) = match scope {
            ListScope::Today => (
                self.service.today_notes()?,
                "Today's Notes".to_string(),
                self.nothing_today(),
            ),
            ListScope::Date(date) => (
                self.service.notes_by_date(&date)?,
                format!("Notes for {date}"),
                format!("No notes found for {date}."),
            ),
            ListScope::Month(MonthArg::OfCurrentYear(month)) => {
                let year = today().year();
                (
                    self.service.notes_by_month(&format!("{year}-{month:02}"))?,
                    format!("Notes for {month:02}/{year}"),
                    format!("No notes found for {month:02}/{year}."),
                )
            }
            ListScope::Month(MonthArg::Full(month)) => (
                self.service.notes_by_month(&month)?,
                format!("Notes for {month}"),
                format!("No notes found for {month}."),
            ),
        };

        if notes.is_empty() {
            println!("{empty}");
            return Ok(());
        }
        if io::stdout().is_terminal() {
            let mut browser = Browser::new(title.clone(), notes.clone());
            match tui::run_browser(&self.service, &mut browser, &self.ctx) {
                Ok(()) => return Ok(()),
                Err(e) => warn!(error = %e, "interactive list failed, falling back to text"),
            }
        }
        self.print_text_list(&title, &notes);
        Ok(())
    }

    fn browse(&self) -> Result<(), Box<dyn Error>> {
        let title = "JotterXpress - Interactive Notes";
        let notes = self.service.today_notes()?;
        if notes.is_empty() {
            println!("{}", self.nothing_today());
            return Ok(());
        }
        if !io::stdout().is_terminal() {
            self.print_text_list(title, &notes);
            return Ok(());
        }
        let mut browser = Browser::new(title, notes);
        tui::run_browser(&self.service, &mut browser, &self.ctx)
            .map_err(|e| format!("Error running interactive list: {e}"))?;
        Ok(())
    }

    fn create(&self, note_type: NoteType) -> Result<(), Box<dyn Error>> {
        if !io::stdout().is_terminal() {
            return Err(TTY_REQUIRED.into());
        }
        let Some(mut note) = tui::run_form(NoteForm::create(note_type), &self.ctx)? else {
            debug!(%note_type, "form cancelled");
            return Ok(());
        };
        self.service.save_note(&mut note)?;
        println!("{}", created_message(&note));
        Ok(())
    }

    fn nothing_today(&self) -> String {
        format!(
            "No notes found for today.\nStart taking notes with: {} \"your note content\"",
            self.program
        )
    }

    fn print_text_list(&self, title: &str, notes: &[Note]) {
        println!("{}", self.ctx.format_header(title));
        println!();
        println!("{}", self.service.list_notes(notes));
    }
}

fn created_message(note: &Note) -> String {
    match note.note_type() {
        NoteType::Text | NoteType::Idea => "Note saved successfully!".to_string(),
        NoteType::Task => "Task created successfully!".to_string(),
        NoteType::Contact => "Contact created successfully!".to_string(),
        NoteType::Reminder => "Reminder created successfully!".to_string(),
    }
}
