use crate::note::NoteType;
use std::error::Error;

pub struct ArgParser {
    iter: std::vec::IntoIter<String>,
    command_name: String,
}

impl ArgParser {
    pub fn new(args: Vec<String>, command_name: &str) -> Self {
        Self { iter: args.into_iter(), command_name: command_name.to_string() }
    }

    /// Extract a string value for a flag
    pub fn extract_value(
        &mut self,
        flag: &str,
    ) -> Result<String, Box<dyn Error>> {
        match self.iter.next() {
            Some(v) if !v.trim().is_empty() => Ok(v),
            _ => Err(format!(
                "Provide a value after {} for {}",
                flag, self.command_name
            )
            .into()),
        }
    }

    /// Get next argument
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<String> {
        self.iter.next()
    }

    /// Collect remaining args
    pub fn collect_remaining(self) -> Vec<String> {
        self.iter.collect()
    }
}

/// Month given to `--list-month`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonthArg {
    /// `MM`: that month of the current year.
    OfCurrentYear(u32),
    /// `YYYY-MM`, validated later by the service.
    Full(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListScope {
    Today,
    Date(String),
    Month(MonthArg),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    /// Free text saved as a text note.
    Add(String),
    List(ListScope),
    /// Interactive browser over today's notes.
    Browse,
    /// Interactive form for a new note of this type.
    Create(NoteType),
}

/// Parse everything after the program name.
pub fn parse_command(
    args: Vec<String>,
    command_name: &str,
) -> Result<Command, Box<dyn Error>> {
    let mut parser = ArgParser::new(args, command_name);
    let mut selectors: Vec<(String, Command)> = Vec::new();
    let mut words: Vec<String> = Vec::new();
    let mut help = false;

    while let Some(arg) = parser.next() {
        if arg == "--" {
            words.extend(parser.collect_remaining());
            break;
        }
        if !arg.starts_with('-') || arg == "-" {
            words.push(arg);
            continue;
        }

        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => {
                (flag.to_string(), Some(value.to_string()))
            }
            _ => (arg.clone(), None),
        };
        let value = |parser: &mut ArgParser| -> Result<String, Box<dyn Error>> {
            match inline.clone() {
                Some(v) if !v.trim().is_empty() => Ok(v),
                Some(_) => Err(format!(
                    "Provide a value after {flag} for {command_name}"
                )
                .into()),
                None => parser.extract_value(&flag),
            }
        };

        let command = match flag.as_str() {
            "-h" | "--help" => {
                help = true;
                continue;
            }
            "-l" | "--list" => Command::List(ListScope::Today),
            "--list-date" => Command::List(ListScope::Date(value(&mut parser)?)),
            "--list-month" => {
                Command::List(ListScope::Month(parse_month_arg(&value(&mut parser)?)?))
            }
            "-n" | "--note" => Command::Create(NoteType::Text),
            "-t" | "--task" => Command::Create(NoteType::Task),
            "-c" | "--contact" => Command::Create(NoteType::Contact),
            "-r" | "--reminder" => Command::Create(NoteType::Reminder),
            "-i" | "--interactive" => Command::Browse,
            _ => return Err(format!("Unknown flag: {arg}").into()),
        };
        if inline.is_some() && !matches!(flag.as_str(), "--list-date" | "--list-month") {
            return Err(format!("{flag} does not take a value").into());
        }
        selectors.push((flag, command));
    }

    if help {
        return Ok(Command::Help);
    }
    if selectors.len() > 1 {
        let names: Vec<&str> = selectors.iter().map(|(f, _)| f.as_str()).collect();
        return Err(format!(
            "Only one command flag can be used at a time (got {})",
            names.join(", ")
        )
        .into());
    }
    if let Some((flag, command)) = selectors.pop() {
        if !words.is_empty() {
            return Err(format!(
                "Unexpected note content with {flag}: {}",
                words.join(" ")
            )
            .into());
        }
        return Ok(command);
    }

    if words.is_empty() {
        return Ok(Command::Help);
    }
    let content = words.join(" ");
    if !content.contains(' ') {
        return Err(format!(
            "'{content}' is not a valid command\n\
             Use quotes for note content: {command_name} \"your note content\"\n\
             Or use flags: {command_name} -l (list), {command_name} -n (note), {command_name} -t (task), {command_name} -r (reminder)"
        )
        .into());
    }
    Ok(Command::Add(content))
}

fn parse_month_arg(raw: &str) -> Result<MonthArg, Box<dyn Error>> {
    let raw = raw.trim();
    if raw.contains('-') {
        return Ok(MonthArg::Full(raw.to_string()));
    }
    match raw.parse::<u32>() {
        Ok(m) if (1..=12).contains(&m) && raw.len() <= 2 => {
            Ok(MonthArg::OfCurrentYear(m))
        }
        _ => Err(format!(
            "Invalid month '{raw}'. Month must be between 1 and 12 or YYYY-MM"
        )
        .into()),
    }
}
