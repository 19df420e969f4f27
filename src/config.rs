use crate::formatting::FormatContext;
use std::env;
use std::io;
use std::path::PathBuf;

pub const DIR_ENV: &str = "JOTTERXPRESS_DIR";
pub const LOG_ENV: &str = "JOTTERXPRESS_LOG";

/// Settings read from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub notes_dir: PathBuf,
    pub use_color: bool,
}

impl Config {
    pub fn from_env() -> io::Result<Self> {
        Ok(Self {
            notes_dir: notes_dir()?,
            use_color: env::var_os("NO_COLOR").is_none(),
        })
    }

    pub fn format_context(&self) -> FormatContext {
        FormatContext::new(self.use_color)
    }
}

fn notes_dir() -> io::Result<PathBuf> {
    if let Some(dir) = env::var_os(DIR_ENV).filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let home = env::var_os("HOME").filter(|h| !h.is_empty()).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("HOME not set; set {DIR_ENV} explicitly"),
        )
    })?;
    Ok(PathBuf::from(home).join(".jotterxpress").join("notes"))
}
