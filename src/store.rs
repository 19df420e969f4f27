use crate::error::{NoteError, Result};
use crate::note::{DATE_FMT, Note, NoteKind, today};
use chrono::{Local, NaiveDate, NaiveTime, TimeZone};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Persistence for notes grouped into one bucket per calendar day.
pub trait NoteRepository {
    /// Insert the note into its date bucket, replacing any entry with the same id.
    fn save(&self, note: &Note) -> Result<()>;

    /// Notes of one day, pending reminders first, then most recently updated.
    fn notes_by_date(&self, date: NaiveDate) -> Result<Vec<Note>>;

    /// Inclusive union of every bucket from `start` to `end`.
    fn notes_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Note>>;

    fn notes_by_month(&self, year: i32, month: u32) -> Result<Vec<Note>> {
        let (start, end) = month_bounds(year, month).ok_or_else(|| {
            NoteError::InvalidMonthFormat(format!("{year}-{month:02}"))
        })?;
        self.notes_by_date_range(start, end)
    }

    fn today_notes(&self) -> Result<Vec<Note>> {
        self.notes_by_date(today())
    }

    /// Remove a note wherever it is stored.
    fn delete_note(&self, id: &str) -> Result<()>;

    /// Remove a note from a known bucket, leaving its siblings untouched.
    fn delete_from_bucket(&self, date: NaiveDate, id: &str) -> Result<()>;
}

/// First and last day of a month, or `None` for an impossible month.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let (next_year, next_month) =
        if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    let last = NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()?;
    Some((first, last))
}

/// Two-tier ordering: pending reminders, then everything else; each tier by
/// `updated_at`, newest first.
pub fn sort_notes(notes: &mut [Note]) {
    notes.sort_by(|a, b| {
        b.is_pending_reminder()
            .cmp(&a.is_pending_reminder())
            .then_with(|| b.updated_at.cmp(&a.updated_at))
    });
}

/// JSON buckets on local disk: `<dir>/<YYYY-MM-DD>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn bucket_path(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("{}.json", date.format(DATE_FMT)))
    }

    fn legacy_path(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("{}.txt", date.format(DATE_FMT)))
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)
                .map_err(|e| NoteError::io(&self.dir, e))?;
        }
        Ok(())
    }

    /// Load a bucket in file order, migrating the legacy text file when the
    /// JSON is missing or unreadable.
    fn read_bucket(&self, date: NaiveDate) -> Result<Vec<Note>> {
        let path = self.bucket_path(date);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(self.migrate_legacy(date)?.unwrap_or_default());
            }
            Err(e) => return Err(NoteError::io(path, e)),
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        // An emptied bucket may have been written as `null`.
        match serde_json::from_str::<Option<Vec<Note>>>(&raw) {
            Ok(notes) => {
                let notes = notes.unwrap_or_default();
                debug!(path = %path.display(), count = notes.len(), "loaded bucket");
                Ok(notes)
            }
            Err(source) => match self.migrate_legacy(date)? {
                Some(notes) => Ok(notes),
                None => Err(NoteError::Decode { path, source }),
            },
        }
    }

    /// Truncate-and-rewrite through a temporary sibling and a rename.
    fn write_bucket(&self, date: NaiveDate, notes: &[Note]) -> Result<()> {
        self.ensure_dir()?;
        let path = self.bucket_path(date);
        let tmp = self.dir.join(format!(".{}.json.tmp", date.format(DATE_FMT)));

        let mut data = serde_json::to_vec_pretty(notes)?;
        data.push(b'\n');
        fs::write(&tmp, data).map_err(|e| NoteError::io(&tmp, e))?;
        if let Err(e) = fs::rename(&tmp, &path) {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                warn!(path = %tmp.display(), error = %cleanup, "failed to remove temporary bucket");
            }
            return Err(NoteError::io(path, e));
        }
        debug!(path = %path.display(), count = notes.len(), "wrote bucket");
        Ok(())
    }

    /// `None` when there is no legacy file for the date.
    fn migrate_legacy(&self, date: NaiveDate) -> Result<Option<Vec<Note>>> {
        let legacy = self.legacy_path(date);
        let raw = match fs::read_to_string(&legacy) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(NoteError::io(legacy, e)),
        };

        let notes = parse_legacy(&raw, date);
        if !notes.is_empty() {
            self.write_bucket(date, &notes)?;
            if let Err(e) = fs::remove_file(&legacy) {
                warn!(path = %legacy.display(), error = %e, "migrated legacy notes but could not remove the text file");
            }
            info!(date = %date, count = notes.len(), "migrated legacy text notes to json");
        }
        Ok(Some(notes))
    }

    /// Dates that have a JSON bucket, newest first.
    fn bucket_dates(&self) -> Result<Vec<NaiveDate>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(NoteError::io(&self.dir, e)),
        };
        let mut dates = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| NoteError::io(&self.dir, e))?;
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            if let Some(date) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| NaiveDate::parse_from_str(s, DATE_FMT).ok())
            {
                dates.push(date);
            }
        }
        dates.sort_unstable_by(|a, b| b.cmp(a));
        Ok(dates)
    }
}

impl NoteRepository for FileStore {
    fn save(&self, note: &Note) -> Result<()> {
        self.ensure_dir()?;
        let mut notes = self.read_bucket(note.date)?;
        match notes.iter_mut().find(|n| n.id == note.id) {
            Some(existing) => *existing = note.clone(),
            None => notes.push(note.clone()),
        }
        self.write_bucket(note.date, &notes)
    }

    fn notes_by_date(&self, date: NaiveDate) -> Result<Vec<Note>> {
        let mut notes = self.read_bucket(date)?;
        sort_notes(&mut notes);
        Ok(notes)
    }

    fn notes_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Note>> {
        let mut all = Vec::new();
        for date in start.iter_days().take_while(|d| *d <= end) {
            match self.read_bucket(date) {
                Ok(notes) => all.extend(notes),
                Err(e) => warn!(date = %date, error = %e, "skipping unreadable bucket"),
            }
        }
        sort_notes(&mut all);
        Ok(all)
    }

    fn delete_note(&self, id: &str) -> Result<()> {
        for date in self.bucket_dates()? {
            let notes = match self.read_bucket(date) {
                Ok(notes) => notes,
                Err(e) => {
                    warn!(date = %date, error = %e, "skipping unreadable bucket");
                    continue;
                }
            };
            if notes.iter().any(|n| n.id == id) {
                return self.delete_from_bucket(date, id);
            }
        }
        Err(NoteError::NotFound(id.to_string()))
    }

    fn delete_from_bucket(&self, date: NaiveDate, id: &str) -> Result<()> {
        let mut notes = self.read_bucket(date)?;
        let before = notes.len();
        notes.retain(|n| n.id != id);
        if notes.len() == before {
            return Err(NoteError::NotFound(id.to_string()));
        }
        self.write_bucket(date, &notes)?;
        info!(date = %date, id, "deleted note");
        Ok(())
    }
}

/// Parse `[HH:MM:SS] content` lines into text notes dated `date`.
/// Anything else is skipped.
fn parse_legacy(raw: &str, date: NaiveDate) -> Vec<Note> {
    let mut notes = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some((clock, content)) =
            line.strip_prefix('[').and_then(|rest| rest.split_once("] "))
        else {
            debug!(line, "skipping malformed legacy line");
            continue;
        };
        let Ok(time) = NaiveTime::parse_from_str(clock, "%H:%M:%S") else {
            debug!(line, "skipping legacy line with bad time");
            continue;
        };

        let naive = date.and_time(time);
        let stamp = Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.fixed_offset())
            .unwrap_or_else(|| naive.and_utc().fixed_offset());

        let base = format!("{}-{clock}", date.format(DATE_FMT));
        let mut id = base.clone();
        let mut n = 1;
        while !seen.insert(id.clone()) {
            id = format!("{base}-{n}");
            n += 1;
        }

        notes.push(Note {
            id,
            kind: NoteKind::Text,
            content: content.to_string(),
            created_at: stamp,
            updated_at: stamp,
            date,
            tags: Vec::new(),
            category: None,
        });
    }
    notes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::{Priority, Status};
    use chrono::{DateTime, Duration, FixedOffset};
    use tempfile::tempdir;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(date: NaiveDate, hour: u32) -> DateTime<FixedOffset> {
        date.and_hms_opt(hour, 0, 0).unwrap().and_utc().fixed_offset()
    }

    #[test]
    fn save_appends_then_replaces_by_id() {
        let tmp = tempdir().unwrap();
        let store = FileStore::new(tmp.path().join("notes"));
        let mut note = Note::text("first draft");
        store.save(&note).unwrap();
        store.save(&Note::text("another one")).unwrap();

        note.content = "second draft".to_string();
        store.save(&note).unwrap();

        let loaded = store.notes_by_date(note.date).unwrap();
        assert_eq!(loaded.len(), 2);
        let found = loaded.iter().find(|n| n.id == note.id).unwrap();
        assert_eq!(found.content, "second draft");
    }

    #[test]
    fn bucket_is_pretty_printed_json_array() {
        let tmp = tempdir().unwrap();
        let store = FileStore::new(tmp.path());
        let note = Note::text("pretty please");
        store.save(&note).unwrap();

        let raw = fs::read_to_string(store.bucket_path(note.date)).unwrap();
        assert!(raw.starts_with("[\n  {\n    \"id\""));
        assert!(raw.ends_with("]\n"));
        assert!(!tmp.path().join(format!(".{}.json.tmp", note.date)).exists());
    }

    #[test]
    fn missing_bucket_is_empty() {
        let tmp = tempdir().unwrap();
        let store = FileStore::new(tmp.path());
        assert!(store.notes_by_date(day(2024, 5, 1)).unwrap().is_empty());
    }

    #[test]
    fn pending_reminders_sort_first() {
        let tmp = tempdir().unwrap();
        let store = FileStore::new(tmp.path());
        let date = day(2025, 1, 10);

        let mut pending = Note::reminder("pay rent", "08:00");
        pending.date = date;
        pending.updated_at = at(date, 1);

        let mut done = Note::reminder("old reminder", "09:00");
        done.date = date;
        done.updated_at = at(date, 2);
        done.complete();

        let mut task = Note::task("review PR", Priority::Low);
        task.date = date;
        task.updated_at = at(date, 3);

        for n in [&task, &done, &pending] {
            store.save(n).unwrap();
        }

        let ids: Vec<String> = store
            .notes_by_date(date)
            .unwrap()
            .into_iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(ids, vec![pending.id, task.id, done.id]);
    }

    #[test]
    fn reminder_with_unknown_status_is_not_pending() {
        let mut odd = Note::reminder("snoozed", "09:00");
        if let NoteKind::Reminder(r) = &mut odd.kind {
            r.status = Status::Other("snoozed".into());
        }
        let mut fresh = Note::text("fresh");
        fresh.updated_at = odd.updated_at + Duration::seconds(5);
        let mut notes = vec![odd.clone(), fresh.clone()];
        sort_notes(&mut notes);
        assert_eq!(notes[0].id, fresh.id);
    }

    #[test]
    fn migrates_corrupt_json_from_legacy_text() {
        let tmp = tempdir().unwrap();
        let store = FileStore::new(tmp.path());
        let date = day(2024, 3, 9);
        fs::write(store.bucket_path(date), "this is not json").unwrap();
        fs::write(store.legacy_path(date), "[09:00:00] buy milk\nnot a note\n")
            .unwrap();

        let notes = store.notes_by_date(date).unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].content, "buy milk");
        assert_eq!(notes[0].id, "2024-03-09-09:00:00");
        assert_eq!(notes[0].kind, NoteKind::Text);
        assert!(!store.legacy_path(date).exists());

        // The rewritten bucket decodes on its own now.
        let again = store.notes_by_date(date).unwrap();
        assert_eq!(again[0].content, "buy milk");
    }

    #[test]
    fn migrates_legacy_text_without_json_bucket() {
        let tmp = tempdir().unwrap();
        let store = FileStore::new(tmp.path());
        let date = day(2023, 12, 31);
        fs::write(
            store.legacy_path(date),
            "[23:59:58] last call\n[23:59:58] same second\n[bad] nope\n",
        )
        .unwrap();

        let notes = store.notes_by_date(date).unwrap();
        assert_eq!(notes.len(), 2);
        let ids: HashSet<&str> = notes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids.len(), 2);
        assert!(store.bucket_path(date).exists());
        assert!(!store.legacy_path(date).exists());
    }

    #[test]
    fn legacy_file_without_valid_lines_is_left_alone() {
        let tmp = tempdir().unwrap();
        let store = FileStore::new(tmp.path());
        let date = day(2023, 6, 1);
        fs::write(store.legacy_path(date), "garbage\n").unwrap();

        assert!(store.notes_by_date(date).unwrap().is_empty());
        assert!(store.legacy_path(date).exists());
        assert!(!store.bucket_path(date).exists());
    }

    #[test]
    fn corrupt_json_without_legacy_file_is_a_decode_error() {
        let tmp = tempdir().unwrap();
        let store = FileStore::new(tmp.path());
        let date = day(2024, 8, 8);
        fs::write(store.bucket_path(date), "{ broken").unwrap();

        let err = store.notes_by_date(date).unwrap_err();
        assert!(matches!(err, NoteError::Decode { .. }));

        let mut note = Note::text("would clobber");
        note.date = date;
        assert!(store.save(&note).is_err());
        assert_eq!(fs::read_to_string(store.bucket_path(date)).unwrap(), "{ broken");
    }

    #[test]
    fn null_bucket_reads_as_empty() {
        let tmp = tempdir().unwrap();
        let store = FileStore::new(tmp.path());
        let date = day(2024, 4, 4);
        fs::write(store.bucket_path(date), "null\n").unwrap();
        assert!(store.notes_by_date(date).unwrap().is_empty());
    }

    #[test]
    fn month_bounds_handle_lengths() {
        assert_eq!(month_bounds(2025, 2), Some((day(2025, 2, 1), day(2025, 2, 28))));
        assert_eq!(month_bounds(2024, 2), Some((day(2024, 2, 1), day(2024, 2, 29))));
        assert_eq!(month_bounds(2024, 12), Some((day(2024, 12, 1), day(2024, 12, 31))));
        assert_eq!(month_bounds(2024, 13), None);
    }

    #[test]
    fn month_query_excludes_neighbouring_days() {
        let tmp = tempdir().unwrap();
        let store = FileStore::new(tmp.path());
        for (date, content) in [
            (day(2025, 1, 31), "january"),
            (day(2025, 2, 1), "first of feb"),
            (day(2025, 2, 28), "last of feb"),
            (day(2025, 3, 1), "march"),
        ] {
            store.save(&Note::text_on(content, date)).unwrap();
        }

        let notes = store.notes_by_month(2025, 2).unwrap();
        let mut contents: Vec<&str> =
            notes.iter().map(|n| n.content.as_str()).collect();
        contents.sort_unstable();
        assert_eq!(contents, vec!["first of feb", "last of feb"]);
        assert!(matches!(
            store.notes_by_month(2025, 0),
            Err(NoteError::InvalidMonthFormat(_))
        ));
    }

    #[test]
    fn range_skips_unreadable_days() {
        let tmp = tempdir().unwrap();
        let store = FileStore::new(tmp.path());
        store.save(&Note::text_on("kept", day(2025, 5, 2))).unwrap();
        fs::write(store.bucket_path(day(2025, 5, 3)), "not json").unwrap();

        let notes =
            store.notes_by_date_range(day(2025, 5, 1), day(2025, 5, 4)).unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].content, "kept");
    }

    #[test]
    fn delete_removes_only_the_target() {
        let tmp = tempdir().unwrap();
        let store = FileStore::new(tmp.path());
        let date = day(2025, 7, 14);
        let keep = Note::text_on("keep me", date);
        let drop = Note::text_on("drop me", date);
        store.save(&keep).unwrap();
        store.save(&drop).unwrap();

        store.delete_note(&drop.id).unwrap();
        let left = store.notes_by_date(date).unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, keep.id);

        assert!(matches!(
            store.delete_note(&drop.id),
            Err(NoteError::NotFound(_))
        ));
        assert!(matches!(
            store.delete_from_bucket(date, "nope"),
            Err(NoteError::NotFound(_))
        ));

        store.delete_from_bucket(date, &keep.id).unwrap();
        assert!(store.notes_by_date(date).unwrap().is_empty());
    }
}
