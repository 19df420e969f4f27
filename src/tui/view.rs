use super::form::NoteForm;
use super::state::{Browser, Screen, StatusLine};
use crate::formatting::{FormatContext, truncate_with_ellipsis, wrap_styled};
use crate::note::now_fixed;
use crate::render::render_markdown;

const LIST_HELP: &str =
    "↑/↓ move • enter preview • e edit • c complete • x delete • o menu • / filter • q quit";

/// Lines for the current browser screen, at most `height` of them.
pub fn browser_lines(
    browser: &Browser,
    ctx: &FormatContext,
    width: usize,
    height: usize,
) -> Vec<String> {
    let mut lines = match browser.screen() {
        Screen::List => list_lines(browser, ctx, width, height),
        Screen::Preview => preview_lines(browser, ctx, width),
        Screen::ContextMenu => {
            let mut lines = list_lines(browser, ctx, width, height.saturating_sub(5));
            lines.extend(menu_lines(browser, ctx));
            lines
        }
        Screen::Filtering => {
            let mut lines = list_lines(browser, ctx, width, height.saturating_sub(1));
            lines.push(format!("{} {}_", ctx.format_header("Filter:"), browser.filter()));
            lines
        }
        Screen::Editing(form) => form_lines(form, ctx, width),
    };
    lines.truncate(height.max(1));
    lines
}

fn list_lines(
    browser: &Browser,
    ctx: &FormatContext,
    width: usize,
    height: usize,
) -> Vec<String> {
    let visible = browser.visible();
    let header = if browser.filter().is_empty() {
        format!("{} ({})", browser.title(), visible.len())
    } else {
        format!(
            "{} ({}/{}) matching \"{}\"",
            browser.title(),
            visible.len(),
            browser.notes().len(),
            browser.filter()
        )
    };
    let mut lines = vec![ctx.format_header(&header), String::new()];

    // Header, blank, blank, status, help.
    let rows = height.saturating_sub(5).max(1);
    let start = browser.cursor().saturating_sub(rows - 1);
    if visible.is_empty() {
        let empty = if browser.notes().is_empty() { "No notes." } else { "No matching notes." };
        lines.push(ctx.format_muted(empty));
    }
    for (i, note) in visible.into_iter().enumerate().skip(start).take(rows) {
        let line = ctx.summary_line(note, width.saturating_sub(2));
        if i == browser.cursor() {
            lines.push(ctx.format_selected(&line));
        } else {
            lines.push(format!("  {line}"));
        }
    }

    lines.push(String::new());
    lines.push(status_text(browser.status(), ctx));
    lines.push(ctx.format_muted(&truncate_with_ellipsis(LIST_HELP, width)));
    lines
}

fn status_text(status: Option<&StatusLine>, ctx: &FormatContext) -> String {
    match status {
        Some(StatusLine::Info(msg)) => ctx.format_timestamp(msg),
        Some(StatusLine::Error(msg)) => ctx.format_error(&format!("Error: {msg}")),
        None => String::new(),
    }
}

fn preview_lines(browser: &Browser, ctx: &FormatContext, width: usize) -> Vec<String> {
    let Some(note) = browser.selected() else {
        return vec![ctx.format_muted("Nothing selected.")];
    };
    let rule = ctx.format_muted(&"─".repeat(width.min(60)));
    let mut lines = vec![ctx.format_header("Note Preview"), rule.clone()];
    for line in render_markdown(&note.content, ctx).lines() {
        lines.extend(wrap_styled(line, width));
    }
    lines.push(rule);
    for line in ctx.detail_lines(note, now_fixed()) {
        lines.extend(wrap_styled(&line, width));
    }
    lines.push(String::new());
    lines.push(ctx.format_muted("esc/q back"));
    lines
}

fn menu_lines(browser: &Browser, ctx: &FormatContext) -> Vec<String> {
    let completable = browser.selected().is_some_and(|n| n.kind.is_completable());
    let complete = if completable {
        "  2  Complete".to_string()
    } else {
        ctx.format_muted("  2  Complete (tasks and reminders only)")
    };
    vec![
        ctx.format_header("Actions"),
        "  1  Update".to_string(),
        complete,
        ctx.format_muted("  esc back"),
    ]
}

pub fn form_lines(form: &NoteForm, ctx: &FormatContext, width: usize) -> Vec<String> {
    let mut lines = vec![ctx.format_header(&form.title()), String::new()];
    for (i, field) in form.fields().iter().enumerate() {
        let focused = i == form.focus();
        let label = if focused {
            ctx.format_header(&format!("> {}", field.label))
        } else {
            format!("  {}", field.label)
        };
        lines.push(label);

        let cursor = if focused { "_" } else { "" };
        if field.value.is_empty() {
            lines.push(format!("    {}{cursor}", ctx.format_muted(field.placeholder)));
        } else {
            let mut values: Vec<String> =
                field.value.split('\n').map(|l| format!("    {l}")).collect();
            if let Some(last) = values.last_mut() {
                last.push_str(cursor);
            }
            lines.extend(values);
        }
        lines.push(String::new());
    }

    if let Some(error) = form.error() {
        lines.push(ctx.format_error(&format!("Error: {error}")));
    }
    let help = if form.is_multiline() {
        "enter newline • ctrl+s save • esc cancel"
    } else {
        "tab/↓ next • shift+tab/↑ back • enter save on last field • ctrl+s save • esc cancel"
    };
    lines.push(ctx.format_muted(&truncate_with_ellipsis(help, width)));
    lines
}
