use crate::formatting::FormatContext;
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Parser, Tag, TagEnd};
use yansi::Paint;

/// Minimal styling categories used when coloring markdown output.
#[derive(Clone, Copy)]
enum Style {
    Heading,
    Bullet,
    Rule,
    Code,
    Strong,
    Emphasis,
    Body,
}

/// Render note content as terminal text. Plain contexts get the same layout
/// without escape codes.
pub fn render_markdown(input: &str, ctx: &FormatContext) -> String {
    let mut rendered = String::new();
    let mut list_stack: Vec<Option<u64>> = Vec::new();
    let mut in_code_block = false;
    let mut strong = false;
    let mut emphasis = false;

    for event in Parser::new(input) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                if !rendered.is_empty() {
                    rendered.push('\n');
                }
                let mark = match level {
                    HeadingLevel::H1 => "# ",
                    HeadingLevel::H2 => "## ",
                    HeadingLevel::H3 => "### ",
                    _ => "#### ",
                };
                push_styled(&mut rendered, mark, Style::Heading, ctx);
                strong = true;
            }
            Event::End(TagEnd::Heading(_)) => {
                strong = false;
                rendered.push('\n');
            }
            Event::End(TagEnd::Paragraph) => rendered.push('\n'),
            Event::Start(Tag::List(start)) => list_stack.push(start),
            Event::End(TagEnd::List(_)) => {
                list_stack.pop();
                if list_stack.is_empty() {
                    rendered.push('\n');
                }
            }
            Event::Start(Tag::Item) => {
                if !rendered.is_empty() && !rendered.ends_with('\n') {
                    rendered.push('\n');
                }
                rendered.push_str(&"  ".repeat(list_stack.len().saturating_sub(1)));
                let marker = match list_stack.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => "- ".to_string(),
                };
                push_styled(&mut rendered, &marker, Style::Bullet, ctx);
            }
            Event::End(TagEnd::Item) => {
                if !rendered.ends_with('\n') {
                    rendered.push('\n');
                }
            }
            Event::Start(Tag::CodeBlock(kind)) => {
                in_code_block = true;
                if let CodeBlockKind::Fenced(lang) = kind {
                    if !lang.is_empty() {
                        push_styled(&mut rendered, &format!("[{lang}]\n"), Style::Rule, ctx);
                    }
                }
            }
            Event::End(TagEnd::CodeBlock) => {
                in_code_block = false;
                rendered.push('\n');
            }
            Event::Start(Tag::Strong) => strong = true,
            Event::End(TagEnd::Strong) => strong = false,
            Event::Start(Tag::Emphasis) => emphasis = true,
            Event::End(TagEnd::Emphasis) => emphasis = false,
            Event::Text(t) => {
                let style = if in_code_block {
                    Style::Code
                } else if strong {
                    Style::Strong
                } else if emphasis {
                    Style::Emphasis
                } else {
                    Style::Body
                };
                // Style each line on its own so escape codes never span a newline.
                for (i, line) in t.split('\n').enumerate() {
                    if i > 0 {
                        rendered.push('\n');
                    }
                    push_styled(&mut rendered, line, style, ctx);
                }
            }
            Event::Code(t) => push_styled(&mut rendered, &t, Style::Code, ctx),
            Event::SoftBreak | Event::HardBreak => rendered.push('\n'),
            Event::Rule => {
                push_styled(&mut rendered, "---", Style::Rule, ctx);
                rendered.push('\n');
            }
            Event::Html(t) => rendered.push_str(&t),
            Event::TaskListMarker(done) => {
                rendered.push_str(if done { "[x] " } else { "[ ] " });
            }
            _ => {}
        }
    }

    rendered.trim_end().to_string()
}

fn push_styled(buf: &mut String, text: &str, style: Style, ctx: &FormatContext) {
    if !ctx.use_color || text.is_empty() {
        buf.push_str(text);
        return;
    }
    let painted = match style {
        Style::Heading => {
            let (r, g, b) = ctx.palette.header;
            Paint::rgb(text, r, g, b).bold()
        }
        Style::Bullet => Paint::yellow(text).bold(),
        Style::Rule => Paint::new(text).dim(),
        Style::Code => {
            let (r, g, b) = ctx.palette.timestamp;
            Paint::rgb(text, r, g, b)
        }
        Style::Strong => Paint::new(text).bold(),
        Style::Emphasis => Paint::new(text).italic(),
        Style::Body => Paint::new(text),
    };
    buf.push_str(&painted.to_string());
}
