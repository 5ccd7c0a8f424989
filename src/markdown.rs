//! Markdown rendering for markdown cells.
//!
//! CommonMark with the GitHub extensions notebooks rely on (tables,
//! strikethrough, task lists, footnotes), plus bare-URL autolinks and
//! `attachment:` image references. Output is sanitized before it is embedded.

use pulldown_cmark::{html, CowStr, Event, LinkType, Options, Parser, Tag, TagEnd};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::models::MimeBundle;
use crate::text::image_data_uri;

const ATTACHMENT_PREFIX: &str = "attachment:";

static BARE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https?://[^\s<>"'`]+"#).expect("URL pattern is valid")
});

fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES
}

pub fn render_markdown(content: &str, attachments: &BTreeMap<String, MimeBundle>) -> String {
    let mut events: Vec<Event<'_>> = Vec::new();
    let mut pending_text = String::new();
    // Inside links, images and code, text is left as written.
    let mut verbatim_depth = 0usize;

    for event in Parser::new_ext(content, options()) {
        if let Event::Text(ref text) = event {
            if verbatim_depth == 0 {
                pending_text.push_str(text);
                continue;
            }
        }
        flush_text(&mut pending_text, &mut events);

        match event {
            Event::Start(Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            }) => {
                verbatim_depth += 1;
                let dest_url = resolve_attachment(&dest_url, attachments)
                    .map(CowStr::from)
                    .unwrap_or(dest_url);
                events.push(Event::Start(Tag::Image {
                    link_type,
                    dest_url,
                    title,
                    id,
                }));
            }
            Event::Start(ref tag @ (Tag::Link { .. } | Tag::CodeBlock(_))) => {
                verbatim_depth += 1;
                events.push(Event::Start(tag.clone()));
            }
            Event::End(TagEnd::Image | TagEnd::Link | TagEnd::CodeBlock) => {
                verbatim_depth = verbatim_depth.saturating_sub(1);
                events.push(event);
            }
            Event::InlineHtml(html) => {
                if is_anchor_tag(&html, "<a") {
                    verbatim_depth += 1;
                } else if is_anchor_tag(&html, "</a") {
                    verbatim_depth = verbatim_depth.saturating_sub(1);
                }
                events.push(Event::InlineHtml(html));
            }
            other => events.push(other),
        }
    }
    flush_text(&mut pending_text, &mut events);

    let mut html_output = String::new();
    html::push_html(&mut html_output, events.into_iter());
    sanitize(&html_output)
}

/// Emits buffered text, turning bare URLs into links.
fn flush_text(pending: &mut String, events: &mut Vec<Event<'_>>) {
    if pending.is_empty() {
        return;
    }
    let text = std::mem::take(pending);
    let mut last = 0;

    for m in BARE_URL.find_iter(&text) {
        let url = m.as_str().trim_end_matches(['.', ',', ';', ':', '!', '?', ')', ']']);
        if url.len() <= "https://".len() {
            continue;
        }
        if m.start() > last {
            events.push(Event::Text(CowStr::from(text[last..m.start()].to_string())));
        }
        events.push(Event::Start(Tag::Link {
            link_type: LinkType::Autolink,
            dest_url: CowStr::from(url.to_string()),
            title: CowStr::from(""),
            id: CowStr::from(""),
        }));
        events.push(Event::Text(CowStr::from(url.to_string())));
        events.push(Event::End(TagEnd::Link));
        last = m.start() + url.len();
    }

    if last < text.len() {
        events.push(Event::Text(CowStr::from(text[last..].to_string())));
    }
}

/// Whether inline HTML opens (`<a`) or closes (`</a`) an anchor, without
/// matching longer tag names such as `<abbr>`.
fn is_anchor_tag(html: &str, prefix: &str) -> bool {
    let tag = html.trim_start().to_ascii_lowercase();
    tag.strip_prefix(prefix)
        .is_some_and(|rest| rest.starts_with(|c: char| c == '>' || c.is_ascii_whitespace()))
}

fn resolve_attachment(dest: &str, attachments: &BTreeMap<String, MimeBundle>) -> Option<String> {
    let name = dest.strip_prefix(ATTACHMENT_PREFIX)?;
    let bundle = attachments.get(name)?;
    let (mime, payload) = bundle.images().next()?;
    Some(image_data_uri(mime, &payload))
}

fn sanitize(html: &str) -> String {
    let mut builder = ammonia::Builder::default();
    builder
        .add_tags(&["input"])
        .add_tag_attributes("input", &["type", "checked", "disabled"])
        .add_url_schemes(&["data"]);
    builder.clean(html).to_string()
}
