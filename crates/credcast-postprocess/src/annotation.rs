//! Annotation token highlighting.
//!
//! Inside `code.language-cred` blocks, tokens such as `@cred@team-42` are
//! wrapped in `<span class="cred-highlight">`. Only text between tags is
//! rewritten, and text already inside a highlight span is left alone, so the
//! transform can run any number of times.

use std::borrow::Cow;
use std::sync::LazyLock;

use credcast_dom::{ContentTree, is_void_element};
use regex::Regex;

use crate::consts::{ANNOTATION_BLOCKS, ANNOTATION_HIGHLIGHT_CLASS, ANNOTATION_PREFIX};
use crate::diagnostics::{DiagnosticKind, Diagnostics, Pass};

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        "{}[A-Za-z0-9:._-]+",
        regex::escape(ANNOTATION_PREFIX)
    ))
    .expect("invalid token regex")
});

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("invalid tag regex"));

static TAG_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^<\s*(/)?\s*([A-Za-z][A-Za-z0-9-]*)").expect("invalid tag name regex")
});

static CLASS_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\sclass\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("invalid class regex")
});

/// Wrap annotation tokens in `html` with highlight spans.
///
/// Returns the input borrowed if there was nothing to wrap.
#[must_use]
pub fn highlight_annotations(html: &str) -> Cow<'_, str> {
    if !TOKEN_RE.is_match(html) {
        return Cow::Borrowed(html);
    }

    let mut out = String::with_capacity(html.len() + 64);
    // One entry per open element: whether it is a highlight span.
    let mut open: Vec<bool> = Vec::new();
    let mut last_end = 0;

    for tag in TAG_RE.find_iter(html) {
        push_text(&mut out, &html[last_end..tag.start()], open.contains(&true));
        out.push_str(tag.as_str());
        track_tag(tag.as_str(), &mut open);
        last_end = tag.end();
    }
    push_text(&mut out, &html[last_end..], open.contains(&true));

    if out == html {
        Cow::Borrowed(html)
    } else {
        Cow::Owned(out)
    }
}

fn push_text(out: &mut String, text: &str, inside_highlight: bool) {
    if inside_highlight {
        out.push_str(text);
        return;
    }
    let replaced = TOKEN_RE.replace_all(text, |caps: &regex::Captures<'_>| {
        format!(
            "<span class=\"{ANNOTATION_HIGHLIGHT_CLASS}\">{}</span>",
            &caps[0]
        )
    });
    out.push_str(&replaced);
}

fn track_tag(tag: &str, open: &mut Vec<bool>) {
    let Some(caps) = TAG_NAME_RE.captures(tag) else {
        // Comments, declarations, processing instructions
        return;
    };
    if caps.get(1).is_some() {
        open.pop();
        return;
    }
    if tag.ends_with("/>") || is_void_element(&caps[2]) {
        return;
    }
    let highlight = caps[2].eq_ignore_ascii_case("span")
        && CLASS_ATTR_RE.captures(tag).is_some_and(|class| {
            class
                .get(1)
                .or_else(|| class.get(2))
                .is_some_and(|value| {
                    value
                        .as_str()
                        .split_ascii_whitespace()
                        .any(|c| c == ANNOTATION_HIGHLIGHT_CLASS)
                })
        });
    open.push(highlight);
}

/// Highlight annotation tokens in every `code.language-cred` element.
///
/// Returns the number of elements whose content changed. Elements are
/// visited in reverse document order so rewriting one never shifts the
/// position of another still to be visited.
pub fn annotate_tree(tree: &mut ContentTree, diagnostics: &Diagnostics) -> usize {
    let mut annotated = 0;

    for path in tree.select(&ANNOTATION_BLOCKS).into_iter().rev() {
        let Some(inner) = tree.inner_html(&path) else {
            continue;
        };
        let Cow::Owned(highlighted) = highlight_annotations(&inner) else {
            continue;
        };
        match tree.set_inner_html(&path, &highlighted) {
            Ok(()) => annotated += 1,
            Err(e) => diagnostics.report(
                Pass::Annotations,
                DiagnosticKind::MalformedContent,
                format!("cannot highlight annotations at {path}: {e}"),
            ),
        }
    }

    if annotated > 0 {
        tracing::debug!(annotated, "Highlighted annotation tokens");
    }
    annotated
}
