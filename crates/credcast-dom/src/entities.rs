//! Markup preparation for the XML reader.
//!
//! The XML parser only knows the five predefined entities, so common HTML
//! named entities are turned into characters before parsing. The predefined
//! ones (`amp`, `lt`, `gt`, `quot`, `apos`) are left for the parser. Bare `&`
//! and `<` that HTML reads as text are escaped first.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

static NAMED_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&([a-zA-Z][a-zA-Z0-9]*);").expect("invalid entity regex"));

static AMPERSAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&([a-zA-Z][a-zA-Z0-9]*;|#[0-9]+;|#[xX][0-9a-fA-F]+;)?")
        .expect("invalid ampersand regex")
});

static LESS_THAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([a-zA-Z/!?])?").expect("invalid less-than regex"));

/// Escape `&` that starts no reference and `<` that starts no tag.
pub(crate) fn escape_stray_markup(html: &str) -> Cow<'_, str> {
    let html = AMPERSAND.replace_all(html, |caps: &regex::Captures| {
        caps.get(1)
            .map_or_else(|| "&amp;".to_owned(), |_| caps[0].to_owned())
    });
    if !html.contains('<') {
        return html;
    }
    let escaped = match LESS_THAN.replace_all(&html, |caps: &regex::Captures| {
        caps.get(1)
            .map_or_else(|| "&lt;".to_owned(), |_| caps[0].to_owned())
    }) {
        Cow::Borrowed(_) => None,
        Cow::Owned(escaped) => Some(escaped),
    };
    escaped.map_or(html, Cow::Owned)
}

/// Replace known HTML named entities with their characters.
///
/// Unknown entities and the XML predefined entities are kept verbatim.
pub(crate) fn decode_named_entities(html: &str) -> Cow<'_, str> {
    if !html.contains('&') {
        return Cow::Borrowed(html);
    }
    NAMED_ENTITY.replace_all(html, |caps: &regex::Captures| {
        named_entity(&caps[1]).map_or_else(|| caps[0].to_owned(), str::to_owned)
    })
}

/// Character for an HTML named entity that XML does not predefine.
fn named_entity(name: &str) -> Option<&'static str> {
    Some(match name {
        "nbsp" => "\u{00a0}",
        "ensp" => "\u{2002}",
        "emsp" => "\u{2003}",
        "thinsp" => "\u{2009}",
        "mdash" => "\u{2014}",
        "ndash" => "\u{2013}",
        "hellip" => "\u{2026}",
        "bull" => "\u{2022}",
        "middot" => "\u{00b7}",
        "ldquo" => "\u{201c}",
        "rdquo" => "\u{201d}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "laquo" => "\u{00ab}",
        "raquo" => "\u{00bb}",
        "rarr" => "\u{2192}",
        "larr" => "\u{2190}",
        "harr" => "\u{2194}",
        "rArr" => "\u{21d2}",
        "lArr" => "\u{21d0}",
        "hArr" => "\u{21d4}",
        "le" => "\u{2264}",
        "ge" => "\u{2265}",
        "ne" => "\u{2260}",
        "plusmn" => "\u{00b1}",
        "times" => "\u{00d7}",
        "divide" => "\u{00f7}",
        "minus" => "\u{2212}",
        "infin" => "\u{221e}",
        "deg" => "\u{00b0}",
        "copy" => "\u{00a9}",
        "reg" => "\u{00ae}",
        "trade" => "\u{2122}",
        "sect" => "\u{00a7}",
        "para" => "\u{00b6}",
        "euro" => "\u{20ac}",
        "pound" => "\u{00a3}",
        "yen" => "\u{00a5}",
        "cent" => "\u{00a2}",
        "check" => "\u{2713}",
        _ => return None,
    })
}

/// Decode an entity reference reported by the XML reader (without `&` and `;`).
pub(crate) fn decode_reference(entity: &str) -> String {
    match entity {
        "lt" => "<".to_owned(),
        "gt" => ">".to_owned(),
        "amp" => "&".to_owned(),
        "apos" => "'".to_owned(),
        "quot" => "\"".to_owned(),
        s if s.starts_with('#') => {
            let code = if let Some(hex) = s.strip_prefix("#x").or_else(|| s.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()
            } else {
                s[1..].parse::<u32>().ok()
            };
            code.and_then(char::from_u32)
                .map_or_else(|| format!("&{entity};"), |c| c.to_string())
        }
        _ => named_entity(entity).map_or_else(|| format!("&{entity};"), str::to_owned),
    }
}
