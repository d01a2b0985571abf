use scraper::{ElementRef, Selector};

/// Characters dropped outright; they carry no visible width.
const ZERO_WIDTH: [char; 3] = ['\u{200B}', '\u{2060}', '\u{FEFF}'];

/// Collapses every Unicode space variant (no-break, thin, em, narrow no-break,
/// ideographic, line breaks) into single ASCII spaces and trims the ends.
pub fn normalize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_space = false;
    for ch in input.chars() {
        if ZERO_WIDTH.contains(&ch) {
            continue;
        }
        if ch.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push(ch);
    }
    out
}

pub fn normalize_lower(input: &str) -> String {
    normalize(input).to_lowercase()
}

pub fn inner_text(element: ElementRef<'_>) -> String {
    normalize(&element.text().collect::<Vec<_>>().join(" "))
}

pub fn first_text(element: &ElementRef<'_>, selector: &Selector) -> Option<String> {
    element.select(selector).next().and_then(|node| {
        let cleaned = inner_text(node);
        if cleaned.is_empty() {
            None
        } else {
            Some(cleaned)
        }
    })
}

pub fn first_attr(element: &ElementRef<'_>, selector: &Selector, attr: &str) -> Option<String> {
    element
        .select(selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn absolute_url(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href.to_string());
    }
    let base_url = reqwest::Url::parse(base).ok()?;
    base_url.join(href).ok().map(|u| u.to_string())
}

/// Host of `href`, resolving scheme-relative and relative links against `base`.
pub fn link_host(base: &str, href: &str) -> Option<String> {
    let resolved = absolute_url(base, href)?;
    reqwest::Url::parse(&resolved)
        .ok()
        .and_then(|url| url.host_str().map(|host| host.to_lowercase()))
}

/// Walks up from `start` (exclusive) and returns the nearest node accepted by
/// `matches`. `parent` yields the parent of a node, or `None` at the root.
pub fn nearest_ancestor<N, P, F>(start: &N, parent: P, mut matches: F) -> Option<N>
where
    P: Fn(&N) -> Option<N>,
    F: FnMut(&N) -> bool,
{
    let mut current = parent(start);
    while let Some(node) = current {
        if matches(&node) {
            return Some(node);
        }
        current = parent(&node);
    }
    None
}

/// Parent element of `element`, skipping the document root.
pub fn parent_element<'a>(element: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    element.parent().and_then(ElementRef::wrap)
}
