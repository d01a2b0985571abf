use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

use super::base;
use super::LayoutExtractor;
use crate::models::{MonthHint, RawCandidate};

const LAYOUT_ID: &str = "table";

/// Ticket vendors whose links mark a table row as a show.
const TICKET_VENDORS: [&str; 1] = ["tce.by"];

// resolves scheme-relative links; relative links land here and never match a vendor
const LINK_BASE: &str = "https://localhost/";

static ROW_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tr").expect("table row selector"));
static CELL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td").expect("table cell selector"));
static LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("table link selector"));
static DATE_TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{2})\.([0-9]{2})\.([0-9]{4}) ([0-9]{2}:[0-9]{2})").expect("table date regex")
});

/// Legacy layout: one `<tr>` per show, date and time in the first cell.
pub struct TableLayout;

impl LayoutExtractor for TableLayout {
    fn layout_id(&self) -> &'static str {
        LAYOUT_ID
    }

    fn extract(&self, document: &Html) -> Vec<RawCandidate> {
        let mut candidates = Vec::new();

        for row in document.select(&ROW_SELECTOR) {
            let first_cell = match row.select(&CELL_SELECTOR).next() {
                Some(cell) => cell,
                None => continue,
            };

            let link = match row.select(&LINK_SELECTOR).find(|a| {
                a.value()
                    .attr("href")
                    .map(is_vendor_link)
                    .unwrap_or(false)
            }) {
                Some(link) => link,
                None => continue,
            };

            let title = base::inner_text(link);
            let href = link.value().attr("href").unwrap_or_default().trim().to_string();

            let first_text = base::inner_text(first_cell);
            let caps = match DATE_TIME_RE.captures(&first_text) {
                Some(caps) => caps,
                None => continue,
            };

            candidates.push(RawCandidate {
                day_text: caps[1].to_string(),
                time_text: caps[4].to_string(),
                title_text: title,
                href,
                hint: Some(MonthHint {
                    year: caps[3].to_string(),
                    month: caps[2].to_string(),
                }),
            });
        }

        candidates
    }
}

fn is_vendor_link(href: &str) -> bool {
    match base::link_host(LINK_BASE, href) {
        Some(host) => TICKET_VENDORS
            .iter()
            .any(|vendor| host == *vendor || host.ends_with(&format!(".{vendor}"))),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HTML: &str = r#"
    <table class="afisha">
        <tr><th>Дата</th><th>Спектакль</th></tr>
        <tr>
            <td>11.11.2025&nbsp;&nbsp;19:00</td>
            <td><a href="https://tce.by/show/123">Записки юного врача</a></td>
        </tr>
        <tr>
            <td>12.11.2025 11:00</td>
            <td><a href="/afisha/buratino">Буратино</a></td>
        </tr>
        <tr>
            <td>скоро</td>
            <td><a href="https://tce.by/show/999">Премьера</a></td>
        </tr>
        <tr>
            <td>13.11.2025 12:00 <span>Малая сцена</span></td>
            <td><a href="https://puppet-minsk.by/about">О театре</a>
                <a href="https://www.tce.by/show/124">Гадкий утёнок</a></td>
        </tr>
        <tr></tr>
    </table>
    "#;

    #[test]
    fn parses_vendor_rows() {
        let document = Html::parse_document(SAMPLE_HTML);
        let candidates = TableLayout.extract(&document);
        assert_eq!(candidates.len(), 2, "only dated rows with vendor links count");

        let first = &candidates[0];
        assert_eq!(first.day_text, "11");
        assert_eq!(first.time_text, "19:00");
        assert_eq!(first.title_text, "Записки юного врача");
        assert_eq!(first.href, "https://tce.by/show/123");
        assert_eq!(
            first.hint,
            Some(MonthHint {
                year: "2025".to_string(),
                month: "11".to_string()
            })
        );

        let second = &candidates[1];
        assert_eq!(second.title_text, "Гадкий утёнок");
        assert_eq!(second.href, "https://www.tce.by/show/124");
        assert_eq!(second.time_text, "12:00");
    }

    #[test]
    fn vendor_match_is_by_host() {
        assert!(is_vendor_link("https://tce.by/show/1"));
        assert!(is_vendor_link("//tce.by/show/1"));
        assert!(!is_vendor_link("https://example.com/?ref=tce.by"));
        assert!(!is_vendor_link("https://nottce.by/show/1"));
        assert!(!is_vendor_link("/afisha/local"));
    }

    #[test]
    fn full_width_digits_are_not_a_date() {
        let html = "<table><tr><td>\u{FF11}\u{FF11}.11.2025 19:00</td>\
            <td><a href=\"https://tce.by/show/1\">Щелкунчик</a></td></tr></table>";
        let document = Html::parse_document(html);
        assert!(TableLayout.extract(&document).is_empty());
    }

    #[test]
    fn absent_table_is_not_an_error() {
        let document = Html::parse_document("<div>nothing here</div>");
        assert!(TableLayout.extract(&document).is_empty());
    }
}
