// src/extractors/detail.rs

// --- Imports ---
use once_cell::sync::Lazy;
use scraper::{node::Node, ElementRef, Html, Selector};
use url::Url;

use crate::extractors::fields::{parse_area, parse_contact, parse_location, ContactField};
use crate::models::{AreaInfo, SchoolDetail};
use crate::utils::error::ParseError;
use crate::utils::text::clean_text;

// --- Line layout of the school info block ---
const NAME_LINE: usize = 0;
const TYPE_LINE: usize = 1;
const ADDRESS_LINE: usize = 2;
const AREA_LINE: usize = 3;
const PHONE_LINE: usize = 4;
const DISTRICT_LINE: usize = 6;

// --- CSS Selectors (Lazy Static) ---
static HEAD_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("head").expect("Failed to compile HEAD_SELECTOR")
});

static INFO_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("#ctl00_ContentPlaceHolder1_SchoolInfoDisplay").expect("Failed to compile INFO_SELECTOR")
});

static WEBSITE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("#ctl00_ContentPlaceHolder1_hlSchoolWebsite").expect("Failed to compile WEBSITE_SELECTOR")
});

/// Parses a school detail page fetched from `page_uri`.
///
/// Only a missing info block is fatal. Absent trailing lines become empty
/// fields, and so does an area line that cannot be split.
pub fn parse_detail(html: &str, page_uri: &str) -> Result<SchoolDetail, ParseError> {
    let document = Html::parse_document(html);

    let head_text = document
        .select(&HEAD_SELECTOR)
        .next()
        .map(|head| head.text().collect::<String>())
        .unwrap_or_default();
    let location = parse_location(&head_text);

    let info = document.select(&INFO_SELECTOR).next().ok_or_else(|| {
        ParseError::DetailStructure(format!("school info block missing on {}", page_uri))
    })?;
    let details = info_lines(info);
    tracing::debug!("Found {} info lines on {}", details.len(), page_uri);

    let website = document
        .select(&WEBSITE_SELECTOR)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(|href| absolute_website(href, page_uri))
        .unwrap_or_default();

    let line = |idx: usize| details.get(idx).cloned().unwrap_or_default();

    let area = match details.get(AREA_LINE).map(|text| parse_area(text)) {
        Some(Ok(area)) => area,
        Some(Err(error)) => {
            tracing::warn!("Leaving area empty on {}: {}", page_uri, error);
            AreaInfo::default()
        }
        None => AreaInfo::default(),
    };

    Ok(SchoolDetail {
        name: line(NAME_LINE),
        school_type: line(TYPE_LINE),
        address: line(ADDRESS_LINE),
        city: area.city,
        province: area.province,
        postcode: area.postcode,
        phone: parse_contact(&line(PHONE_LINE), ContactField::Phone),
        district: parse_contact(&line(DISTRICT_LINE), ContactField::District),
        website,
        location,
    })
}

/// Resolves the website href against the page; empty when that is impossible.
fn absolute_website(href: &str, page_uri: &str) -> String {
    if Url::parse(href).is_ok_and(|url| url.has_host()) {
        return href.to_string();
    }
    match Url::parse(page_uri).and_then(|page| page.join(href)) {
        Ok(url) => url.to_string(),
        Err(error) => {
            tracing::warn!("Cannot resolve website link '{}' against {}: {}", href, page_uri, error);
            String::new()
        }
    }
}

/// Text of the block split at `<br>` elements, markup dropped, blank lines removed.
fn info_lines(block: ElementRef<'_>) -> Vec<String> {
    let mut raw_lines = Vec::new();
    let mut current = String::new();

    for node in block.descendants() {
        match node.value() {
            Node::Text(text) => {
                let in_script = node
                    .parent()
                    .and_then(ElementRef::wrap)
                    .is_some_and(|parent| matches!(parent.value().name(), "script" | "style"));
                if !in_script {
                    current.push_str(&text.text);
                }
            }
            Node::Element(element) if element.name() == "br" => {
                raw_lines.push(std::mem::take(&mut current));
            }
            _ => {}
        }
    }
    raw_lines.push(current);

    raw_lines
        .iter()
        .map(|line| clean_text(line))
        .filter(|line| !line.is_empty())
        .collect()
}
