// src/extractors/listing.rs

// --- Imports ---
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::models::ListingRecord;
use crate::routes::ParsedUri;
use crate::utils::error::ParseError;
use crate::utils::text::clean_text;

// --- Column layout of the ranking table ---
const RANK_COL: usize = 0;
const NAME_COL: usize = 3;
const CITY_COL: usize = 4;
const RATING_COL: usize = 5;

// --- CSS Selectors (Lazy Static) ---
static ROW_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".rating table tr").expect("Failed to compile ROW_SELECTOR")
});

static CELL_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("td").expect("Failed to compile CELL_SELECTOR")
});

static LINK_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("a[href]").expect("Failed to compile LINK_SELECTOR")
});

/// A parsed listing page. Rows are turned into records on demand.
pub struct ListingPage {
    document: Html,
    base: ParsedUri,
}

/// Parses listing HTML fetched from `base_uri`.
///
/// Fails only if `base_uri` is not a usable absolute URL; row problems surface
/// per row from [`ListingPage::records`].
pub fn parse_listing(html: &str, base_uri: &str) -> Result<ListingPage, ParseError> {
    let base = ParsedUri::parse(base_uri)?;
    Ok(ListingPage {
        document: Html::parse_document(html),
        base,
    })
}

impl ListingPage {
    /// Data rows in the table, header excluded.
    pub fn row_count(&self) -> usize {
        self.document.select(&ROW_SELECTOR).count().saturating_sub(1)
    }

    /// One result per data row, in document order. Each call starts over.
    pub fn records(&self) -> impl Iterator<Item = Result<ListingRecord, ParseError>> + '_ {
        self.document
            .select(&ROW_SELECTOR)
            .enumerate()
            .skip(1) // header row
            .map(move |(row_idx, row)| parse_row(row_idx, row, &self.base))
    }
}

fn parse_row(row_idx: usize, row: ElementRef<'_>, base: &ParsedUri) -> Result<ListingRecord, ParseError> {
    let cells: Vec<ElementRef> = row.select(&CELL_SELECTOR).collect();
    let cell = |col: usize| {
        cells.get(col).copied().ok_or_else(|| ParseError::RowParse {
            row: row_idx,
            reason: format!("missing column {} (row has {} cells)", col, cells.len()),
        })
    };

    let name_cell = cell(NAME_COL)?;
    let href = name_cell
        .select(&LINK_SELECTOR)
        .next()
        .and_then(|a| a.value().attr("href"))
        .ok_or_else(|| ParseError::RowParse {
            row: row_idx,
            reason: "name column has no detail link".to_string(),
        })?;

    Ok(ListingRecord {
        rank: cell_text(cell(RANK_COL)?),
        name: cell_text(name_cell),
        link: base.absolute(href),
        city: cell_text(cell(CITY_COL)?),
        rating: cell_text(cell(RATING_COL)?),
    })
}

fn cell_text(cell: ElementRef<'_>) -> String {
    clean_text(&cell.text().collect::<String>())
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://ontario.compareschoolrankings.org/elementary/SchoolsByRankLocationName.aspx";

    const LISTING_HTML: &str = r#"
        <!DOCTYPE html>
        <html><head><title>Ontario Elementary</title></head><body>
        <table class="layout"><tr><td>Menu</td></tr></table>
        <div class="rating">
          <table>
            <tr><th>Rank</th><th>Trend</th><th></th><th>School</th><th>City</th><th>Rating</th></tr>
            <tr>
              <td>1</td><td>up</td><td><img src="/i.png"></td>
              <td><a href="/elementary/SchoolProfile.aspx?SchoolID=101">Abbey   Lane
                  PS</a></td>
              <td>Oakville</td><td>10.0</td>
            </tr>
            <tr>
              <td>2/3017</td><td>-</td><td></td>
              <td><a href="/elementary/SchoolProfile.aspx?SchoolID=202">Banting&nbsp;PS</a></td>
              <td>Toronto</td><td>9.8</td>
            </tr>
            <tr>
              <td>=3</td><td>down</td><td></td>
              <td><a href="SchoolProfile.aspx?SchoolID=303">Cedar Ridge PS</a></td>
              <td> Markham </td><td>n/a</td>
            </tr>
          </table>
        </div>
        </body></html>
    "#;

    #[test]
    fn parses_every_data_row_in_order() {
        let page = parse_listing(LISTING_HTML, BASE).unwrap();
        assert_eq!(page.row_count(), 3);

        let records: Vec<ListingRecord> = page.records().collect::<Result<_, _>>().unwrap();
        assert_eq!(records.len(), 3);

        assert_eq!(
            records[0],
            ListingRecord {
                rank: "1".to_string(),
                name: "Abbey Lane PS".to_string(),
                link: "http://ontario.compareschoolrankings.org/elementary/SchoolProfile.aspx?SchoolID=101"
                    .to_string(),
                city: "Oakville".to_string(),
                rating: "10.0".to_string(),
            }
        );
        assert_eq!(records[1].rank, "2/3017");
        assert_eq!(records[1].name, "Banting PS");
        assert_eq!(records[2].rank, "=3");
        assert_eq!(records[2].city, "Markham");
        assert_eq!(records[2].rating, "n/a");

        for record in &records {
            assert!(!record.rank.is_empty());
            assert!(!record.name.is_empty());
            assert!(!record.city.is_empty());
            assert!(!record.rating.is_empty());
            assert!(record.link.starts_with("http://ontario.compareschoolrankings.org/"));
        }
    }

    #[test]
    fn records_can_be_iterated_again_with_identical_output() {
        let page = parse_listing(LISTING_HTML, BASE).unwrap();
        let first: Vec<_> = page.records().map(|r| r.unwrap()).collect();
        let second: Vec<_> = page.records().map(|r| r.unwrap()).collect();
        assert_eq!(first, second);

        let reparsed = parse_listing(LISTING_HTML, BASE).unwrap();
        let third: Vec<_> = reparsed.records().map(|r| r.unwrap()).collect();
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&third).unwrap()
        );
    }

    #[test]
    fn malformed_rows_fail_individually() {
        let html = r#"
            <div class="rating"><table>
              <tr><th>Rank</th></tr>
              <tr><td>1</td><td></td><td></td><td><a href="/a">A</a></td><td>X</td><td>7.0</td></tr>
              <tr><td>2</td><td></td><td></td><td>No link</td><td>Y</td><td>6.0</td></tr>
              <tr><td>3</td><td></td><td></td><td><a href="/c">C</a></td></tr>
              <tr><td>4</td><td></td><td></td><td><a href="/d">D</a></td><td>Z</td><td>5.0</td></tr>
            </table></div>
        "#;
        let page = parse_listing(html, BASE).unwrap();
        let results: Vec<_> = page.records().collect();
        assert_eq!(results.len(), 4);

        assert_eq!(results[0].as_ref().unwrap().name, "A");
        assert!(matches!(results[1], Err(ParseError::RowParse { row: 2, .. })));
        assert!(matches!(results[2], Err(ParseError::RowParse { row: 3, .. })));
        assert_eq!(results[3].as_ref().unwrap().link, "http://ontario.compareschoolrankings.org/d");
    }

    #[test]
    fn page_without_rating_table_is_empty() {
        let page = parse_listing("<html><body><table><tr><td>1</td></tr></table></body></html>", BASE).unwrap();
        assert_eq!(page.row_count(), 0);
        assert_eq!(page.records().count(), 0);
    }

    #[test]
    fn invalid_base_uri_is_rejected() {
        assert!(matches!(
            parse_listing(LISTING_HTML, "/relative/only"),
            Err(ParseError::InvalidUri { .. })
        ));
    }
}
