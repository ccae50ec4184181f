use lazy_static::lazy_static;
use nc_core::CandidateArticle;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::utils::absolute_url;

lazy_static! {
    static ref ARTICLE: Selector = Selector::parse("article").unwrap();
    static ref LINK: Selector = Selector::parse("a[href]").unwrap();
    static ref TITLE: Selector = Selector::parse("h2.title").unwrap();
}

/// Extracts one candidate per `<article>` on a listing page.
///
/// The link is the first `a[href]` inside the unit and the title the text of its
/// first `h2.title`. Units missing either are skipped. Relative links are resolved
/// against `base`.
pub fn parse_listing(html: &str, base: Option<&Url>) -> Vec<CandidateArticle> {
    let document = Html::parse_document(html);
    document
        .select(&ARTICLE)
        .filter_map(|unit| parse_unit(unit, base))
        .collect()
}

fn parse_unit(unit: ElementRef<'_>, base: Option<&Url>) -> Option<CandidateArticle> {
    let href = unit.select(&LINK).next()?.value().attr("href")?;
    let title = unit
        .select(&TITLE)
        .next()?
        .text()
        .collect::<String>();
    let title = title.split_whitespace().collect::<Vec<_>>().join(" ");
    if title.is_empty() {
        return None;
    }
    let url = absolute_url(base, href)?;
    Some(CandidateArticle::new(title, url))
}
