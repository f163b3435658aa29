//! Tier C: last-resort scan of item containers in unstructured HTML.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::{Value, json};

use super::{RawItem, Tier};

static PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$(\d+\.\d{2})").expect("valid price regex"));

/// Upper bound on containers inspected per page
pub const MAX_PATTERN_ITEMS: usize = 100;

pub(super) fn extract_pattern_items(html: &str) -> Vec<RawItem> {
    let (Ok(container_selector), Ok(title_selector), Ok(link_selector), Ok(image_selector)) = (
        Selector::parse("div[data-item-id]"),
        Selector::parse("span"),
        Selector::parse("a[href]"),
        Selector::parse("img"),
    ) else {
        return Vec::new();
    };

    let document = Html::parse_document(html);

    document
        .select(&container_selector)
        .filter(|container| !inside_container(container))
        .take(MAX_PATTERN_ITEMS)
        .filter_map(|container| {
            let title = container
                .select(&title_selector)
                .map(collapse_text)
                .find(|text| !text.is_empty())?;

            let text = collapse_text(container);
            let price = PRICE_RE.captures(&text)?.get(1)?.as_str().to_string();

            let mut fields = json!({
                "name": title,
                "price": format!("${price}"),
            });
            if let Some(href) = container
                .select(&link_selector)
                .next()
                .and_then(|a| a.value().attr("href"))
            {
                fields["link"] = Value::from(href);
            }
            if let Some(src) = container
                .select(&image_selector)
                .next()
                .and_then(|img| {
                    // Lazy-loaded images keep the real URL in data-src
                    img.value()
                        .attr("data-src")
                        .or_else(|| img.value().attr("src"))
                })
            {
                fields["image"] = Value::from(src);
            }

            Some(RawItem {
                tier: Tier::Pattern,
                fields,
            })
        })
        .collect()
}

/// Nested containers belong to the outermost one.
fn inside_container(element: &ElementRef<'_>) -> bool {
    element.ancestors().any(|node| {
        node.value()
            .as_element()
            .is_some_and(|el| el.name() == "div" && el.attr("data-item-id").is_some())
    })
}

fn collapse_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
