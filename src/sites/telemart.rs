//! Telemart extraction strategy
//!
//! Categories come straight off the home page catalog; any link that does
//! not start with the configured base URL is skipped with a warning, never
//! an abort. A tile with an unparseable price keeps the item with a zero
//! price. Enrichment fetches one `characteristics/` page per item and
//! builds a two-level specification map: each header row opens a group that
//! collects the sibling rows following it, up to the next header.

use crate::fetch::{Fetched, PageFetcher};
use crate::items::{Category, Item, Source, Specifications};
use crate::sites::{
    absolute_link, element_text, first_attr, first_text, has_class, price, sel, SiteStrategy,
};
use scraper::{ElementRef, Html, Selector};

pub struct TelemartSite {
    base_url: String,
    catalog_link: Selector,
    last_page: Selector,
    tile: Selector,
    tile_title: Selector,
    tile_link: Selector,
    tile_price: Selector,
    tile_image: Selector,
    short_char: Selector,
    short_char_label: Selector,
    short_char_value: Selector,
    spec_header: Selector,
    spec_col: Selector,
}

impl TelemartSite {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            catalog_link: sel(".catalog-box__item-link"),
            last_page: sel(".page-item.last"),
            tile: sel(".product-item"),
            tile_title: sel(".product-item__title"),
            tile_link: sel(".product-item__title a"),
            tile_price: sel(".product-cost"),
            tile_image: sel(".product-item__pic__img img"),
            short_char: sel(".product-short-char__item"),
            short_char_label: sel(".product-short-char__item__label"),
            short_char_value: sel(".product-short-char__item__value"),
            spec_header: sel(".card-block__specific-header"),
            spec_col: sel(".card-block__specific-col"),
        }
    }

    /// Categories from the home document, validated against the base URL
    fn categories_from_home(&self, home: &Html) -> Vec<Category> {
        home.select(&self.catalog_link)
            .filter_map(|a| {
                let href = a.value().attr("href")?;
                let link = absolute_link(&self.base_url, href)?;
                if !link.starts_with(&self.base_url) {
                    tracing::warn!(
                        "Skipping category link outside {}: {}",
                        self.base_url,
                        link
                    );
                    return None;
                }
                Some(Category {
                    title: element_text(a),
                    link,
                })
            })
            .collect()
    }

    fn map_tile(&self, tile: ElementRef, category_label: &str) -> Option<Item> {
        let link = first_attr(tile, &self.tile_link, "href")
            .and_then(|href| absolute_link(&self.base_url, &href))?;

        let raw_price = first_text(tile, &self.tile_price).unwrap_or_default();
        let price = match price::normalize(&raw_price) {
            Some(value) => value,
            None => {
                tracing::debug!("Unparseable price {:?} for {}, storing zero", raw_price, link);
                0.0
            }
        };

        Some(Item {
            id: None,
            title: first_text(tile, &self.tile_title).unwrap_or_default(),
            subtitle: None,
            link,
            description: self.short_characteristics(tile),
            price,
            specifications: None,
            kind: category_label.to_string(),
            image: first_attr(tile, &self.tile_image, "src").unwrap_or_default(),
            source: Source::Telemart,
        })
    }

    /// Flat map of the short characteristics shown on a listing tile,
    /// serialized to JSON for the item description
    fn short_characteristics(&self, tile: ElementRef) -> Option<String> {
        let mut chars = Specifications::new();
        for row in tile.select(&self.short_char) {
            let Some(label) = first_text(row, &self.short_char_label) else {
                continue;
            };
            let value = first_text(row, &self.short_char_value).unwrap_or_default();
            chars.push_text(label, value);
        }

        if chars.is_empty() {
            return None;
        }
        serde_json::to_string(&chars).ok()
    }

    /// Grouped specification map from a `characteristics/` document
    ///
    /// Walks the sibling rows following each header row until the next
    /// header. Returns `None` when no groups are found, so a degraded fetch
    /// leaves the item's specifications absent.
    fn specifications_from(&self, doc: &Html) -> Option<Specifications> {
        let mut specs = Specifications::new();
        for header in doc.select(&self.spec_header) {
            let group_title = first_text(header, &self.spec_col).unwrap_or_default();
            let mut rows = Vec::new();

            let mut node = header.next_sibling();
            while let Some(current) = node {
                node = current.next_sibling();
                let Some(element) = ElementRef::wrap(current) else {
                    continue;
                };
                if has_class(element, "card-block__specific-header") {
                    break;
                }
                if !has_class(element, "card-block__specific-row") {
                    continue;
                }

                let cols: Vec<ElementRef> = element.select(&self.spec_col).collect();
                let (Some(first), Some(last)) = (cols.first(), cols.last()) else {
                    continue;
                };
                rows.push((element_text(*first), element_text(*last)));
            }

            specs.push_group(group_title, rows);
        }
        (!specs.is_empty()).then_some(specs)
    }
}

impl SiteStrategy for TelemartSite {
    fn source(&self) -> Source {
        Source::Telemart
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn discover_categories(&self, fetcher: &PageFetcher) -> Vec<Category> {
        let home = fetcher.fetch_document(&self.base_url).await;
        self.categories_from_home(&home)
    }

    fn count_pages(&self, category_doc: &Html) -> Option<u32> {
        category_doc
            .select(&self.last_page)
            .next()
            .and_then(|el| element_text(el).parse().ok())
    }

    fn page_url(&self, category_link: &str, page: u32) -> String {
        format!("{}?page={}", category_link, page)
    }

    fn extract_listing(&self, page_doc: &Html, category_label: &str) -> Vec<Item> {
        page_doc
            .select(&self.tile)
            .filter_map(|tile| self.map_tile(tile, category_label))
            .collect()
    }

    async fn enrich(&self, fetcher: &PageFetcher, item: &mut Item) {
        let specs_url = format!("{}characteristics/", item.link);
        match fetcher.fetch_raw(&specs_url).await {
            Fetched::Content(body) => {
                let doc = Html::parse_document(&body);
                if item.specifications.is_none() {
                    item.specifications = self.specifications_from(&doc);
                }
            }
            Fetched::Empty => {
                tracing::debug!("No characteristics fetched for {}", item.link);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::SpecValue;

    fn site() -> TelemartSite {
        TelemartSite::new("https://telemart.example/ua".to_string())
    }

    const LISTING: &str = r#"
        <html><body>
        <div class="product-item">
            <div class="product-item__pic__img"><img src="https://img.example/kb.jpg"></div>
            <div class="product-item__title"><a href="https://telemart.example/ua/keyboard-x/">Keyboard X</a></div>
            <div class="product-short-char">
                <div class="product-short-char__item">
                    <span class="product-short-char__item__label">Switch</span>
                    <span class="product-short-char__item__value">Red</span>
                </div>
                <div class="product-short-char__item">
                    <span class="product-short-char__item__label">Layout</span>
                    <span class="product-short-char__item__value">TKL</span>
                </div>
            </div>
            <div class="product-cost">2 199 грн</div>
        </div>
        <div class="product-item">
            <div class="product-item__title"><a href="https://telemart.example/ua/mouse-y/">Mouse Y</a></div>
            <div class="product-cost">очікується</div>
        </div>
        </body></html>
    "#;

    #[test]
    fn listing_maps_tiles_with_short_characteristics() {
        let doc = Html::parse_document(LISTING);
        let items = site().extract_listing(&doc, "peripherals");

        assert_eq!(items.len(), 2);
        let item = &items[0];
        assert_eq!(item.title, "Keyboard X");
        assert_eq!(item.link, "https://telemart.example/ua/keyboard-x/");
        assert_eq!(item.price, 2199.0);
        assert_eq!(item.kind, "peripherals");
        assert_eq!(item.source, Source::Telemart);
        assert_eq!(
            item.description.as_deref(),
            Some(r#"{"Switch":"Red","Layout":"TKL"}"#)
        );
    }

    #[test]
    fn unparseable_price_defaults_to_zero() {
        let doc = Html::parse_document(LISTING);
        let items = site().extract_listing(&doc, "peripherals");

        assert_eq!(items[1].title, "Mouse Y");
        assert_eq!(items[1].price, 0.0);
        assert!(items[1].description.is_none());
    }

    #[test]
    fn categories_skip_links_outside_base_url() {
        let doc = Html::parse_document(
            r#"<div class="catalog-box">
                <a class="catalog-box__item-link" href="https://telemart.example/ua/katalog/pc/">PC</a>
                <a class="catalog-box__item-link" href="https://elsewhere.example/deal/">Deal</a>
            </div>"#,
        );
        let categories = site().categories_from_home(&doc);
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].title, "PC");
        assert_eq!(categories[0].link, "https://telemart.example/ua/katalog/pc/");
    }

    #[test]
    fn count_pages_reads_last_page_item() {
        let doc = Html::parse_document(
            r#"<ul><li class="page-item">1</li><li class="page-item last">14</li></ul>"#,
        );
        assert_eq!(site().count_pages(&doc), Some(14));
    }

    #[test]
    fn count_pages_absent_without_pagination() {
        let doc = Html::parse_document("<html><body>single page</body></html>");
        assert_eq!(site().count_pages(&doc), None);
    }

    #[test]
    fn page_url_appends_query_parameter() {
        assert_eq!(
            site().page_url("https://telemart.example/ua/katalog/pc/", 3),
            "https://telemart.example/ua/katalog/pc/?page=3"
        );
    }

    #[test]
    fn specifications_group_rows_under_headers() {
        let doc = Html::parse_document(
            r#"<div class="card-block">
                <div class="card-block__specific-header">
                    <div class="card-block__specific-col">Display</div>
                </div>
                <div class="card-block__specific-row">
                    <div class="card-block__specific-col">Diagonal</div>
                    <div class="card-block__specific-col">15.6"</div>
                </div>
                <div class="card-block__specific-row">
                    <div class="card-block__specific-col">Panel</div>
                    <div class="card-block__specific-col">IPS</div>
                </div>
                <div class="card-block__specific-header">
                    <div class="card-block__specific-col">Case</div>
                </div>
                <div class="card-block__specific-row">
                    <div class="card-block__specific-col">Color</div>
                    <div class="card-block__specific-col">Black</div>
                </div>
            </div>"#,
        );

        let specs = site().specifications_from(&doc).unwrap();
        assert_eq!(specs.len(), 2);
        assert_eq!(
            specs.get("Display"),
            Some(&SpecValue::Group(vec![
                ("Diagonal".to_string(), "15.6\"".to_string()),
                ("Panel".to_string(), "IPS".to_string()),
            ]))
        );
        assert_eq!(
            specs.get("Case"),
            Some(&SpecValue::Group(vec![(
                "Color".to_string(),
                "Black".to_string()
            )]))
        );
    }

    #[test]
    fn specifications_absent_when_page_has_no_headers() {
        let doc = Html::parse_document("<html><body></body></html>");
        assert!(site().specifications_from(&doc).is_none());
    }
}
