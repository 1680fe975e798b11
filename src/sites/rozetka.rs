//! Rozetka extraction strategy
//!
//! Categories are discovered in two levels: the home page menu links to
//! portal pages, whose subcategory tiles are the crawlable categories.
//! Listing tiles with an unparseable price are dropped. Enrichment fetches
//! two extra pages per item: a `characteristics/` page for a flat
//! specification map, and the product page itself for description and image.

use crate::fetch::{Fetched, PageFetcher};
use crate::items::{Category, Item, Source, Specifications};
use crate::sites::{
    absolute_link, element_text, first_attr, first_text, price, sel, SiteStrategy,
};
use futures::future::join_all;
use scraper::{Html, Selector};

pub struct RozetkaSite {
    base_url: String,
    menu_link: Selector,
    subcategory_tile: Selector,
    pagination_link: Selector,
    tile: Selector,
    tile_title: Selector,
    tile_link: Selector,
    tile_price: Selector,
    tile_image: Selector,
    spec_row: Selector,
    spec_label: Selector,
    spec_value: Selector,
    product_image: Selector,
    product_description: Selector,
    rich_text: Selector,
}

impl RozetkaSite {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            menu_link: sel(".menu-categories__item .menu-categories__link"),
            subcategory_tile: sel(".portal-grid__cell .tile-cats__heading"),
            pagination_link: sel(".pagination__link"),
            tile: sel(".goods-tile__inner"),
            tile_title: sel(".goods-tile__title"),
            tile_link: sel(".product-link"),
            tile_price: sel(".goods-tile__price-value"),
            tile_image: sel(".goods-tile__picture img"),
            spec_row: sel(".item"),
            spec_label: sel(".label span"),
            spec_value: sel(".sub-list li"),
            product_image: sel(".picture-container__picture"),
            product_description: sel(".product-about__description-content"),
            rich_text: sel(".rich-text"),
        }
    }

    /// Portal page links from the home document's category menu
    fn portal_links(&self, home: &Html) -> Vec<String> {
        home.select(&self.menu_link)
            .filter_map(|a| a.value().attr("href"))
            .filter_map(|href| absolute_link(&self.base_url, href))
            .collect()
    }

    /// Crawlable subcategories from one portal page
    fn subcategories(&self, portal_doc: &Html) -> Vec<Category> {
        portal_doc
            .select(&self.subcategory_tile)
            .filter_map(|tile| {
                let href = tile.value().attr("href")?;
                let link = absolute_link(&self.base_url, href)?;
                Some(Category {
                    title: element_text(tile),
                    link,
                })
            })
            .collect()
    }

    fn map_tile(&self, tile: scraper::ElementRef, category_label: &str) -> Option<Item> {
        let link = first_attr(tile, &self.tile_link, "href")
            .and_then(|href| absolute_link(&self.base_url, &href))?;

        let raw_price = first_text(tile, &self.tile_price)?;
        let price = match price::normalize(&raw_price) {
            Some(value) => value,
            None => {
                tracing::debug!("Dropping tile with unparseable price {:?}: {}", raw_price, link);
                return None;
            }
        };

        Some(Item {
            id: None,
            title: first_text(tile, &self.tile_title).unwrap_or_default(),
            subtitle: None,
            link,
            description: None,
            price,
            specifications: None,
            kind: category_label.to_string(),
            image: first_attr(tile, &self.tile_image, "src").unwrap_or_default(),
            source: Source::Rozetka,
        })
    }

    /// Flat specification map from a `characteristics/` document
    ///
    /// Returns `None` when the page yields no rows, so a degraded fetch
    /// leaves the item's specifications absent.
    fn specifications_from(&self, doc: &Html) -> Option<Specifications> {
        let mut specs = Specifications::new();
        for row in doc.select(&self.spec_row) {
            let Some(label) = first_text(row, &self.spec_label) else {
                continue;
            };
            let value: String = row
                .select(&self.spec_value)
                .map(element_text)
                .collect::<Vec<_>>()
                .join(", ");
            specs.push_text(label, value.trim().to_string());
        }
        (!specs.is_empty()).then_some(specs)
    }

    /// Applies description and image from the product page document
    fn apply_description_and_image(&self, doc: &Html, item: &mut Item) {
        if let Some(image) = doc
            .select(&self.product_image)
            .next()
            .and_then(|el| el.value().attr("src"))
        {
            item.image = image.to_string();
        }

        let description = doc
            .select(&self.product_description)
            .next()
            .map(element_text)
            .filter(|s| !s.is_empty());

        if let Some(text) = description {
            item.description = Some(text);
        } else {
            let rich: Vec<String> = doc
                .select(&self.rich_text)
                .map(element_text)
                .filter(|s| !s.is_empty())
                .collect();
            if !rich.is_empty() {
                item.description = Some(rich.join(" "));
            }
        }
    }
}

impl SiteStrategy for RozetkaSite {
    fn source(&self) -> Source {
        Source::Rozetka
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn discover_categories(&self, fetcher: &PageFetcher) -> Vec<Category> {
        let home = fetcher.fetch_document(&self.base_url).await;
        let portals = self.portal_links(&home);
        drop(home);
        tracing::info!("Found {} top-level sections", portals.len());

        let resolved = join_all(portals.iter().map(|link| async move {
            let doc = fetcher.fetch_document(link).await;
            self.subcategories(&doc)
        }))
        .await;

        resolved.into_iter().flatten().collect()
    }

    fn count_pages(&self, category_doc: &Html) -> Option<u32> {
        category_doc
            .select(&self.pagination_link)
            .last()
            .and_then(|el| element_text(el).parse().ok())
    }

    fn page_url(&self, category_link: &str, page: u32) -> String {
        format!("{}page={}", category_link, page)
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

        match fetcher.fetch_raw(&item.link).await {
            Fetched::Content(body) => {
                let doc = Html::parse_document(&body);
                self.apply_description_and_image(&doc, item);
            }
            Fetched::Empty => {
                tracing::debug!("No product page fetched for {}", item.link);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::SpecValue;

    fn site() -> RozetkaSite {
        RozetkaSite::new("https://rozetka.example/".to_string())
    }

    const LISTING: &str = r#"
        <html><body>
        <div class="goods-tile__inner">
            <a class="product-link" href="https://rozetka.example/phone-a/p1/">
                <span class="goods-tile__title">Phone A</span>
            </a>
            <div class="goods-tile__picture"><img src="https://img.example/a.jpg"></div>
            <span class="goods-tile__price-value">12 999 ₴</span>
        </div>
        <div class="goods-tile__inner">
            <a class="product-link" href="/phone-b/p2/">
                <span class="goods-tile__title">Phone B</span>
            </a>
            <div class="goods-tile__picture"><img src="/b.jpg"></div>
            <span class="goods-tile__price-value">нема в наявності</span>
        </div>
        </body></html>
    "#;

    #[test]
    fn listing_maps_tiles_and_drops_unparseable_price() {
        let doc = Html::parse_document(LISTING);
        let items = site().extract_listing(&doc, "c80003");

        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.title, "Phone A");
        assert_eq!(item.link, "https://rozetka.example/phone-a/p1/");
        assert_eq!(item.price, 12999.0);
        assert_eq!(item.kind, "c80003");
        assert_eq!(item.image, "https://img.example/a.jpg");
        assert_eq!(item.source, Source::Rozetka);
        assert!(item.description.is_none());
        assert!(item.specifications.is_none());
    }

    #[test]
    fn count_pages_reads_last_pagination_link() {
        let doc = Html::parse_document(
            r#"<div class="pagination">
                <a class="pagination__link">1</a>
                <a class="pagination__link">2</a>
                <a class="pagination__link">23</a>
            </div>"#,
        );
        assert_eq!(site().count_pages(&doc), Some(23));
    }

    #[test]
    fn count_pages_absent_without_pagination() {
        let doc = Html::parse_document("<html><body>no pager here</body></html>");
        assert_eq!(site().count_pages(&doc), None);
    }

    #[test]
    fn page_url_appends_page_parameter() {
        assert_eq!(
            site().page_url("https://rozetka.example/phones/c80003/", 7),
            "https://rozetka.example/phones/c80003/page=7"
        );
    }

    #[test]
    fn portal_links_resolve_against_base() {
        let doc = Html::parse_document(
            r#"<ul>
                <li class="menu-categories__item">
                    <a class="menu-categories__link" href="/computers/">Computers</a>
                </li>
                <li class="menu-categories__item">
                    <a class="menu-categories__link" href="https://rozetka.example/phones/">Phones</a>
                </li>
            </ul>"#,
        );
        let links = site().portal_links(&doc);
        assert_eq!(
            links,
            vec![
                "https://rozetka.example/computers/".to_string(),
                "https://rozetka.example/phones/".to_string(),
            ]
        );
    }

    #[test]
    fn subcategories_take_title_and_link() {
        let doc = Html::parse_document(
            r#"<div class="portal-grid__cell">
                <a class="tile-cats__heading" href="/phones/c80003/">Smartphones</a>
            </div>"#,
        );
        let categories = site().subcategories(&doc);
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].title, "Smartphones");
        assert_eq!(categories[0].link, "https://rozetka.example/phones/c80003/");
    }

    #[test]
    fn specifications_build_flat_map_in_row_order() {
        let doc = Html::parse_document(
            r#"<div class="item">
                <div class="label"><span>Діагональ</span></div>
                <ul class="sub-list"><li>6.1"</li></ul>
            </div>
            <div class="item">
                <div class="label"><span>Пам'ять</span></div>
                <ul class="sub-list"><li>128 ГБ</li></ul>
            </div>"#,
        );
        let specs = site().specifications_from(&doc).unwrap();
        assert_eq!(specs.len(), 2);
        assert_eq!(
            specs.get("Діагональ"),
            Some(&SpecValue::Text("6.1\"".to_string()))
        );
    }

    #[test]
    fn specifications_absent_when_page_has_no_rows() {
        let doc = Html::parse_document("<html><body></body></html>");
        assert!(site().specifications_from(&doc).is_none());
    }

    #[test]
    fn description_falls_back_to_rich_text_blocks() {
        let mut item = Item {
            id: None,
            title: "Phone".to_string(),
            subtitle: None,
            link: "https://rozetka.example/phone/p1/".to_string(),
            description: None,
            price: 1.0,
            specifications: None,
            kind: "c1".to_string(),
            image: String::new(),
            source: Source::Rozetka,
        };

        let doc = Html::parse_document(
            r#"<img class="picture-container__picture" src="https://img.example/big.jpg">
               <div class="rich-text">First block.</div>
               <div class="rich-text">Second block.</div>"#,
        );
        site().apply_description_and_image(&doc, &mut item);

        assert_eq!(item.image, "https://img.example/big.jpg");
        assert_eq!(item.description.as_deref(), Some("First block. Second block."));
    }
}
