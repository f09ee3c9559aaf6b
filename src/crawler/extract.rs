//! Product field extraction from listing HTML
//!
//! Listing pages follow WooCommerce markup. Each `li.product` element yields
//! at most one product:
//! - title from `h2.woo-loop-product__title a`, preferring the untruncated
//!   `data-title` of the add-to-cart button
//! - price from `span.price`, preferring the sale price inside `<ins>`
//! - image URL from the thumbnail `<img>` through an ordered fallback chain
//!
//! Nothing here performs I/O. Missing fields are logged and mapped to `None`.

use scraper::node::Element;
use scraper::{ElementRef, Html, Selector};
use url::Url;

const PRODUCT_SELECTOR: &str = "li.product";
const TITLE_SELECTOR: &str = "h2.woo-loop-product__title a";
const FULL_TITLE_SELECTOR: &str = "a.add_to_cart_button";
const FULL_TITLE_ATTR: &str = "data-title";
const PRICE_BOX_SELECTOR: &str = "span.price";
const SALE_PRICE_SELECTOR: &str = "ins";
const PRICE_AMOUNT_SELECTOR: &str = "span.woocommerce-Price-amount";
const THUMBNAIL_SELECTOR: &str = "img.attachment-woocommerce_thumbnail";
const ANY_IMAGE_SELECTOR: &str = "img";

/// Characters removed from price text before parsing
const CURRENCY_SYMBOLS: &[char] = &['₹', '$', '€', '£', '¥'];

/// Fields extracted from one product element
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFields {
    pub title: String,
    pub price: f64,
    /// Absolute image URL, if any rule produced one
    pub image_url: Option<String>,
}

/// Result of parsing a whole listing page
#[derive(Debug, Clone, Default)]
pub struct ListingPage {
    /// Number of product elements found, including ones that failed extraction
    pub element_count: usize,

    /// Successfully extracted products, in document order
    pub products: Vec<ProductFields>,
}

/// One named step of the image URL fallback chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageRule {
    /// `data-lazy-src`, set by lazy-loading plugins
    LazySrc,
    /// Plain `src`
    Src,
    /// First URL of `srcset`
    Srcset,
    /// First URL of `data-lazy-srcset`
    LazySrcset,
}

impl ImageRule {
    /// Rules in evaluation order
    pub const CHAIN: [ImageRule; 4] = [
        ImageRule::LazySrc,
        ImageRule::Src,
        ImageRule::Srcset,
        ImageRule::LazySrcset,
    ];

    pub fn attribute(&self) -> &'static str {
        match self {
            Self::LazySrc => "data-lazy-src",
            Self::Src => "src",
            Self::Srcset => "srcset",
            Self::LazySrcset => "data-lazy-srcset",
        }
    }

    fn is_srcset(&self) -> bool {
        matches!(self, Self::Srcset | Self::LazySrcset)
    }

    /// Returns the usable URL this rule yields for `img`, if any
    pub fn candidate(&self, img: &Element) -> Option<String> {
        let raw = img.attr(self.attribute())?.trim();
        let value = if self.is_srcset() {
            first_srcset_url(raw)?
        } else {
            raw
        };

        if value.is_empty() || is_placeholder(value) {
            return None;
        }

        Some(value.to_string())
    }
}

/// Returns true for inline placeholders that are not fetchable raster URLs
pub fn is_placeholder(value: &str) -> bool {
    value.starts_with("data:") || value.ends_with("svg+xml")
}

/// Extracts the first URL of a `srcset`-style attribute
fn first_srcset_url(srcset: &str) -> Option<&str> {
    srcset.split(',').next()?.split_whitespace().next()
}

/// Resolves the image URL of an `<img>` element through [`ImageRule::CHAIN`]
pub fn resolve_image_url(img: &Element) -> Option<String> {
    ImageRule::CHAIN.iter().find_map(|rule| {
        let candidate = rule.candidate(img)?;
        tracing::trace!("Image URL resolved by {}", rule.attribute());
        Some(candidate)
    })
}

/// Parses a price string such as `"₹1,299.50"`
///
/// Currency symbols, thousands separators and whitespace are stripped.
/// Negative and non-finite values are rejected.
pub fn parse_price(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| !CURRENCY_SYMBOLS.contains(c) && *c != ',' && !c.is_whitespace())
        .collect();

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite() && *price >= 0.0)
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Extracts the product title
pub fn extract_title(product: ElementRef<'_>) -> Option<String> {
    let title_node = product.select(&selector(TITLE_SELECTOR)?).next()?;

    let full_title = selector(FULL_TITLE_SELECTOR).and_then(|sel| {
        product
            .select(&sel)
            .next()
            .and_then(|button| button.value().attr(FULL_TITLE_ATTR))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
    });

    let title = full_title.unwrap_or_else(|| element_text(title_node));
    if title.is_empty() {
        None
    } else {
        Some(title)
    }
}

/// Extracts the product price, preferring the sale price
pub fn extract_price(product: ElementRef<'_>) -> Option<f64> {
    let price_box = match product.select(&selector(PRICE_BOX_SELECTOR)?).next() {
        Some(b) => b,
        None => {
            tracing::warn!("No price found for the product");
            return None;
        }
    };

    let amount = selector(PRICE_AMOUNT_SELECTOR)?;
    let price_element = match price_box.select(&selector(SALE_PRICE_SELECTOR)?).next() {
        Some(sale) => sale.select(&amount).next(),
        None => price_box.select(&amount).next(),
    };

    let Some(price_element) = price_element else {
        tracing::warn!("No price element found for the product");
        return None;
    };

    let price_text = element_text(price_element);
    let price = parse_price(&price_text);
    if price.is_none() {
        tracing::warn!("Invalid price format: {}", price_text);
    }
    price
}

/// Finds the product's thumbnail, falling back to its first `<img>`
fn find_image(product: ElementRef<'_>) -> Option<ElementRef<'_>> {
    [THUMBNAIL_SELECTOR, ANY_IMAGE_SELECTOR]
        .iter()
        .filter_map(|css| selector(css))
        .find_map(|sel| product.select(&sel).next())
}

/// Extracts title, price and image URL from one product element
///
/// Returns `None` when the title or price is missing. A missing image URL
/// is not fatal and leaves `image_url` unset.
pub fn extract_product(product: ElementRef<'_>) -> Option<ProductFields> {
    let Some(title) = extract_title(product) else {
        tracing::warn!("No title found for the product");
        return None;
    };

    let Some(price) = extract_price(product) else {
        tracing::warn!("Skipping product due to missing price: {}", title);
        return None;
    };

    let image_url = find_image(product).and_then(|img| resolve_image_url(img.value()));
    if image_url.is_none() {
        tracing::warn!("No valid image URL found for product: {}", title);
    }

    Some(ProductFields {
        title,
        price,
        image_url,
    })
}

/// Parses a listing page and extracts every product on it
///
/// Relative image URLs are resolved against `page_url`.
pub fn parse_listing(html: &str, page_url: &Url) -> ListingPage {
    let document = Html::parse_document(html);
    let Some(product_selector) = selector(PRODUCT_SELECTOR) else {
        return ListingPage::default();
    };

    let mut page = ListingPage::default();
    for element in document.select(&product_selector) {
        page.element_count += 1;

        if let Some(mut fields) = extract_product(element) {
            fields.image_url = fields
                .image_url
                .and_then(|raw| resolve_url(&raw, page_url));
            page.products.push(fields);
        }
    }

    page
}

fn resolve_url(raw: &str, base: &Url) -> Option<String> {
    match base.join(raw) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Some(url.to_string()),
        Ok(url) => {
            tracing::warn!("Ignoring image URL with unsupported scheme: {}", url);
            None
        }
        Err(e) => {
            tracing::warn!("Invalid image URL '{}': {}", raw, e);
            None
        }
    }
}
