pub mod shopee;

pub use shopee::ShopeeCrawler;

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ AppError, Result };

static PRODUCT_IDS: LazyLock<std::result::Result<Regex, regex::Error>> = LazyLock::new(|| {
    Regex::new(r"i\.(\d+)\.(\d+)")
});

/// Shop and item ids carried in a marketplace product URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductUrl {
    pub shop_id: i64,
    pub item_id: i64,
}

impl ProductUrl {
    /// Parse `https://shopee.vn/<slug>-i.<shop_id>.<item_id>[?query]`.
    ///
    /// The first `i.<shop>.<item>` run in the path wins.
    pub fn parse(url: &str) -> Result<Self> {
        let pattern = PRODUCT_IDS.as_ref().map_err(|e| AppError::Internal(e.to_string()))?;
        let path = url.split(|c: char| c == '?' || c == '#').next().unwrap_or_default();

        let captures = pattern.captures(path).ok_or(AppError::ProductNotFound)?;
        let shop_id = captures[1].parse().map_err(|_| AppError::ProductNotFound)?;
        let item_id = captures[2].parse().map_err(|_| AppError::ProductNotFound)?;

        Ok(Self { shop_id, item_id })
    }
}
