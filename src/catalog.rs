// keydrop/src/catalog.rs
// Static SKU -> download link catalog

use std::collections::HashMap;

use crate::order::{Order, ProductCategory};

pub const MASTERCLASS_INSTRUCTIONS: &str =
    "No download required. Use the key below to access your Masterclass.";

const DEFAULT_ENTRIES: [(&str, &str); 6] = [
    (
        "shotgun_pack",
        "https://drive.google.com/file/d/1nOgDQ-iEs1c72LbkSUSJlL1oQKVsl-JR/view?usp=sharing",
    ),
    (
        "smg_pack",
        "https://drive.google.com/file/d/1SW1wPdZs9roOPNLr9TK4_EtkxFnN6fi0/view?usp=sharing",
    ),
    (
        "ar_pack",
        "https://drive.google.com/file/d/1KPgM3cPxHTALnXOpU0Oj2jTPQw-aSDI5/view?usp=sharing",
    ),
    (
        "bullet_drop_pack",
        "https://drive.google.com/file/d/1mWrNFCwl-iKNREQ3ttK6CQEoxmp6sMHY/view?usp=sharing",
    ),
    (
        "fortnite_optimizer_pack",
        "https://drive.google.com/file/d/17Hi9xyhWXMdfrDzyyj15jV9azJsexov_/view?usp=sharing",
    ),
    (
        "build_place_pack",
        "https://drive.google.com/file/d/1JtFPiApQIbFi9oTc-tOpMvhCG9GzbQNT/view?usp=sharing",
    ),
];

/// What the purchaser gets alongside their key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadLinks {
    Links(Vec<String>),
    Instructions(&'static str),
}

impl DownloadLinks {
    /// Text placed in the email's download-link slot
    pub fn email_text(&self) -> String {
        match self {
            DownloadLinks::Links(links) => links.join("\n"),
            DownloadLinks::Instructions(text) => (*text).to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Catalog {
    links: HashMap<String, String>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(
            DEFAULT_ENTRIES
                .iter()
                .map(|(sku, url)| (sku.to_string(), url.to_string())),
        )
    }
}

impl Catalog {
    pub fn new(entries: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            links: entries.into_iter().collect(),
        }
    }

    pub fn link_for(&self, sku: &str) -> Option<&str> {
        self.links.get(sku).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Catalog URLs for the order's SKUs in item order, unknown SKUs dropped.
    /// Masterclass purchases get the fixed instructions instead.
    pub fn download_links(&self, order: &Order, category: ProductCategory) -> DownloadLinks {
        match category {
            ProductCategory::Masterclass => DownloadLinks::Instructions(MASTERCLASS_INSTRUCTIONS),
            ProductCategory::Standard => DownloadLinks::Links(
                order
                    .skus()
                    .iter()
                    .filter_map(|sku| self.link_for(sku))
                    .map(str::to_string)
                    .collect(),
            ),
        }
    }
}
