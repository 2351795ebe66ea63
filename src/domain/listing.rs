//! Paginated rendering of ignore and VIP lists

use crate::domain::entities::{GuildPolicyConfig, ListGroup};

/// Character budget of a single embed field
pub const DEFAULT_PAGE_LENGTH: usize = 1024;

const SEPARATOR: &str = ", ";
const FILLER: &str = "None";

/// One page of a listing, rendered by adapters as an embed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPage {
    pub title: String,
    pub fields: Vec<(String, String)>,
    pub footer: String,
}

impl ListingPage {
    /// Characters of title, field names and values, and footer
    pub fn char_len(&self) -> usize {
        self.title.chars().count()
            + self.footer.chars().count()
            + self
                .fields
                .iter()
                .map(|(name, value)| name.chars().count() + value.chars().count())
                .sum::<usize>()
    }
}

/// Rendered list group
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    Empty(String),
    Pages(Vec<ListingPage>),
}

impl Listing {
    pub fn pages(&self) -> &[ListingPage] {
        match self {
            Listing::Empty(_) => &[],
            Listing::Pages(pages) => pages,
        }
    }

    /// Plain-text rendering for adapters without embeds
    pub fn to_text(&self) -> String {
        match self {
            Listing::Empty(message) => message.clone(),
            Listing::Pages(pages) => pages
                .iter()
                .map(|page| {
                    let mut out = format!("== {} ==\n", page.title);
                    for (name, value) in &page.fields {
                        out.push_str(&format!("{}: {}\n", name, value));
                    }
                    out.push_str(&page.footer);
                    out
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// Split a `", "`-joined list into pages of at most `page_length` characters
pub fn pagify(text: &str, page_length: usize) -> Vec<String> {
    pagify_on(text, SEPARATOR, page_length)
}

/// Split `text` into pages of at most `page_length` characters.
///
/// Pages break before the last `separator` that fits; an entry longer than a
/// page is hard-cut at a char boundary. Blank pages are dropped.
pub fn pagify_on(text: &str, separator: &str, page_length: usize) -> Vec<String> {
    let page_length = page_length.max(1);
    let mut pages = Vec::new();
    let mut rest = text;

    while rest.chars().count() > page_length {
        let limit = rest
            .char_indices()
            .nth(page_length)
            .map(|(idx, _)| idx)
            .unwrap_or(rest.len());
        // A separator starting exactly at the limit still ends a full page
        let window = rest
            .get(..limit + separator.len())
            .unwrap_or(&rest[..limit]);
        let cut = match window.rfind(separator) {
            Some(idx) if idx > 0 => idx,
            _ => limit,
        };
        let page = rest[..cut].trim();
        if !page.is_empty() {
            pages.push(page.to_string());
        }
        rest = rest[cut..].trim_start_matches(separator);
    }

    let tail = rest.trim();
    if !tail.is_empty() {
        pages.push(tail.to_string());
    }
    pages
}

/// Render a list group of a guild's config into embed pages.
///
/// Columns are zipped page by page, shorter columns filled with "None".
pub fn render(config: &GuildPolicyConfig, group: ListGroup, page_length: usize) -> Listing {
    let categories = group.categories();
    let columns: Vec<Vec<String>> = categories
        .iter()
        .map(|category| {
            let joined = config
                .entries(*category)
                .iter()
                .map(|target| target.mention())
                .collect::<Vec<_>>()
                .join(SEPARATOR);
            pagify(&joined, page_length)
        })
        .collect();

    let total = columns.iter().map(Vec::len).max().unwrap_or(0);
    if total == 0 {
        return Listing::Empty(group.empty_message().to_string());
    }

    let pages = (0..total)
        .map(|idx| ListingPage {
            title: group.title().to_string(),
            fields: categories
                .iter()
                .zip(&columns)
                .map(|(category, column)| {
                    let value = column.get(idx).cloned().unwrap_or_else(|| FILLER.to_string());
                    (category.heading().to_string(), value)
                })
                .collect(),
            footer: format!("Page {}/{}", idx + 1, total),
        })
        .collect();

    Listing::Pages(pages)
}
