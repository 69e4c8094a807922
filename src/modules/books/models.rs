use serde::{Deserialize, Serialize};

use library_db::{Document, Record};

/// Field names every create and full replace must supply, in wire form.
pub const REQUIRED_FIELDS: [&str; 5] = [
    "title",
    "author",
    "category",
    "publishedYear",
    "availableCopies",
];

/// A book as held by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub title: String,
    pub author: String,
    pub category: String,
    pub published_year: i64,
    pub available_copies: i64,
}

/// A persisted book with its id and timestamps.
pub type BookRecord = Record<Book>;

impl Document for Book {
    const COLLECTION: &'static str = "books";

    fn normalize(&mut self) {
        for field in [&mut self.title, &mut self.author, &mut self.category] {
            *field = field.trim().to_string();
        }
    }

    fn validate(&self) -> Vec<String> {
        let mut violations = Vec::new();
        if self.title.is_empty() {
            violations.push("Title is required".to_string());
        }
        if self.author.is_empty() {
            violations.push("Author is required".to_string());
        }
        if self.category.is_empty() {
            violations.push("Category is required".to_string());
        }
        if self.published_year < 0 {
            violations.push("Year cannot be negative".to_string());
        }
        if self.available_copies < 0 {
            violations.push("Available copies cannot be negative".to_string());
        }
        violations
    }
}

/// Request body for create and full replace.
///
/// Every field is optional at the decoding stage so a missing field becomes
/// `MissingFields` instead of a decoding failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookInput {
    pub title: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub published_year: Option<i64>,
    pub available_copies: Option<i64>,
}

impl BookInput {
    /// The complete book, or `None` when any field is absent or a text field is empty.
    ///
    /// Whitespace-only text passes here and is rejected later by the store schema.
    pub fn complete(&self) -> Option<Book> {
        let text = |value: &Option<String>| {
            value
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Some(Book {
            title: text(&self.title)?,
            author: text(&self.author)?,
            category: text(&self.category)?,
            published_year: self.published_year?,
            available_copies: self.available_copies?,
        })
    }
}

/// Request body for a partial update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BookPatch {
    /// Signed adjustment applied to `availableCopies`
    pub delta: Option<i64>,
    /// Replacement category; trimmed before use
    pub category: Option<String>,
}

/// Query string accepted by the list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookQuery {
    pub category: Option<String>,
    pub year: Option<String>,
}

/// Selection applied when listing books.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookFilter {
    All,
    /// Exact, case-sensitive category match
    Category(String),
    /// Published strictly after `year`. A `raw` value with no leading integer
    /// leaves `year` empty and matches nothing.
    PublishedAfter { year: Option<i64>, raw: String },
}

impl BookQuery {
    /// Resolve the query into a single filter; `category` wins over `year`.
    pub fn filter(&self) -> BookFilter {
        if let Some(category) = self.category.as_deref().filter(|c| !c.is_empty()) {
            return BookFilter::Category(category.to_string());
        }

        match self.year.as_deref().filter(|y| !y.is_empty()) {
            Some(year) => BookFilter::published_after(year),
            None => BookFilter::All,
        }
    }
}

impl BookFilter {
    pub fn published_after(raw: &str) -> Self {
        BookFilter::PublishedAfter {
            year: leading_integer(raw),
            raw: raw.to_string(),
        }
    }

    pub fn matches(&self, book: &Book) -> bool {
        match self {
            BookFilter::All => true,
            BookFilter::Category(category) => book.category == *category,
            BookFilter::PublishedAfter { year, .. } => {
                year.is_some_and(|year| book.published_year > year)
            }
        }
    }

    /// Message returned alongside the listing
    pub fn describe(&self) -> String {
        match self {
            BookFilter::All => "All books".to_string(),
            BookFilter::Category(category) => format!("Books in category: {category}"),
            BookFilter::PublishedAfter { raw, .. } => format!("Books published after {raw}"),
        }
    }
}

/// Integer at the start of `raw`, ignoring whatever follows it.
///
/// Accepts leading whitespace, a sign and a `0x` prefix; `"2015abc"` and
/// `"2015.5"` both read as 2015. Out-of-range values saturate.
fn leading_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let (radix, body) = match unsigned.get(..2) {
        Some("0x" | "0X") => (16, &unsigned[2..]),
        _ => (10, unsigned),
    };
    let end = body
        .find(|c: char| !c.is_digit(radix))
        .unwrap_or(body.len());
    let digits = &body[..end];
    if digits.is_empty() {
        return None;
    }

    let magnitude = i128::from_str_radix(digits, radix).unwrap_or(i128::MAX);
    let value = if negative { -magnitude } else { magnitude };
    Some(value.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
}
