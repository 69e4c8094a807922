//! Sample catalogue loader.

use anyhow::{bail, Context};

use library_db::{Collection, MemoryCollection};
use library_kernel::settings::Settings;

use crate::modules::books::models::{Book, BookRecord};

fn book(title: &str, author: &str, category: &str, published_year: i64, copies: i64) -> Book {
    Book {
        title: title.to_string(),
        author: author.to_string(),
        category: category.to_string(),
        published_year,
        available_copies: copies,
    }
}

/// The demo catalogue written by `seed`
pub fn sample_catalogue() -> Vec<Book> {
    vec![
        book("Clean Code", "Robert C. Martin", "Programming", 2008, 3),
        book(
            "Introduction to Algorithms",
            "Cormen, Leiserson, Rivest, Stein",
            "Computer Science",
            2009,
            5,
        ),
        book("Design Patterns", "Erich Gamma", "Programming", 1994, 2),
        book(
            "Deep Learning",
            "Ian Goodfellow, Yoshua Bengio, Aaron Courville",
            "AI",
            2016,
            4,
        ),
        book("You Don't Know JS", "Kyle Simpson", "Programming", 2015, 6),
        book(
            "The Pragmatic Programmer",
            "Andrew Hunt, David Thomas",
            "Programming",
            1999,
            1,
        ),
        book("Python Crash Course", "Eric Matthes", "Programming", 2016, 7),
    ]
}

/// Replace the persisted book collection with the sample catalogue.
///
/// Requires `store.snapshot_dir`; seeding a purely in-memory store would be
/// lost as soon as the process exits.
pub async fn seed(settings: &Settings) -> anyhow::Result<Vec<BookRecord>> {
    if settings.store.snapshot_dir.is_none() {
        bail!("seeding requires store.snapshot_dir (e.g. LIBRARY_STORE__SNAPSHOT_DIR)");
    }

    let store = MemoryCollection::<Book>::open(&settings.store)
        .await
        .context("failed to open book store")?;

    let removed = store.clear().await.context("failed to clear books")?;
    tracing::info!(removed, "existing books cleared");

    let records = store
        .insert_many(sample_catalogue())
        .await
        .context("failed to insert sample books")?;
    for record in &records {
        tracing::info!(book_id = %record.id, title = %record.doc.title, "seeded book");
    }

    store.close().await.context("failed to close book store")?;
    tracing::info!(count = records.len(), "seed complete");
    Ok(records)
}
