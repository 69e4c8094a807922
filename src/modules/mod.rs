pub mod books;

use std::sync::Arc;

use library_db::Collection;
use library_kernel::ModuleRegistry;

use books::models::Book;

/// Register all project-specific modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, books: Arc<dyn Collection<Book>>) {
    registry.register(books::create_module(books));
}
