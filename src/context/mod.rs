pub mod walker;

pub use walker::{collect, resolve_dir, Collected, ContextError, Selection, SourceFile};
