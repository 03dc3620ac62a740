mod entry;

pub use entry::FileEntry;
