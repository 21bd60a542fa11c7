pub mod content;
pub mod playlists;
pub mod portal;
pub mod profile;
pub mod records;
pub mod sessions;

pub use content::FsContentStore;
pub use playlists::JsonPlaylistStore;
pub use portal::PortalClient;
pub use records::JsonLinesRecordSink;
pub use sessions::InMemorySessions;
