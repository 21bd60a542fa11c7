pub mod domain;
pub mod ports;

pub use domain::{
    Category, ContentEntry, EntryKind, LoginRecord, PortalCredentials, StudentProfile, UserId,
    Year,
};
pub use ports::{
    ContentStore, LoginOutcome, PlaylistStore, PortError, PortResult, PortalService, RecordSink,
    SessionStore,
};
