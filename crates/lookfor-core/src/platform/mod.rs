/// Platform-specific metadata — owner names and permission strings.
///
/// Unix resolves the owning uid through the password database and renders the
/// mode bits. Other platforms have no owner and only a read-only bit.
pub mod owner;
pub mod permissions;

pub use owner::owner_name;
pub use permissions::permission_string;
