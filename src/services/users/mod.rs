mod profile;

pub use self::profile::{Profile, ProfileResult, PROFILE_POSTS_LIMIT};
