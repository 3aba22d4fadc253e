// Engine constants (no magic values)

/// Newer visible messages tolerated below a view before it is reposted
pub const DEFAULT_REPOST_THRESHOLD: i64 = 5;

/// Head-read/conditional-remove rounds before `pop_front` gives up
pub const DEFAULT_POP_MAX_ATTEMPTS: usize = 5;

/// Extra markers fetched on top of the threshold, so hidden messages
/// (edits, channel joins) do not starve the buried check
pub const BURY_SCAN_PADDING: usize = 20;

/// Ephemeral notice shown when a request failed on the store
pub const TRY_AGAIN_NOTICE: &str = "Something went wrong, please try again.";

/// Ephemeral notice shown when the queue display could not be published
pub const DISPLAY_FAILED_NOTICE: &str = "The queue display could not be updated.";
