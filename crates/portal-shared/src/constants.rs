/// Application name
pub const APP_NAME: &str = "JNTU-GV Alumni Portal";

/// Avatar service used for generated profile pictures
pub const AVATAR_BASE_URL: &str = "https://picsum.photos/200/200";

/// Upper bound (exclusive) of the random avatar seed
pub const AVATAR_SEED_RANGE: u32 = 1000;

/// Interval between two reads of an open conversation, in milliseconds
pub const DEFAULT_CHAT_POLL_INTERVAL_MS: u64 = 2000;

/// Number of approved testimonials shown on the public landing feed
pub const DEFAULT_PUBLIC_TESTIMONIAL_LIMIT: usize = 3;

/// Secret shared by every bootstrap account
pub const SEED_SECRET: &str = "admin";
