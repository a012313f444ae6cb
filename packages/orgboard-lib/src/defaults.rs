pub const GRAPHQL_API_HOST: &str = "127.0.0.1";
pub const GRAPHQL_API_PORT: &str = "4000";

pub const MEMBERS_PAGE_SIZE: u32 = 32;
pub const EVENTS_PAGE_SIZE: u32 = 50;
pub const POSTS_PAGE_SIZE: u32 = 5;
pub const BLOCKED_USERS_PAGE_SIZE: u32 = 32;
pub const VENUES_PAGE_SIZE: u32 = 32;

pub const MEMBERSHIP_REQUESTS_FIRST: u32 = 8;
pub const UPCOMING_EVENTS_CAP: usize = 5;

pub const SERVICE_COMMAND_CHANNEL_SIZE: usize = 100;
pub const DRIVER_EVENT_CHANNEL_SIZE: usize = 100;
