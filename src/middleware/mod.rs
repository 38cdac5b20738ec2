pub mod cookie_store;
pub mod permission;

pub use cookie_store::CookieStore;
pub use permission::{get_current_user, require_role, web_session, WebSession};
