// HTTP request handlers for the auth routes
pub mod login;
pub mod pages;
pub mod session;


pub use login::{complete_login, start_login};
pub use pages::{health, sign_in_page};
pub use session::{logout, user_info};
