mod change_password;
mod complete_reset;
mod login;
mod password;
mod request_reset;

pub use change_password::change_password;
pub use complete_reset::complete_reset;
pub use login::{LoginResponse, login};
pub use password::set_password;
pub use request_reset::request_reset;
