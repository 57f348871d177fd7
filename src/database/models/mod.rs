pub mod work_day;
pub mod service_location;
pub mod rental_object;
pub mod telegram_user;
pub mod registration_book;

pub use work_day::*;
pub use service_location::*;
pub use rental_object::*;
pub use telegram_user::*;
pub use registration_book::*;
