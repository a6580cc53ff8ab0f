pub mod location;
pub mod mail;

pub use location::{LocationService, LOCATOR};
pub use mail::{send_best_effort, EmailMessage, MailService, NotificationSender, MAILER};
