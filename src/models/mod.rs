pub mod blog;
pub mod coordinates;
pub mod donor;
pub mod email_template;
pub mod enums;
pub mod kit;
pub mod organisation;
pub mod volunteer;

pub use blog::{Faq, Post};
pub use coordinates::Coordinates;
pub use donor::Donor;
pub use email_template::EmailTemplate;
pub use enums::{KitStatus, KitType, KitVolunteerRole};
pub use kit::{Kit, KitAttributes, KitImage, KitVolunteer};
pub use organisation::{Organisation, OrganisationAttributes};
pub use volunteer::{Capacity, Volunteer, VolunteerAttributes};
