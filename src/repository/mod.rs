pub mod blog;
pub mod donor;
pub mod email_template;
pub mod kit;
pub mod organisation;
pub mod volunteer;

pub use blog::{FaqInput, FaqRepository, PostInput, PostRepository};
pub use donor::{DonorInput, DonorRepository};
pub use email_template::{EmailTemplateInput, EmailTemplateRepository};
pub use kit::{KitInput, KitRepository, KitStatusCount, KitTypeCount};
pub use organisation::{OrganisationInput, OrganisationRepository, RequestCount};
pub use volunteer::{VolunteerInput, VolunteerRepository};
