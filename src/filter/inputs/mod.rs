pub mod blog;
pub mod donor;
pub mod email_template;
pub mod kit;
pub mod organisation;
pub mod volunteer;

pub use blog::{FaqWhereInput, PostWhereInput};
pub use donor::DonorWhereInput;
pub use email_template::EmailTemplateWhereInput;
pub use kit::{KitAttributesWhereInput, KitStatusComparison, KitTypeComparison, KitWhereInput};
pub use organisation::{OrganisationAttributesWhereInput, OrganisationWhereInput};
pub use volunteer::{
    VolunteerAttributesWhereInput, VolunteerCapacityWhereInput, VolunteerWhereInput,
};
