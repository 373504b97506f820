pub mod campaign;
pub mod team;
pub mod user;

pub use campaign::{Campaign, CampaignStatus, NewCampaign};
pub use team::Team;
pub use user::User;
