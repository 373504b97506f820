pub mod actions;
pub mod campaigns;
