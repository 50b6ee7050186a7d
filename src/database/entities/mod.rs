pub mod parcels;
pub mod project_members;
pub mod project_parcels;
pub mod project_tenements;
pub mod projects;
pub mod prospects;
pub mod tenements;
pub mod users;
