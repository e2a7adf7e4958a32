pub mod admin;
pub mod analytics;
pub mod dashboard;
pub mod health;
pub mod locations;
pub mod properties;
