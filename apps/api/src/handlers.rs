pub mod admin;
pub mod audit;
pub mod buckets;
pub mod health;
pub mod objects;
pub mod requests;
