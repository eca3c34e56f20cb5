//! Barbershop directory server.
//!
//! Lists barbershops in Maputo with their distance from the user and
//! whether they are open right now, and lets signed-in users keep
//! favorites, rate shops and book services.

pub mod backend;
pub mod cache;
pub mod clock;
pub mod config;
pub mod domain;
pub mod listing;
pub mod location;
pub mod web;
