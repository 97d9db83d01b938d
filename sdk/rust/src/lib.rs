//! Client SDK for the contact API.

pub mod client;

pub use client::{Contact, ContactClient, Created, Envelope, NewContact};
