//! Data models shared across the SDK

pub mod element;

pub use element::{Association, Attribute, Element, Node};
