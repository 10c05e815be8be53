//! Concrete street-network sources.

pub mod overpass;
