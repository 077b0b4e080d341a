//! Geometry algorithms: polygon buffering and walkshed isochrones.

pub mod buffer;
pub mod isochrone;

pub use isochrone::{
    AB_A_ONLY, AB_NEITHER, Isochrone, IsochroneGenerator, save_ab_ratios, save_isochrones,
};
