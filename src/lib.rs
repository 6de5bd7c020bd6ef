//! Exact-topology **Constructive Solid Geometry** on polyhedral solids and
//! planar areas, built around Boolean operations (*union*, *subtract*,
//! *intersect*) on polygon sets stored in [BSP](solid::bsp) trees.
//!
//! Clipping leaves faces cut into fragments and nearly identical vertices.
//! Every Boolean result is therefore [retesselated](Solid::retesselated),
//! merging coplanar fragments back into larger convex polygons, and
//! [canonicalized](Solid::canonicalized), snapping near-coincident values
//! onto shared instances. 2D areas ([`Cag`]) reuse the 3D engine by extruding
//! their outlines into walls.
//!
//! ```
//! use csgkernel::{BooleanOps, Solid};
//! use nalgebra::{Point3, Vector3};
//!
//! let half = Vector3::new(0.5, 0.5, 0.5);
//! let a: Solid<()> = Solid::cuboid(Point3::origin(), half, None);
//! let b = Solid::cuboid(Point3::new(0.5, 0.0, 0.0), half, None);
//! assert!((a.subtract(&b).volume() - 0.5).abs() < 1e-6);
//! ```
//!
//! # Features
//! #### Default
//! - **f64**: use f64 as Real
//!
//! #### Optional
//! - **f32**: use f32 as Real, this conflicts with f64

#![forbid(unsafe_code)]
#![warn(unused)]
#![warn(clippy::missing_const_for_fn, clippy::approx_constant, clippy::all)]

pub mod cag;
pub mod errors;
pub mod float_types;
pub mod fuzzy;
pub mod solid;
pub mod tag;
pub mod traits;

#[cfg(any(all(feature = "f64", feature = "f32"), not(any(feature = "f64", feature = "f32"))))]
compile_error!("Either 'f64' or 'f32' feature must be specified, but not both");

pub use cag::Cag;
pub use errors::ValidationError;
pub use solid::Solid;
pub use traits::BooleanOps;
