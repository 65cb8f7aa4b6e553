//! Safe wrapper over the parts of Embree 4 needed for filtered triangle queries.

pub mod device;
pub use device::Device;

pub mod error;
pub use error::EmbreeError;

pub mod geometry;
pub use geometry::TriangleGeometry;

pub mod ray;
pub use ray::{FilterCandidate, Hit, Ray, RayHit4};

pub mod scene;
pub use scene::Scene;
