//! Static lighting core: scene import, light sampling and shadow ray queries for an offline
//! light map baker.

pub mod accel;
pub mod color;
pub mod error;
pub mod geometry;
pub mod lightmap;
pub mod lights;
pub mod materials;
pub mod sampling;
pub mod scene;

pub use accel::{AggregateMesh, DefaultAggregateMesh, LightRay, LightRayIntersection};
pub use error::{ImportError, ImportResult};
pub use scene::{load_scene_file, Scene};
