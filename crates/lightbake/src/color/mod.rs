mod linear_color;
mod sh;


pub use linear_color::LinearColor;
pub use sh::{sh2_basis_function, SHVector3, SHVectorRGB3};
