//! Recursive ray tracer with Phong illumination, hard shadows, and mirror
//! reflection over spheres and planes, lit by point and spot lights.

pub mod io;
pub mod render;
pub mod scene;
pub mod shade;
pub mod trace;
