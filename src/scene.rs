use glam::DVec3;

/// Shading coefficients shared by every visible object.
///
/// `refractivity` and `ior` are carried through from the scene description
/// and weight the reflection blend, but no transmission is ever traced.
pub struct Surface {
    pub diffuse_color: DVec3,
    pub specular_color: DVec3,
    pub reflectivity: f64,
    pub refractivity: f64,
    pub ior: f64,
}

pub enum Object {
    Camera {
        center: DVec3,
        width: f64,
        height: f64,
    },
    Sphere {
        surface: Surface,
        center: DVec3,
        radius: f64,
    },
    Plane {
        surface: Surface,
        center: DVec3,
        normal: DVec3,
    },
}

pub enum Light {
    Point {
        color: DVec3,
        position: DVec3,
        radial: [f64; 3],
    },
    Spot {
        color: DVec3,
        position: DVec3,
        radial: [f64; 3],
        /// Cone half-angle in degrees.
        theta: f64,
        direction: DVec3,
        angular_a0: f64,
    },
}

/// View-plane parameters taken from the first camera in the scene.
pub struct Viewport {
    pub cx: f64,
    pub cy: f64,
    pub width: f64,
    pub height: f64,
}

/// An immutable, already-validated scene. Object and light order matter:
/// intersection ties go to the earlier object, and the first camera found
/// supplies the viewport.
pub struct Scene {
    pub objects: Vec<Object>,
    pub lights: Vec<Light>,
}

pub struct Film {
    pub screen_width: u32,
    pub screen_height: u32,
    pub pixel_data: Vec<DVec3>,
}

impl Object {
    pub fn surface(&self) -> &Surface {
        match self {
            Object::Sphere { surface, .. } | Object::Plane { surface, .. } => surface,
            // nearest_hit never reports a camera
            Object::Camera { .. } => unreachable!("cameras have no surface"),
        }
    }

    /// Unit normal at a point on the object's surface.
    pub fn surface_normal(&self, point: DVec3) -> DVec3 {
        match self {
            Object::Sphere { center, .. } => (point - *center).normalize(),
            Object::Plane { normal, .. } => normal.normalize(),
            Object::Camera { .. } => unreachable!("cameras are never intersected"),
        }
    }
}

impl Light {
    pub fn color(&self) -> DVec3 {
        match self {
            Light::Point { color, .. } | Light::Spot { color, .. } => *color,
        }
    }

    pub fn position(&self) -> DVec3 {
        match self {
            Light::Point { position, .. } | Light::Spot { position, .. } => *position,
        }
    }

    /// Radial attenuation coefficients [a0, a1, a2].
    pub fn radial(&self) -> [f64; 3] {
        match self {
            Light::Point { radial, .. } | Light::Spot { radial, .. } => *radial,
        }
    }
}

impl Scene {
    /// Finds the first camera and returns its view-plane parameters. A scene
    /// without a camera renders with a degraded default viewport.
    pub fn viewport(&self) -> Viewport {
        for object in &self.objects {
            if let Object::Camera {
                center,
                width,
                height,
            } = object
            {
                return Viewport {
                    cx: center.x,
                    cy: center.y,
                    width: *width,
                    height: *height,
                };
            }
        }

        log::warn!("scene has no camera, rendering with a 1x1 viewport at the origin");
        Viewport {
            cx: 0.0,
            cy: 0.0,
            width: 1.0,
            height: 1.0,
        }
    }
}

impl Film {
    pub fn new(screen_width: u32, screen_height: u32) -> Self {
        Film {
            screen_width,
            screen_height,
            pixel_data: vec![DVec3::ZERO; (screen_width * screen_height) as usize],
        }
    }

    /// Stores a pixel from the renderer's bottom-to-top scanline order so
    /// that `pixel_data` reads top-to-bottom.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: DVec3) {
        if x < self.screen_width && y < self.screen_height {
            let index = (self.screen_height - y - 1) * self.screen_width + x;
            self.pixel_data[index as usize] = color;
        }
    }

    /// Quantizes to 8-bit RGB: clamp each channel to [0, 1], scale to 255,
    /// truncate.
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.pixel_data
            .iter()
            .flat_map(|rgb| {
                let clamped = rgb.clamp(DVec3::ZERO, DVec3::ONE);
                [
                    (clamped.x * 255.0) as u8,
                    (clamped.y * 255.0) as u8,
                    (clamped.z * 255.0) as u8,
                ]
            })
            .collect()
    }
}
