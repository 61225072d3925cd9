use glam::DVec3;

use crate::{
    scene::{Light, Scene},
    trace::{nearest_hit, reflect, Ray, RayHit},
};

/// Reflection chains stop once `depth` exceeds this.
pub const MAX_DEPTH: u32 = 7;

/// Phong specular exponent.
const SHININESS: i32 = 20;

/// Offset applied to a bounce ray's origin, along the mirrored direction, to
/// avoid re-hitting the surface it left.
const REFLECT_BIAS: f64 = 0.01;

/// Shades one intersection: Phong contribution from every light plus a
/// recursively traced mirror term, blended by the surface's reflectivity.
/// The result is unclamped.
pub fn shade(scene: &Scene, ray: &Ray, hit: &RayHit, depth: u32) -> DVec3 {
    if depth > MAX_DEPTH {
        return DVec3::ZERO;
    }

    let point = ray.at(hit.t);

    // Ambient term is zero; the local color is the sum over all lights.
    let mut color = DVec3::ZERO;
    for light in &scene.lights {
        color += direct_light(scene, ray, hit, point, light);
    }

    let surface = scene.objects[hit.index].surface();
    if surface.reflectivity != 0.0 {
        let normal = scene.objects[hit.index].surface_normal(point);
        let mirrored = reflect(ray.direction, normal).normalize();
        let bounce = Ray::new(point + REFLECT_BIAS * mirrored, mirrored);

        if let Some(next) = nearest_hit(&bounce, &scene.objects, None, None) {
            let reflected = shade(scene, &bounce, &next, depth + 1);
            let kr = surface.reflectivity;
            let kt = surface.refractivity;
            color = (1.0 - kr - kt) * color + kr * reflected;
        }
    }

    color
}

/// One light's Phong contribution at `point`, or black if any object blocks
/// the path to the light.
pub fn direct_light(
    scene: &Scene,
    ray: &Ray,
    hit: &RayHit,
    point: DVec3,
    light: &Light,
) -> DVec3 {
    let to_light = light.position() - point;
    let light_distance = to_light.length();

    // Hard shadow test, bounded at the light and skipping the shaded object.
    let shadow_ray = Ray::new(point, to_light);
    if nearest_hit(
        &shadow_ray,
        &scene.objects,
        Some(hit.index),
        Some(light_distance),
    )
    .is_some()
    {
        return DVec3::ZERO;
    }

    let object = &scene.objects[hit.index];
    let surface = object.surface();

    let n = object.surface_normal(point);
    let l = shadow_ray.direction;
    let r = (2.0 * n.dot(l) * n - l).normalize();
    let v = -ray.direction;

    let n_dot_l = n.dot(l).max(0.0);
    let diffuse = n_dot_l * surface.diffuse_color * light.color();

    let v_dot_r = v.dot(r).max(0.0);
    let specular = if n_dot_l > 0.0 && v_dot_r > 0.0 {
        v_dot_r.powi(SHININESS) * surface.specular_color * light.color()
    } else {
        DVec3::ZERO
    };

    angular_attenuation(light, -l) * radial_attenuation(light, light_distance) * (diffuse + specular)
}

/// Distance falloff 1 / (a2 d^2 + a1 d + a0), where `distance` runs from the
/// shaded point to the light. Returns 1 for an infinite distance.
pub fn radial_attenuation(light: &Light, distance: f64) -> f64 {
    if !distance.is_finite() {
        return 1.0;
    }

    let [a0, a1, a2] = light.radial();
    1.0 / (a2 * distance * distance + a1 * distance + a0)
}

/// Cone falloff for spotlights; point lights always pass. `to_point` is the
/// unit vector from the light toward the shaded point. A direction exactly
/// on the cone boundary is still lit.
pub fn angular_attenuation(light: &Light, to_point: DVec3) -> f64 {
    match light {
        Light::Point { .. } => 1.0,
        Light::Spot {
            theta,
            direction,
            angular_a0,
            ..
        } => {
            let alignment = direction.normalize().dot(to_point);
            if alignment < theta.to_radians().cos() {
                0.0
            } else {
                alignment.powf(*angular_a0)
            }
        }
    }
}
