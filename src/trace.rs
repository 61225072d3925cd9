use glam::DVec3;

use crate::scene::Object;

pub struct Ray {
    pub origin: DVec3,
    pub direction: DVec3,
}

/// The nearest valid intersection found by [`nearest_hit`].
pub struct RayHit {
    pub t: f64,
    pub index: usize,
}

impl Ray {
    pub fn new(origin: DVec3, direction: DVec3) -> Self {
        Ray {
            origin,
            direction: direction.normalize(),
        }
    }

    pub fn at(&self, t: f64) -> DVec3 {
        self.origin + t * self.direction
    }
}

/// Mirrors `direction` about the unit normal.
pub fn reflect(direction: DVec3, normal: DVec3) -> DVec3 {
    direction - 2.0 * direction.dot(normal) * normal
}

/// Scans the object list in order for the smallest positive intersection
/// parameter. Cameras never intersect; `ignore` drops one object from the
/// search (the shadow test excludes the shaded object itself), and
/// `max_distance` rejects hits beyond it (shadow rays stop at the light).
/// Ties go to the earlier object.
pub fn nearest_hit(
    ray: &Ray,
    objects: &[Object],
    ignore: Option<usize>,
    max_distance: Option<f64>,
) -> Option<RayHit> {
    let mut best: Option<RayHit> = None;

    for (index, object) in objects.iter().enumerate() {
        if ignore == Some(index) {
            continue;
        }

        let Some(t) = intersect(object, ray) else {
            continue;
        };

        if let Some(max) = max_distance {
            if t > max {
                continue;
            }
        }

        if best.as_ref().map_or(true, |hit| t < hit.t) {
            best = Some(RayHit { t, index });
        }
    }

    best
}

fn intersect(object: &Object, ray: &Ray) -> Option<f64> {
    match object {
        Object::Camera { .. } => None,
        Object::Sphere { center, radius, .. } => intersect_sphere(ray, *center, *radius),
        Object::Plane { center, normal, .. } => intersect_plane(ray, *center, *normal),
    }
}

/// Solves |O + tD - C|^2 = r^2 and returns the smaller positive root, else
/// the larger positive root.
fn intersect_sphere(ray: &Ray, center: DVec3, radius: f64) -> Option<f64> {
    let oc = ray.origin - center;
    let b = 2.0 * ray.direction.dot(oc);
    let c = oc.length_squared() - radius * radius;
    let discriminant = b * b - 4.0 * c;

    if discriminant < 0.0 {
        return None;
    }

    let sqrt_discriminant = discriminant.sqrt();
    let first_hit = (-b - sqrt_discriminant) / 2.0;
    if first_hit > 0.0 {
        return Some(first_hit);
    }

    let second_hit = (-b + sqrt_discriminant) / 2.0;
    if second_hit > 0.0 {
        return Some(second_hit);
    }

    None
}

fn intersect_plane(ray: &Ray, center: DVec3, normal: DVec3) -> Option<f64> {
    let denominator = normal.dot(ray.direction);
    if denominator == 0.0 {
        return None;
    }

    let t = (center - ray.origin).dot(normal) / denominator;
    if t > 0.0 {
        Some(t)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Surface;
    use float_cmp::approx_eq;

    fn plain_surface() -> Surface {
        Surface {
            diffuse_color: DVec3::splat(0.5),
            specular_color: DVec3::splat(0.5),
            reflectivity: 0.0,
            refractivity: 0.0,
            ior: 1.0,
        }
    }

    fn unit_sphere_at(center: DVec3) -> Object {
        Object::Sphere {
            surface: plain_surface(),
            center,
            radius: 1.0,
        }
    }

    #[test]
    fn ray_hits_unit_sphere_at_t_four() {
        let objects = vec![unit_sphere_at(DVec3::ZERO)];
        let ray = Ray::new(DVec3::new(0.0, 0.0, -5.0), DVec3::new(0.0, 0.0, 1.0));

        let hit = nearest_hit(&ray, &objects, None, None).unwrap();
        assert!(approx_eq!(f64, hit.t, 4.0, epsilon = 1e-9));
        assert_eq!(hit.index, 0);
    }

    #[test]
    fn ray_from_inside_sphere_takes_larger_root() {
        let objects = vec![unit_sphere_at(DVec3::ZERO)];
        let ray = Ray::new(DVec3::ZERO, DVec3::new(0.0, 0.0, 1.0));

        let hit = nearest_hit(&ray, &objects, None, None).unwrap();
        assert!(approx_eq!(f64, hit.t, 1.0, epsilon = 1e-9));
    }

    #[test]
    fn ray_aimed_away_misses_everything() {
        let objects = vec![
            unit_sphere_at(DVec3::new(0.0, 0.0, 5.0)),
            Object::Plane {
                surface: plain_surface(),
                center: DVec3::new(0.0, 0.0, 10.0),
                normal: DVec3::new(0.0, 0.0, -1.0),
            },
        ];
        let ray = Ray::new(DVec3::ZERO, DVec3::new(0.0, 0.0, -1.0));

        assert!(nearest_hit(&ray, &objects, None, None).is_none());
    }

    #[test]
    fn plane_hit_uses_signed_distance() {
        let objects = vec![Object::Plane {
            surface: plain_surface(),
            center: DVec3::new(7.0, -3.0, 4.0),
            normal: DVec3::new(0.0, 0.0, -1.0),
        }];
        let ray = Ray::new(DVec3::ZERO, DVec3::new(0.0, 0.0, 1.0));

        // Only the plane's z offset matters, not the center's distance from
        // the ray origin.
        let hit = nearest_hit(&ray, &objects, None, None).unwrap();
        assert!(approx_eq!(f64, hit.t, 4.0, epsilon = 1e-9));
    }

    #[test]
    fn parallel_ray_misses_plane() {
        let objects = vec![Object::Plane {
            surface: plain_surface(),
            center: DVec3::new(0.0, -1.0, 0.0),
            normal: DVec3::new(0.0, 1.0, 0.0),
        }];
        let ray = Ray::new(DVec3::ZERO, DVec3::new(1.0, 0.0, 0.0));

        assert!(nearest_hit(&ray, &objects, None, None).is_none());
    }

    #[test]
    fn first_object_wins_ties() {
        let objects = vec![
            unit_sphere_at(DVec3::new(0.0, 0.0, 5.0)),
            unit_sphere_at(DVec3::new(0.0, 0.0, 5.0)),
        ];
        let ray = Ray::new(DVec3::ZERO, DVec3::new(0.0, 0.0, 1.0));

        let hit = nearest_hit(&ray, &objects, None, None).unwrap();
        assert_eq!(hit.index, 0);
    }

    #[test]
    fn ignore_index_skips_that_object() {
        let objects = vec![
            unit_sphere_at(DVec3::new(0.0, 0.0, 3.0)),
            unit_sphere_at(DVec3::new(0.0, 0.0, 6.0)),
        ];
        let ray = Ray::new(DVec3::ZERO, DVec3::new(0.0, 0.0, 1.0));

        let hit = nearest_hit(&ray, &objects, Some(0), None).unwrap();
        assert_eq!(hit.index, 1);
    }

    #[test]
    fn max_distance_bounds_the_search() {
        let objects = vec![unit_sphere_at(DVec3::new(0.0, 0.0, 6.0))];
        let ray = Ray::new(DVec3::ZERO, DVec3::new(0.0, 0.0, 1.0));

        assert!(nearest_hit(&ray, &objects, None, Some(4.0)).is_none());
        assert!(nearest_hit(&ray, &objects, None, Some(5.0)).is_some());
    }

    #[test]
    fn cameras_never_intersect() {
        let objects = vec![Object::Camera {
            center: DVec3::new(0.0, 0.0, 5.0),
            width: 1.0,
            height: 1.0,
        }];
        let ray = Ray::new(DVec3::ZERO, DVec3::new(0.0, 0.0, 1.0));

        assert!(nearest_hit(&ray, &objects, None, None).is_none());
    }

    #[test]
    fn reflect_mirrors_about_the_normal() {
        let incoming = DVec3::new(1.0, -1.0, 0.0).normalize();
        let reflected = reflect(incoming, DVec3::new(0.0, 1.0, 0.0));
        let expected = DVec3::new(1.0, 1.0, 0.0).normalize();

        assert!((reflected - expected).length() < 1e-12);
    }
}
