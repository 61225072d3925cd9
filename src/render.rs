use glam::DVec3;
use rayon::iter::{IndexedParallelIterator, ParallelIterator};
use rayon::slice::ParallelSliceMut;

use crate::{
    scene::{Film, Scene},
    shade::shade,
    trace::{nearest_hit, Ray},
};

/// Renders the scene to a `width` x `height` film. Primary rays start at the
/// origin and sweep the first camera's view plane at unit distance; a miss
/// leaves the pixel black. Rows are independent and render in parallel.
pub fn render(scene: &Scene, width: u32, height: u32) -> Film {
    let viewport = scene.viewport();
    let pixel_width = viewport.width / width as f64;
    let pixel_height = viewport.height / height as f64;

    let mut film = Film::new(width, height);
    film.pixel_data
        .par_chunks_mut(width as usize)
        .enumerate()
        .for_each(|(row, pixels)| {
            // Scanlines run bottom to top; the film stores them top to bottom.
            let y = height - 1 - row as u32;
            for (x, pixel) in pixels.iter_mut().enumerate() {
                let direction = DVec3::new(
                    viewport.cx - viewport.width / 2.0 + pixel_width * (x as f64 + 0.5),
                    viewport.cy - viewport.height / 2.0 + pixel_height * (y as f64 + 0.5),
                    1.0,
                );
                let ray = Ray::new(DVec3::ZERO, direction);

                *pixel = match nearest_hit(&ray, &scene.objects, None, None) {
                    Some(hit) => shade(scene, &ray, &hit, 0),
                    None => DVec3::ZERO,
                };
            }
        });

    film
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Light, Object, Surface};

    #[test]
    fn empty_scene_renders_black_regardless_of_lights() {
        let scene = Scene {
            objects: vec![Object::Camera {
                center: DVec3::ZERO,
                width: 1.0,
                height: 1.0,
            }],
            lights: vec![
                Light::Point {
                    color: DVec3::ONE,
                    position: DVec3::new(0.0, 0.0, 2.0),
                    radial: [1.0, 0.0, 0.0],
                },
                Light::Point {
                    color: DVec3::ONE,
                    position: DVec3::new(3.0, 0.0, 2.0),
                    radial: [1.0, 0.0, 0.0],
                },
            ],
        };

        let film = render(&scene, 8, 8);
        assert!(film.pixel_data.iter().all(|pixel| *pixel == DVec3::ZERO));
        assert!(film.to_rgb8().iter().all(|channel| *channel == 0));
    }

    #[test]
    fn sphere_in_the_upper_half_lands_in_the_top_rows() {
        let scene = Scene {
            objects: vec![
                Object::Camera {
                    center: DVec3::ZERO,
                    width: 1.0,
                    height: 1.0,
                },
                Object::Sphere {
                    surface: Surface {
                        diffuse_color: DVec3::ONE,
                        specular_color: DVec3::ZERO,
                        reflectivity: 0.0,
                        refractivity: 0.0,
                        ior: 1.0,
                    },
                    // Above the view axis, so it shows up in the image's
                    // upper rows after the flip.
                    center: DVec3::new(0.0, 1.0, 4.0),
                    radius: 0.8,
                },
            ],
            lights: vec![Light::Point {
                color: DVec3::ONE,
                position: DVec3::new(0.0, 5.0, 0.0),
                radial: [1.0, 0.0, 0.0],
            }],
        };

        let film = render(&scene, 9, 9);
        let width = film.screen_width as usize;

        let top_rows_lit = film.pixel_data[..3 * width]
            .iter()
            .any(|pixel| *pixel != DVec3::ZERO);
        let bottom_rows_lit = film.pixel_data[6 * width..]
            .iter()
            .any(|pixel| *pixel != DVec3::ZERO);

        assert!(top_rows_lit);
        assert!(!bottom_rows_lit);
    }
}
