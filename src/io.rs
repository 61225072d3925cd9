use std::{
    error::Error,
    fmt::Display,
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
};

use clap::{value_parser, Arg, Command};
use glam::DVec3;
use png::Encoder;
use serde::Deserialize;
use serde_json::{from_str, from_value, Value};

use crate::scene::{Film, Light, Object, Scene, Surface};

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct CameraParams {
    width: f64,
    height: f64,
    position: Option<[f64; 3]>,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct SphereParams {
    diffuse_color: [f64; 3],
    specular_color: [f64; 3],
    position: [f64; 3],
    radius: f64,
    reflectivity: Option<f64>,
    refractivity: Option<f64>,
    ior: Option<f64>,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct PlaneParams {
    diffuse_color: [f64; 3],
    specular_color: [f64; 3],
    position: [f64; 3],
    normal: [f64; 3],
    reflectivity: Option<f64>,
    refractivity: Option<f64>,
    ior: Option<f64>,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct LightParams {
    color: [f64; 3],
    position: [f64; 3],
    #[serde(rename = "radial-a0")]
    radial_a0: f64,
    #[serde(rename = "radial-a1")]
    radial_a1: f64,
    #[serde(rename = "radial-a2")]
    radial_a2: f64,
    theta: Option<f64>,
    direction: Option<[f64; 3]>,
    #[serde(rename = "angular-a0")]
    angular_a0: Option<f64>,
}

#[derive(Debug)]
pub struct SceneParseError {
    message: String,
}

impl Display for SceneParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for SceneParseError {}

enum SceneEntry {
    Object(Object),
    Light(Light),
}

pub fn read_input(filename: &str) -> Result<Scene, SceneParseError> {
    let Ok(scene_json) = fs::read_to_string(Path::new(filename)) else {
        return Err(SceneParseError {
            message: format!("Couldn't open file at {}", filename),
        });
    };

    parse_scene(&scene_json)
}

/// Parses the scene description: a JSON array of typed maps. The order of
/// appearance is preserved for both objects and lights.
pub fn parse_scene(scene_json: &str) -> Result<Scene, SceneParseError> {
    let Ok(entries) = from_str::<Vec<Value>>(scene_json) else {
        return Err(SceneParseError {
            message: "Scene description isn't a JSON array".to_string(),
        });
    };

    if entries.is_empty() {
        return Err(SceneParseError {
            message: "Scene description contains no objects".to_string(),
        });
    }

    let mut objects: Vec<Object> = Vec::new();
    let mut lights: Vec<Light> = Vec::new();
    for (index, mut entry) in entries.into_iter().enumerate() {
        match parse_entry(index, &mut entry)? {
            SceneEntry::Object(object) => objects.push(object),
            SceneEntry::Light(light) => lights.push(light),
        }
    }

    Ok(Scene { objects, lights })
}

fn parse_entry(index: usize, entry: &mut Value) -> Result<SceneEntry, SceneParseError> {
    let Some(entry_map) = entry.as_object_mut() else {
        return Err(SceneParseError {
            message: format!("Entry {} isn't a valid scene object", index),
        });
    };

    let Some((_, entry_type)) = entry_map.remove_entry("type") else {
        return Err(SceneParseError {
            message: format!("Entry {} doesn't have a type field", index),
        });
    };

    match entry_type.as_str() {
        Some("camera") => {
            let Ok(params) = from_value::<CameraParams>(entry.clone()) else {
                return Err(SceneParseError {
                    message: format!("Camera at entry {} has invalid parameters", index),
                });
            };

            if params.width <= 0.0 || params.height <= 0.0 {
                return Err(SceneParseError {
                    message: format!(
                        "Camera at entry {} must have positive width and height",
                        index
                    ),
                });
            }

            Ok(SceneEntry::Object(Object::Camera {
                center: DVec3::from_array(params.position.unwrap_or([0.0; 3])),
                width: params.width,
                height: params.height,
            }))
        }
        Some("sphere") => {
            let Ok(params) = from_value::<SphereParams>(entry.clone()) else {
                return Err(SceneParseError {
                    message: format!("Sphere at entry {} has invalid parameters", index),
                });
            };

            if params.radius <= 0.0 {
                return Err(SceneParseError {
                    message: format!("Sphere at entry {} must have a positive radius", index),
                });
            }

            let surface = build_surface(
                index,
                params.diffuse_color,
                params.specular_color,
                params.reflectivity,
                params.refractivity,
                params.ior,
            )?;

            Ok(SceneEntry::Object(Object::Sphere {
                surface,
                center: DVec3::from_array(params.position),
                radius: params.radius,
            }))
        }
        Some("plane") => {
            let Ok(params) = from_value::<PlaneParams>(entry.clone()) else {
                return Err(SceneParseError {
                    message: format!("Plane at entry {} has invalid parameters", index),
                });
            };

            let surface = build_surface(
                index,
                params.diffuse_color,
                params.specular_color,
                params.reflectivity,
                params.refractivity,
                params.ior,
            )?;

            Ok(SceneEntry::Object(Object::Plane {
                surface,
                center: DVec3::from_array(params.position),
                normal: DVec3::from_array(params.normal),
            }))
        }
        Some("light") => {
            let Ok(params) = from_value::<LightParams>(entry.clone()) else {
                return Err(SceneParseError {
                    message: format!("Light at entry {} has invalid parameters", index),
                });
            };

            parse_light(index, params).map(SceneEntry::Light)
        }
        _ => Err(SceneParseError {
            message: format!("Entry {} has an unknown type", index),
        }),
    }
}

fn parse_light(index: usize, params: LightParams) -> Result<Light, SceneParseError> {
    let radial = [params.radial_a0, params.radial_a1, params.radial_a2];
    if radial.iter().any(|coefficient| *coefficient < 0.0) {
        return Err(SceneParseError {
            message: format!(
                "Light at entry {} has a negative radial attenuation coefficient",
                index
            ),
        });
    }

    let color = DVec3::from_array(params.color);
    let position = DVec3::from_array(params.position);

    // Any spotlight field promotes the light to a spotlight, and a spotlight
    // needs all three of theta, direction, and angular-a0.
    let is_spot = params.theta.map_or(false, |theta| theta != 0.0)
        || params.direction.is_some()
        || params.angular_a0.is_some();
    if !is_spot {
        return Ok(Light::Point {
            color,
            position,
            radial,
        });
    }

    let (Some(theta), Some(direction), Some(angular_a0)) =
        (params.theta, params.direction, params.angular_a0)
    else {
        return Err(SceneParseError {
            message: format!(
                "Spotlight at entry {} needs theta, direction, and angular-a0",
                index
            ),
        });
    };

    if angular_a0 < 0.0 {
        return Err(SceneParseError {
            message: format!("Spotlight at entry {} has a negative angular-a0", index),
        });
    }

    Ok(Light::Spot {
        color,
        position,
        radial,
        theta,
        direction: DVec3::from_array(direction),
        angular_a0,
    })
}

fn build_surface(
    index: usize,
    diffuse_color: [f64; 3],
    specular_color: [f64; 3],
    reflectivity: Option<f64>,
    refractivity: Option<f64>,
    ior: Option<f64>,
) -> Result<Surface, SceneParseError> {
    let in_range = |color: &[f64; 3]| color.iter().all(|channel| (0.0..=1.0).contains(channel));
    if !in_range(&diffuse_color) || !in_range(&specular_color) {
        return Err(SceneParseError {
            message: format!(
                "Object at entry {} has a color channel outside 0.0 to 1.0",
                index
            ),
        });
    }

    Ok(Surface {
        diffuse_color: DVec3::from_array(diffuse_color),
        specular_color: DVec3::from_array(specular_color),
        reflectivity: reflectivity.unwrap_or(0.0),
        refractivity: refractivity.unwrap_or(0.0),
        ior: ior.unwrap_or(1.0),
    })
}

pub fn read_args() -> Option<(u32, u32, String, String)> {
    let matches = Command::new("raytrace")
        .arg(
            Arg::new("width")
                .required(true)
                .value_parser(value_parser!(u32).range(1..)),
        )
        .arg(
            Arg::new("height")
                .required(true)
                .value_parser(value_parser!(u32).range(1..)),
        )
        .arg(Arg::new("input").required(true))
        .arg(Arg::new("output").required(true))
        .arg_required_else_help(true)
        .get_matches();

    let width = matches.get_one::<u32>("width")?;
    let height = matches.get_one::<u32>("height")?;
    let input = matches.get_one::<String>("input")?;
    let output = matches.get_one::<String>("output")?;
    Some((*width, *height, input.clone(), output.clone()))
}

/// Writes the film as ASCII P3 PPM for `.ppm` paths and 8-bit RGB PNG for
/// everything else.
pub fn save_image(film: &Film, filename: &str) -> Result<(), Box<dyn Error>> {
    match Path::new(filename).extension().and_then(|ext| ext.to_str()) {
        Some("ppm") => save_to_ppm(film, filename),
        _ => save_to_png(film, filename),
    }
}

fn save_to_png(film: &Film, filename: &str) -> Result<(), Box<dyn Error>> {
    let mut encoder = Encoder::new(
        BufWriter::new(File::create(Path::new(filename))?),
        film.screen_width,
        film.screen_height,
    );

    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.write_header()?.write_image_data(&film.to_rgb8())?;

    Ok(())
}

fn save_to_ppm(film: &Film, filename: &str) -> Result<(), Box<dyn Error>> {
    let mut writer = BufWriter::new(File::create(Path::new(filename))?);

    writeln!(writer, "P3")?;
    writeln!(writer, "{} {}", film.screen_width, film.screen_height)?;
    writeln!(writer, "255")?;
    for value in film.to_rgb8() {
        writeln!(writer, "{}", value)?;
    }

    Ok(())
}
