//! STL reader for binary and ASCII files.

use crate::error::{Result, ViewerError};
use crate::geometry::mesh::{Mesh, Triangle};
use nalgebra::{Point3, Vector3};
use nom::{
    bytes::complete::tag,
    character::complete::{multispace0, multispace1, not_line_ending},
    multi::many0,
    number::complete::float,
    sequence::preceded,
    IResult,
};
use std::path::Path;

const HEADER_LEN: usize = 80;
const FACET_LEN: usize = 50;

/// Read and parse an STL file.
///
/// Missing files map to [`ViewerError::FileNotFound`]; unparseable content maps to
/// [`ViewerError::Format`] so the control thread can report it.
pub fn load_stl(path: &Path) -> Result<Mesh> {
    let data = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ViewerError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => ViewerError::file_error(format!("Failed to read {}", path.display()), e),
    })?;

    parse_stl(&data).map_err(|message| ViewerError::format(path, message))
}

/// Detect the STL flavour and parse it.
pub fn parse_stl(data: &[u8]) -> std::result::Result<Mesh, String> {
    // Binary files are allowed to start with "solid" too, so ASCII is only a first guess.
    if data.starts_with(b"solid") {
        if let Ok(text) = std::str::from_utf8(data) {
            if let Ok(mesh) = parse_ascii_stl(text) {
                return Ok(mesh);
            }
        }
    }

    parse_binary_stl(data)
}

pub fn parse_binary_stl(data: &[u8]) -> std::result::Result<Mesh, String> {
    if data.len() < HEADER_LEN + 4 {
        return Err("file too small to be a valid STL".to_string());
    }

    let body = &data[HEADER_LEN..];
    let count = u32::from_le_bytes([body[0], body[1], body[2], body[3]]) as usize;
    let facets = &body[4..];

    if facets.len() < count.saturating_mul(FACET_LEN) {
        return Err(format!(
            "header declares {} facets but only {} bytes follow",
            count,
            facets.len()
        ));
    }

    let mut mesh = Mesh::with_capacity(count);
    for chunk in facets.chunks_exact(FACET_LEN).take(count) {
        let normal = read_vec3(&chunk[0..12]);
        let a = read_vec3(&chunk[12..24]);
        let b = read_vec3(&chunk[24..36]);
        let c = read_vec3(&chunk[36..48]);
        // trailing two bytes are the attribute byte count
        mesh.push(Triangle::new(
            normal,
            [Point3::from(a), Point3::from(b), Point3::from(c)],
        ));
    }

    Ok(mesh)
}

fn read_vec3(bytes: &[u8]) -> Vector3<f32> {
    let f = |i: usize| f32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);
    Vector3::new(f(0), f(4), f(8))
}

pub fn parse_ascii_stl(input: &str) -> std::result::Result<Mesh, String> {
    match ascii_solid(input) {
        Ok((_, mesh)) => Ok(mesh),
        Err(e) => Err(format!("failed to parse ASCII STL: {:?}", e)),
    }
}

fn ascii_solid(input: &str) -> IResult<&str, Mesh> {
    let (input, _) = preceded(multispace0, tag("solid"))(input)?;
    let (input, _name) = not_line_ending(input)?;
    let (input, triangles) = many0(facet)(input)?;
    let (input, _) = preceded(multispace0, tag("endsolid"))(input)?;

    let mut mesh = Mesh::with_capacity(triangles.len());
    for triangle in triangles {
        mesh.push(triangle);
    }
    Ok((input, mesh))
}

fn facet(input: &str) -> IResult<&str, Triangle> {
    let (input, _) = preceded(multispace0, tag("facet"))(input)?;
    let (input, _) = preceded(multispace1, tag("normal"))(input)?;
    let (input, normal) = vector3(input)?;
    let (input, _) = preceded(multispace0, tag("outer"))(input)?;
    let (input, _) = preceded(multispace1, tag("loop"))(input)?;
    let (input, a) = vertex(input)?;
    let (input, b) = vertex(input)?;
    let (input, c) = vertex(input)?;
    let (input, _) = preceded(multispace0, tag("endloop"))(input)?;
    let (input, _) = preceded(multispace0, tag("endfacet"))(input)?;

    Ok((
        input,
        Triangle::new(normal, [Point3::from(a), Point3::from(b), Point3::from(c)]),
    ))
}

fn vertex(input: &str) -> IResult<&str, Vector3<f32>> {
    let (input, _) = preceded(multispace0, tag("vertex"))(input)?;
    vector3(input)
}

fn vector3(input: &str) -> IResult<&str, Vector3<f32>> {
    let (input, _) = multispace0(input)?;
    let (input, x) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, y) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, z) = float(input)?;
    Ok((input, Vector3::new(x, y, z)))
}
