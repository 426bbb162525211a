//! Wavefront object loading.
//!
//! The loader produces de-indexed vertex data: every face corner becomes its
//! own vertex, so the arrays in [`ObjData`] can be uploaded straight into
//! separate vertex buffers and drawn with `draw_arrays`.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use glam::{Vec2, Vec3};

use crate::error::{Error, Result};

/// Parallel arrays of triangle vertices.
///
/// `uvs` and `normals` are either empty or exactly as long as `positions`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjData {
    pub positions: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub normals: Vec<Vec3>,
}

impl ObjData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn has_uvs(&self) -> bool {
        !self.uvs.is_empty()
    }

    pub fn has_normals(&self) -> bool {
        !self.normals.is_empty()
    }

    /// Axis-aligned bounds of all positions, `None` for an empty mesh.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.positions.first()?;
        Some(
            self.positions
                .iter()
                .fold((first, first), |(min, max), p| (min.min(*p), max.max(*p))),
        )
    }
}

impl std::str::FromStr for ObjData {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_obj(s.as_bytes())
    }
}

/// Loads and parses the object file at `path`.
pub fn load_obj(path: impl AsRef<Path>) -> Result<ObjData> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let data = parse_obj(BufReader::new(file)).map_err(|e| match e {
        Error::Io { source, .. } => Error::io(path, source),
        other => other,
    })?;

    log::info!(
        "Loaded {}: {} vertices ({} triangles), uvs: {}, normals: {}",
        path.display(),
        data.vertex_count(),
        data.vertex_count() / 3,
        data.has_uvs(),
        data.has_normals(),
    );
    if let Some((min, max)) = data.bounds() {
        log::debug!("Bounds of {}: {min} .. {max}", path.display());
    }

    Ok(data)
}

/// A face corner with resolved, zero-based indices.
#[derive(Debug, Clone, Copy)]
struct Corner {
    position: usize,
    uv: Option<usize>,
    normal: Option<usize>,
}

/// Parses object text from any buffered reader.
pub fn parse_obj<R: BufRead>(reader: R) -> Result<ObjData> {
    let mut positions: Vec<Vec3> = Vec::new();
    let mut uvs: Vec<Vec2> = Vec::new();
    let mut normals: Vec<Vec3> = Vec::new();

    let mut out = ObjData::default();
    // (has uv, has normal) of the first corner seen; all others must agree.
    let mut layout: Option<(bool, bool)> = None;

    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line.map_err(|e| Error::io("<object>", e))?;
        let content = line.split_once('#').map_or(line.as_str(), |(before, _)| before);

        let mut parts = content.split_whitespace();
        let Some(tag) = parts.next() else {
            continue;
        };

        match tag {
            "v" => {
                let [x, y, z] = parse_floats::<_, 3>(&mut parts, line_no, "v")?;
                positions.push(Vec3::new(x, y, z));
            }
            "vt" => {
                let [u, v] = parse_floats::<_, 2>(&mut parts, line_no, "vt")?;
                uvs.push(Vec2::new(u, v));
            }
            "vn" => {
                let [x, y, z] = parse_floats::<_, 3>(&mut parts, line_no, "vn")?;
                normals.push(Vec3::new(x, y, z));
            }
            "f" => {
                let corners = parts
                    .map(|token| {
                        parse_corner(token, positions.len(), uvs.len(), normals.len(), line_no)
                    })
                    .collect::<Result<Vec<_>>>()?;

                if corners.len() < 3 {
                    return Err(Error::obj(
                        line_no,
                        format!("face needs at least 3 corners, found {}", corners.len()),
                    ));
                }

                for corner in &corners {
                    let this = (corner.uv.is_some(), corner.normal.is_some());
                    match layout {
                        None => layout = Some(this),
                        Some(expected) if expected != this => {
                            return Err(Error::obj(
                                line_no,
                                "faces mix corners with and without uv/normal indices",
                            ));
                        }
                        Some(_) => {}
                    }
                }

                for i in 1..corners.len() - 1 {
                    for corner in [corners[0], corners[i], corners[i + 1]] {
                        out.positions.push(positions[corner.position]);
                        if let Some(uv) = corner.uv {
                            out.uvs.push(uvs[uv]);
                        }
                        if let Some(normal) = corner.normal {
                            out.normals.push(normals[normal]);
                        }
                    }
                }
            }
            other => {
                log::debug!("Ignoring '{other}' directive on line {line_no}");
            }
        }
    }

    if out.positions.is_empty() {
        return Err(Error::NoTriangles);
    }

    Ok(out)
}

fn parse_floats<'a, I: Iterator<Item = &'a str>, const N: usize>(
    parts: &mut I,
    line_no: usize,
    tag: &str,
) -> Result<[f32; N]> {
    let mut values = [0.0; N];
    for (i, value) in values.iter_mut().enumerate() {
        let token = parts
            .next()
            .ok_or_else(|| Error::obj(line_no, format!("'{tag}' needs {N} values, found {i}")))?;
        *value = token
            .parse()
            .map_err(|_| Error::obj(line_no, format!("invalid number '{token}'")))?;
    }
    Ok(values)
}

fn parse_corner(
    token: &str,
    position_count: usize,
    uv_count: usize,
    normal_count: usize,
    line_no: usize,
) -> Result<Corner> {
    let mut split = token.split('/');

    let position = match split.next() {
        Some(value) if !value.is_empty() => resolve_index(value, position_count, line_no)?,
        _ => return Err(Error::obj(line_no, format!("malformed face corner '{token}'"))),
    };
    let uv = match split.next() {
        Some(value) if !value.is_empty() => Some(resolve_index(value, uv_count, line_no)?),
        _ => None,
    };
    let normal = match split.next() {
        Some(value) if !value.is_empty() => Some(resolve_index(value, normal_count, line_no)?),
        _ => None,
    };
    if split.next().is_some() {
        return Err(Error::obj(line_no, format!("malformed face corner '{token}'")));
    }

    Ok(Corner {
        position,
        uv,
        normal,
    })
}

/// Turns a 1-based (or negative, end-relative) index into a zero-based one.
fn resolve_index(token: &str, len: usize, line_no: usize) -> Result<usize> {
    let raw: i64 = token
        .parse()
        .map_err(|_| Error::obj(line_no, format!("invalid index '{token}'")))?;

    let resolved = match raw {
        0 => None,
        r if r > 0 => Some(r - 1),
        r => Some(len as i64 + r),
    };

    match resolved {
        Some(idx) if idx >= 0 && (idx as usize) < len => Ok(idx as usize),
        _ => Err(Error::obj(line_no, format!("index {raw} out of range (have {len})"))),
    }
}
