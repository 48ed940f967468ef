//! JSON region files: `{"polygons": [[exterior, hole, …], …]}` with rings as `[[x, y], …]`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use geo::{LineString, MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};

type Ring = Vec<[f64; 2]>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionFile {
    /// One entry per polygon; the first ring is the exterior, the rest are holes.
    pub polygons: Vec<Vec<Ring>>,
}

impl RegionFile {
    pub fn read(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_slice(&bytes).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }
        fs::write(path, serde_json::to_vec_pretty(self)?)
            .with_context(|| format!("writing {}", path.display()))
    }

    pub fn to_multi_polygon(&self) -> Result<MultiPolygon<f64>> {
        let polys = self
            .polygons
            .iter()
            .enumerate()
            .map(|(i, rings)| {
                let (exterior, holes) = rings
                    .split_first()
                    .with_context(|| format!("polygon {i} has no exterior ring"))?;
                Ok(Polygon::new(
                    LineString::from(exterior.clone()),
                    holes.iter().cloned().map(LineString::from).collect(),
                ))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(MultiPolygon::new(polys))
    }
}

fn ring(ls: &LineString<f64>) -> Ring {
    ls.coords().map(|c| [c.x, c.y]).collect()
}

fn polygon_rings(p: &Polygon<f64>) -> Vec<Ring> {
    std::iter::once(ring(p.exterior()))
        .chain(p.interiors().iter().map(ring))
        .collect()
}

impl From<&MultiPolygon<f64>> for RegionFile {
    fn from(mp: &MultiPolygon<f64>) -> Self {
        Self {
            polygons: mp.0.iter().map(polygon_rings).collect(),
        }
    }
}

impl From<&Polygon<f64>> for RegionFile {
    fn from(p: &Polygon<f64>) -> Self {
        Self {
            polygons: vec![polygon_rings(p)],
        }
    }
}

/// Shapes file: one `RegionFile` per sub-region, in segment order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapesFile {
    pub segments: Vec<RegionFile>,
}
