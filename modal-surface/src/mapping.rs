use nalgebra as na;
use triangle_rs as mesh;

use crate::{basis::SegmentBasis, ModalSurfaceError, Result};

/// Mesh-to-raster mapping of a segment mode set
///
/// Holds the segment mesh node coordinates and the mode shapes sampled at
/// the nodes, one mode per column. [Mapping::rasterize] interpolates every
/// mode onto a uniform square raster: the mesh is Delaunay triangulated
/// and each raster pixel falling inside a triangle gets the barycentric
/// interpolation of the mode values at the triangle vertices; pixels
/// outside the mesh are zero.
#[derive(Debug, Clone)]
pub struct Mapping {
    x: Vec<f64>,
    y: Vec<f64>,
    z: na::DMatrix<f64>,
}

impl Mapping {
    pub fn new(x: Vec<f64>, y: Vec<f64>, z: na::DMatrix<f64>) -> Result<Self> {
        if x.len() != z.nrows() || y.len() != z.nrows() {
            return Err(ModalSurfaceError::NodesMismatch {
                expected: z.nrows(),
                found: x.len().min(y.len()),
            });
        }
        Ok(Self { x, y, z })
    }
    pub fn n_node(&self) -> usize {
        self.x.len()
    }
    pub fn n_mode(&self) -> usize {
        self.z.ncols()
    }

    /// Interpolates the modes onto a `resolution x resolution` raster
    /// spanning `diameter`, centered on the mirror axis
    ///
    /// The raster is stored column-major per mode, `y` running fastest.
    pub fn rasterize(&self, resolution: usize, diameter: f64) -> Result<SegmentBasis> {
        if resolution < 2 {
            return Err(ModalSurfaceError::Raster(format!(
                "a raster needs at least 2 pixels across, got {resolution}"
            )));
        }
        let n = resolution;
        let n_mode = self.n_mode();
        let delta = diameter / (n - 1) as f64;
        let origin = -0.5 * diameter;

        let nodes: Vec<f64> = self
            .x
            .iter()
            .zip(&self.y)
            .flat_map(|(&x, &y)| vec![x, y])
            .collect();
        let mut builder = mesh::Builder::new();
        builder.add_nodes(&nodes);
        let delaunay = builder.set_switches("Q").build();
        if delaunay.x().len() != self.n_node() {
            return Err(ModalSurfaceError::Raster(format!(
                "triangulation altered the node set: {} nodes in, {} vertices out",
                self.n_node(),
                delaunay.x().len()
            )));
        }

        let mut raster = vec![0f64; n * n * n_mode];
        for t in delaunay.triangle_iter() {
            let (ia, ib, ic) = (t[0], t[1], t[2]);
            let (xa, ya) = (delaunay.x()[ia], delaunay.y()[ia]);
            let (xb, yb) = (delaunay.x()[ib], delaunay.y()[ib]);
            let (xc, yc) = (delaunay.x()[ic], delaunay.y()[ic]);
            let det = (xb - xa) * (yc - ya) - (xc - xa) * (yb - ya);
            if det.abs() < f64::EPSILON * diameter * diameter {
                continue;
            }
            // pixel bounding box of the triangle, clamped to the raster
            let clamp = |v: f64| ((v - origin) / delta).clamp(0., (n - 1) as f64);
            let i0 = clamp(xa.min(xb).min(xc)).floor() as usize;
            let i1 = clamp(xa.max(xb).max(xc)).ceil() as usize;
            let j0 = clamp(ya.min(yb).min(yc)).floor() as usize;
            let j1 = clamp(ya.max(yb).max(yc)).ceil() as usize;
            for ix in i0..=i1 {
                let px = origin + ix as f64 * delta;
                for iy in j0..=j1 {
                    let py = origin + iy as f64 * delta;
                    let wb = ((px - xa) * (yc - ya) - (xc - xa) * (py - ya)) / det;
                    let wc = ((xb - xa) * (py - ya) - (px - xa) * (yb - ya)) / det;
                    let wa = 1. - wb - wc;
                    let eps = 1e-12;
                    if wa >= -eps && wb >= -eps && wc >= -eps {
                        let p = iy + ix * n;
                        for m in 0..n_mode {
                            raster[m * n * n + p] = wa * self.z[(ia, m)]
                                + wb * self.z[(ib, m)]
                                + wc * self.z[(ic, m)];
                        }
                    }
                }
            }
        }
        Ok(SegmentBasis::new(resolution, diameter, n_mode, raster))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 5x5 node grid spanning the raster with z = 1 + 2x + 3y per node:
    // linear interpolation is exact everywhere inside the mesh
    fn planar_mapping(d: f64) -> Mapping {
        let mut x = vec![];
        let mut y = vec![];
        let mut z = vec![];
        for i in 0..5 {
            for j in 0..5 {
                let xn = -d / 2. + d * i as f64 / 4.;
                let yn = -d / 2. + d * j as f64 / 4.;
                x.push(xn);
                y.push(yn);
                z.push(1. + 2. * xn + 3. * yn);
            }
        }
        let n = x.len();
        Mapping::new(x, y, na::DMatrix::from_column_slice(n, 1, &z)).unwrap()
    }

    #[test]
    fn planar_interpolation_is_exact() {
        let d = 2.;
        let n = 16;
        let basis = planar_mapping(d).rasterize(n, d).unwrap();
        let raster = basis.mode(0);
        let delta = d / (n - 1) as f64;
        for ix in 0..n {
            for iy in 0..n {
                let px = -d / 2. + ix as f64 * delta;
                let py = -d / 2. + iy as f64 * delta;
                let expected = 1. + 2. * px + 3. * py;
                let value = raster[iy + ix * n];
                assert!(
                    (value - expected).abs() < 1e-9,
                    "pixel ({ix},{iy}): {value} != {expected}"
                );
            }
        }
    }

    #[test]
    fn outside_pixels_are_zero() {
        // mesh covering only half the raster span
        let d = 2.;
        let n = 16;
        let basis = planar_mapping(d / 2.).rasterize(n, d).unwrap();
        let raster = basis.mode(0);
        // corner pixel is outside the mesh
        assert_eq!(raster[0], 0.);
    }

    #[test]
    fn degenerate_resolution() {
        let mapping = planar_mapping(2.);
        for n in [0, 1] {
            assert!(matches!(
                mapping.rasterize(n, 2.),
                Err(ModalSurfaceError::Raster(_))
            ));
        }
    }

    #[test]
    fn nodes_mismatch() {
        let z = na::DMatrix::<f64>::zeros(4, 1);
        assert!(matches!(
            Mapping::new(vec![0.; 3], vec![0.; 4], z),
            Err(ModalSurfaceError::NodesMismatch { .. })
        ));
    }
}
