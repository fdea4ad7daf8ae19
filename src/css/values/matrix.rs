//! 4x4 transform matrices.
//!
//! Matrices use column vectors: `m[row][col]`, points transform as `M * p`
//! and the translation lives in the last column. Interpolation decomposes
//! both matrices into translation, scale, skew, perspective and a rotation
//! quaternion, interpolates those and recomposes.

use std::fmt;

/// A 4x4 matrix of `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix4 {
    pub m: [[f64; 4]; 4],
}

impl Default for Matrix4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix4 {
    pub const IDENTITY: Matrix4 = Matrix4 {
        m: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// The 2D affine matrix `matrix(a, b, c, d, e, f)`.
    pub fn from_2d(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self {
            m: [
                [a, c, 0.0, e],
                [b, d, 0.0, f],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Build from 16 values in column-major order, as `matrix3d()` lists them.
    pub fn from_column_major(v: &[f64; 16]) -> Self {
        let mut m = [[0.0; 4]; 4];
        for (col, chunk) in v.chunks_exact(4).enumerate() {
            for (row, value) in chunk.iter().enumerate() {
                m[row][col] = *value;
            }
        }
        Self { m }
    }

    pub fn to_column_major(&self) -> [f64; 16] {
        let mut out = [0.0; 16];
        for col in 0..4 {
            for row in 0..4 {
                out[col * 4 + row] = self.m[row][col];
            }
        }
        out
    }

    pub fn translation(x: f64, y: f64, z: f64) -> Self {
        let mut r = Self::IDENTITY;
        r.m[0][3] = x;
        r.m[1][3] = y;
        r.m[2][3] = z;
        r
    }

    pub fn scale(x: f64, y: f64, z: f64) -> Self {
        let mut r = Self::IDENTITY;
        r.m[0][0] = x;
        r.m[1][1] = y;
        r.m[2][2] = z;
        r
    }

    /// Rotation of `degrees` about the axis `(x, y, z)`.
    ///
    /// A zero axis yields the identity.
    pub fn rotation(x: f64, y: f64, z: f64, degrees: f64) -> Self {
        let len = (x * x + y * y + z * z).sqrt();
        if len == 0.0 {
            return Self::IDENTITY;
        }
        let (x, y, z) = (x / len, y / len, z / len);
        let (s, c) = degrees.to_radians().sin_cos();
        let t = 1.0 - c;
        Self {
            m: [
                [c + x * x * t, x * y * t - z * s, x * z * t + y * s, 0.0],
                [y * x * t + z * s, c + y * y * t, y * z * t - x * s, 0.0],
                [z * x * t - y * s, z * y * t + x * s, c + z * z * t, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// `skew(x, y)` with both angles in degrees.
    pub fn skew(x_degrees: f64, y_degrees: f64) -> Self {
        let mut r = Self::IDENTITY;
        r.m[0][1] = x_degrees.to_radians().tan();
        r.m[1][0] = y_degrees.to_radians().tan();
        r
    }

    /// `perspective(depth)`; a depth of zero means no perspective.
    pub fn perspective(depth: f64) -> Self {
        let mut r = Self::IDENTITY;
        if depth != 0.0 {
            r.m[3][2] = -1.0 / depth;
        }
        r
    }

    /// `self * other`: applies `other` first, then `self`.
    pub fn multiply(&self, other: &Matrix4) -> Matrix4 {
        let mut m = [[0.0; 4]; 4];
        for (row, out_row) in m.iter_mut().enumerate() {
            for (col, out) in out_row.iter_mut().enumerate() {
                *out = (0..4).map(|k| self.m[row][k] * other.m[k][col]).sum();
            }
        }
        Matrix4 { m }
    }

    pub fn transpose(&self) -> Matrix4 {
        let mut m = [[0.0; 4]; 4];
        for (row, out_row) in m.iter_mut().enumerate() {
            for (col, out) in out_row.iter_mut().enumerate() {
                *out = self.m[col][row];
            }
        }
        Matrix4 { m }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Whether the matrix only affects the x/y plane.
    pub fn is_2d(&self) -> bool {
        let m = &self.m;
        m[0][2] == 0.0
            && m[1][2] == 0.0
            && m[2][0] == 0.0
            && m[2][1] == 0.0
            && m[2][2] == 1.0
            && m[2][3] == 0.0
            && m[3][0] == 0.0
            && m[3][1] == 0.0
            && m[3][2] == 0.0
            && m[3][3] == 1.0
    }

    /// Transform a 2D point, dividing by `w`.
    pub fn transform_point(&self, x: f64, y: f64) -> (f64, f64) {
        let m = &self.m;
        let tx = m[0][0] * x + m[0][1] * y + m[0][3];
        let ty = m[1][0] * x + m[1][1] * y + m[1][3];
        let w = m[3][0] * x + m[3][1] * y + m[3][3];
        if w == 0.0 || w == 1.0 {
            (tx, ty)
        } else {
            (tx / w, ty / w)
        }
    }

    pub fn determinant(&self) -> f64 {
        let mut a = self.m;
        let mut det = 1.0;
        for col in 0..4 {
            let Some(pivot) = (col..4).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            else {
                return 0.0;
            };
            if a[pivot][col] == 0.0 {
                return 0.0;
            }
            if pivot != col {
                a.swap(pivot, col);
                det = -det;
            }
            det *= a[col][col];
            for row in col + 1..4 {
                let factor = a[row][col] / a[col][col];
                for k in col..4 {
                    a[row][k] -= factor * a[col][k];
                }
            }
        }
        det
    }

    pub fn is_invertible(&self) -> bool {
        self.determinant().abs() > f64::EPSILON
    }

    /// Gauss-Jordan inverse; `None` for singular matrices.
    pub fn inverse(&self) -> Option<Matrix4> {
        let mut a = self.m;
        let mut inv = Self::IDENTITY.m;
        for col in 0..4 {
            let pivot =
                (col..4).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
            if a[pivot][col].abs() <= f64::EPSILON {
                return None;
            }
            a.swap(pivot, col);
            inv.swap(pivot, col);
            let p = a[col][col];
            for k in 0..4 {
                a[col][k] /= p;
                inv[col][k] /= p;
            }
            for row in 0..4 {
                if row != col {
                    let factor = a[row][col];
                    for k in 0..4 {
                        a[row][k] -= factor * a[col][k];
                        inv[row][k] -= factor * inv[col][k];
                    }
                }
            }
        }
        Some(Matrix4 { m: inv })
    }

    // ── Decomposition ───────────────────────────────────────────────────

    /// Split into interpolable components; `None` for singular matrices.
    pub fn decompose(&self) -> Option<Decomposed> {
        // Work on the row-vector form: translation in the last row.
        let mut m = self.transpose().m;
        if m[3][3] == 0.0 {
            return None;
        }
        let norm = m[3][3];
        for row in m.iter_mut() {
            for v in row.iter_mut() {
                *v /= norm;
            }
        }

        let mut perspective_matrix = Matrix4 { m };
        for row in perspective_matrix.m.iter_mut().take(3) {
            row[3] = 0.0;
        }
        perspective_matrix.m[3][3] = 1.0;
        if !perspective_matrix.is_invertible() {
            return None;
        }

        let perspective = if m[0][3] != 0.0 || m[1][3] != 0.0 || m[2][3] != 0.0 {
            let rhs = [m[0][3], m[1][3], m[2][3], m[3][3]];
            let inv = perspective_matrix.inverse()?;
            let mut p = [0.0; 4];
            for (i, out) in p.iter_mut().enumerate() {
                *out = (0..4).map(|k| inv.m[i][k] * rhs[k]).sum();
            }
            p
        } else {
            [0.0, 0.0, 0.0, 1.0]
        };

        let translate = [m[3][0], m[3][1], m[3][2]];

        let mut row = [
            [m[0][0], m[0][1], m[0][2]],
            [m[1][0], m[1][1], m[1][2]],
            [m[2][0], m[2][1], m[2][2]],
        ];
        let mut scale = [0.0; 3];
        let mut skew = [0.0; 3];

        scale[0] = length(row[0]);
        row[0] = normalize(row[0]);

        skew[0] = dot(row[0], row[1]);
        row[1] = combine(row[1], row[0], 1.0, -skew[0]);
        scale[1] = length(row[1]);
        row[1] = normalize(row[1]);
        skew[0] /= scale[1];

        skew[1] = dot(row[0], row[2]);
        row[2] = combine(row[2], row[0], 1.0, -skew[1]);
        skew[2] = dot(row[1], row[2]);
        row[2] = combine(row[2], row[1], 1.0, -skew[2]);
        scale[2] = length(row[2]);
        row[2] = normalize(row[2]);
        skew[1] /= scale[2];
        skew[2] /= scale[2];

        if dot(row[0], cross(row[1], row[2])) < 0.0 {
            for i in 0..3 {
                scale[i] = -scale[i];
                for v in row[i].iter_mut() {
                    *v = -*v;
                }
            }
        }

        let mut quaternion = [
            0.5 * (1.0 + row[0][0] - row[1][1] - row[2][2]).max(0.0).sqrt(),
            0.5 * (1.0 - row[0][0] + row[1][1] - row[2][2]).max(0.0).sqrt(),
            0.5 * (1.0 - row[0][0] - row[1][1] + row[2][2]).max(0.0).sqrt(),
            0.5 * (1.0 + row[0][0] + row[1][1] + row[2][2]).max(0.0).sqrt(),
        ];
        if row[2][1] > row[1][2] {
            quaternion[0] = -quaternion[0];
        }
        if row[0][2] > row[2][0] {
            quaternion[1] = -quaternion[1];
        }
        if row[1][0] > row[0][1] {
            quaternion[2] = -quaternion[2];
        }

        Some(Decomposed {
            translate,
            scale,
            skew,
            perspective,
            quaternion,
        })
    }

    /// Interpolate between two matrices by decomposition.
    ///
    /// When either side cannot be decomposed the result flips from
    /// `self` to `end` at the midpoint.
    pub fn interpolate(&self, end: &Matrix4, progress: f64) -> Matrix4 {
        match (self.decompose(), end.decompose()) {
            (Some(a), Some(b)) => a.interpolate(&b, progress).recompose(),
            _ => {
                log::debug!("matrix is not decomposable, interpolating discretely");
                if progress < 0.5 {
                    *self
                } else {
                    *end
                }
            }
        }
    }
}

impl fmt::Display for Matrix4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_2d() {
            let m = &self.m;
            write!(
                f,
                "matrix({}, {}, {}, {}, {}, {})",
                m[0][0], m[1][0], m[0][1], m[1][1], m[0][3], m[1][3]
            )
        } else {
            f.write_str("matrix3d(")?;
            for (i, v) in self.to_column_major().iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{v}")?;
            }
            f.write_str(")")
        }
    }
}

/// The interpolable components of a matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decomposed {
    pub translate: [f64; 3],
    pub scale: [f64; 3],
    pub skew: [f64; 3],
    pub perspective: [f64; 4],
    pub quaternion: [f64; 4],
}

impl Decomposed {
    pub fn interpolate(&self, end: &Decomposed, progress: f64) -> Decomposed {
        let mix3 = |a: [f64; 3], b: [f64; 3]| {
            [
                a[0] + (b[0] - a[0]) * progress,
                a[1] + (b[1] - a[1]) * progress,
                a[2] + (b[2] - a[2]) * progress,
            ]
        };
        let mut perspective = [0.0; 4];
        for (i, out) in perspective.iter_mut().enumerate() {
            *out = self.perspective[i] + (end.perspective[i] - self.perspective[i]) * progress;
        }
        Decomposed {
            translate: mix3(self.translate, end.translate),
            scale: mix3(self.scale, end.scale),
            skew: mix3(self.skew, end.skew),
            perspective,
            quaternion: slerp(self.quaternion, end.quaternion, progress),
        }
    }

    pub fn recompose(&self) -> Matrix4 {
        // Row-vector form, transposed back at the end.
        let mut m = Matrix4::IDENTITY;
        for i in 0..4 {
            m.m[i][3] = self.perspective[i];
        }
        for i in 0..4 {
            for j in 0..3 {
                m.m[3][i] += self.translate[j] * m.m[j][i];
            }
        }

        let [x, y, z, w] = self.quaternion;
        let mut rotation = Matrix4::IDENTITY;
        rotation.m[0][0] = 1.0 - 2.0 * (y * y + z * z);
        rotation.m[0][1] = 2.0 * (x * y + z * w);
        rotation.m[0][2] = 2.0 * (x * z - y * w);
        rotation.m[1][0] = 2.0 * (x * y - z * w);
        rotation.m[1][1] = 1.0 - 2.0 * (x * x + z * z);
        rotation.m[1][2] = 2.0 * (y * z + x * w);
        rotation.m[2][0] = 2.0 * (x * z + y * w);
        rotation.m[2][1] = 2.0 * (y * z - x * w);
        rotation.m[2][2] = 1.0 - 2.0 * (x * x + y * y);
        m = rotation.multiply(&m);

        let mut skew = Matrix4::IDENTITY;
        skew.m[1][0] = self.skew[0];
        skew.m[2][0] = self.skew[1];
        skew.m[2][1] = self.skew[2];
        m = skew.multiply(&m);

        for i in 0..3 {
            for j in 0..4 {
                m.m[i][j] *= self.scale[i];
            }
        }
        m.transpose()
    }
}

fn slerp(a: [f64; 4], b: [f64; 4], progress: f64) -> [f64; 4] {
    let product = (a[0] * b[0] + a[1] * b[1] + a[2] * b[2] + a[3] * b[3]).clamp(-1.0, 1.0);
    if product.abs() == 1.0 {
        return a;
    }
    let theta = product.acos();
    let w = (progress * theta).sin() / (1.0 - product * product).sqrt();
    let keep = (progress * theta).cos() - product * w;
    [
        a[0] * keep + b[0] * w,
        a[1] * keep + b[1] * w,
        a[2] * keep + b[2] * w,
        a[3] * keep + b[3] * w,
    ]
}

fn length(v: [f64; 3]) -> f64 {
    dot(v, v).sqrt()
}

fn normalize(v: [f64; 3]) -> [f64; 3] {
    let len = length(v);
    if len == 0.0 {
        v
    } else {
        [v[0] / len, v[1] / len, v[2] / len]
    }
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn combine(a: [f64; 3], b: [f64; 3], ascale: f64, bscale: f64) -> [f64; 3] {
    [
        a[0] * ascale + b[0] * bscale,
        a[1] * ascale + b[1] * bscale,
        a[2] * ascale + b[2] * bscale,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: &Matrix4, b: &Matrix4) {
        for row in 0..4 {
            for col in 0..4 {
                assert!(
                    (a.m[row][col] - b.m[row][col]).abs() < 1e-9,
                    "m[{row}][{col}]: {} != {}",
                    a.m[row][col],
                    b.m[row][col]
                );
            }
        }
    }

    #[test]
    fn translation_moves_points() {
        let m = Matrix4::translation(10.0, 20.0, 0.0);
        assert_eq!(m.transform_point(1.0, 2.0), (11.0, 22.0));
    }

    #[test]
    fn rotation_about_z_is_clockwise_on_screen() {
        let m = Matrix4::rotation(0.0, 0.0, 1.0, 90.0);
        let (x, y) = m.transform_point(1.0, 0.0);
        assert!(x.abs() < 1e-12);
        assert!((y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn multiply_applies_right_operand_first() {
        let t = Matrix4::translation(10.0, 0.0, 0.0);
        let s = Matrix4::scale(2.0, 2.0, 1.0);
        assert_eq!(t.multiply(&s).transform_point(1.0, 1.0), (12.0, 2.0));
        assert_eq!(s.multiply(&t).transform_point(1.0, 1.0), (22.0, 2.0));
    }

    #[test]
    fn column_major_round_trip() {
        let values: [f64; 16] = core::array::from_fn(|i| i as f64);
        assert_eq!(Matrix4::from_column_major(&values).to_column_major(), values);
    }

    #[test]
    fn inverse_of_scale_translate() {
        let m = Matrix4::translation(5.0, -3.0, 0.0).multiply(&Matrix4::scale(2.0, 4.0, 1.0));
        let inv = m.inverse().unwrap();
        assert_close(&m.multiply(&inv), &Matrix4::IDENTITY);
    }

    #[test]
    fn singular_matrix() {
        let m = Matrix4::scale(0.0, 1.0, 1.0);
        assert!(!m.is_invertible());
        assert!(m.inverse().is_none());
        assert!(m.decompose().is_none());
    }

    #[test]
    fn decompose_recompose() {
        let m = Matrix4::translation(3.0, 4.0, 5.0)
            .multiply(&Matrix4::rotation(1.0, 2.0, 3.0, 40.0))
            .multiply(&Matrix4::skew(10.0, 0.0))
            .multiply(&Matrix4::scale(2.0, 3.0, 0.5));
        let d = m.decompose().unwrap();
        assert_close(&d.recompose(), &m);
    }

    #[test]
    fn decompose_recompose_with_perspective() {
        let m = Matrix4::perspective(100.0).multiply(&Matrix4::translation(1.0, 2.0, 3.0));
        assert_close(&m.decompose().unwrap().recompose(), &m);
    }

    #[test]
    fn interpolate_endpoints() {
        let a = Matrix4::rotation(0.0, 0.0, 1.0, 10.0);
        let b = Matrix4::translation(10.0, 0.0, 0.0).multiply(&Matrix4::scale(2.0, 2.0, 1.0));
        assert_close(&a.interpolate(&b, 0.0), &a);
        assert_close(&a.interpolate(&b, 1.0), &b);
    }

    #[test]
    fn interpolate_rotation_halfway() {
        let a = Matrix4::IDENTITY;
        let b = Matrix4::rotation(0.0, 0.0, 1.0, 90.0);
        assert_close(&a.interpolate(&b, 0.5), &Matrix4::rotation(0.0, 0.0, 1.0, 45.0));
    }

    #[test]
    fn print_2d_and_3d() {
        assert_eq!(
            Matrix4::from_2d(1.0, 2.0, 3.0, 4.0, 5.0, 6.0).to_string(),
            "matrix(1, 2, 3, 4, 5, 6)"
        );
        assert!(Matrix4::translation(0.0, 0.0, 1.0)
            .to_string()
            .starts_with("matrix3d(1, 0, 0, 0,"));
    }
}
