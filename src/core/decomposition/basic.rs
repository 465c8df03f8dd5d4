//! Sinclair and Pauli colour composites

use crate::core::matrix::Matrix3;

/// Linear powers for the red, green and blue channels of a composite
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RgbComposite {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

/// |VV|^2, |HV|^2 and |HH|^2 from a covariance matrix
pub fn sinclair(c3: &Matrix3) -> RgbComposite {
    RgbComposite {
        red: c3.re[2][2],
        green: c3.re[1][1] / 2.0,
        blue: c3.re[0][0],
    }
}

/// |HH-VV|^2/2, 2|HV|^2 and |HH+VV|^2/2 from a coherency matrix
pub fn pauli(t3: &Matrix3) -> RgbComposite {
    RgbComposite {
        red: t3.re[1][1],
        green: t3.re[2][2],
        blue: t3.re[0][0],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::matrix::ScatterMatrix;
    use approx::assert_abs_diff_eq;
    use num_complex::Complex64;

    #[test]
    fn test_channels_from_scattering_matrix() {
        let s = ScatterMatrix::new(
            Complex64::new(1.0, 0.0),
            Complex64::new(0.0, 0.5),
            Complex64::new(0.0, 0.5),
            Complex64::new(-0.5, 0.0),
        );

        let rgb = sinclair(&s.to_c3());
        assert_abs_diff_eq!(rgb.red, 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(rgb.green, 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(rgb.blue, 1.0, epsilon = 1e-12);

        let rgb = pauli(&s.to_t3());
        assert_abs_diff_eq!(rgb.red, 1.125, epsilon = 1e-12);
        assert_abs_diff_eq!(rgb.green, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(rgb.blue, 0.125, epsilon = 1e-12);
        assert_abs_diff_eq!(rgb.red + rgb.green + rgb.blue, s.span(), epsilon = 1e-12);
    }
}
