use super::{IntegrationError, IntegrationSeries, Integrator};
use nalgebra::{Point3, Vector3};

/// Explicit velocity-Verlet scheme:
///
/// 1. `x(t+dt) = x(t) + v(t)·dt + ½·a(t)·dt²`
/// 2. `a(t+dt) = f(x(t+dt))`
/// 3. `v(t+dt) = v(t) + ½·(a(t) + a(t+dt))·dt`
#[derive(Debug, Clone, Copy, Default)]
pub struct VelocityVerlet;

impl Integrator for VelocityVerlet {
    fn integrate<F, E>(
        &self,
        mut step_function: F,
        initial_positions: &[Point3<f64>],
        initial_velocities: &[Vector3<f64>],
        step_size: f64,
        step_count: usize,
    ) -> Result<IntegrationSeries, IntegrationError<E>>
    where
        F: FnMut(&[Point3<f64>], f64) -> Result<Vec<Vector3<f64>>, E>,
    {
        let n = initial_positions.len();
        if initial_velocities.len() != n {
            return Err(IntegrationError::InvalidInput(format!(
                "{} positions but {} velocities",
                n,
                initial_velocities.len()
            )));
        }
        if !(step_size.is_finite() && step_size > 0.0) {
            return Err(IntegrationError::InvalidInput(format!(
                "step size must be finite and positive, got {step_size}"
            )));
        }

        let mut evaluation = 0usize;
        let mut accelerations = |x: &[Point3<f64>],
                                 t: f64|
         -> Result<Vec<Vector3<f64>>, IntegrationError<E>> {
            let a = step_function(x, t)
                .map_err(|source| IntegrationError::Step { evaluation, source })?;
            evaluation += 1;
            if a.len() != n {
                return Err(IntegrationError::ShapeMismatch {
                    expected: n,
                    found: a.len(),
                });
            }
            Ok(a)
        };

        let mut series = IntegrationSeries {
            positions: Vec::with_capacity(step_count + 1),
            velocities: Vec::with_capacity(step_count + 1),
            timestamps: Vec::with_capacity(step_count + 1),
        };

        let mut x = initial_positions.to_vec();
        let mut v = initial_velocities.to_vec();
        let mut a = accelerations(&x, 0.0)?;
        series.positions.push(x.clone());
        series.velocities.push(v.clone());
        series.timestamps.push(0.0);

        let half_dt2 = 0.5 * step_size * step_size;
        for step in 1..=step_count {
            let t = step as f64 * step_size;
            for ((xi, vi), ai) in x.iter_mut().zip(&v).zip(&a) {
                *xi += vi * step_size + ai * half_dt2;
            }
            let a_next = accelerations(&x, t)?;
            for ((vi, ai), ai_next) in v.iter_mut().zip(&a).zip(&a_next) {
                *vi += (ai + ai_next) * (0.5 * step_size);
            }
            a = a_next;
            series.positions.push(x.clone());
            series.velocities.push(v.clone());
            series.timestamps.push(t);
        }
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    #[test]
    fn calls_step_function_step_count_plus_one_times() {
        let mut calls = 0;
        let series = VelocityVerlet
            .integrate(
                |x: &[Point3<f64>], _t| {
                    calls += 1;
                    Ok::<_, Infallible>(vec![Vector3::zeros(); x.len()])
                },
                &[Point3::origin()],
                &[Vector3::new(1.0, 0.0, 0.0)],
                0.5,
                4,
            )
            .unwrap();
        assert_eq!(calls, 5);
        assert_eq!(series.num_frames(), 5);
        assert_eq!(series.timestamps, vec![0.0, 0.5, 1.0, 1.5, 2.0]);
        assert_eq!(series.positions[4][0], Point3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn constant_acceleration_is_integrated_exactly() {
        let g = Vector3::new(0.0, -2.0, 0.0);
        let series = VelocityVerlet
            .integrate(
                |x: &[Point3<f64>], _t| Ok::<_, Infallible>(vec![g; x.len()]),
                &[Point3::origin()],
                &[Vector3::zeros()],
                1.0,
                3,
            )
            .unwrap();
        // y = ½ g t², v = g t
        assert!((series.positions[3][0].y + 9.0).abs() < 1e-12);
        assert!((series.velocities[3][0].y + 6.0).abs() < 1e-12);
    }

    #[test]
    fn step_function_error_stops_integration() {
        let mut calls = 0;
        let result = VelocityVerlet.integrate(
            |x: &[Point3<f64>], _t| {
                calls += 1;
                if calls == 3 {
                    Err("boom")
                } else {
                    Ok(vec![Vector3::zeros(); x.len()])
                }
            },
            &[Point3::origin()],
            &[Vector3::zeros()],
            1.0,
            10,
        );
        assert!(matches!(
            result,
            Err(IntegrationError::Step { evaluation: 2, source: "boom" })
        ));
        assert_eq!(calls, 3);
    }

    #[test]
    fn rejects_wrong_acceleration_count_and_bad_step_size() {
        let result = VelocityVerlet.integrate(
            |_: &[Point3<f64>], _t| Ok::<_, Infallible>(vec![]),
            &[Point3::origin()],
            &[Vector3::zeros()],
            1.0,
            1,
        );
        assert!(matches!(
            result,
            Err(IntegrationError::ShapeMismatch { expected: 1, found: 0 })
        ));

        let result = VelocityVerlet.integrate(
            |x: &[Point3<f64>], _t| Ok::<_, Infallible>(vec![Vector3::zeros(); x.len()]),
            &[Point3::origin()],
            &[Vector3::zeros()],
            0.0,
            1,
        );
        assert!(matches!(result, Err(IntegrationError::InvalidInput(_))));
    }
}
