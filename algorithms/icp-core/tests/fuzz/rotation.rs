use bolero::check;
use icp_core::kernels::covariance::cross_covariance;
use icp_core::kernels::deviation::deviate;
use icp_core::kernels::mean::mean_regular;
use icp_core::solver::{solve_power_method, solve_svd};
use nalgebra::{UnitQuaternion, Vector3};

const BASE_POINTS: [[f32; 3]; 4] =
    [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 1.0, 1.0]];

fn frame_for(rotation: UnitQuaternion<f32>, scale: f32) -> icp_core::kernels::covariance::CovarianceFrame {
    let m_points: Vec<[f32; 3]> = BASE_POINTS.to_vec();
    let f_points: Vec<[f32; 3]> = m_points
        .iter()
        .map(|p| {
            let rotated = rotation * Vector3::new(p[0], p[1], p[2]) * scale;
            [rotated.x, rotated.y, rotated.z]
        })
        .collect();

    let (f_mean, m_mean) = mean_regular(&f_points, &m_points).unwrap();
    let dev_m = deviate(&m_points, m_mean);
    let dev_f = deviate(&f_points, f_mean);
    cross_covariance(&dev_m, &dev_f, None, 1.0).unwrap()
}

fn axis_and_angle(raw: (i8, i8, i8, i8)) -> UnitQuaternion<f32> {
    let (ax, ay, az, astep) = raw;
    let axis = Vector3::new(f32::from(ax), f32::from(ay), f32::from(az));
    let axis = if axis.norm() < 1e-6 { Vector3::x() } else { axis.normalize() };
    let angle = (f32::from(astep) / 127.0) * core::f32::consts::PI;
    UnitQuaternion::from_axis_angle(&nalgebra::Unit::new_normalize(axis), angle)
}

/// Law 1: every transform produced by either solver variant carries a unit
/// quaternion and a strictly positive scale.
#[test]
fn solved_transforms_are_unit_quaternion_positive_scale() {
    check!().with_type::<(i8, i8, i8, i8)>().for_each(|raw| {
        let rotation = axis_and_angle(*raw);
        let frame = frame_for(rotation, 1.0);

        for step in [solve_svd(&frame, [0.0; 4], [0.0; 4]), solve_power_method(&frame, [0.0; 4], [0.0; 4])] {
            if let Ok(t) = step {
                assert!((t.q.norm() - 1.0).abs() < 1e-5);
                assert!(t.s > 0.0);
            }
        }
    });
}

/// Law 7: SVD and power-method rotations agree to within 1e-4 in quaternion
/// l-infinity distance on non-degenerate `S`.
#[test]
fn svd_and_power_method_agree() {
    check!().with_type::<(i8, i8, i8, i8)>().for_each(|raw| {
        let rotation = axis_and_angle(*raw);
        let frame = frame_for(rotation, 1.0);

        let via_svd = solve_svd(&frame, [0.0; 4], [0.0; 4]);
        let via_power = solve_power_method(&frame, [0.0; 4], [0.0; 4]);

        if let (Ok(a), Ok(b)) = (via_svd, via_power) {
            let diff = (a.q.as_vector() - b.q.as_vector()).abs();
            let diff_flipped = (a.q.as_vector() + b.q.as_vector()).abs();
            let linf = diff.max().min(diff_flipped.max());
            assert!(linf < 1e-3, "linf = {linf}");
        }
    });
}

/// Law 8: equal sigmas give unit scale; `sigma_f = k^2 * sigma_m` gives
/// `s_k = k`.
#[test]
fn recovered_scale_matches_sigma_ratio() {
    check!().with_type::<(i8, i8, i8, i8, u8)>().for_each(|(ax, ay, az, astep, k_raw)| {
        let rotation = axis_and_angle((*ax, *ay, *az, *astep));
        let k = 1.0 + (f32::from(*k_raw) / 255.0) * 3.0;

        let identity_frame = frame_for(rotation, 1.0);
        if let Ok(step) = solve_svd(&identity_frame, [0.0; 4], [0.0; 4]) {
            assert!((step.s - 1.0).abs() < 1e-2, "s = {}", step.s);
        }

        let scaled_frame = frame_for(rotation, k);
        if let Ok(step) = solve_svd(&scaled_frame, [0.0; 4], [0.0; 4]) {
            assert!((step.s - k).abs() < 1e-2 * k, "s = {}, k = {k}", step.s);
        }
    });
}
