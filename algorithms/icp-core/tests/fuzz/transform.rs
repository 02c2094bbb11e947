use bolero::check;
use icp_core::{apply_matrix, apply_quaternion, Point8, Similarity};
use nalgebra::{UnitQuaternion, Vector3};

fn point_from_lanes(lanes: [i16; 6]) -> Point8 {
    Point8::new(
        f32::from(lanes[0]),
        f32::from(lanes[1]),
        f32::from(lanes[2]),
        f32::from(lanes[3]),
        f32::from(lanes[4]),
        f32::from(lanes[5]),
    )
}

/// Law 2: the identity transform is the identity on xyz and bit-exact on
/// the remaining lanes.
#[test]
fn identity_transform_is_a_no_op() {
    check!().with_type::<[i16; 6]>().for_each(|lanes| {
        let point = point_from_lanes(*lanes);
        let out = apply_quaternion(&[point], &Similarity::identity())[0];

        assert!((out.lanes[0] - point.lanes[0]).abs() < 1e-3);
        assert!((out.lanes[1] - point.lanes[1]).abs() < 1e-3);
        assert!((out.lanes[2] - point.lanes[2]).abs() < 1e-3);
        assert_eq!(&out.lanes[3..8], &point.lanes[3..8]);
    });
}

/// Law 3: the quaternion and matrix forms of `apply` agree to within 1e-5
/// relative error on the geometric lanes.
#[test]
fn quaternion_and_matrix_forms_agree() {
    check!()
        .with_type::<([i16; 6], i16, i16, i16, i8)>()
        .for_each(|(lanes, tx, ty, tz, angle_step)| {
            let point = point_from_lanes(*lanes);
            let angle = (f32::from(*angle_step) / 127.0) * core::f32::consts::PI;
            let t = Similarity {
                q: UnitQuaternion::from_axis_angle(&Vector3::z_axis(), angle),
                t: Vector3::new(f32::from(*tx), f32::from(*ty), f32::from(*tz)),
                s: 1.0,
            };

            let via_quat = apply_quaternion(&[point], &t)[0];
            let via_matrix = apply_matrix(&[point], &t.to_matrix4())[0];

            for lane in 0..3 {
                let a = via_quat.lanes[lane];
                let b = via_matrix.lanes[lane];
                let scale = a.abs().max(b.abs()).max(1.0);
                assert!((a - b).abs() / scale < 1e-4, "lane {lane}: {a} vs {b}");
            }
        });
}
