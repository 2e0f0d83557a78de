use super::*;

#[test]
fn fmt_num_trims_trailing_zeros() {
    assert_eq!(fmt_num(10.0), "10");
    assert_eq!(fmt_num(0.5), "0.5");
    assert_eq!(fmt_num(-128.4), "-128.4");
    assert_eq!(fmt_num(1.0 / 3.0), "0.333333");
}

#[test]
fn fmt_num_never_prints_negative_zero() {
    assert_eq!(fmt_num(-0.0), "0");
    assert_eq!(fmt_num(-0.0000001), "0");
    assert_eq!(fmt_num(f64::NAN), "0");
}

#[test]
fn identity_detection() {
    assert!(is_identity(Affine::IDENTITY));
    assert!(is_identity(Affine::translate((0.0, 0.0))));
    assert!(!is_identity(Affine::translate((1.0, 0.0))));
    assert!(!is_identity(Affine::scale(2.0)));
}

#[test]
fn rgb_components_are_clamped() {
    let c = Rgb::new(1.5, -0.2, 0.25);
    assert_eq!(c, Rgb { r: 1.0, g: 0.0, b: 0.25 });
}
