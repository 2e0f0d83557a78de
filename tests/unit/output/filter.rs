use super::*;

const DVIPS: &str = "%!PS-Adobe-2.0
%%Creator: dvips(k)
%%BoundingBox: 0 0 612 792
%%DocumentPaperSizes: Letter
%%EndComments
TeXDict begin @defspecial
0 0 moveto
@fedspecial end
%%BoundingBox: 1 2 3 4
%%EOF
";

fn run(t: Affine) -> String {
    let mut out = PsFile::new(Vec::new(), false);
    filter_dvips_output(
        DVIPS.as_bytes(),
        &mut out,
        &BBox::new(5.0, 6.0, 105.0, 56.0),
        t,
    )
    .unwrap();
    String::from_utf8(out.close().unwrap()).unwrap()
}

#[test]
fn header_and_first_bounding_box_are_replaced() {
    let s = run(Affine::IDENTITY);
    assert!(s.starts_with("%!PS-Adobe-3.0 EPSF-3.0\n"));
    assert!(s.contains("%%BoundingBox: 5 6 105 56\n"));
    assert!(!s.contains("%%BoundingBox: 0 0 612 792"));
    // Only the first bounding box comment is rewritten.
    assert!(s.contains("%%BoundingBox: 1 2 3 4\n"));
    assert!(!s.contains("DocumentPaperSizes"));
}

#[test]
fn identity_transform_leaves_specials_alone() {
    let s = run(Affine::IDENTITY);
    assert!(!s.contains("gsave"));
    assert!(s.contains("TeXDict begin @defspecial\n0 0 moveto\n@fedspecial end\n"));
}

#[test]
fn nonzero_shift_brackets_specials() {
    let s = run(Affine::translate((10.0, 20.0)));
    assert!(s.contains(
        "TeXDict begin @defspecial\ngsave\n[1 0 0 1 10 20] concat\n0 0 moveto\ngrestore\n@fedspecial end\n"
    ));
}
