use super::*;

#[test]
fn build_name_appends_aux_and_suffix() {
    assert_eq!(build_name("fig", "eps", "", false), "fig.eps");
    assert_eq!(build_name("fig", "tex", "_", false), "fig_.tex");
    assert_eq!(build_name("fig", "", "_", false), "fig_");
    assert_eq!(aux_name("dir/fig", "dvi", false), "dir/fig_.dvi");
}

#[test]
fn strip_dir_keeps_only_the_file_name() {
    assert_eq!(build_name("some/dir/fig", "pdf", "", true), "fig.pdf");
}

#[test]
fn out_name_respects_standard_output_and_global_write() {
    let mut s = Settings::default();
    assert_eq!(out_name("out", "eps", true, &s), "-");
    assert_eq!(out_name("a/b", "eps", false, &s), "b.eps");
    s.global_write = true;
    assert_eq!(out_name("a/b", "eps", false, &s), "a/b.eps");
    s.global_write = false;
    s.outname = "a/b".to_string();
    assert_eq!(out_name("a/b", "png", false, &s), "a/b.png");
}

#[test]
fn spaces_become_underscores() {
    assert_eq!(space_to_underscore("my fig 1"), "my_fig_1");
}
