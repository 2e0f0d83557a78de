use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        PictorError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        PictorError::config("x")
            .to_string()
            .contains("configuration error:")
    );
    assert!(PictorError::draw("x").to_string().contains("draw error:"));
    assert!(
        PictorError::viewer("x")
            .to_string()
            .contains("viewer unavailable:")
    );
}

#[test]
fn tool_failure_names_the_tool_and_status() {
    let err = PictorError::tool("dvips", 2);
    assert_eq!(err.to_string(), "dvips exited with status 2");
}

#[test]
fn io_errors_are_wrapped_with_their_message() {
    let err: PictorError = std::io::Error::other("boom").into();
    assert!(matches!(err, PictorError::Other(_)));
    assert!(err.to_string().contains("boom"));
}
