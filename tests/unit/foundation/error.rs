use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(MoshError::usage("x").to_string().contains("usage error:"));
    assert!(
        MoshError::missing_dependency("x")
            .to_string()
            .contains("missing dependency:")
    );
    assert!(MoshError::fatal_input("x").to_string().contains("input error:"));
    assert!(MoshError::resource("x").to_string().contains("resource error:"));
    assert!(
        MoshError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(MoshError::cancelled("x").to_string().contains("cancelled:"));
}

#[test]
fn collaborator_error_surfaces_invocation_and_full_diagnostics() {
    let err = MoshError::collaborator(
        "sox in.raw out.raw echo 0.8",
        "exit status: 2",
        "sox FAIL echo: usage: gain-in gain-out delay decay [ delay decay ... ]\nsecond line",
    );
    let text = err.to_string();
    assert!(text.starts_with("collaborator error:"));
    assert!(text.contains("sox in.raw out.raw echo 0.8"));
    assert!(text.contains("exit status: 2"));
    assert!(text.contains("gain-in gain-out delay decay"));
    assert!(text.contains("second line"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = MoshError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn only_usage_errors_request_help() {
    assert!(MoshError::usage("missing input").is_usage());
    assert!(!MoshError::fatal_input("unreadable").is_usage());
}
