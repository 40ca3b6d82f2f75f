use std::path::PathBuf;

use kiln_util::errors::{FetchError, KilnError};

#[test]
fn test_not_found_display() {
    let err = KilnError::ArtifactNotFound {
        artifact: "com.example:lib:1.0".to_string(),
        locations: "https://repo/a, https://repo/b".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "Artifact com.example:lib:1.0 not found at https://repo/a, https://repo/b"
    );
    assert!(err.is_not_found());
    assert!(err.is_lookup_failure());
}

#[test]
fn test_retrieval_error_keeps_source() {
    let err = KilnError::ArtifactRetrieval {
        artifact: "com.example:lib".to_string(),
        url: "https://repo/lib".to_string(),
        source: FetchError::Status { status: 503 },
    };
    assert!(!err.is_not_found());
    assert!(err.is_lookup_failure());
    let source = std::error::Error::source(&err).unwrap();
    assert_eq!(source.to_string(), "HTTP 503");
}

#[test]
fn test_parsing_error_lists_messages() {
    let err = KilnError::ManifestParsing {
        artifact: "g:a".to_string(),
        url: "https://repo/a.pom".to_string(),
        errors: vec!["unexpected end".to_string(), "bad tag".to_string()],
    };
    assert_eq!(
        err.to_string(),
        "Failed to parse https://repo/a.pom for g:a: unexpected end; bad tag"
    );
    assert!(!err.is_lookup_failure());
}

#[test]
fn test_download_error_names_file() {
    let err = KilnError::Download {
        artifact: "g:a:1.0".to_string(),
        url: "https://repo/a-1.0.jar".to_string(),
        file: PathBuf::from("/tmp/libs/a-1.0.jar"),
        source: FetchError::Transport {
            message: "connection reset".to_string(),
        },
    };
    assert!(err.to_string().contains("/tmp/libs/a-1.0.jar"));
    assert!(err.to_string().contains("https://repo/a-1.0.jar"));
}

#[test]
fn test_io_error_from_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let err: KilnError = io_err.into();
    assert!(matches!(err, KilnError::Io(_)));
}

#[test]
fn test_parent_cycle_shows_chain() {
    let err = KilnError::ParentCycle {
        artifact: "g:a:1".to_string(),
        chain: "g:a:1 -> g:b:1 -> g:a:1".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "Parent manifests of g:a:1 form a cycle: g:a:1 -> g:b:1 -> g:a:1"
    );
    assert!(!err.is_lookup_failure());
}
