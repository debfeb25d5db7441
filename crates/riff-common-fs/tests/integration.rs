use riff_common_fs as fs;
use std::path::PathBuf;
use tempfile::tempdir;
use test_case::test_case;

#[test_case("song.RPP", "rpp", true ; "uppercase file")]
#[test_case("song.rpp", "RPP", true ; "uppercase query")]
#[test_case("song.RPP-bak", "rpp", false ; "backup suffix")]
#[test_case("song.RPP.json", "rpp", false ; "double extension")]
#[test_case("RPP", "rpp", false ; "no extension")]
fn test_extension_matching(path: &str, ext: &str, expected: bool) {
    assert_eq!(fs::has_extension(path, ext), expected);
}

#[test]
fn test_atomic_write_round_trip_with_bytes() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("project").join("take.RPP");
    let content = b"<REAPER_PROJECT 0.1\r\n  TEMPO 120 4 4\r\n>\xff\n";

    fs::write_atomic(&target, content).unwrap();

    assert_eq!(fs::read_bytes(&target).unwrap(), content.to_vec());
}

#[test]
fn test_rename_missing_source_is_not_found() {
    let dir = tempdir().unwrap();
    let err = fs::rename(dir.path().join("gone"), dir.path().join("there")).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.path(), dir.path().join("gone"));
}

#[test]
fn test_expand_tilde_leaves_relative_paths() {
    assert_eq!(
        fs::path::expand_tilde("agents/default"),
        Some(PathBuf::from("agents/default"))
    );
}
