#[cfg(test)]
mod tests {
    use crate::core::VndrError;
    use crate::manifest::{
        DependencyEntry, ParseMode, load_config, parse_deps, serialize_deps, suggestion_path,
        write_config,
    };
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    #[test]
    fn test_parse_two_and_three_fields() {
        let deps = parse_deps(
            "github.com/pkg/errors v0.8.0\ngithub.com/docker/docker abc https://github.com/fork/docker.git\n",
            ParseMode::Standard,
        )
        .unwrap();

        assert_eq!(
            deps,
            vec![
                DependencyEntry::new("github.com/pkg/errors", "v0.8.0"),
                DependencyEntry::new("github.com/docker/docker", "abc")
                    .with_override("https://github.com/fork/docker.git"),
            ]
        );
    }

    #[test]
    fn test_comments_and_blank_lines_are_ignored() {
        let commented = "\
# header comment

github.com/a/b v1   # pinned for reasons
   # indented comment
github.com/c/d v2

";
        let plain = "github.com/a/b v1\ngithub.com/c/d v2\n";

        assert_eq!(
            parse_deps(commented, ParseMode::Standard).unwrap(),
            parse_deps(plain, ParseMode::Standard).unwrap()
        );
    }

    #[test]
    fn test_wrong_field_count_names_the_line() {
        let err = parse_deps("github.com/a/b v1\ngithub.com/lonely # no rev\n", ParseMode::Standard)
            .unwrap_err();
        match err {
            VndrError::InvalidConfigFormat {
                line,
            } => assert_eq!(line, "github.com/lonely"),
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(parse_deps("a b c d\n", ParseMode::Standard).is_err());
    }

    #[test]
    fn test_gomod_mode_normalizes_override() {
        let text = "\
golang.org/x/net abc https://github.com/golang/net.git
golang.org/x/sys def git://github.com/golang/sys
golang.org/x/text ghi github.com/golang/text
";
        let deps = parse_deps(text, ParseMode::Gomod).unwrap();
        let overrides: Vec<&str> = deps.iter().map(|d| d.repo_override.as_str()).collect();
        assert_eq!(overrides, vec!["github.com/golang/net", "github.com/golang/sys", "github.com/golang/text"]);

        let standard = parse_deps(text, ParseMode::Standard).unwrap();
        assert_eq!(standard[0].repo_override, "https://github.com/golang/net.git");
    }

    #[test]
    fn test_serialize_round_trip_without_overrides() {
        let entries = vec![
            DependencyEntry::new("github.com/a/b", "v1"),
            DependencyEntry::new("golang.org/x/net", "0123456789abcdef"),
            DependencyEntry::new("gopkg.in/yaml.v2", "v2.2.1"),
        ];
        let text = serialize_deps(&entries);
        assert_eq!(parse_deps(&text, ParseMode::Standard).unwrap(), entries);
    }

    #[test]
    fn test_serialize_drops_override() {
        let entries = vec![DependencyEntry::new("github.com/a/b", "v1").with_override("github.com/fork/b")];
        let text = serialize_deps(&entries);
        assert_eq!(text, "github.com/a/b v1\n");

        let back = parse_deps(&text, ParseMode::Standard).unwrap();
        assert_eq!(back[0].repo_override(), None);
    }

    #[test]
    fn test_load_and_write_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("vendor.conf");

        let err = load_config(&path, ParseMode::Standard).unwrap_err();
        assert!(matches!(err.downcast_ref::<VndrError>(), Some(VndrError::ConfigNotFound { .. })));

        let entries = vec![DependencyEntry::new("github.com/a/b", "v1")];
        write_config(&path, &entries).unwrap();
        assert_eq!(load_config(&path, ParseMode::Standard).unwrap(), entries);
    }

    #[test]
    fn test_malformed_file_keeps_format_error_in_chain() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("vendor.conf");
        std::fs::write(&path, "just-one-field\n").unwrap();

        let err = load_config(&path, ParseMode::Standard).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
        assert!(err.chain().any(|e| matches!(
            e.downcast_ref::<VndrError>(),
            Some(VndrError::InvalidConfigFormat { .. })
        )));
    }

    #[test]
    fn test_suggestion_path_is_a_sibling() {
        assert_eq!(
            suggestion_path(Path::new("/project/vendor.conf")),
            PathBuf::from("/project/vendor.conf.tmp")
        );
    }
}
