#[cfg(test)]
mod tests {
    use crate::cli::{normalize_args, Cli, Command, MergeArg};
    use clap::Parser;
    use std::ffi::OsString;
    use std::path::PathBuf;

    fn normalized(args: &[&str]) -> Vec<String> {
        normalize_args(args.iter().copied())
            .into_iter()
            .map(|arg: OsString| arg.to_string_lossy().into_owned())
            .collect()
    }

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(normalize_args(args.iter().copied()))
    }

    #[test]
    fn bare_invocation_builds() {
        assert_eq!(normalized(&["multipage"]), vec!["multipage", "build"]);
        assert!(matches!(parse(&["multipage"]).command, Command::Build(_)));
    }

    #[test]
    fn flags_without_subcommand_build() {
        let cli = parse(&["multipage", "--strategy", "mobile,default", "--debug"]);
        assert!(cli.global.verbose);
        match cli.command {
            Command::Build(args) => assert_eq!(args.strategy, vec!["mobile", "default"]),
            other => panic!("expected build, got {other:?}"),
        }
    }

    #[test]
    fn unknown_build_flags_are_forwarded() {
        assert_eq!(
            normalized(&["multipage", "--mode", "staging", "--page", "home", "--minify"]),
            vec!["multipage", "build", "--page", "home", "--", "--mode", "staging", "--minify"]
        );

        let cli = parse(&["multipage", "build", "--outDir=out", "-m", "page", "--", "--force"]);
        let Command::Build(args) = cli.command else {
            panic!("expected build");
        };
        assert_eq!(args.merge, Some(MergeArg::Page));
        assert_eq!(args.forward, vec!["--outDir=out", "--force"]);
    }

    #[test]
    fn global_flags_before_subcommand_are_kept() {
        let cli = parse(&["multipage", "--cwd", "site", "build", "--timeout", "30"]);
        assert_eq!(cli.global.cwd, Some(PathBuf::from("site")));
        let Command::Build(args) = cli.command else {
            panic!("expected build");
        };
        assert_eq!(args.timeout, Some(30));
        assert!(args.forward.is_empty());
    }

    #[test]
    fn flag_values_are_not_mistaken_for_subcommands() {
        let cli = parse(&["multipage", "--strategy", "dev"]);
        let Command::Build(args) = cli.command else {
            panic!("expected build");
        };
        assert_eq!(args.strategy, vec!["dev"]);
    }

    #[test]
    fn other_subcommands_are_untouched() {
        assert_eq!(
            normalized(&["multipage", "dev", "--port", "3000"]),
            vec!["multipage", "dev", "--port", "3000"]
        );
        let cli = parse(&["multipage", "dev", "--port", "3000", "--strategy", "mobile"]);
        let Command::Dev(args) = cli.command else {
            panic!("expected dev");
        };
        assert_eq!(args.port, 3000);
        assert_eq!(args.host, "127.0.0.1");
        assert_eq!(args.strategy, vec!["mobile"]);
    }

    #[test]
    fn top_level_help_is_left_alone() {
        assert_eq!(normalized(&["multipage", "--help"]), vec!["multipage", "--help"]);
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(normalize_args(["multipage", "-q", "-v"]));
        assert!(result.is_err());
    }

    #[test]
    fn resolve_accepts_unit_path() {
        let cli = parse(&["multipage", "resolve", "--unit", ".temp.mp.default.unit.json"]);
        let Command::Resolve(args) = cli.command else {
            panic!("expected resolve");
        };
        assert_eq!(args.unit, Some(PathBuf::from(".temp.mp.default.unit.json")));
        assert!(!args.manifest);
    }
}
