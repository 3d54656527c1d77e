use clap::{CommandFactory, Parser};
use nodetree::tooling::cli::{Cli, Commands};

#[test]
fn parse_valid_command_matrix() {
    let cases: Vec<Vec<&str>> = vec![
        vec!["nodetree", "build", "--output", "t.bin", "--dir", "."],
        vec!["nodetree", "build", "-o", "t.bin", "--list", "paths.txt"],
        vec![
            "nodetree", "merge", "-o", "t.bin", "--package", "a=one", "--package", "b=two",
        ],
        vec!["nodetree", "merge", "-o", "t.bin", "--package", "a=one", "--sequential"],
        vec!["nodetree", "ls", "t.bin"],
        vec!["nodetree", "stat", "t.bin", "--format", "json"],
        vec!["nodetree", "show", "t.bin", "a\\b.txt"],
        vec!["nodetree", "--log-level", "debug", "ls", "t.bin"],
        vec!["nodetree", "ls", "t.bin", "--config", "custom.toml"],
    ];

    for args in cases {
        let parsed = Cli::try_parse_from(args.clone());
        assert!(parsed.is_ok(), "expected valid parse for args: {args:?}");
    }
}

#[test]
fn parse_rejects_conflicting_build_sources() {
    let both = Cli::try_parse_from([
        "nodetree", "build", "-o", "t.bin", "--dir", ".", "--list", "p.txt",
    ]);
    assert!(both.is_err());

    let neither = Cli::try_parse_from(["nodetree", "build", "-o", "t.bin"]);
    assert!(neither.is_err());
}

#[test]
fn parse_requires_a_package_for_merge() {
    assert!(Cli::try_parse_from(["nodetree", "merge", "-o", "t.bin"]).is_err());
}

#[test]
fn parse_collects_repeated_packages() {
    let cli = Cli::try_parse_from([
        "nodetree", "merge", "-o", "t.bin", "--package", "a=one", "--package", "b=two",
    ])
    .unwrap();
    match cli.command {
        Commands::Merge { packages, sequential, .. } => {
            assert_eq!(packages, vec!["a=one", "b=two"]);
            assert!(!sequential);
        }
        other => panic!("unexpected command {:?}", other),
    }
}

#[test]
fn help_lists_every_subcommand() {
    let help = Cli::command().render_long_help().to_string();
    for name in ["build", "merge", "ls", "stat", "show"] {
        assert!(help.contains(name), "help should mention {name}");
    }
}
