mod tests {
    use crate::*;

    #[test]
    fn test_log_and_plot_paths_pass_through() {
        for raw in ["logs/exp-barrier-e5-s1", "plots/barrier.svg", "./report.json"] {
            assert_eq!(sanitize_path(raw).unwrap(), PathBuf::from(raw));
        }
    }

    #[test]
    fn test_dotdot_in_log_dir_is_refused() {
        let err = sanitize_path("logs/../exp-seq-e5-s1").unwrap_err();
        assert!(err.to_string().contains("parent directory component"));
        assert!(err.to_string().contains("logs/../exp-seq-e5-s1"));
        // Dots inside a file name are not a component.
        assert!(sanitize_path("logs/exp..e5").is_ok());
    }

    #[test]
    fn test_trace_setting_values() {
        assert_eq!(TraceSetting::parse(""), TraceSetting::Off);
        assert_eq!(TraceSetting::parse(" OFF "), TraceSetting::Off);
        assert_eq!(TraceSetting::parse("0"), TraceSetting::Off);
        assert_eq!(TraceSetting::parse("on"), TraceSetting::Default);
        assert_eq!(TraceSetting::parse("True"), TraceSetting::Default);
        assert_eq!(
            TraceSetting::parse("oesbench::timer=info"),
            TraceSetting::Filter("oesbench::timer=info".to_string())
        );
        assert_eq!(TraceSetting::Off.filter_directive(), None);
        assert_eq!(
            TraceSetting::Filter("oesbench_core=debug".to_string()).filter_directive(),
            Some("oesbench_core=debug".to_string())
        );
    }

    #[test]
    fn test_cli_args_rejects_parent_dir_in_plot_output() {
        let err = CliArgs::try_parse_from(["oesbench", "plot", "barrier", "--output", "../barrier.svg"]).unwrap_err();
        assert!(err.to_string().contains("parent directory component"));
    }

    #[test]
    fn test_cli_args_rejects_parent_dir_in_sweep_dir() {
        let res = CliArgs::try_parse_from(["oesbench", "sweep", "farm", "--dir", "runs/../../logs"]);
        assert!(res.is_err());
    }

    #[test]
    fn test_cli_args_sort_defaults() {
        let args = CliArgs::try_parse_from(["oesbench", "sort", "async"]).expect("should parse");
        match args.command {
            Commands::Sort {
                variant,
                workers,
                exponent,
                seed,
                blocks,
            } => {
                assert_eq!(variant, "async");
                assert_eq!(workers, 1);
                assert_eq!(exponent, None);
                assert_eq!(seed, 1);
                assert_eq!(blocks, None);
            }
            other => panic!("expected sort command, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_args_global_config_after_subcommand() {
        let args =
            CliArgs::try_parse_from(["oesbench", "variants", "--config", "bench.toml"]).expect("should parse");
        assert_eq!(args.config.as_deref(), Some(Path::new("bench.toml")));
        assert!(matches!(args.command, Commands::Variants));
    }

    #[test]
    fn test_baseline_flags_conflict() {
        let res = CliArgs::try_parse_from(["oesbench", "summary", "barrier", "--baseline", "seq", "--no-baseline"]);
        assert!(res.is_err());
    }

    #[test]
    fn test_resolve_selection_uses_config_then_flags() {
        let config = BenchConfig::from_toml_str("[experiment]\ndir = \"logs\"\nexponent = 6\nseeds = \"1..=3\"\n")
            .expect("config should parse");
        let args = CliArgs::try_parse_from(["oesbench", "summary", "barrier", "--seeds", "2,4"]).expect("should parse");
        let Commands::Summary { experiment, .. } = args.command else {
            panic!("expected summary command");
        };
        let selection = resolve_selection(&experiment, &config).expect("selection");
        assert_eq!(selection.dir, PathBuf::from("logs"));
        assert_eq!(selection.exponent, 6);
        assert_eq!(selection.seeds, vec![2, 4]);
        assert_eq!(selection.baseline.as_deref(), Some("seq"));
    }

    #[test]
    fn test_resolve_selection_without_baseline() {
        let args =
            CliArgs::try_parse_from(["oesbench", "plot", "farm", "--no-baseline", "--exponent", "3"]).expect("parse");
        let Commands::Plot { experiment, .. } = args.command else {
            panic!("expected plot command");
        };
        let selection = resolve_selection(&experiment, &BenchConfig::default()).expect("selection");
        assert_eq!(selection.baseline, None);
        assert_eq!(selection.exponent, 3);
        assert_eq!(selection.seeds, (1..=10).collect::<Vec<u64>>());
    }
}
