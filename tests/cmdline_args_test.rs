//! Tests for command-line argument parsing
//!
//! Note: These tests verify the argument parser configuration by creating
//! a test parser with the same structure as the main binary.

use clap::{Arg, ArgAction, Command as ClapCommand};

/// Create a command with the same argument structure as the main binary
fn create_test_command() -> ClapCommand {
    ClapCommand::new("physio-pose")
        .version("0.1.0")
        .about("Replay recorded face detections through head pose tracking")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("PATH")
                .required_unless_present("print-config")
                .help("Recorded detections to replay"),
        )
        .arg(
            Arg::new("config")
                .short('C')
                .long("config")
                .value_name("PATH")
                .help("Configuration file"),
        )
        .arg(
            Arg::new("exercises")
                .short('e')
                .long("exercises")
                .action(ArgAction::SetTrue)
                .help("Run the exercise routine"),
        )
        .arg(
            Arg::new("print-config")
                .long("print-config")
                .action(ArgAction::SetTrue)
                .help("Print an example configuration"),
        )
        .arg(
            Arg::new("debug")
                .short('d')
                .long("debug")
                .action(ArgAction::SetTrue)
                .help("Enable debug output"),
        )
}

#[test]
fn test_input_required() {
    let result = create_test_command().try_get_matches_from(vec!["physio-pose"]);
    assert!(result.is_err());

    let matches = create_test_command()
        .try_get_matches_from(vec!["physio-pose", "--print-config"])
        .unwrap();
    assert!(matches.get_flag("print-config"));
}

#[test]
fn test_all_arguments() {
    let matches = create_test_command()
        .try_get_matches_from(vec![
            "physio-pose",
            "-i",
            "session.yaml",
            "-C",
            "physio.yaml",
            "--exercises",
            "--debug",
        ])
        .unwrap();

    assert_eq!(matches.get_one::<String>("input").unwrap(), "session.yaml");
    assert_eq!(matches.get_one::<String>("config").unwrap(), "physio.yaml");
    assert!(matches.get_flag("exercises"));
    assert!(matches.get_flag("debug"));
}

#[test]
fn test_flag_defaults() {
    let matches = create_test_command()
        .try_get_matches_from(vec!["physio-pose", "--input", "session.yaml"])
        .unwrap();

    assert!(!matches.get_flag("exercises"));
    assert!(!matches.get_flag("debug"));
    assert!(matches.get_one::<String>("config").is_none());
}

#[test]
fn test_unknown_argument_rejected() {
    let result = create_test_command().try_get_matches_from(vec!["physio-pose", "-i", "a.yaml", "--cam", "0"]);
    assert!(result.is_err());
}
