use clap::{Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    Command::new("edpilot")
        .version(env!("CARGO_PKG_VERSION"))
        .about("GUI test harness for editor extensions")
        .long_about(
            "edpilot launches an editor with an extension in development mode, drives it \
             through the command palette, checks visible text, captures screenshots and \
             cleans up every editor process afterwards.",
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("executable")
                .long("executable")
                .short('e')
                .help("Path to the editor executable (overrides config)")
                .global(true),
        )
        .arg(
            Arg::new("extension")
                .long("extension")
                .short('x')
                .help("Path to the extension under development (default: current directory)")
                .global(true),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        // Probe subcommand
        .subcommand(
            Command::new("probe")
                .about("Check that the editor can be found and run")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Output in JSON format")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("timeout")
                        .long("timeout")
                        .help("Seconds to wait for '--version' to finish (default: 10)")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("10"),
                ),
        )
        // Session subcommand
        .subcommand(
            Command::new("session")
                .about("Launch the editor, run commands, then close it")
                .arg(
                    Arg::new("workspace")
                        .long("workspace")
                        .short('w')
                        .help("Workspace folder to open (default: <extension>/.test-workspace)"),
                )
                .arg(
                    Arg::new("wait-secs")
                        .long("wait-secs")
                        .help("Seconds to wait after spawning before checking the process")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    Arg::new("reuse-window")
                        .long("reuse-window")
                        .help("Do not pass --new-window to the editor")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("wait-extension")
                        .long("wait-extension")
                        .help("Wait for the named extension to finish loading")
                        .value_name("NAME"),
                )
                .arg(
                    Arg::new("command")
                        .long("command")
                        .short('c')
                        .help("Command palette entry to run (repeatable, runs in order)")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("find")
                        .long("find")
                        .help("Text that must be visible in the editor window"),
                )
                .arg(
                    Arg::new("screenshot")
                        .long("screenshot")
                        .short('s')
                        .help("Capture a screenshot with this file name before closing")
                        .value_name("FILE"),
                )
                .arg(
                    Arg::new("no-sweep")
                        .long("no-sweep")
                        .help("Only kill the spawned process tree on close, not every editor instance")
                        .action(ArgAction::SetTrue),
                ),
        )
        // Cleanup subcommand
        .subcommand(
            Command::new("cleanup")
                .about("Kill every running instance of the editor")
                .arg(
                    Arg::new("process-name")
                        .long("process-name")
                        .short('p')
                        .help("Process name to kill (default: configured or executable name)"),
                ),
        )
}
