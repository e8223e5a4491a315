//! Help output for the binary and each command.

/// Brief usage for a command, shown with argument errors.
pub fn show_command_usage(command: Option<&str>) {
    match command {
        Some("times" | "t") => log_block_start!("Usage: daybook times [YYYY-MM-DD]"),
        Some("next" | "n") => log_block_start!("Usage: daybook next"),
        Some("status" | "s") => log_block_start!("Usage: daybook status"),
        Some("toggle") => log_block_start!("Usage: daybook toggle <field>"),
        Some("travel") => log_block_start!("Usage: daybook travel"),
        Some("exercise") => log_block_start!("Usage: daybook exercise <type> [minutes]"),
        Some("reading") => log_block_start!("Usage: daybook reading <text> [perspective]"),
        Some("environment" | "env") => log_block_start!("Usage: daybook environment [note]"),
        Some("languages" | "lang") => {
            log_block_start!("Usage: daybook languages <lang,lang> <tool> [activity,activity]")
        }
        Some("reflect") => log_block_start!("Usage: daybook reflect <presence 1-10> [notes]"),
        Some("clear") => log_block_start!(
            "Usage: daybook clear <exercise|reading|languages|environment|reflection>"
        ),
        Some("week" | "w") => log_block_start!("Usage: daybook week"),
        _ => log_block_start!("Usage: daybook [OPTIONS] [COMMAND]"),
    }
}

/// Help for `command`, or general help when `None`.
pub fn run_help_command(command: Option<&str>) {
    match command {
        None => display_general_help(),
        Some("toggle") => display_toggle_help(),
        Some(known) if is_known(known) => {
            log_version!();
            show_command_usage(Some(known));
            log_end!();
        }
        Some(unknown) => {
            log_warning!("Unknown command: {}", unknown);
            display_general_help();
        }
    }
}

fn is_known(command: &str) -> bool {
    matches!(
        command,
        "times"
            | "t"
            | "next"
            | "n"
            | "status"
            | "s"
            | "travel"
            | "exercise"
            | "reading"
            | "environment"
            | "env"
            | "languages"
            | "lang"
            | "reflect"
            | "clear"
            | "week"
            | "w"
    )
}

pub fn display_general_help() {
    log_version!();
    log_block_start!("Usage: daybook [OPTIONS] [COMMAND]");
    log_block_start!("Options:");
    log_indented!("-c, --config <DIR>      Use DIR/daybook.toml and its database");
    log_indented!("-a, --at <DATETIME>     Evaluate at a local time (YYYY-MM-DD HH:MM)");
    log_indented!("-m, --memory            Use a throwaway in-memory store");
    log_indented!("-d, --debug             Show debug output");
    log_indented!("-h, --help              Show help");
    log_indented!("-V, --version           Show version");
    log_block_start!("Commands:");
    log_indented!("status, s               Today's record and what is still pending (default)");
    log_indented!("times, t [DATE]         Prayer times and windows");
    log_indented!("next, n                 The next prayer");
    log_indented!("toggle <field>          Check or uncheck a prayer or hygiene field");
    log_indented!("travel                  Toggle travel mode (lifts every window)");
    log_indented!("exercise <type> [min]   Record exercise");
    log_indented!("reading <text> [view]   Record reading");
    log_indented!("environment [note]      Record a tidy environment");
    log_indented!("languages <l,l> <tool>  Record language practice");
    log_indented!("reflect <1-10> [notes]  Record the evening reflection");
    log_indented!("clear <field>           Reset an ungated field");
    log_indented!("week, w                 This week's totals");
    log_pipe!();
    log_info!("Use 'daybook help <command>' for details on a command.");
    log_end!();
}

fn display_toggle_help() {
    log_version!();
    log_block_start!("toggle - Check or uncheck a time-gated field");
    show_command_usage(Some("toggle"));
    log_block_start!("Fields and windows:");
    log_indented!("fajr                    fajr to sunrise");
    log_indented!("dhuhr, asr, maghrib     prayer time to two hours after");
    log_indented!("isha                    isha to two hours after");
    log_indented!("morning                 fajr to 11:59");
    log_indented!("evening                 maghrib to two hours after isha");
    log_block_start!("Description:");
    log_indented!("Unchecking follows the same windows as checking.");
    log_indented!("With travel mode on, every field can be toggled at any time.");
    log_block_start!("Examples:");
    log_indented!("daybook toggle fajr");
    log_indented!("daybook --at \"2024-06-15 05:30\" toggle morning");
    log_end!();
}
