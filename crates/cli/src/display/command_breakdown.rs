use emurunner_core::interfaces::LaunchMode;
use emurunner_core::testing::LaunchRecord;

/// The parts of a builder or emulator command line
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CommandParts<'a> {
    pub program: &'a str,
    pub project: Option<&'a str>,
    pub scenario: Vec<&'a str>,
    pub switches: Vec<&'a str>,
    pub operands: Vec<&'a str>,
}

impl<'a> CommandParts<'a> {
    pub fn parse(argv: &'a [String]) -> Self {
        let mut parts = CommandParts::default();
        let Some((program, args)) = argv.split_first() else {
            return parts;
        };
        parts.program = program.as_str();

        let mut i = 0;
        while i < args.len() {
            let arg = args[i].as_str();
            if let Some(project) = arg.strip_prefix("-P") {
                parts.project = Some(project);
            } else if let Some(var) = arg.strip_prefix("-X") {
                parts.scenario.push(var);
            } else if arg == "-ex" && i + 1 < args.len() {
                // gdb command: keep the switch with its value
                parts.switches.push(arg);
                parts.switches.push(&args[i + 1]);
                i += 1;
            } else if arg.starts_with('-') {
                parts.switches.push(arg);
            } else {
                parts.operands.push(arg);
            }
            i += 1;
        }
        parts
    }
}

pub fn print_command_breakdown(argv: &[String]) {
    let parts = CommandParts::parse(argv);

    println!("   🔧 Command breakdown:");
    println!("      • command: {}", parts.program);
    if let Some(project) = parts.project {
        println!("      • project: {project}");
    }
    if !parts.scenario.is_empty() {
        println!("      • scenario: {:?}", parts.scenario);
    }
    if !parts.switches.is_empty() {
        println!("      • switches: {:?}", parts.switches);
    }
    for operand in &parts.operands {
        println!("      • operand: {operand}");
    }
}

/// Print every command a dry run recorded, in launch order
pub fn print_launches(launches: &[LaunchRecord]) {
    if launches.is_empty() {
        println!("No commands would be started");
        return;
    }

    for (index, launch) in launches.iter().enumerate() {
        let mode = match launch.mode {
            LaunchMode::Interactive => "console",
            LaunchMode::Silent => "silent",
        };
        println!("\n{}. [{mode}] {}", index + 1, launch.argv.join(" "));
        print_command_breakdown(&launch.argv);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_emulator_command() {
        let argv = argv(&[
            "arm-eabi-gnatemu",
            "-P/work/demo.gpr",
            "-XMODE=debug",
            "--freeze-on-startup",
            "--gdb=1234",
            "/work/obj/prog",
        ]);
        let parts = CommandParts::parse(&argv);

        assert_eq!(parts.program, "arm-eabi-gnatemu");
        assert_eq!(parts.project, Some("/work/demo.gpr"));
        assert_eq!(parts.scenario, vec!["MODE=debug"]);
        assert_eq!(parts.switches, vec!["--freeze-on-startup", "--gdb=1234"]);
        assert_eq!(parts.operands, vec!["/work/obj/prog"]);
    }

    #[test]
    fn test_parse_gdb_command_keeps_ex_value() {
        let argv = argv(&["gdb", "/work/obj/prog", "-ex", "target remote localhost:1234"]);
        let parts = CommandParts::parse(&argv);

        assert_eq!(parts.operands, vec!["/work/obj/prog"]);
        assert_eq!(parts.switches, vec!["-ex", "target remote localhost:1234"]);
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(CommandParts::parse(&[]), CommandParts::default());
    }
}
