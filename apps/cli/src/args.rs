use std::env;

const DEFAULT_WATCH_INTERVAL_SECS: u64 = 300;

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Scan,
    Show,
    Watch { interval_secs: u64 },
}

pub fn parse_args() -> Result<Command, String> {
    parse_from(env::args().skip(1))
}

fn parse_from(mut args: impl Iterator<Item = String>) -> Result<Command, String> {
    let command = match args.next() {
        Some(value) => value,
        None => return Err("missing command".to_string()),
    };

    match command.as_str() {
        "scan" => reject_extra(args).map(|_| Command::Scan),
        "show" => reject_extra(args).map(|_| Command::Show),
        "watch" => {
            let mut interval_secs = DEFAULT_WATCH_INTERVAL_SECS;
            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--interval" => {
                        let value = args
                            .next()
                            .ok_or_else(|| "missing value for --interval".to_string())?;
                        interval_secs = value
                            .parse::<u64>()
                            .map_err(|_| format!("invalid interval value: {value}"))?;
                        if interval_secs == 0 {
                            return Err("interval must be at least 1 second".to_string());
                        }
                    }
                    _ => return Err(format!("unknown argument: {arg}")),
                }
            }
            Ok(Command::Watch { interval_secs })
        }
        "--help" | "-h" => {
            print_help();
            std::process::exit(0);
        }
        _ => Err(format!("unknown command: {command}")),
    }
}

fn reject_extra(mut args: impl Iterator<Item = String>) -> Result<(), String> {
    match args.next() {
        Some(arg) => Err(format!("unknown argument: {arg}")),
        None => Ok(()),
    }
}

pub fn print_help() {
    println!(
        "usagebar\n\n\
Usage:\n  usagebar scan                     Scan logs and refresh the caches\n  usagebar show                     Print cached usage without scanning\n  usagebar watch [--interval <s>]   Scan on a fixed interval until Ctrl+C\n\n\
Options:\n  --interval <s>  Seconds between watch scans (default {DEFAULT_WATCH_INTERVAL_SECS})\n  -h, --help      Show this help message\n"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command, String> {
        parse_from(args.iter().map(|arg| arg.to_string()))
    }

    #[test]
    fn parses_commands() {
        assert_eq!(parse(&["scan"]), Ok(Command::Scan));
        assert_eq!(parse(&["show"]), Ok(Command::Show));
        assert_eq!(
            parse(&["watch"]),
            Ok(Command::Watch { interval_secs: 300 })
        );
        assert_eq!(
            parse(&["watch", "--interval", "30"]),
            Ok(Command::Watch { interval_secs: 30 })
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["frobnicate"]).is_err());
        assert!(parse(&["scan", "--fast"]).is_err());
        assert!(parse(&["watch", "--interval"]).is_err());
        assert!(parse(&["watch", "--interval", "soon"]).is_err());
        assert!(parse(&["watch", "--interval", "0"]).is_err());
    }
}
