//! Interactive roster shell.
//!
//! On a terminal, commands are read through a line editor with a `roster> ` prompt and history.
//! Piped input is read one command per line without a prompt. Replies go to stdout, logs to
//! stderr.

use std::{
    error::Error,
    io::{self, BufRead, IsTerminal, Write},
    mem,
    process::ExitCode,
};

use clap::{Arg, ArgAction, ArgMatches, Command};
use log::{error, info};
use rustyline::{DefaultEditor, error::ReadlineError};
use roster::{
    Config, ListQuery, RecordError, Roster, SortKey, SortOrder, StudentRecord, Upsert,
    config::{BUCKETS_ENV, LOG_LEVEL_ENV},
    logger::initialize_logger,
};

/// Prompt shown by the line editor
const PROMPT: &str = "roster> ";

/// Whether the shell keeps reading after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    /// Read the next line
    Continue,
    /// Stop the session
    Quit,
}

fn main() -> ExitCode {
    let matches = Command::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .arg(
            Arg::new("buckets")
                .long("buckets")
                .env(BUCKETS_ENV)
                .help("Initial bucket count of the student table")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .env(LOG_LEVEL_ENV)
                .help("Log level (error, warn, info, debug, trace)")
                .default_value("info"),
        )
        .get_matches();

    let config = Config::new(
        matches.get_one::<usize>("buckets").copied(),
        matches.get_one::<String>("log-level").map_or("info", String::as_str),
    );
    initialize_logger(config.log_level);

    let mut roster = match Roster::with_buckets(config.initial_buckets) {
        Ok(roster) => roster,
        Err(err) => {
            error!("Cannot start roster: {err}");
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };
    info!("Roster ready with {} buckets", config.initial_buckets);

    let session = if io::stdin().is_terminal() {
        interactive(&mut roster)
    } else {
        run(&mut roster, io::stdin().lock(), io::stdout().lock()).map_err(Into::into)
    };

    match session {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("Shell stopped: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Grammar of a single shell line
fn shell() -> Command {
    let record_args = |cmd: Command| {
        cmd.arg(Arg::new("ID").required(true).help("Student id"))
            .arg(Arg::new("NAME").required(true).help("Full name"))
            .arg(Arg::new("AGE").required(true).help("Age between 1 and 120"))
            .arg(Arg::new("GRADE").required(true).help("Grade or level"))
            .arg(Arg::new("MAJOR").required(true).help("Major or department"))
    };

    Command::new("roster")
        .no_binary_name(true)
        .subcommand_required(true)
        .disable_version_flag(true)
        .subcommand(record_args(Command::new("add").about("Add a student, replacing one with the same id")))
        .subcommand(record_args(Command::new("edit").about("Edit an existing student")))
        .subcommand(
            Command::new("search")
                .about("Show the student with the given id")
                .arg(Arg::new("ID").required(true)),
        )
        .subcommand(
            Command::new("delete").about("Delete the student with the given id").arg(Arg::new("ID").required(true)),
        )
        .subcommand(
            Command::new("list")
                .about("List students")
                .arg(Arg::new("search").short('q').long("search").help("Case-insensitive search term"))
                .arg(Arg::new("sort-by").long("sort-by").default_value("id").help("id, name, age, grade or major"))
                .arg(Arg::new("order").long("order").default_value("asc").help("asc or desc"))
                .arg(Arg::new("json").long("json").action(ArgAction::SetTrue).help("Print a JSON array")),
        )
        .subcommand(Command::new("stats").about("Show size, bucket count and load factor"))
        .subcommand(Command::new("quit").visible_alias("exit").about("Leave the shell"))
}

/// Reads commands through `rustyline` until `quit`, Ctrl-C or Ctrl-D
fn interactive(roster: &mut Roster) -> Result<(), Box<dyn Error>> {
    let mut grammar = shell();
    let mut editor = DefaultEditor::new()?;
    let mut output = io::stdout();
    println!("Type 'help' for commands");

    loop {
        match editor.readline(PROMPT) {
            Ok(line) => {
                let command = line.trim();
                if command.is_empty() {
                    continue;
                }
                editor.add_history_entry(command)?;

                if handle_line(roster, &mut grammar, command, &mut output)? == Flow::Quit {
                    break;
                }
                output.flush()?;
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}

/// Runs commands from `input` until it ends or `quit` is read
fn run<R: BufRead, W: Write>(roster: &mut Roster, input: R, mut output: W) -> io::Result<()> {
    let mut grammar = shell();

    for line in input.lines() {
        if handle_line(roster, &mut grammar, &line?, &mut output)? == Flow::Quit {
            break;
        }
        output.flush()?;
    }

    Ok(())
}

/// Tokenizes, parses and executes one line
fn handle_line<W: Write>(
    roster: &mut Roster,
    grammar: &mut Command,
    line: &str,
    output: &mut W,
) -> io::Result<Flow> {
    let words = match split_words(line) {
        Ok(words) if words.is_empty() => return Ok(Flow::Continue),
        Ok(words) => words,
        Err(message) => {
            writeln!(output, "error: {message}")?;
            return Ok(Flow::Continue);
        }
    };

    match grammar.try_get_matches_from_mut(words) {
        Ok(matches) => execute(roster, &matches, output),
        Err(err) => {
            write!(output, "{}", err.render())?;
            Ok(Flow::Continue)
        }
    }
}

/// Applies one parsed command to the roster
fn execute<W: Write>(roster: &mut Roster, matches: &ArgMatches, out: &mut W) -> io::Result<Flow> {
    match matches.subcommand() {
        Some(("add", args)) => {
            let [id, name, age, grade, major] = record_fields(args);
            match StudentRecord::from_fields(id, name, age, grade, major) {
                Ok(record) => {
                    let id = record.id.clone();
                    match roster.add(record) {
                        Upsert::Added => writeln!(out, "success: Added student with ID {id}.")?,
                        Upsert::Updated => writeln!(out, "success: Updated existing student with ID {id}.")?,
                    }
                }
                Err(RecordError::MissingField(_)) => writeln!(out, "error: All fields are required.")?,
                Err(err) => writeln!(out, "{}", flash(&err))?,
            }
        }
        Some(("edit", args)) => {
            let [id, name, age, grade, major] = record_fields(args);
            match roster.edit(id, name, age, grade, major) {
                Ok(()) => writeln!(out, "success: Updated student {}.", id.trim())?,
                Err(err) => writeln!(out, "{}", flash(&err))?,
            }
        }
        Some(("search", args)) => match roster.find(text(args, "ID")) {
            Ok(record) => {
                writeln!(out, "{}", header())?;
                writeln!(out, "{record}")?;
            }
            Err(err) => writeln!(out, "{}", flash(&err))?,
        },
        Some(("delete", args)) => {
            let id = text(args, "ID");
            match roster.delete(id) {
                Ok(()) => writeln!(out, "success: Deleted student with ID {}.", id.trim())?,
                Err(err) => writeln!(out, "{}", flash(&err))?,
            }
        }
        Some(("list", args)) => {
            let query = ListQuery {
                search: args.get_one::<String>("search").cloned(),
                sort_by: SortKey::parse_or_default(text(args, "sort-by")),
                order: SortOrder::parse_or_default(text(args, "order")),
            };
            let records = roster.list(&query);

            if args.get_flag("json") {
                serde_json::to_writer(&mut *out, &records)?;
                writeln!(out)?;
            } else if records.is_empty() {
                writeln!(out, "info: No students found.")?;
            } else {
                writeln!(out, "{}", header())?;
                for record in &records {
                    writeln!(out, "{record}")?;
                }
            }
        }
        Some(("stats", _)) => {
            let stats = roster.stats();
            writeln!(
                out,
                "size={} buckets={} load_factor={:.3}",
                stats.size, stats.buckets, stats.load_factor
            )?;
        }
        Some(("quit", _)) => return Ok(Flow::Quit),
        _ => {}
    }

    Ok(Flow::Continue)
}

/// Column titles matching the `Display` layout of `StudentRecord`
fn header() -> String {
    format!("{:<10} {:<20} {:>3} {:<12} {}", "ID", "NAME", "AGE", "GRADE", "MAJOR")
}

/// Value of a required positional argument
fn text<'a>(args: &'a ArgMatches, name: &str) -> &'a str {
    args.get_one::<String>(name).map_or("", String::as_str)
}

/// The five record arguments in declaration order
fn record_fields(args: &ArgMatches) -> [&str; 5] {
    ["ID", "NAME", "AGE", "GRADE", "MAJOR"].map(|name| text(args, name))
}

/// One-line message for a failed command, prefixed with its category
fn flash(err: &RecordError) -> String {
    match err {
        RecordError::NotFound(id) => format!("info: No student found with ID {id}."),
        RecordError::MissingField("student_id") => "error: Student ID is required.".to_string(),
        RecordError::MissingField(_) => "error: All fields are required.".to_string(),
        RecordError::InvalidAge(_) => "error: Age must be a valid positive integer.".to_string(),
        RecordError::Table(err) => format!("error: {err}"),
    }
}

/// Splits a line on whitespace; double quotes group words and may enclose nothing
fn split_words(line: &str) -> Result<Vec<String>, &'static str> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quoted = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                quoted = !quoted;
                in_word = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_word {
                    words.push(mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quoted {
        return Err("unterminated quote");
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(script: &str) -> String {
        let mut roster = Roster::with_buckets(3).unwrap();
        let mut output = Vec::new();
        run(&mut roster, script.as_bytes(), &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_split_words() {
        assert_eq!(split_words("  add S1  Ada ").unwrap(), vec!["add", "S1", "Ada"]);
        assert_eq!(
            split_words(r#"add S1 "Ada Lovelace" 20 "" CS"#).unwrap(),
            vec!["add", "S1", "Ada Lovelace", "20", "", "CS"]
        );
        assert!(split_words("   ").unwrap().is_empty());
        assert_eq!(split_words(r#"add "S1"#), Err("unterminated quote"));
    }

    #[test]
    fn test_add_then_update() {
        let out = session("add S1 Ada 20 Senior CS\nadd S1 Ada 21 Senior CS\n");
        assert_eq!(
            out,
            "success: Added student with ID S1.\nsuccess: Updated existing student with ID S1.\n"
        );
    }

    #[test]
    fn test_validation_messages() {
        let out = session("add S1 Ada 0 Senior CS\nadd S1 \"\" 20 Senior CS\nsearch \"  \"\n");
        assert_eq!(
            out,
            "error: Age must be a valid positive integer.\nerror: All fields are required.\nerror: Student ID is required.\n"
        );
    }

    #[test]
    fn test_add_with_blank_id_asks_for_all_fields() {
        let out = session("add \"\" Ada 20 Senior CS\nadd \" \" Ada 20 Senior CS\ndelete \"\"\n");
        assert_eq!(
            out,
            "error: All fields are required.\nerror: All fields are required.\nerror: Student ID is required.\n"
        );
    }

    #[test]
    fn test_handle_line_skips_blank_and_reports_quotes() {
        let mut roster = Roster::default();
        let mut grammar = shell();
        let mut output = Vec::new();

        assert_eq!(handle_line(&mut roster, &mut grammar, "   ", &mut output).unwrap(), Flow::Continue);
        assert_eq!(handle_line(&mut roster, &mut grammar, "add \"S1", &mut output).unwrap(), Flow::Continue);
        assert_eq!(handle_line(&mut roster, &mut grammar, "exit", &mut output).unwrap(), Flow::Quit);
        assert_eq!(String::from_utf8(output).unwrap(), "error: unterminated quote\n");
        assert!(roster.is_empty());
    }

    #[test]
    fn test_edit_search_delete() {
        let out = session(concat!(
            "edit S1 Ada 20 Senior CS\n",
            "add S1 Ada 20 Senior CS\n",
            "edit S1 \"Ada Lovelace\" 36 Senior Mathematics\n",
            "search S1\n",
            "delete S1\n",
            "delete S1\n",
        ));
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines.first(), Some(&"info: No student found with ID S1."));
        assert_eq!(lines.get(2), Some(&"success: Updated student S1."));
        assert!(lines.get(4).is_some_and(|row| row.contains("Ada Lovelace") && row.contains("Mathematics")));
        assert_eq!(lines.get(5), Some(&"success: Deleted student with ID S1."));
        assert_eq!(lines.get(6), Some(&"info: No student found with ID S1."));
    }

    #[test]
    fn test_list_json_sorted() {
        let out = session(concat!(
            "add S2 bob 21 Senior Math\n",
            "add S1 alice 20 Junior CS\n",
            "list --sort-by age --order desc --json\n",
        ));
        let json = out.lines().last().unwrap();
        let records: Vec<StudentRecord> = serde_json::from_str(json).unwrap();

        assert_eq!(records.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(), vec!["S2", "S1"]);
    }

    #[test]
    fn test_list_empty_and_stats() {
        let out = session("list -q nobody\nstats\n");
        assert_eq!(out, "info: No students found.\nsize=0 buckets=3 load_factor=0.000\n");
    }

    #[test]
    fn test_quit_stops_reading() {
        let out = session("quit\nadd S1 Ada 20 Senior CS\n");
        assert!(out.is_empty());
    }

    #[test]
    fn test_unknown_command_reports_usage() {
        let out = session("frobnicate\n");
        assert!(out.contains("error:"));
    }
}
