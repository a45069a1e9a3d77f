use std::env;
use std::io::{self, Read};
use std::path::Path;
use std::process;

use anchorpatch::{parse_rules_from_args, read_text, rewrite_lines, write_atomic, RuleSet};

fn usage() {
    eprintln!(
        "Usage: regionsub [--dry-run] [--stdin] [--end <substring>] <file|-> <start-substring> <rule>...\n\n\
         Rewrites lines inside the region opened by the first line containing\n\
         <start-substring>. Each rule is passed as a separate argv token:\n\
         - s/find/replace/          replace every occurrence of find\n\
         - n/marker/find/replace/   on lines containing marker, edit the NEXT line\n\
         Escapes in rule fields: \\/ \\\\ \\n \\t; the final delimiter is optional.\n\n\
         Without --end the region runs to end of file. With --end, a line\n\
         containing <substring> closes it and a later start marker reopens it.\n\
         With --dry-run, no file is written; stdout shows what would change.\n\
         With --stdin, <file> must be '-' and input is read from stdin;\n\
         output is the entire rewritten text.\n"
    );
}

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut dry_run = false;
    let mut stdin_mode = false;
    let mut end: Option<String> = None;

    let mut idx = 1;
    while idx < args.len() {
        match args[idx].as_str() {
            "--dry-run" => {
                dry_run = true;
                idx += 1;
            }
            "--stdin" => {
                stdin_mode = true;
                idx += 1;
            }
            "--end" => {
                if idx + 1 >= args.len() {
                    eprintln!("error: --end requires a value");
                    usage();
                    process::exit(2);
                }
                end = Some(args[idx + 1].clone());
                idx += 2;
            }
            "--help" | "-h" => {
                usage();
                return;
            }
            s if s.starts_with('-') && s.len() > 1 => {
                eprintln!("error: unknown flag {s}");
                usage();
                process::exit(2);
            }
            _ => break,
        }
    }

    if args.len() - idx < 3 {
        usage();
        process::exit(2);
    }

    let file = args[idx].clone();
    let start = args[idx + 1].clone();

    let rule_args: Vec<String> = args[idx + 2..].iter().cloned().collect();
    let rules = match parse_rules_from_args(&rule_args) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(2);
        }
    };

    let rules = RuleSet { start, end, rules };

    if stdin_mode {
        if file != "-" {
            eprintln!("error: with --stdin, file must be '-' (got '{file}')");
            process::exit(2);
        }

        let mut input = String::new();
        if let Err(e) = io::stdin().read_to_string(&mut input) {
            eprintln!("error: failed to read stdin: {e}");
            process::exit(1);
        }

        let outcome = rewrite_lines(&input, &rules);
        if outcome.region_start.is_none() {
            eprintln!("error: start marker {:?} not found", rules.start);
            process::exit(2);
        }

        print!("{}", outcome.text());
        return;
    }

    // File mode.
    let text = match read_text(Path::new(&file)) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    let outcome = rewrite_lines(&text, &rules);

    let region_start = match outcome.region_start {
        Some(n) => n,
        None => {
            eprintln!("error: start marker {:?} not found; {file} unchanged", rules.start);
            process::exit(2);
        }
    };

    if outcome.modified.is_empty() {
        println!("no changes (region starts at line {region_start}); {file} unchanged");
        return;
    }

    if !dry_run {
        if let Err(e) = write_atomic(Path::new(&file), &outcome.text()) {
            eprintln!("error: failed to write {file}: {e}");
            process::exit(1);
        }
    }

    for &lineno in &outcome.modified {
        println!("{lineno}  {}", outcome.lines[lineno - 1].text);
    }
    println!(
        "rewrote {} line(s) in region starting at line {region_start}",
        outcome.modified.len()
    );
}
