use std::env;
use std::io;
use std::path::Path;
use std::process;

use anchorpatch::{insert_block, read_block_from_bufread, read_text, write_atomic, Anchor};

fn usage() {
    eprintln!(
        "Usage: anchorins [--dry-run] <file> <first-pattern> <second-pattern>\n\n\
         Inserts a text block between every adjacent pair of lines where\n\
         <first-pattern> matches one line and <second-pattern> matches the\n\
         next. The block is read from stdin until a line with just '.'\n\
         (as in ex/ed); write '..' for a literal '.' line.\n\n\
         Pairs already separated by the block are reported, not re-inserted.\n\
         With --dry-run, no file is written; stdout shows what would change.\n"
    );
}

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut dry_run = false;

    let mut idx = 1;
    while idx < args.len() {
        match args[idx].as_str() {
            "--dry-run" => {
                dry_run = true;
                idx += 1;
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

    if args.len() - idx != 3 {
        usage();
        process::exit(2);
    }

    let file = args[idx].clone();
    let anchor = match Anchor::new(&args[idx + 1], &args[idx + 2]) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(2);
        }
    };

    let mut stdin = io::stdin().lock();
    let block = match read_block_from_bufread(&mut stdin) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(2);
        }
    };
    if block.is_empty() {
        eprintln!("error: empty text block; nothing to insert");
        process::exit(2);
    }

    let text = match read_text(Path::new(&file)) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    let outcome = insert_block(&text, &anchor, &block);

    if outcome.inserted.is_empty() && outcome.present.is_empty() {
        eprintln!("error: anchor matched no adjacent line pair; {file} unchanged");
        process::exit(2);
    }

    if outcome.inserted.is_empty() {
        println!(
            "block already present at {} location(s); {file} unchanged",
            outcome.present.len()
        );
        return;
    }

    if !dry_run {
        if let Err(e) = write_atomic(Path::new(&file), &outcome.text()) {
            eprintln!("error: failed to write {file}: {e}");
            process::exit(1);
        }
    }

    for &start in &outcome.inserted {
        for k in 0..block.len() {
            let lineno = start + k;
            println!("{lineno}  {}", outcome.lines[lineno - 1].text);
        }
    }

    let mut summary = format!(
        "inserted {} line(s) at {} location(s)",
        block.len() * outcome.inserted.len(),
        outcome.inserted.len()
    );
    if !outcome.present.is_empty() {
        summary.push_str(&format!(
            "; already present at {} location(s)",
            outcome.present.len()
        ));
    }
    println!("{summary}");
}
