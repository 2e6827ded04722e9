use std::{env, fs};

fn main() {
    let filename = env::args().nth(1).expect("file name required");
    let input = fs::read_to_string(&filename).unwrap();

    for (n, line) in input.lines().enumerate() {
        match ngci::parse::parse_line(n + 1, &downcase(line)) {
            Err(e) => eprintln!("{}: parse error: {}", n + 1, e),
            Ok(block) => println!("{}", block),
        }
    }
}

// the session layer normally does this; reproduce it for standalone parsing
fn downcase(line: &str) -> String {
    let mut out = String::new();
    let mut in_comment = false;
    for ch in line.chars() {
        match ch {
            '(' if !in_comment => { in_comment = true; out.push(ch); }
            ')' if in_comment => { in_comment = false; out.push(ch); }
            ' ' | '\t' if !in_comment => {}
            _ if in_comment => out.push(ch),
            _ => out.push(ch.to_ascii_lowercase()),
        }
    }
    out
}
