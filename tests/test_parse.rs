// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

use ngci::error::Error;
use ngci::parse::parse_line;

#[test]
fn test_parse() {
    // input lines arrive downcased with whitespace stripped outside
    // comments; the display form normalizes numbers and spacing
    for (src, display) in [
        // words, block deletion, line numbers
        ("/g1x10y2", "/g1 x10 y2"),
        ("n1g#1x10", "n1 g#1 x10"),
        ("g0x1.y2.5z-.5", "g0 x1 y2.5 z-0.5"),
        // number formats in assignments
        ("#1=+1.#2=1.5#3=-.5", "#1=1 #2=1.5 #3=-0.5"),
        // expressions stay flat; precedence is the evaluator's business
        ("g[[1+2]/3*4-5]", "g[[1+2]/3*4-5]"),
        ("g[sin[0]]", "g[sin[0]]"),
        ("x[atan[1]/[2]]", "x[atan[1]/[2]]"),
        ("x[1and0xor1or0]", "x[1and0xor1or0]"),
        ("x[2**3mod5]", "x[2**3mod5]"),
        // parameter references, also indirect
        ("#1=[1+2]", "#1=[1+2]"),
        ("#[1]=3", "#[1]=3"),
        ("x##2", "x##2"),
        // comments pass through verbatim
        ("g1(Mind The Case)x2", "g1 (Mind The Case) x2"),
    ] {
        let block = parse_line(1, src).unwrap();
        assert_eq!(block.to_string(), display, "for source {:?}", src);
    }
}

#[test]
fn test_roundtrip() {
    // the display form must reparse to itself
    for src in ["/g1x10y2", "g[[1+2]/3*4-5]", "x[atan[#1]/[2]]", "#[1]=[1+2]"] {
        let display = parse_line(1, src).unwrap().to_string();
        let stripped: String = display.chars().filter(|&ch| ch != ' ').collect();
        assert_eq!(parse_line(1, &stripped).unwrap().to_string(), display);
    }
}

#[test]
fn test_invalid() {
    for (snippet, error) in [
        // invalid characters
        ("$", Error::BadCharacterUsed),
        // missing values
        ("gg", Error::BadCharacterUsed),
        // o-words are not part of this dialect
        ("o10", Error::BadCharacterUsed),
        // unclosed expressions are told apart from other syntax trouble
        ("x[1+2", Error::UnclosedExpression),
        ("g[sin[0]", Error::UnclosedExpression),
        // unknown function and operator names
        ("xsinh[1]", Error::BadCharacterUsed),
        ("x[1==2]", Error::BadCharacterUsed),
    ] {
        assert_eq!(parse_line(1, snippet).unwrap_err(), error, "for source {:?}", snippet);
    }
}
