// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

use robolang::ast::*;
use robolang::lex::TokenKind;
use robolang::parse::{self, Error, ParseErrorKind, MAX_NESTING};
use robolang::registry::FunctionTable;

fn functions() -> FunctionTable {
    FunctionTable::with_names(vec!["move", "wait", "print"])
}

fn parse(src: &str) -> Function {
    parse::parse(src, &functions()).unwrap()
}

fn procedure(cmd: &Command) -> &str {
    match cmd {
        Command::Procedure(p) => &p.text,
        other => panic!("expected a procedure, got {:?}", other),
    }
}

#[test]
fn test_if_with_decrement() {
    let func = parse("func f(var x) { if (x > 0) { x = x - 1; } }");
    assert_eq!(func.name, "f");
    assert_eq!(func.params, vec![Param { name: "x".into(), dims: 0, init: None }]);
    assert_eq!(func.body.len(), 1);
    match &func.body.commands[0] {
        Command::If(i) => {
            assert_eq!(i.condition, "x > 0");
            assert_eq!(i.then_block.len(), 1);
            assert_eq!(procedure(&i.then_block.commands[0]), "x = x - 1;");
            assert!(i.else_block.is_empty());
        }
        other => panic!("expected an if, got {:?}", other),
    }
}

#[test]
fn test_coalescing() {
    let func = parse("func f() { a = 1; b = 2; }");
    assert_eq!(func.body.len(), 1);
    assert_eq!(procedure(&func.body.commands[0]), "a = 1; b = 2;");

    // empty statements do not break the chain
    let func = parse("func f() { a = 1; ; var b; }");
    assert_eq!(func.body.len(), 1);
    assert_eq!(procedure(&func.body.commands[0]), "a = 1; var b;");

    let func = parse("func f() { a = 1; if (a) { } b = 2; }");
    assert_eq!(func.body.len(), 3);
    assert_eq!(procedure(&func.body.commands[0]), "a = 1;");
    assert!(matches!(func.body.commands[1], Command::If(_)));
    assert_eq!(procedure(&func.body.commands[2]), "b = 2;");

    // calls and nested blocks break the chain as well
    let func = parse("func f() { a = 1; wait(1); b = 2; { c = 3; } d = 4; }");
    assert_eq!(func.body.len(), 5);
    assert_eq!(procedure(&func.body.commands[0]), "a = 1;");
    assert_eq!(procedure(&func.body.commands[2]), "b = 2;");
    match &func.body.commands[3] {
        Command::Block(b) => {
            assert_eq!(b.len(), 1);
            assert_eq!(procedure(&b.commands[0]), "c = 3;");
        }
        other => panic!("expected a block, got {:?}", other),
    }
    assert_eq!(procedure(&func.body.commands[4]), "d = 4;");
}

#[test]
fn test_function_calls() {
    let func = parse("func f() {\n  move(10,  -20 );\n  x = 1;\n}");
    assert_eq!(func.body.len(), 2);
    assert_eq!(func.body.commands[0],
               Command::Call(FunctionCall { name: "move".into(), args: "10,  -20".into() }));
    assert_eq!(procedure(&func.body.commands[1]), "x = 1;");

    let func = parse("func f() { print(\"a  b\", 1+2); wait(); }");
    assert_eq!(func.body.commands[0],
               Command::Call(FunctionCall { name: "print".into(), args: "\"a  b\", 1+2".into() }));
    assert_eq!(func.body.commands[1],
               Command::Call(FunctionCall { name: "wait".into(), args: "".into() }));

    // comments around the arguments are not part of them
    let func = parse("func f() {\n  move(1 // speed\n  );\n  wait( /* none */ );\n}");
    assert_eq!(func.body.commands[0],
               Command::Call(FunctionCall { name: "move".into(), args: "1".into() }));
    assert_eq!(func.body.commands[1],
               Command::Call(FunctionCall { name: "wait".into(), args: "".into() }));

    // a call that is only part of a statement stays in the text
    let func = parse("func f() { x = wait(5); }");
    assert_eq!(procedure(&func.body.commands[0]), "x = wait ( 5 );");
}

#[test]
fn test_custom_factory() {
    let mut table = FunctionTable::new();
    table.register("turn", |args: &str| FunctionCall { name: "rotate".into(), args: args.to_uppercase() });
    let func = parse::parse("func f() { turn(left); }", &table).unwrap();
    assert_eq!(func.body.commands[0],
               Command::Call(FunctionCall { name: "rotate".into(), args: "LEFT".into() }));
}

#[test]
fn test_unknown_function() {
    for src in &[
        "func f() { foo(1,2); }",
        "func f() { x = foo(1); }",
        "func f() { if (foo(1)) { } }",
        "func f() { while (x < 3) { foo(); } }",
    ] {
        match parse::parse(src, &functions()) {
            Err(Error::Parse(e)) => {
                assert_eq!(e.kind, ParseErrorKind::UnknownFunction("foo".into()));
                assert!(e.to_string().ends_with("Invalid function call: foo"));
                assert_eq!(&src[e.start..e.end], "foo");
            }
            other => panic!("{}: expected unknown function error, got {:?}", src, other),
        }
    }
}

#[test]
fn test_failed_assignment_lookahead() {
    // the first statement is tried as an assignment, which fails at `==`
    let func = parse("func f() { move(1) == 2; move(3); a[i] = b.c; }");
    assert_eq!(func.body.len(), 3);
    assert_eq!(procedure(&func.body.commands[0]), "move ( 1 ) == 2;");
    assert_eq!(func.body.commands[1],
               Command::Call(FunctionCall { name: "move".into(), args: "3".into() }));
    assert_eq!(procedure(&func.body.commands[2]), "a [ i ] = b . c;");

    // deep nesting must not blow up
    let deep = format!("func f() {{ x = {}1{}; }}", "(".repeat(40), ")".repeat(40));
    let func = parse(&deep);
    assert_eq!(func.body.len(), 1);
}

#[test]
fn test_expressions() {
    let func = parse(r#"func f() {
        x = -a++ * ~b << 2 >>> 1 | c ^ d & e;
        y = !(p && q) || r != s;
        s = "a b\n";
        z = 0x1F + 1.5e3 - .5f % 7L;
        ++i;
        a = b = c;
    }"#);
    assert_eq!(procedure(&func.body.commands[0]),
               "x = - a ++ * ~ b << 2 >>> 1 | c ^ d & e; y = ! ( p && q ) || r != s; \
                s = \"a b\\n\"; z = 0x1F + 1.5e3 - .5f % 7L; ++ i; a = b = c;");
}

#[test]
fn test_control_flow() {
    let func = parse("func f() {
        if (a) b = 1; else if (c) d = 2; else { e = 3; }
        while (x) { break; continue; }
        return x + 1;
    }");
    assert_eq!(func.body.len(), 3);
    match &func.body.commands[0] {
        Command::If(i) => {
            assert_eq!(procedure(&i.then_block.commands[0]), "b = 1;");
            match &i.else_block.commands[0] {
                Command::If(inner) => {
                    assert_eq!(inner.condition, "c");
                    assert_eq!(procedure(&inner.else_block.commands[0]), "e = 3;");
                }
                other => panic!("expected an if, got {:?}", other),
            }
        }
        other => panic!("expected an if, got {:?}", other),
    }
    match &func.body.commands[1] {
        Command::While(w) => {
            assert_eq!(w.condition, "x");
            assert_eq!(w.body.len(), 1);
            assert_eq!(procedure(&w.body.commands[0]), "break; continue;");
        }
        other => panic!("expected a while, got {:?}", other),
    }
    assert_eq!(procedure(&func.body.commands[2]), "return x + 1;");

    // dangling else binds to the inner if
    let func = parse("func f() { if (a) if (b) x = 1; else x = 2; }");
    match &func.body.commands[0] {
        Command::If(i) => {
            assert!(i.else_block.is_empty());
            assert!(matches!(&i.then_block.commands[0], Command::If(inner) if inner.else_block.len() == 1));
        }
        other => panic!("expected an if, got {:?}", other),
    }
}

#[test]
fn test_params_and_declarations() {
    let func = parse("func g(var a, b[][] = [1, [2, 3],], var c = 3) { var m[] = [], n = c * 2; }");
    assert_eq!(func.params, vec![
        Param { name: "a".into(), dims: 0, init: None },
        Param { name: "b".into(), dims: 2, init: Some("[ 1 , [ 2 , 3 ] , ]".into()) },
        Param { name: "c".into(), dims: 0, init: Some("3".into()) },
    ]);
    assert_eq!(procedure(&func.body.commands[0]), "var m [ ] = [ ] , n = c * 2;");

    let func = parse("func f() { speeds = [1, 2]; }");
    assert_eq!(procedure(&func.body.commands[0]), "speeds = [ 1 , 2 ];");

    let func = parse("func empty() { }");
    assert!(func.params.is_empty());
    assert!(func.body.is_empty());
}

#[test]
fn test_error_position() {
    match parse::parse("func f() {\n  x = ;\n}", &functions()) {
        Err(Error::Parse(e)) => {
            assert_eq!((e.line, e.column), (2, 7));
            match e.kind {
                ParseErrorKind::Syntax { found, expected } => {
                    assert_eq!(found.kind, TokenKind::Semicolon);
                    assert!(expected.contains(&TokenKind::Identifier));
                    assert!(expected.contains(&TokenKind::LBracket));
                }
                other => panic!("expected a syntax error, got {:?}", other),
            }
        }
        other => panic!("expected a parse error, got {:?}", other),
    }

    // the expected set does not depend on the rewound assignment attempt
    match parse::parse("func f() { (a) b; }", &functions()) {
        Err(Error::Parse(e)) => match e.kind {
            ParseErrorKind::Syntax { found, expected } => {
                assert_eq!(found.image, "b");
                for kind in &[TokenKind::LBracket, TokenKind::Dot, TokenKind::LParen,
                              TokenKind::Assign, TokenKind::Incr, TokenKind::Plus,
                              TokenKind::OrOr, TokenKind::Semicolon] {
                    assert!(expected.contains(kind), "{} missing", kind);
                }
            }
            other => panic!("expected a syntax error, got {:?}", other),
        },
        other => panic!("expected a parse error, got {:?}", other),
    }

    match parse::parse("func f() { x = 1 }", &functions()) {
        Err(e @ Error::Parse(_)) => {
            assert_eq!(e.line_col(), (1, 18));
            assert!(e.to_string().contains("expected"));
        }
        other => panic!("expected a parse error, got {:?}", other),
    }
}

#[test]
fn test_invalid() {
    for snippet in &[
        "",                                 // no function at all
        "func () { }",                      // missing name
        "func f( { }",                      // unclosed parameter list
        "func f(var) { }",                  // parameter without name
        "func f() { x = ; }",               // missing value
        "func f() { x = 1 }",               // missing semicolon
        "func f() { if x > 0 { } }",        // condition without parens
        "func f() { while (x) }",           // missing loop body
        "func f() { else { } }",            // else without if
        "func f() { var ; }",               // declaration without name
        "func f() { a.(1); }",              // member access without name
        "func f() { }  func g() { }",       // trailing input
        "func f() { x = \"abc; }",          // unterminated string
        "func f() { /* }",                  // unterminated comment
        "func f() { x = @; }",              // invalid character
        "func f() { unknown(1); }",         // unknown function
    ] {
        assert!(parse::parse(snippet, &functions()).is_err(), "{:?} should not parse", snippet);
    }
}

#[test]
fn test_nesting_limit() {
    let n = 5000;
    for src in &[
        format!("func f() {{ x = {}1{}; }}", "(".repeat(n), ")".repeat(n)),
        format!("func f() {{ x = {}1; }}", "-".repeat(n)),
        format!("func f() {{ {} }}", "{".repeat(n)),
        format!("func f() {{ {} x = 1; }}", "if (a) ".repeat(n)),
        format!("func f(var a[] = {}) {{ }}", "[".repeat(n)),
    ] {
        match parse::parse(src, &functions()) {
            Err(Error::Parse(e)) => {
                assert_eq!(e.kind, ParseErrorKind::TooDeep);
                assert!(e.to_string().contains("nested too deeply"));
            }
            other => panic!("expected a nesting error, got {:?}", other),
        }
    }

    // just below the limit still parses
    let depth = MAX_NESTING - 10;
    let src = format!("func f() {{ x = {}1{}; }}", "(".repeat(depth / 2), ")".repeat(depth / 2));
    assert_eq!(parse(&src).body.len(), 1);
}
