//! `alias`, `unalias` (spec §4.H step 2).

use super::BuiltinOutcome;
use crate::interpreter::Interpreter;

pub fn alias(args: &[String], interp: &mut Interpreter) -> BuiltinOutcome {
    if args.is_empty() {
        let mut entries: Vec<(String, String)> =
            interp.aliases.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        entries.sort();
        for (name, value) in entries {
            println!("alias {name}='{value}'");
        }
        return BuiltinOutcome::status(0);
    }
    let mut status = 0;
    for arg in args {
        match arg.split_once('=') {
            Some((name, value)) => interp.aliases.define(name, value),
            None => match interp.aliases.get(arg) {
                Some(value) => println!("alias {arg}='{value}'"),
                None => {
                    eprintln!("hash: alias: {arg}: not found");
                    status = 1;
                }
            },
        }
    }
    BuiltinOutcome::status(status)
}

pub fn unalias(args: &[String], interp: &mut Interpreter) -> BuiltinOutcome {
    if args.first().map(String::as_str) == Some("-a") {
        let names: Vec<String> = interp.aliases.iter().map(|(k, _)| k.to_string()).collect();
        for name in names {
            interp.aliases.remove(&name);
        }
        return BuiltinOutcome::status(0);
    }
    let mut status = 0;
    for name in args {
        if !interp.aliases.remove(name) {
            eprintln!("hash: unalias: {name}: not found");
            status = 1;
        }
    }
    BuiltinOutcome::status(status)
}
