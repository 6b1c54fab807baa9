//! `trap` (spec §4.J).

use super::BuiltinOutcome;
use crate::exec::traps::{TrapAction, TrapKey};
use crate::interpreter::Interpreter;

pub fn trap(args: &[String], interp: &mut Interpreter) -> BuiltinOutcome {
    if args.is_empty() {
        for (key, action) in interp.traps.list() {
            if let TrapAction::Command(cmd) = action {
                println!("trap -- '{cmd}' {}", key.display_name());
            }
        }
        return BuiltinOutcome::status(0);
    }
    if args[0] == "-p" {
        for (key, action) in interp.traps.list() {
            if let TrapAction::Command(cmd) = action {
                println!("trap -- '{cmd}' {}", key.display_name());
            }
        }
        return BuiltinOutcome::status(0);
    }

    let (action, specs) = (&args[0], &args[1..]);
    let action = if action == "-" {
        TrapAction::Default
    } else if action.is_empty() {
        TrapAction::Ignore
    } else {
        TrapAction::Command(action.clone())
    };

    if specs.is_empty() {
        eprintln!("hash: trap: usage: trap [-lp] [[arg] signal_spec ...]");
        return BuiltinOutcome::status(2);
    }

    let mut status = 0;
    for spec in specs {
        match TrapKey::parse(spec) {
            Some(key) => interp.traps.set(key, action.clone()),
            None => {
                eprintln!("hash: trap: {spec}: invalid signal specification");
                status = 1;
            }
        }
    }
    BuiltinOutcome::status(status)
}
