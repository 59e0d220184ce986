use std::time::{Duration, Instant};

use setcalc::{Binding, Environment, Expr, OpKind, eval};

fn name(i: usize) -> String {
    let first = (b'A' + (i / 26) as u8) as char;
    let second = (b'A' + (i % 26) as u8) as char;
    format!("{first}{second}")
}

/// Build a chain of deferred bindings, each unioning one element onto the
/// previous name, then time resolving the tail. Deferred bindings re-walk
/// the whole chain on every reference, so this measures the un-memoized
/// resolution cost.
fn bench_deferred_chain(depth: usize, rounds: usize) -> Duration {
    let mut env = Environment::new();
    env.define(name(0), Binding::Value(Expr::set([Expr::Constant(0)])));
    for i in 1..depth {
        env.define(
            name(i),
            Binding::Deferred(Expr::op(
                OpKind::Union,
                Expr::variable(name(i - 1)),
                Expr::set([Expr::Constant(i as i64)]),
            )),
        );
    }

    let tail = Expr::variable(name(depth - 1));
    let start = Instant::now();
    for _ in 0..rounds {
        eval(&tail, &env, true).expect("chain resolves");
    }
    start.elapsed()
}

fn main() {
    println!("Deferred-chain resolution benchmark");
    println!("===================================\n");

    let rounds = 100;
    for depth in [10, 50, 100, 200] {
        let duration = bench_deferred_chain(depth, rounds);
        let per_round = duration.as_micros() / rounds as u128;
        println!("depth {depth:3}: {duration:?} total ({per_round} us/resolve)");
    }
}
