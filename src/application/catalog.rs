//! Built-in recursive functions for the command line.

use crate::domain::tracer::Frame;

/// Recursive functions the CLI can trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Demo {
    Fib,
    Factorial,
    Binomial,
    PowerSet,
    Climb,
}

impl Demo {
    pub const ALL: [Demo; 5] = [
        Demo::Fib,
        Demo::Factorial,
        Demo::Binomial,
        Demo::PowerSet,
        Demo::Climb,
    ];

    /// Parse a demo name (CLI input).
    pub fn from_name(s: &str) -> Option<Demo> {
        match s.to_lowercase().as_str() {
            "fib" | "fibonacci" => Some(Demo::Fib),
            "factorial" | "fact" => Some(Demo::Factorial),
            "binomial" | "choose" => Some(Demo::Binomial),
            "power-set" | "powerset" | "subsets" => Some(Demo::PowerSet),
            "climb" | "stairs" => Some(Demo::Climb),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Demo::Fib => "fib",
            Demo::Factorial => "factorial",
            Demo::Binomial => "binomial",
            Demo::PowerSet => "power-set",
            Demo::Climb => "climb",
        }
    }

    /// Names of the top-level arguments.
    pub fn params(&self) -> &'static [&'static str] {
        match self {
            Demo::Binomial => &["n", "k"],
            _ => &["n"],
        }
    }
}

/// Naive Fibonacci.
pub fn fib(f: &mut Frame<'_, u64, u64>, n: &u64) -> u64 {
    if *n < 2 {
        *n
    } else {
        f.call(n - 1) + f.call(n - 2)
    }
}

/// Factorial; fails once the product no longer fits in a `u128`.
pub fn factorial(f: &mut Frame<'_, u64, u128, String>, n: &u64) -> Result<u128, String> {
    if *n == 0 {
        return Ok(1);
    }
    let rest = f.recurse_labeled(n - 1, "n-1")?;
    rest.checked_mul(*n as u128)
        .ok_or_else(|| format!("factorial({}) overflows u128", n))
}

/// `C(n, k)` by Pascal's rule.
pub fn binomial(f: &mut Frame<'_, (u32, u32), u64>, args: &(u32, u32)) -> u64 {
    let (n, k) = *args;
    if k > n {
        0
    } else if k == 0 || k == n {
        1
    } else {
        f.call_labeled((n - 1, k - 1), "take") + f.call_labeled((n - 1, k), "skip")
    }
}

/// Every subset of `i..=n`, extending `chosen`.
pub fn power_set(
    f: &mut Frame<'_, (u32, u32, Vec<u32>), Vec<Vec<u32>>>,
    args: &(u32, u32, Vec<u32>),
) -> Vec<Vec<u32>> {
    let (i, n, chosen) = args;
    if i > n {
        return vec![chosen.clone()];
    }
    let mut with = chosen.clone();
    with.push(*i);
    let mut subsets = f.call_labeled((i + 1, *n, chosen.clone()), "out");
    subsets.extend(f.call_labeled((i + 1, *n, with), "in"));
    subsets
}

/// Ways to climb `n` stairs taking one or two steps at a time.
pub fn climb(f: &mut Frame<'_, u64, u64>, n: &u64) -> u64 {
    match *n {
        0 | 1 => 1,
        n => f.call_labeled(n - 1, "+1") + f.call_labeled(n - 2, "+2"),
    }
}
