//! Utility functions for the examples

#![allow(dead_code, unused_imports, unused_macros)]

/// Macros to time code and display a human-readable duration.
pub mod timeit {
    /// Time the evaluation of an expression and print the duration.
    macro_rules! timeit {
        ($name:expr, $code:expr) => {{
            use crate::util::DisplayDuration;
            let start = std::time::Instant::now();
            let r = $code;
            println!(
                "⏱  {}: {}",
                $name,
                DisplayDuration(start.elapsed())
            );
            r
        }};
    }

    /// Time the evaluation of an expression repeated `$loops` times and print
    /// the average duration.
    macro_rules! timeit_n {
        ($name:expr, $loops:expr, $code:expr) => {{
            use crate::util::DisplayDuration;
            let start = std::time::Instant::now();
            let r = $code;
            for _ in 1..$loops {
                let _ = $code;
            }
            println!(
                "⏱  {}: {}",
                $name,
                DisplayDuration(start.elapsed() / $loops)
            );
            r
        }};
    }

    pub(crate) use timeit;
    pub(crate) use timeit_n;
}

/// Wrapper around [`Duration`](std::time::Duration) that displays it in the
/// most natural unit.
pub struct DisplayDuration(pub std::time::Duration);

impl std::fmt::Display for DisplayDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let duration_ns = self.0.as_nanos();
        if duration_ns < 1_000_u128 {
            write!(f, "{duration_ns} ns")
        } else if duration_ns < 1_000_000_u128 {
            write!(f, "{} μs", (duration_ns + 500) / 1_000)
        } else {
            let duration_ms_times_10 = (duration_ns + 50_000) / (100_000);
            write!(f, "{} ms", (duration_ms_times_10 as f64) / 10.0)
        }
    }
}
