//! Running independent targets in parallel.

use anyhow::{Context, Result, bail};
use rayon::{ThreadPoolBuilder, prelude::*};

/// Result of a parallel batch operation.
#[derive(Debug, Default)]
pub struct BatchResult {
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchResult {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }

    pub fn ok_or_bail(&self, operation: &str) -> Result<()> {
        if self.failed > 0 {
            bail!("{operation} failed: {} succeeded, {} failed", self.succeeded, self.failed);
        }
        Ok(())
    }
}

/// Process items in parallel with consistent error reporting.
///
/// A failing item does not stop the others; its error chain is printed.
pub fn process_parallel_iter<T, R, F>(
    label: &str,
    items: impl IntoIterator<Item = T>,
    op: F,
) -> Result<BatchResult>
where
    T: Send,
    R: Send,
    F: Fn(T) -> Result<R> + Sync,
{
    let items: Vec<T> = items.into_iter().collect();
    let results: Vec<_> = items.into_par_iter().map(&op).collect();

    let mut result = BatchResult::default();
    for r in &results {
        if let Err(e) = r {
            eprintln!("{e:?}");
            result.failed += 1;
        } else {
            result.succeeded += 1;
        }
    }

    println!("{label}: {} succeeded, {} failed", result.succeeded, result.failed);
    Ok(result)
}

/// Run `f` on a pool of `jobs` threads, or on the global pool.
pub fn with_jobs<R: Send>(jobs: Option<usize>, f: impl FnOnce() -> R + Send) -> Result<R> {
    match jobs {
        Some(jobs) => {
            let pool = ThreadPoolBuilder::new()
                .num_threads(jobs)
                .build()
                .with_context(|| format!("Failed to start {jobs} worker threads"))?;
            Ok(pool.install(f))
        }
        None => Ok(f()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failures_are_counted() {
        let result = process_parallel_iter("Square", 0..5, |n: i32| {
            if n == 3 { bail!("no threes") } else { Ok(n * n) }
        })
        .unwrap();
        assert_eq!(result.total(), 5);
        assert_eq!(result.failed, 1);
        assert!(!result.all_succeeded());
        assert!(result.ok_or_bail("Square").is_err());
    }

    #[test]
    fn test_with_jobs() {
        assert_eq!(with_jobs(Some(2), rayon::current_num_threads).unwrap(), 2);
        assert_eq!(with_jobs(None, || 7).unwrap(), 7);
    }
}
