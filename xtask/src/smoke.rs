//! Correctness smoke script
//!
//! Runs the same short script against every structure, starting each check
//! from a clone of an empty prototype.

use anyhow::{Context, Result, bail, ensure};
use chunkset::prelude::*;
use clap::Args;

/// Arguments for the smoke subcommand
#[derive(Args, Debug)]
pub struct SmokeArgs {
    /// Minimum chunk size for the chunked structures
    #[arg(long, requires = "max")]
    pub min: Option<usize>,

    /// Maximum chunk size for the chunked structures
    #[arg(long, requires = "min")]
    pub max: Option<usize>,
}

impl SmokeArgs {
    fn bounds(&self) -> Result<ChunkBounds> {
        match (self.min, self.max) {
            (Some(min), Some(max)) => {
                ChunkBounds::new(min, max).context("Invalid chunk bounds")
            }
            _ => Ok(ChunkBounds::SMOKE),
        }
    }
}

/// Main entry point for the smoke command
pub fn run(args: &SmokeArgs) -> Result<()> {
    let bounds = args.bounds()?;
    tracing::info!(%bounds, "running smoke script");

    check("array", &ArraySet::new())?;
    check("sorted array", &SortedArraySet::new())?;
    check("chunked set", &ChunkedSet::with_bounds(bounds))?;
    check("multilevel chunked tree", &MultilevelChunkedTree::with_bounds(bounds))?;
    check("balanced tree", &BalancedTree::with_bounds(bounds))?;

    tracing::info!("all structures passed");
    Ok(())
}

fn check<S>(title: &str, prototype: &S) -> Result<()>
where
    S: OrderedSet<i32> + Clone,
{
    script(prototype).with_context(|| format!("{title} failed the smoke script"))?;
    tracing::info!(structure = title, "passed");
    Ok(())
}

fn script<S>(prototype: &S) -> Result<()>
where
    S: OrderedSet<i32> + Clone,
{
    {
        let empty = prototype.clone();
        let mut count = 0;
        empty.enumerate(|_| count += 1);
        ensure!(count == 0, "an empty set visited {count} values during enumeration");
        ensure!(!empty.contains(&1), "an empty set claims to contain 1");
    }

    {
        let mut set = prototype.clone();
        set.insert(1);
        ensure!(set.contains(&1), "1 is absent right after inserting it");
        ensure!(!set.contains(&2), "2 is present although it was never inserted");
        set.erase(&1);
        ensure!(!set.contains(&1), "1 is still present after erasing it");
    }

    {
        let mut set = prototype.clone();
        for value in 0..1000 {
            set.insert(value);
            if !set.contains(&value) {
                bail!("{value} is absent right after inserting it");
            }
        }
        for value in 0..1000 {
            set.erase(&value);
        }
        let mut leftover = 0;
        set.enumerate(|_| leftover += 1);
        ensure!(leftover == 0, "{leftover} values survived erasing everything");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[derive(Clone, Default)]
    struct ForgetfulSet(BTreeSet<i32>);

    impl OrderedSet<i32> for ForgetfulSet {
        fn insert(&mut self, value: i32) {
            if value != 500 {
                self.0.insert(value);
            }
        }

        fn erase(&mut self, value: &i32) {
            self.0.remove(value);
        }

        fn contains(&self, value: &i32) -> bool {
            self.0.contains(value)
        }

        fn enumerate<F: FnMut(&i32)>(&self, visitor: F) {
            self.0.iter().for_each(visitor);
        }
    }

    #[test]
    fn test_reference_set_passes() {
        assert!(script(&BTreeSet::new()).is_ok());
    }

    #[test]
    fn test_lost_insert_is_reported() {
        let error = check("forgetful", &ForgetfulSet::default()).unwrap_err();
        assert_eq!(error.to_string(), "forgetful failed the smoke script");
        assert_eq!(
            error.root_cause().to_string(),
            "500 is absent right after inserting it"
        );
    }

    #[test]
    fn test_mismatched_bounds_are_rejected() {
        let args = SmokeArgs {
            min: Some(19),
            max: Some(10),
        };
        assert!(args.bounds().is_err());
    }
}
