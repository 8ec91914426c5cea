use anyhow::{Context, Result, anyhow};

use crate::sort::{SortOptions, Sorter, SorterRegistry, is_sorted};
use crate::workload::{checksum, generate};

/// Outcome of one scenario run, kept so benches can `black_box` it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortRunOutcome {
    pub len: usize,
    pub checksum: i64,
}

/// A scenario with its input vector generated up front.
#[derive(Clone)]
pub struct PreparedSortScenario {
    spec: &'static SortScenario,
    input: Vec<i32>,
    expected: (usize, i64),
}

impl PreparedSortScenario {
    pub fn key(&self) -> &'static str {
        self.spec.key
    }

    pub fn title(&self) -> &'static str {
        self.spec.title
    }

    pub fn variant(&self) -> &'static str {
        self.spec.variant
    }

    pub fn bench_case_name(&self) -> String {
        format!("{}_{}w", self.spec.key, self.spec.workers)
    }

    pub fn options(&self) -> SortOptions {
        let opts = SortOptions::new(self.spec.workers);
        match self.spec.blocks {
            Some(blocks) => opts.with_blocks(blocks),
            None => opts,
        }
    }

    /// Fresh copy of the input; sorting happens in place.
    pub fn input(&self) -> Vec<i32> {
        self.input.clone()
    }

    pub fn run(&self, registry: &SorterRegistry) -> Result<SortRunOutcome> {
        let sorter = registry.get(self.spec.variant)?;
        let mut data = self.input();
        self.run_with(sorter, &mut data)
    }

    /// Sort `data` (a copy of [`Self::input`]) and verify the result.
    pub fn run_with(&self, sorter: &dyn Sorter, data: &mut [i32]) -> Result<SortRunOutcome> {
        sorter
            .sort(data, &self.options())
            .with_context(|| format!("sort scenario '{}' failed", self.spec.key))?;
        if !is_sorted(data) {
            return Err(anyhow!("scenario '{}' produced an unsorted vector", self.spec.key));
        }
        let observed = checksum(data);
        if observed != self.expected {
            return Err(anyhow!(
                "scenario '{}' expected checksum {:?} but observed {:?}",
                self.spec.key,
                self.expected,
                observed
            ));
        }
        Ok(SortRunOutcome {
            len: observed.0,
            checksum: observed.1,
        })
    }
}

#[derive(Debug, Clone)]
struct SortScenario {
    key: &'static str,
    title: &'static str,
    variant: &'static str,
    len: usize,
    seed: u64,
    workers: usize,
    blocks: Option<usize>,
}

static SORT_SCENARIOS: &[SortScenario] = &[
    SortScenario {
        key: "seq_1k",
        title: "Sequential baseline, 1000 integers",
        variant: "seq",
        len: 1_000,
        seed: 1,
        workers: 1,
        blocks: None,
    },
    SortScenario {
        key: "barrier_1k",
        title: "Barrier-synchronised phases",
        variant: "barrier",
        len: 1_000,
        seed: 1,
        workers: 4,
        blocks: None,
    },
    SortScenario {
        key: "parfor_1k",
        title: "Parallel-for per phase",
        variant: "parfor",
        len: 1_000,
        seed: 1,
        workers: 4,
        blocks: None,
    },
    SortScenario {
        key: "async_1k",
        title: "Asynchronous blocks with border invalidation",
        variant: "async",
        len: 1_000,
        seed: 1,
        workers: 4,
        blocks: None,
    },
    SortScenario {
        key: "farm_1k",
        title: "Task farm with feedback scheduling",
        variant: "farm",
        len: 1_000,
        seed: 1,
        workers: 4,
        blocks: Some(16),
    },
];

pub fn prepare_sort_scenarios() -> Vec<PreparedSortScenario> {
    SORT_SCENARIOS
        .iter()
        .map(|spec| {
            let input = generate(spec.len, spec.seed);
            let expected = checksum(&input);
            PreparedSortScenario { spec, input, expected }
        })
        .collect()
}
