//! Averages, throughput and the linear-scaling comparison curve.

use std::collections::BTreeMap;

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::experiment::{ConcurrentRecord, SequentialRecord};

/// Arithmetic mean of elapsed times in microseconds.
pub fn mean<I>(values: I) -> Result<f64>
where
    I: IntoIterator<Item = u64>,
{
    let (count, total) = values
        .into_iter()
        .fold((0usize, 0u128), |(count, total), v| (count + 1, total + v as u128));
    if count == 0 {
        return Err(anyhow!("cannot average an empty set of runs"));
    }
    Ok(total as f64 / count as f64)
}

pub fn sequential_mean(records: &[SequentialRecord]) -> Result<f64> {
    mean(records.iter().map(|r| r.elapsed_usec)).map_err(|_| anyhow!("no sequential runs to average"))
}

/// Runs per microsecond. `None` when the mean is not positive.
pub fn throughput(mean_usec: f64) -> Option<f64> {
    (mean_usec > 0.0).then(|| 1.0 / mean_usec)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupStats {
    pub workers: u32,
    pub samples: usize,
    pub mean_usec: f64,
}

/// `T_C(nw)` for every worker count, ordered by worker count.
pub fn group_by_workers(records: &[ConcurrentRecord]) -> BTreeMap<u32, GroupStats> {
    let mut sums: BTreeMap<u32, (usize, u128)> = BTreeMap::new();
    for record in records {
        let entry = sums.entry(record.workers).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += record.elapsed_usec as u128;
    }
    sums.into_iter()
        .map(|(workers, (samples, total))| {
            (
                workers,
                GroupStats {
                    workers,
                    samples,
                    mean_usec: total as f64 / samples as f64,
                },
            )
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThroughputPoint {
    pub workers: u32,
    pub samples: usize,
    pub mean_usec: f64,
    pub throughput: Option<f64>,
    /// `nw / T_C^{nw=1}`
    pub ideal: Option<f64>,
    /// `T_seq / T_C(nw)`
    pub speedup: Option<f64>,
    pub efficiency: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThroughputAnalysis {
    pub sequential_mean_usec: Option<f64>,
    /// Time the comparison curve is scaled from: the `nw = 1` mean, or the
    /// sequential mean when no single-worker runs exist.
    pub ideal_basis_usec: Option<f64>,
    pub points: Vec<ThroughputPoint>,
}

impl ThroughputAnalysis {
    pub fn from_records(concurrent: &[ConcurrentRecord], sequential_mean_usec: Option<f64>) -> Result<Self> {
        if concurrent.is_empty() {
            return Err(anyhow!("no concurrent runs to analyse"));
        }
        let groups = group_by_workers(concurrent);
        let ideal_basis_usec = groups
            .get(&1)
            .map(|g| g.mean_usec)
            .or(sequential_mean_usec)
            .filter(|basis| *basis > 0.0);

        let points = groups
            .values()
            .map(|group| {
                let nw = group.workers as f64;
                let speedup = sequential_mean_usec
                    .filter(|_| group.mean_usec > 0.0)
                    .map(|seq| seq / group.mean_usec);
                ThroughputPoint {
                    workers: group.workers,
                    samples: group.samples,
                    mean_usec: group.mean_usec,
                    throughput: throughput(group.mean_usec),
                    ideal: ideal_basis_usec.map(|basis| nw / basis),
                    speedup,
                    efficiency: speedup.filter(|_| nw > 0.0).map(|s| s / nw),
                }
            })
            .collect();

        Ok(Self {
            sequential_mean_usec,
            ideal_basis_usec,
            points,
        })
    }

    pub fn max_workers(&self) -> u32 {
        self.points.iter().map(|p| p.workers).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conc(workers: u32, seed: u64, elapsed_usec: u64) -> ConcurrentRecord {
        ConcurrentRecord {
            workers,
            seed,
            elapsed_usec,
        }
    }

    #[test]
    fn test_sequential_mean_of_ten_files() {
        let times = [100, 110, 90, 105, 95, 120, 80, 100, 100, 100];
        let records: Vec<SequentialRecord> = times
            .iter()
            .enumerate()
            .map(|(i, &t)| SequentialRecord {
                seed: i as u64 + 1,
                elapsed_usec: t,
            })
            .collect();
        let expected = times.iter().sum::<u64>() as f64 / 10.0;
        assert_eq!(sequential_mean(&records).unwrap(), expected);
    }

    #[test]
    fn test_mean_of_nothing_is_an_error() {
        assert!(mean(Vec::<u64>::new()).is_err());
        assert!(sequential_mean(&[]).is_err());
    }

    #[test]
    fn test_throughput_is_reciprocal_of_group_mean() {
        let records = vec![conc(1, 1, 400), conc(1, 2, 600), conc(2, 1, 200), conc(2, 2, 300), conc(4, 1, 125)];
        let groups = group_by_workers(&records);
        assert_eq!(groups[&1].mean_usec, 500.0);
        assert_eq!(groups[&2].samples, 2);

        let analysis = ThroughputAnalysis::from_records(&records, None).unwrap();
        for point in &analysis.points {
            assert_eq!(point.throughput, Some(1.0 / groups[&point.workers].mean_usec));
        }
        assert_eq!(analysis.max_workers(), 4);
    }

    #[test]
    fn test_ideal_curve_scales_single_worker_mean() {
        let records = vec![conc(1, 1, 1000), conc(2, 1, 600), conc(4, 1, 400)];
        let analysis = ThroughputAnalysis::from_records(&records, Some(800.0)).unwrap();
        assert_eq!(analysis.ideal_basis_usec, Some(1000.0));
        let ideal: Vec<f64> = analysis.points.iter().map(|p| p.ideal.unwrap()).collect();
        assert_eq!(ideal, vec![0.001, 0.002, 0.004]);

        let four = &analysis.points[2];
        assert_eq!(four.speedup, Some(2.0));
        assert_eq!(four.efficiency, Some(0.5));
    }

    #[test]
    fn test_ideal_curve_falls_back_to_sequential_mean() {
        let records = vec![conc(2, 1, 300), conc(8, 1, 100)];
        let analysis = ThroughputAnalysis::from_records(&records, Some(500.0)).unwrap();
        assert_eq!(analysis.ideal_basis_usec, Some(500.0));
        assert_eq!(analysis.points[0].ideal, Some(2.0 / 500.0));

        let without = ThroughputAnalysis::from_records(&records, None).unwrap();
        assert_eq!(without.ideal_basis_usec, None);
        assert!(without.points.iter().all(|p| p.ideal.is_none() && p.speedup.is_none()));
    }

    #[test]
    fn test_zero_times_have_no_throughput() {
        let analysis = ThroughputAnalysis::from_records(&[conc(1, 1, 0)], Some(0.0)).unwrap();
        let point = &analysis.points[0];
        assert_eq!(point.throughput, None);
        assert_eq!(point.ideal, None);
        assert_eq!(point.speedup, None);
    }

    #[test]
    fn test_empty_concurrent_input_is_an_error() {
        assert!(ThroughputAnalysis::from_records(&[], Some(1.0)).is_err());
    }
}
