//! Pull-based performance and memory monitoring.
//!
//! The orchestrator samples the monitor between pipeline stages; there are
//! no background timers. Memory pressure is tracked as a state machine over
//! `used / budget`, re-evaluated on every sample (downward recovery after a
//! cleanup is allowed). The monitor never aborts a run itself; it reports
//! signals the orchestrator may escalate.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Source of resident-memory readings. Injected so tests can script
/// pressure scenarios.
pub trait MemoryProbe: Send {
    fn sample(&mut self) -> Option<usize>;
}

/// Probe backed by the process RSS via `memory-stats`.
pub struct SystemMemoryProbe;

impl MemoryProbe for SystemMemoryProbe {
    fn sample(&mut self) -> Option<usize> {
        memory_stats::memory_stats().map(|usage| usage.physical_mem)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MemoryLevel {
    Normal,
    Warning,
    Cleanup,
    Critical,
}

impl MemoryLevel {
    fn from_ratio(ratio: f64) -> Self {
        if ratio >= 0.85 {
            MemoryLevel::Critical
        } else if ratio >= 0.80 {
            MemoryLevel::Cleanup
        } else if ratio >= 0.70 {
            MemoryLevel::Warning
        } else {
            MemoryLevel::Normal
        }
    }
}

/// Result of one sampling step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoryReading {
    pub bytes: usize,
    pub ratio: f64,
    pub level: MemoryLevel,
    /// The Cleanup level was just entered; the caller should run its
    /// reclamation path and report bytes freed.
    pub entered_cleanup: bool,
    /// The Critical level was entered for the first time in this run; the
    /// caller should run its emergency path. Raised at most once per run.
    pub entered_critical: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerformanceSample {
    pub memory_bytes: usize,
    pub ratio: f64,
    pub level: MemoryLevel,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StageTiming {
    pub stage: String,
    pub duration: Duration,
    pub over_budget: bool,
}

/// Memory usage over one run, for the metrics report.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MemoryUsageSummary {
    pub start: usize,
    pub peak: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonitorConfig {
    /// Budget the pressure ratio is computed against.
    pub memory_budget: usize,
    /// Stage durations above this produce a warning, never a failure.
    pub max_stage_duration: Duration,
    /// Rolling sample history length; oldest samples are trimmed.
    pub sample_history: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            memory_budget: 512 * 1024 * 1024,
            max_stage_duration: Duration::from_secs(5),
            sample_history: 64,
        }
    }
}

/// Process-wide monitor shared across runs under a single-writer
/// discipline. Constructor-injected rather than global so tests can use
/// isolated instances.
pub struct PerformanceMonitor {
    config: MonitorConfig,
    probe: Box<dyn MemoryProbe>,
    level: MemoryLevel,
    samples: VecDeque<PerformanceSample>,
    stages: Vec<StageTiming>,
    run_started: Option<Instant>,
    start_memory: usize,
    peak_memory: usize,
    last_memory: usize,
    critical_signalled: bool,
    reclaimed_bytes: usize,
}

impl PerformanceMonitor {
    pub fn new(probe: Box<dyn MemoryProbe>, config: MonitorConfig) -> Self {
        Self {
            config,
            probe,
            level: MemoryLevel::Normal,
            samples: VecDeque::new(),
            stages: Vec::new(),
            run_started: None,
            start_memory: 0,
            peak_memory: 0,
            last_memory: 0,
            critical_signalled: false,
            reclaimed_bytes: 0,
        }
    }

    pub fn with_system_probe(config: MonitorConfig) -> Self {
        Self::new(Box::new(SystemMemoryProbe), config)
    }

    /// Resets per-run tracking. Sample history survives across runs.
    pub fn start_run(&mut self) {
        self.run_started = Some(Instant::now());
        self.stages.clear();
        self.critical_signalled = false;
        self.reclaimed_bytes = 0;
        let bytes = self.probe.sample().unwrap_or(0);
        self.start_memory = bytes;
        self.peak_memory = bytes;
        self.last_memory = bytes;
    }

    /// Takes one memory sample and re-evaluates the pressure level.
    pub fn sample(&mut self) -> MemoryReading {
        let bytes = self.probe.sample().unwrap_or(self.last_memory);
        let ratio = if self.config.memory_budget == 0 {
            0.0
        } else {
            bytes as f64 / self.config.memory_budget as f64
        };
        let level = MemoryLevel::from_ratio(ratio);
        let entered_cleanup = level == MemoryLevel::Cleanup && self.level < MemoryLevel::Cleanup;
        let entered_critical = level == MemoryLevel::Critical && !self.critical_signalled;
        if entered_critical {
            self.critical_signalled = true;
        }
        if level != self.level {
            log::debug!(
                "memory pressure {:?} -> {:?} ({:.0}% of budget)",
                self.level,
                level,
                ratio * 100.0
            );
        }
        self.level = level;
        self.last_memory = bytes;
        self.peak_memory = self.peak_memory.max(bytes);

        self.samples.push_back(PerformanceSample {
            memory_bytes: bytes,
            ratio,
            level,
        });
        while self.samples.len() > self.config.sample_history {
            self.samples.pop_front();
        }

        MemoryReading {
            bytes,
            ratio,
            level,
            entered_cleanup,
            entered_critical,
        }
    }

    /// Records a stage duration. Returns true when the stage exceeded the
    /// configured maximum.
    pub fn record_stage(&mut self, stage: &str, duration: Duration) -> bool {
        let over_budget = duration > self.config.max_stage_duration;
        if over_budget {
            log::warn!(
                "stage '{stage}' took {:?}, over the {:?} budget",
                duration,
                self.config.max_stage_duration
            );
        }
        self.stages.push(StageTiming {
            stage: stage.to_string(),
            duration,
            over_budget,
        });
        over_budget
    }

    /// Records bytes released by a reclamation pass.
    pub fn record_reclaimed(&mut self, bytes: usize) {
        self.reclaimed_bytes += bytes;
        log::info!("reclaimed {bytes} bytes under memory pressure");
    }

    pub fn reclaimed_bytes(&self) -> usize {
        self.reclaimed_bytes
    }

    pub fn level(&self) -> MemoryLevel {
        self.level
    }

    pub fn run_elapsed(&self) -> Duration {
        self.run_started.map(|t| t.elapsed()).unwrap_or_default()
    }

    pub fn stage_timings(&self) -> &[StageTiming] {
        &self.stages
    }

    pub fn history(&self) -> impl Iterator<Item = &PerformanceSample> {
        self.samples.iter()
    }

    /// Memory summary for the finished run.
    pub fn usage_summary(&self) -> MemoryUsageSummary {
        MemoryUsageSummary {
            start: self.start_memory,
            peak: self.peak_memory,
            end: self.last_memory,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ScriptedProbe {
        readings: std::vec::IntoIter<usize>,
        last: usize,
    }

    impl ScriptedProbe {
        fn new(readings: Vec<usize>) -> Self {
            Self {
                readings: readings.into_iter(),
                last: 0,
            }
        }
    }

    impl MemoryProbe for ScriptedProbe {
        fn sample(&mut self) -> Option<usize> {
            if let Some(next) = self.readings.next() {
                self.last = next;
            }
            Some(self.last)
        }
    }

    fn monitor(readings: Vec<usize>) -> PerformanceMonitor {
        PerformanceMonitor::new(
            Box::new(ScriptedProbe::new(readings)),
            MonitorConfig {
                memory_budget: 100,
                ..Default::default()
            },
        )
    }

    #[test]
    fn levels_follow_the_thresholds() {
        let mut m = monitor(vec![10, 50, 72, 81, 86]);
        m.start_run();
        assert_eq!(m.sample().level, MemoryLevel::Normal);
        assert_eq!(m.sample().level, MemoryLevel::Warning);
        assert_eq!(m.sample().level, MemoryLevel::Cleanup);
        assert_eq!(m.sample().level, MemoryLevel::Critical);
    }

    #[test]
    fn critical_is_signalled_exactly_once_per_run() {
        let mut m = monitor(vec![10, 50, 90, 95, 99]);
        m.start_run();
        assert!(!m.sample().entered_critical);
        assert!(m.sample().entered_critical);
        assert!(!m.sample().entered_critical);
        assert!(!m.sample().entered_critical);

        // A new run may signal again.
        m.start_run();
        assert!(m.sample().entered_critical);
    }

    #[test]
    fn cleanup_entry_is_flagged_and_recovery_is_allowed() {
        let mut m = monitor(vec![10, 50, 82, 83, 40]);
        m.start_run();
        assert!(!m.sample().entered_cleanup);
        let reading = m.sample();
        assert!(reading.entered_cleanup);
        assert!(!m.sample().entered_cleanup, "already in cleanup");
        let recovered = m.sample();
        assert_eq!(recovered.level, MemoryLevel::Normal);
    }

    #[test]
    fn sample_history_is_bounded() {
        let mut m = PerformanceMonitor::new(
            Box::new(ScriptedProbe::new((0..200).collect())),
            MonitorConfig {
                memory_budget: 1000,
                sample_history: 8,
                ..Default::default()
            },
        );
        m.start_run();
        for _ in 0..100 {
            m.sample();
        }
        assert_eq!(m.history().count(), 8);
    }

    #[test]
    fn slow_stages_are_flagged_but_not_fatal() {
        let mut m = PerformanceMonitor::new(
            Box::new(ScriptedProbe::new(vec![10])),
            MonitorConfig {
                max_stage_duration: Duration::from_millis(10),
                ..Default::default()
            },
        );
        m.start_run();
        assert!(!m.record_stage("layout", Duration::from_millis(5)));
        assert!(m.record_stage("render", Duration::from_millis(50)));
        assert_eq!(m.stage_timings().len(), 2);
        assert!(m.stage_timings()[1].over_budget);
    }

    #[test]
    fn usage_summary_tracks_start_peak_end() {
        let mut m = monitor(vec![20, 60, 90, 30]);
        m.start_run();
        m.sample();
        m.sample();
        m.sample();
        let summary = m.usage_summary();
        assert_eq!(summary.start, 20);
        assert_eq!(summary.peak, 90);
        assert_eq!(summary.end, 30);
    }
}
