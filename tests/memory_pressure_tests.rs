mod common;

use common::fixtures::{basic_invoice, long_invoice};
use facture::pipeline::builder::UniformFontMeasurer;
use facture::pipeline::{MemoryProbe, MonitorConfig};
use facture::GeneratorBuilder;
use std::sync::Arc;
use std::time::Duration;

/// Reports `low` for the first `low_samples` readings, then `high`.
struct StepProbe {
    low: usize,
    high: usize,
    low_samples: usize,
    taken: usize,
}

impl MemoryProbe for StepProbe {
    fn sample(&mut self) -> Option<usize> {
        self.taken += 1;
        if self.taken <= self.low_samples {
            Some(self.low)
        } else {
            Some(self.high)
        }
    }
}

fn pressured_generator(low_samples: usize, high: usize) -> facture::DocumentGenerator {
    common::init_test_logging();
    GeneratorBuilder::new()
        .with_font_measurer(Arc::new(UniformFontMeasurer))
        .with_memory_probe(Box::new(StepProbe {
            low: 100,
            high,
            low_samples,
            taken: 0,
        }))
        .with_monitor_config(MonitorConfig {
            memory_budget: 1000,
            max_stage_duration: Duration::from_secs(5),
            sample_history: 64,
        })
        .build()
}

#[test]
fn cleanup_pressure_drops_the_render_cache() {
    // One full run takes five probe readings (start plus four stage
    // boundaries), so the second run sees cleanup-level pressure.
    let mut generator = pressured_generator(5, 820);

    let first = generator.generate(&basic_invoice()).unwrap();
    assert!(!first.cache_hit);
    assert_eq!(generator.cache_stats().entry_count, 1);

    let second = generator.generate(&long_invoice(5)).unwrap();
    assert!(!second.cache_hit);
    // Pressure relief cleared the earlier entry.
    let third = generator.generate(&basic_invoice()).unwrap();
    assert!(!third.cache_hit);
}

#[test]
fn critical_pressure_surfaces_as_a_warning_not_a_failure() {
    let mut generator = pressured_generator(0, 900);
    let output = generator.generate(&basic_invoice()).unwrap();

    assert!(output
        .report
        .warnings
        .iter()
        .any(|w| w.contains("memory critically high")));
    assert!(output
        .report
        .errors
        .iter()
        .any(|e| e.kind == facture::ErrorKind::Memory && !e.is_fatal()));
    assert!(output.bytes.starts_with(b"%PDF"));
}

#[test]
fn unpressured_runs_carry_no_memory_warnings() {
    let mut generator = pressured_generator(usize::MAX, 900);
    let output = generator.generate(&basic_invoice()).unwrap();
    assert!(output.report.warnings.is_empty());
    assert!(output.report.errors.is_empty());
    let summary = output.report.memory;
    assert_eq!(summary.start, 100);
    assert_eq!(summary.peak, 100);
}
