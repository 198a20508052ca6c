use serde::{Deserialize, Serialize};

/// Measurements taken while compiling one expression
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileStats {
    pub filter_count: usize,
    /// Deepest the name stack got
    pub peak_name_depth: usize,
    pub parse_micros: i64,
    pub compile_micros: i64,
}

impl CompileStats {
    pub fn total_micros(&self) -> i64 {
        self.parse_micros + self.compile_micros
    }
}

/// Totals over many compiles
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineStats {
    pub expressions_compiled: usize,
    pub expressions_failed: usize,
    pub total_filters: usize,
    pub total_micros: i64,
}

impl PipelineStats {
    pub fn record(&mut self, stats: &CompileStats) {
        self.expressions_compiled += 1;
        self.total_filters += stats.filter_count;
        self.total_micros += stats.total_micros();
    }

    pub fn record_failure(&mut self) {
        self.expressions_failed += 1;
    }

    pub fn success_rate(&self) -> f64 {
        let total = self.expressions_compiled + self.expressions_failed;
        if total == 0 {
            0.0
        } else {
            self.expressions_compiled as f64 / total as f64
        }
    }

    pub fn average_filters(&self) -> f64 {
        if self.expressions_compiled == 0 {
            0.0
        } else {
            self.total_filters as f64 / self.expressions_compiled as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rates_handle_empty_totals() {
        let stats = PipelineStats::default();
        assert_eq!(stats.success_rate(), 0.0);
        assert_eq!(stats.average_filters(), 0.0);
    }

    #[test]
    fn totals_accumulate() {
        let mut totals = PipelineStats::default();
        totals.record(&CompileStats {
            filter_count: 3,
            peak_name_depth: 2,
            parse_micros: 10,
            compile_micros: 5,
        });
        totals.record(&CompileStats {
            filter_count: 1,
            ..CompileStats::default()
        });
        totals.record_failure();
        assert_eq!(totals.total_filters, 4);
        assert_eq!(totals.total_micros, 15);
        assert_eq!(totals.average_filters(), 2.0);
        assert!((totals.success_rate() - 2.0 / 3.0).abs() < 1e-9);
    }
}
