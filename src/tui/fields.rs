//! Editable rows of the settings panel.
//!
//! Each row reads one number out of `Parameters` and produces a *new*
//! `Parameters` when adjusted or typed over; the caller decides whether to keep it.

use crate::domain::{FitSource, JohnsonSuParams, Parameters, SegmentKind, SegmentSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stat {
    Count,
    Mean,
    StdDev,
    Min,
    Max,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManualParam {
    A,
    B,
    Loc,
    Scale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    BinWidth,
    CurrentBenchmark,
    NewBenchmark,
    Segment(SegmentKind, Stat),
    Skewness,
    Kurtosis,
    LargeSampleSize,
    Manual(ManualParam),
}

/// Rows shown for `params`; manual parameters only appear in manual mode.
pub fn visible_fields(params: &Parameters) -> Vec<Field> {
    use Stat::*;

    let mut fields = vec![Field::BinWidth, Field::CurrentBenchmark, Field::NewBenchmark];
    let main = SegmentKind::Main;
    fields.extend([
        Field::Segment(main, Count),
        Field::Segment(main, Mean),
        Field::Segment(main, StdDev),
        Field::Skewness,
        Field::Kurtosis,
        Field::Segment(main, Min),
        Field::Segment(main, Max),
    ]);
    for kind in [SegmentKind::LowTail, SegmentKind::HighTail] {
        fields.extend([Count, Mean, StdDev, Min, Max].map(|stat| Field::Segment(kind, stat)));
    }
    fields.push(Field::LargeSampleSize);
    if matches!(params.fit_source, FitSource::Manual(_)) {
        fields.extend([ManualParam::A, ManualParam::B, ManualParam::Loc, ManualParam::Scale].map(Field::Manual));
    }
    fields
}

impl Field {
    pub fn label(self) -> String {
        match self {
            Field::BinWidth => "Bin width".to_string(),
            Field::CurrentBenchmark => "Current benchmark".to_string(),
            Field::NewBenchmark => "New benchmark".to_string(),
            Field::Segment(kind, stat) => {
                let stat = match stat {
                    Stat::Count => "count",
                    Stat::Mean => "mean",
                    Stat::StdDev => "std dev",
                    Stat::Min => "min",
                    Stat::Max => "max",
                };
                format!("{} {stat}", kind.display_name())
            }
            Field::Skewness => "MainData skewness".to_string(),
            Field::Kurtosis => "MainData kurtosis".to_string(),
            Field::LargeSampleSize => "Large-N sample".to_string(),
            Field::Manual(p) => match p {
                ManualParam::A => "JSU a".to_string(),
                ManualParam::B => "JSU b".to_string(),
                ManualParam::Loc => "JSU loc".to_string(),
                ManualParam::Scale => "JSU scale".to_string(),
            },
        }
    }

    fn is_integer(self) -> bool {
        matches!(self, Field::Segment(_, Stat::Count) | Field::LargeSampleSize)
    }

    fn step(self) -> f64 {
        match self {
            Field::BinWidth => 50.0,
            Field::CurrentBenchmark | Field::NewBenchmark => 50.0,
            Field::Segment(SegmentKind::HighTail, Stat::Count) => 1.0,
            Field::Segment(_, _) => 10.0,
            Field::Skewness => 0.05,
            Field::Kurtosis => 0.1,
            Field::LargeSampleSize => 100_000.0,
            Field::Manual(ManualParam::A | ManualParam::B) => 0.1,
            Field::Manual(ManualParam::Loc | ManualParam::Scale) => 10.0,
        }
    }

    pub fn get(self, params: &Parameters) -> f64 {
        match self {
            Field::BinWidth => params.bin_width,
            Field::CurrentBenchmark => params.benchmarks.current,
            Field::NewBenchmark => params.benchmarks.new,
            Field::Segment(kind, stat) => {
                let seg = params.segment(kind);
                match stat {
                    Stat::Count => seg.count as f64,
                    Stat::Mean => seg.mean,
                    Stat::StdDev => seg.std_dev,
                    Stat::Min => seg.min,
                    Stat::Max => seg.max,
                }
            }
            Field::Skewness => params.main.skewness,
            Field::Kurtosis => params.main.kurtosis,
            Field::LargeSampleSize => params.large_sample_size as f64,
            Field::Manual(p) => {
                let m = manual_params(params);
                match p {
                    ManualParam::A => m.a,
                    ManualParam::B => m.b,
                    ManualParam::Loc => m.loc,
                    ManualParam::Scale => m.scale,
                }
            }
        }
    }

    /// Current value as shown in the panel.
    pub fn display(self, params: &Parameters) -> String {
        let v = self.get(params);
        if self.is_integer() {
            format!("{v:.0}")
        } else {
            format!("{v}")
        }
    }

    /// `params` with this field moved by `steps` increments (counts floor at 0).
    pub fn adjusted(self, params: &Parameters, steps: i32) -> Parameters {
        let next = self.get(params) + self.step() * f64::from(steps);
        let next = if self.is_integer() { next.max(0.0).round() } else { round_step(next) };
        self.with_value(params, next)
    }

    /// `params` with this field replaced by the typed `text`.
    pub fn parsed(self, params: &Parameters, text: &str) -> Result<Parameters, String> {
        let text = text.trim();
        let value = if self.is_integer() {
            text.parse::<usize>()
                .map(|v| v as f64)
                .map_err(|_| format!("{}: expected a whole number, got '{text}'", self.label()))?
        } else {
            text.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| format!("{}: expected a number, got '{text}'", self.label()))?
        };
        Ok(self.with_value(params, value))
    }

    fn with_value(self, params: &Parameters, value: f64) -> Parameters {
        let mut out = *params;
        match self {
            Field::BinWidth => out.bin_width = value,
            Field::CurrentBenchmark => out.benchmarks.current = value,
            Field::NewBenchmark => out.benchmarks.new = value,
            Field::Segment(kind, stat) => {
                let seg: &mut SegmentSpec = match kind {
                    SegmentKind::Main => &mut out.main.segment,
                    SegmentKind::LowTail => &mut out.low_tail,
                    SegmentKind::HighTail => &mut out.high_tail,
                };
                match stat {
                    Stat::Count => seg.count = value as usize,
                    Stat::Mean => seg.mean = value,
                    Stat::StdDev => seg.std_dev = value,
                    Stat::Min => seg.min = value,
                    Stat::Max => seg.max = value,
                }
            }
            Field::Skewness => out.main.skewness = value,
            Field::Kurtosis => out.main.kurtosis = value,
            Field::LargeSampleSize => out.large_sample_size = value as usize,
            Field::Manual(p) => {
                let mut m = manual_params(params);
                match p {
                    ManualParam::A => m.a = value,
                    ManualParam::B => m.b = value,
                    ManualParam::Loc => m.loc = value,
                    ManualParam::Scale => m.scale = value,
                }
                out.fit_source = FitSource::Manual(m);
            }
        }
        out
    }
}

fn manual_params(params: &Parameters) -> JohnsonSuParams {
    match params.fit_source {
        FitSource::Manual(p) => p,
        FitSource::Moments => JohnsonSuParams::MANUAL_DEFAULT,
    }
}

/// Trim float noise from repeated `+= 0.05` style steps.
fn round_step(v: f64) -> f64 {
    (v * 1e6).round() / 1e6
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_rows_only_in_manual_mode() {
        let mut params = Parameters::default();
        let fields = visible_fields(&params);
        assert_eq!(fields.len(), 21);
        assert!(!fields.iter().any(|f| matches!(f, Field::Manual(_))));

        params.fit_source = FitSource::Manual(JohnsonSuParams::MANUAL_DEFAULT);
        assert_eq!(visible_fields(&params).len(), 25);
    }

    #[test]
    fn counts_do_not_go_negative() {
        let mut params = Parameters::default();
        params.high_tail.count = 0;
        let field = Field::Segment(SegmentKind::HighTail, Stat::Count);
        assert_eq!(field.adjusted(&params, -1).high_tail.count, 0);
        assert_eq!(field.adjusted(&params, 3).high_tail.count, 3);
    }

    #[test]
    fn float_steps_stay_tidy() {
        let params = Parameters::default();
        let next = Field::Skewness.adjusted(&params, 1);
        assert_eq!(next.main.skewness, 2.01);
        let back = Field::Skewness.adjusted(&next, -1);
        assert_eq!(back.main.skewness, 1.96);
    }

    #[test]
    fn typed_values_are_parsed_per_field() {
        let params = Parameters::default();
        let next = Field::Segment(SegmentKind::LowTail, Stat::Max).parsed(&params, " 400 ").unwrap();
        assert_eq!(next.low_tail.max, 400.0);

        assert!(Field::Segment(SegmentKind::Main, Stat::Count).parsed(&params, "4.5").is_err());
        assert!(Field::BinWidth.parsed(&params, "abc").is_err());
        assert!(Field::BinWidth.parsed(&params, "inf").is_err());

        let next = Field::Manual(ManualParam::Scale).parsed(&params, "900").unwrap();
        match next.fit_source {
            FitSource::Manual(m) => {
                assert_eq!(m.scale, 900.0);
                assert_eq!(m.a, JohnsonSuParams::MANUAL_DEFAULT.a);
            }
            FitSource::Moments => panic!("expected manual source"),
        }
    }
}
