//! Formatted terminal output.
//!
//! Formatting lives here so the numeric code never touches strings.

use crate::app::pipeline::RunOutput;
use crate::domain::{AxisSpec, CalibrationSet, OptimizerConfig, OptimumRecord, RelaxivityParameters};
use crate::report::CalibrationResidual;

/// Header block: axes and calibration summary.
pub fn format_run_header(config: &OptimizerConfig) -> String {
    let mut out = String::new();

    out.push_str("=== sec - spin-echo contrast optimizer ===\n");
    out.push_str(&format!("TE: {}\n", fmt_axis(&config.echo_time)));
    out.push_str(&format!("TR: {}\n", fmt_axis(&config.repetition_time)));
    out.push_str(&format!("c : {}\n", fmt_axis(&config.concentration)));
    out.push_str(&format!("Calibration: n={}\n", config.calibration.len()));
    out
}

/// Fitted relaxivity per channel.
pub fn format_fit_summary(params: &RelaxivityParameters) -> String {
    let mut out = String::new();
    out.push_str("Relaxivity fit (rate = r0 + c * ri):\n");
    for fit in [&params.t1, &params.t2] {
        out.push_str(&format!(
            "- {}: r0={:.6e} /ms ri={:.6e} /(ms*mM) | t0={:.3} ms ti={:.3} ms*mM | RSS={:.3e} (n={})\n",
            fit.channel,
            fit.r0,
            fit.ri,
            fit.t0(),
            fit.ti(),
            fit.rss,
            fit.n_samples
        ));
    }
    out
}

/// Per-sample observed/fitted table for the calibration data.
pub fn format_calibration_table(calibration: &CalibrationSet, residuals: &[CalibrationResidual]) -> String {
    let mut out = String::new();
    out.push_str(&format!("Calibration samples (n={}):\n", calibration.len()));
    out.push_str(format!("{:<4} {:>10} {:>12} {:>12} {:>12}", "ch", "c (mM)", "obs (ms)", "fit (ms)", "resid").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<4} {:-<10} {:-<12} {:-<12} {:-<12}", "", "", "", "", "").trim_end());
    out.push('\n');
    for r in residuals {
        out.push_str(
            format!(
                "{:<4} {:>10.3} {:>12.3} {:>12.3} {:>12.3}",
                r.channel.to_string(),
                r.concentration,
                r.observed,
                r.fitted,
                r.residual
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out
}

/// One row per echo time: best TR, best concentration, optionally the score.
pub fn format_optimum_table(optima: &[OptimumRecord], show_score: bool) -> String {
    let mut out = String::new();

    let mut header = format!("{:>8} {:>10} {:>10}", "TE (ms)", "TR (ms)", "c (mM)");
    let mut rule = format!("{:-<8} {:-<10} {:-<10}", "", "", "");
    if show_score {
        header.push_str(&format!(" {:>14}", "score"));
        rule.push_str(&format!(" {:-<14}", ""));
    }
    out.push_str(header.trim_end());
    out.push('\n');
    out.push_str(rule.trim_end());
    out.push('\n');

    for o in optima {
        let mut line = format!("{:>8.2} {:>10.2} {:>10.3}", o.echo_time, o.repetition_time, o.concentration);
        if show_score {
            line.push_str(&format!(" {:>14.6e}", o.score));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out
}

/// Full `optimize` output.
pub fn format_run(run: &RunOutput, show_score: bool) -> String {
    let mut out = format_run_header(&run.config);
    out.push('\n');
    out.push_str(&format_fit_summary(&run.params));
    out.push('\n');
    out.push_str(&format_optimum_table(&run.optima, show_score));
    out
}

fn fmt_axis(spec: &AxisSpec) -> String {
    let b = spec.bounds();
    format!(
        "[{}, {}] step {} {}",
        b.min(),
        b.max(),
        spec.step(),
        spec.kind().unit()
    )
}
