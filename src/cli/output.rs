//! Output formatting and progress bars for CLI

use indicatif::{ProgressBar, ProgressStyle};

use crate::{Error, Result, metric::MetricReport};

/// Create a progress bar for probe training epochs
pub fn create_epoch_progress(total_epochs: u64) -> Result<ProgressBar> {
    let pb = ProgressBar::new(total_epochs);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} epochs ({msg})")
            .map_err(|e| Error::ProgressBarTemplate {
                message: e.to_string(),
            })?
            .progress_chars("=>-"),
    );
    Ok(pb)
}

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:20} {}", format!("{}:", key), value);
}

/// Print one line per actor followed by the batch means.
pub fn print_report(report: &MetricReport) {
    println!(
        "  {:>5} {:>9} {:>8} {:>6} {:>9} {:>8} {:>6}",
        "actor", "l_gop", "gop %", "gop q1", "l_rp", "rp %", "rp q1"
    );
    for a in &report.actors {
        println!(
            "  {:>5} {:>9.4} {:>8.1} {:>6} {:>9.4} {:>8.1} {:>6}",
            a.actor, a.l_gop, a.gop_accuracy, a.gop.q1, a.l_rp, a.rp_accuracy, a.rp.q1
        );
    }

    let s = &report.summary;
    println!();
    print_kv("actors", &s.actors.to_string());
    print_kv(
        "l_gop",
        &format!("{:.4} ± {:.4}", s.l_gop.mean, s.l_gop.std_dev),
    );
    print_kv(
        "gop accuracy",
        &format!("{:.1}% ± {:.1}", s.gop_accuracy.mean, s.gop_accuracy.std_dev),
    );
    print_kv("l_rp", &format!("{:.4} ± {:.4}", s.l_rp.mean, s.l_rp.std_dev));
    print_kv(
        "rp accuracy",
        &format!("{:.1}% ± {:.1}", s.rp_accuracy.mean, s.rp_accuracy.std_dev),
    );
}
