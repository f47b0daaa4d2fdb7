//! Plain-text panels for the demo: catalog, metrics, predictions, phase log,
//! and the post-unlearning report.

use std::fmt::Write as _;

use qpaudio_core::simulation::{
    EpochRecord, LoadStep, PhasePlan, RetainStatus, UnlearnPhase, UnlearnReport,
};
use qpaudio_core::{ConfidenceDistribution, ModelSession, SpeakerCatalog, SpeakerMetrics, Verdict};
use unicode_width::UnicodeWidthStr;

const BAR_WIDTH: usize = 30;

/// Left-align `s` in a column of `width` terminal cells.
fn pad(s: &str, width: usize) -> String {
    let w = UnicodeWidthStr::width(s);
    if w >= width {
        s.to_string()
    } else {
        format!("{s}{}", " ".repeat(width - w))
    }
}

fn display_name<'a>(catalog: &'a SpeakerCatalog, id: &'a str) -> &'a str {
    catalog
        .get(id)
        .map(|s| s.display_name.as_str())
        .unwrap_or(id)
}

/// Horizontal bar filled to `percent` of `width` cells.
pub fn bar(percent: f64, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

fn signed(value: f64) -> String {
    if value >= 0.0 {
        format!("+{value:.2}")
    } else {
        format!("{value:.2}")
    }
}

pub fn speakers_table(catalog: &SpeakerCatalog) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {} {} {} {}",
        pad("ID", 10),
        pad("Speaker", 26),
        pad("Samples", 8),
        pad("Duration", 10),
        "Avg clip"
    );
    for s in catalog.iter() {
        let _ = writeln!(
            out,
            "{} {} {} {} {}",
            pad(&s.id, 10),
            pad(&format!("[{}] {}", s.initials(), s.display_name), 26),
            pad(&s.sample_count.to_string(), 8),
            pad(&s.total_duration, 10),
            s.avg_clip_duration
        );
    }
    out
}

pub fn load_step_line(step: &LoadStep) -> String {
    format!("  ✓ {} [{:>3}%]", pad(step.message, 44), step.percent)
}

pub fn model_panel(model: &ModelSession, catalog: &SpeakerCatalog) -> String {
    let mut out = String::new();
    let s = &model.summary;
    let _ = writeln!(
        out,
        "Model Accuracy {:.2}%  |  Parameters {}  |  Speakers Identified {}  |  Architecture {}",
        model.average_accuracy(),
        s.parameters,
        s.class_count,
        s.architecture
    );
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{} {} {} {} {} {} {}",
        pad("Speaker", 26),
        pad("Samples", 8),
        pad("Duration", 10),
        pad("Accuracy", 9),
        pad("Precision", 10),
        pad("Recall", 8),
        "F1"
    );
    for m in model.metrics.iter() {
        let speaker = catalog.get(&m.speaker_id);
        let _ = writeln!(
            out,
            "{} {} {} {} {} {} {:.1}%",
            pad(display_name(catalog, &m.speaker_id), 26),
            pad(
                &speaker.map(|s| s.sample_count.to_string()).unwrap_or_default(),
                8
            ),
            pad(
                speaker.map(|s| s.total_duration.as_str()).unwrap_or_default(),
                10
            ),
            pad(&format!("{:.2}%", m.accuracy), 9),
            pad(&format!("{:.1}%", m.precision), 10),
            pad(&format!("{:.1}%", m.recall), 8),
            m.f1_score
        );
    }
    out
}

/// Stats card shown when a speaker is selected for unlearning.
pub fn speaker_stats(
    catalog: &SpeakerCatalog,
    metrics: &SpeakerMetrics,
    spectrogram: &str,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", display_name(catalog, &metrics.speaker_id));
    if let Some(s) = catalog.get(&metrics.speaker_id) {
        let _ = writeln!(
            out,
            "  Training samples {}  |  Total duration {}  |  Avg clip {}",
            s.sample_count, s.total_duration, s.avg_clip_duration
        );
    }
    let _ = writeln!(
        out,
        "  Accuracy {:.2}%  |  Precision {:.1}%  |  Recall {:.1}%  |  F1 {:.1}%  |  Spectrogram {}",
        metrics.accuracy, metrics.precision, metrics.recall, metrics.f1_score, spectrogram
    );
    out
}

pub fn prediction_panel(dist: &ConfidenceDistribution, catalog: &SpeakerCatalog) -> String {
    let mut out = String::new();
    for entry in &dist.entries {
        let marker = match (entry.is_true, entry.predicted) {
            (true, _) => "  true",
            (false, true) => "  predicted",
            (false, false) => "",
        };
        let _ = writeln!(
            out,
            "  {} {} {:>5.1}%{}",
            pad(display_name(catalog, &entry.speaker_id), 26),
            bar(entry.confidence, BAR_WIDTH),
            entry.confidence,
            marker
        );
    }
    let verdict = match dist.verdict() {
        Verdict::Correct { speaker } => format!(
            "  ✓ Model correctly identifies: {}",
            display_name(catalog, &speaker)
        ),
        Verdict::Misclassified { truth, predicted } => format!(
            "  ✗ Misclassified: True {} → Predicted {}",
            display_name(catalog, &truth),
            display_name(catalog, &predicted)
        ),
    };
    let _ = writeln!(out, "{verdict}");
    out
}

pub fn phase_line(phase: UnlearnPhase, status: &str) -> String {
    format!("{} {}", pad(&phase.to_string(), 42), status)
}

pub fn epoch_line(record: &EpochRecord) -> String {
    format!(
        "    [Unlearn Epoch {}/{}]  q_loss: {:.4}  |  forget_acc: {:.2}%↓  |  retain_acc: {:.2}%  |  {:.1}s",
        record.epoch,
        record.total_epochs,
        record.q_loss,
        record.forget_accuracy,
        record.retain_accuracy,
        record.reported_secs
    )
}

pub fn completion_line(plan: &PhasePlan) -> String {
    format!("Completed in {:.1} s", plan.total_duration().as_secs_f64())
}

pub fn report_panel(report: &UnlearnReport, catalog: &SpeakerCatalog) -> String {
    let target = display_name(catalog, &report.target);
    let wrong = display_name(catalog, &report.misclass_target);
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Unlearning successful. The model now misclassifies {target}'s audio; \
         performance on all retained speakers remains intact."
    );
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Before unlearning: {target} → predicted {target} ({:.1}%)  CORRECT IDENTIFICATION",
        report.comparison.pre_confidence
    );
    let _ = writeln!(
        out,
        "After unlearning:  {target} → predicted {wrong} ({:.1}%, distributed)  MISCLASSIFIED, SPEAKER ERASED",
        report.comparison.post_confidence
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "Post-unlearning prediction ({}):", report.target);
    out.push_str(&prediction_panel(&report.post_prediction, catalog));
    let _ = writeln!(out);

    let _ = writeln!(
        out,
        "{} {} {} {} Status",
        pad("Speaker", 26),
        pad("Before", 9),
        pad("After", 9),
        pad("Delta", 8)
    );
    for row in &report.retain_table {
        let status = match row.status {
            RetainStatus::Erased => "ERASED",
            RetainStatus::Retained => "Retained",
        };
        let _ = writeln!(
            out,
            "{} {} {} {} {}",
            pad(display_name(catalog, &row.speaker_id), 26),
            pad(&format!("{:.2}%", row.pre_accuracy), 9),
            pad(&format!("{:.2}%", row.post_accuracy), 9),
            pad(&format!("{}%", signed(row.delta)), 8),
            status
        );
    }
    let _ = writeln!(out);

    let p = &report.privacy;
    let _ = writeln!(out, "Forget Accuracy (FA) ↓     {:.2}%", p.forget_accuracy);
    let _ = writeln!(out, "Privacy Erasure Rate ↑     {:.2}%", p.erasure_rate);
    let _ = writeln!(out, "Information Leakage ↓      {:.2}%", p.information_leakage);
    let _ = writeln!(out, "Retain Accuracy ↑          {:.2}%", p.retain_accuracy);
    let _ = writeln!(out, "False Accept Rate ↓        {:.2}%", p.false_accept_rate);
    let _ = writeln!(out, "False Reject Rate ↑        {:.2}%", p.false_reject_rate);
    out
}
