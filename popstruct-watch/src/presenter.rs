//! Result presentation
//!
//! Turns a [`ResultPreview`] into display-ready metric cards and plot tabs.
//! Metrics and plots are handled independently; a preview carrying only one
//! of them still renders, and an empty preview becomes an explicit empty view
//! pointing at the archive download.

use popstruct_core::domain::result::{PreviewContent, ResultPreview};
use serde_json::Value;
use std::collections::HashSet;

/// Text of the empty view
pub const EMPTY_MESSAGE: &str = "No results available yet.";

/// Hint pointing at the full archive
pub const DOWNLOAD_HINT: &str = "Download the full results package to access all output files.";

const PLOTS_UNAVAILABLE: &str =
    "Plots are not available in the preview. Download the full results package for all plots.";

/// One headline number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricCard {
    pub label: String,
    pub value: String,
}

impl MetricCard {
    fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// One plot, shown as a tab
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlotTab {
    /// Position in the preview's plot list
    pub index: usize,
    pub title: String,
    /// Name used when the image is saved
    pub file_name: String,
    pub media_type: String,
}

/// Renderable result summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultView {
    Ready {
        cards: Vec<MetricCard>,
        tabs: Vec<PlotTab>,
        /// Shown when part of the preview is missing
        notice: Option<String>,
    },
    Empty {
        message: String,
        hint: String,
    },
}

impl ResultView {
    pub fn from_preview(preview: &ResultPreview) -> Self {
        let cards = metric_cards(preview);
        let tabs = plot_tabs(preview);

        // Metrics that are all non-scalar leave nothing to show
        if cards.is_empty() && tabs.is_empty() {
            return ResultView::Empty {
                message: preview
                    .message
                    .clone()
                    .unwrap_or_else(|| EMPTY_MESSAGE.to_string()),
                hint: DOWNLOAD_HINT.to_string(),
            };
        }

        let notice = match preview.content() {
            PreviewContent::MetricsOnly => Some(
                preview
                    .message
                    .clone()
                    .unwrap_or_else(|| PLOTS_UNAVAILABLE.to_string()),
            ),
            _ => None,
        };

        ResultView::Ready {
            cards,
            tabs,
            notice,
        }
    }

    /// View for a completed job whose preview could not be loaded
    pub fn unavailable(message: impl Into<String>) -> Self {
        ResultView::Empty {
            message: message.into(),
            hint: DOWNLOAD_HINT.to_string(),
        }
    }

    pub fn cards(&self) -> &[MetricCard] {
        match self {
            ResultView::Ready { cards, .. } => cards,
            ResultView::Empty { .. } => &[],
        }
    }

    pub fn tabs(&self) -> &[PlotTab] {
        match self {
            ResultView::Ready { tabs, .. } => tabs,
            ResultView::Empty { .. } => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ResultView::Empty { .. })
    }
}

fn metric_cards(preview: &ResultPreview) -> Vec<MetricCard> {
    let mut cards = Vec::new();
    let mut shown: HashSet<&str> = HashSet::new();

    if let Some(samples) = preview.sample_count() {
        cards.push(MetricCard::new("Samples Analyzed", group_thousands(samples)));
        shown.insert("n_samples");
    }

    if let Some(variants) = preview.variant_count() {
        cards.push(MetricCard::new("Genetic Variants", group_thousands(variants)));
        shown.insert("n_variants");
    }

    if let Some(ratios) = preview.variance_explained() {
        let top_two: f64 = ratios.iter().take(2).sum();
        cards.push(MetricCard::new(
            "Variance Explained (PC1+PC2)",
            format!("{:.1}%", top_two * 100.0),
        ));
        shown.insert("variance_explained");
    }

    if let Some(clusters) = preview.cluster_count() {
        cards.push(MetricCard::new("Clusters", clusters.to_string()));
        shown.insert("n_clusters");
    }

    if let Some(score) = preview.silhouette_score() {
        cards.push(MetricCard::new("Silhouette Score", format!("{:.3}", score)));
        shown.insert("silhouette_score");
    }

    for (key, value) in &preview.metrics {
        if shown.contains(key.as_str()) {
            continue;
        }
        if let Some(formatted) = format_scalar(value) {
            cards.push(MetricCard::new(humanize(key), formatted));
        }
    }

    cards
}

fn plot_tabs(preview: &ResultPreview) -> Vec<PlotTab> {
    preview
        .plots
        .iter()
        .enumerate()
        .map(|(index, plot)| PlotTab {
            index,
            title: plot.name.clone(),
            file_name: plot
                .filename
                .clone()
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| format!("{}.png", slug(&plot.name, index))),
            media_type: plot.media_type().to_string(),
        })
        .collect()
}

/// Formats a scalar metric; arrays, objects and nulls yield `None`
fn format_scalar(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                Some(group_thousands(u))
            } else if let Some(i) = n.as_i64() {
                Some(format!("-{}", group_thousands(i.unsigned_abs())))
            } else {
                n.as_f64().map(format_float)
            }
        }
        Value::Bool(b) => Some(if *b { "Yes" } else { "No" }.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn format_float(value: f64) -> String {
    let formatted = format!("{:.4}", value);
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// 48213 -> "48,213"
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    grouped
}

/// "mean_kinship" -> "Mean Kinship"
fn humanize(key: &str) -> String {
    key.split(['_', '-', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn slug(name: &str, index: usize) -> String {
    let mut slug = String::new();
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }

    let slug = slug.trim_end_matches('_');
    if slug.is_empty() {
        format!("plot_{}", index + 1)
    } else {
        slug.to_string()
    }
}
