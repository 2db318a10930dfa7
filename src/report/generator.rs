//! Markdown and JSON report generation.
//!
//! This module renders a [`Report`] of engagement metrics as Markdown
//! or pretty-printed JSON.

use crate::config::ReportConfig;
use crate::models::{
    AggregateResult, AreaRollup, AreaSummary, HierarchyNode, Report, ReportMetadata,
    TenureBucket,
};
use anyhow::Result;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report, options: &ReportConfig) -> String {
    let mut output = String::new();

    output.push_str("# HRPulse Engagement Report\n\n");

    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_table_of_contents(report, options));
    output.push_str(&generate_overview_section(&report.overall));
    output.push_str(&generate_ranking_section(&report.rollup, options.top_areas));
    output.push_str(&generate_headcount_section(&report.rollup));

    if options.include_hierarchy {
        output.push_str(&generate_hierarchy_section(&report.hierarchy));
    }
    if options.include_tenure {
        output.push_str(&generate_tenure_section(&report.tenure));
    }

    output.push_str(&generate_footer());

    output
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

fn fmt_enps(score: Option<i32>) -> String {
    match score {
        Some(s) if s > 0 => format!("+{}", s),
        Some(s) => s.to_string(),
        None => "N/A".to_string(),
    }
}

fn fmt_score(score: Option<f64>) -> String {
    score
        .map(|s| format!("{:.2}", s))
        .unwrap_or_else(|| "N/A".to_string())
}

fn fmt_pct(pct: Option<f64>) -> String {
    pct.map(|p| format!("{:.1}%", p))
        .unwrap_or_else(|| "-".to_string())
}

fn anchor(title: &str) -> String {
    title.to_lowercase().replace(' ', "-")
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **API:** {}\n", metadata.api_url));
    if let Some(ref company) = metadata.company {
        section.push_str(&format!("- **Company:** `{}`\n", company));
    }
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Scale:** {}\n", metadata.scale));
    section.push_str(&format!("- **Areas Fetched:** {}\n", metadata.areas_fetched));
    section.push_str(&format!(
        "- **Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the table of contents.
fn generate_table_of_contents(report: &Report, options: &ReportConfig) -> String {
    let mut titles = vec!["Metadata", "Company Overview", "Area Ranking", "Headcount by Area"];
    if options.include_hierarchy && !report.hierarchy.is_empty() {
        titles.push("Hierarchy");
    }
    if options.include_tenure && !report.tenure.is_empty() {
        titles.push("Tenure Distribution");
    }

    let mut toc = String::from("## Table of Contents\n\n");
    for title in titles {
        toc.push_str(&format!("- [{}](#{})\n", title, anchor(title)));
    }
    toc.push('\n');

    toc
}

/// Generate the company-wide overview.
fn generate_overview_section(overall: &AggregateResult) -> String {
    let mut section = String::new();

    section.push_str("## Company Overview\n\n");
    section.push_str("| Employees | Responses | eNPS | Band | Avg. Score |\n");
    section.push_str("|:---:|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | **{}** | {} | {} |\n\n",
        overall.total_employees,
        overall.valid_responses(),
        fmt_enps(overall.enps_score),
        overall
            .band()
            .map(|b| format!("{} {}", b.emoji(), b))
            .unwrap_or_else(|| "-".to_string()),
        fmt_score(overall.average_score),
    ));

    section.push_str("| Promoters | Neutrals | Detractors |\n");
    section.push_str("|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} ({}) | {} ({}) | {} ({}) |\n\n",
        overall.promoters,
        fmt_pct(overall.promoter_pct()),
        overall.neutrals,
        fmt_pct(overall.neutral_pct()),
        overall.detractors,
        fmt_pct(overall.detractor_pct()),
    ));

    section
}

/// Areas with an eNPS, highest first; ties keep rollup order.
fn ranked_areas(rollup: &AreaRollup) -> Vec<&AreaSummary> {
    let mut ranked: Vec<&AreaSummary> = rollup
        .areas
        .iter()
        .filter(|a| a.metrics.enps_score.is_some())
        .collect();
    ranked.sort_by_key(|a| std::cmp::Reverse(a.metrics.enps_score));
    ranked
}

/// Generate the eNPS ranking across areas.
fn generate_ranking_section(rollup: &AreaRollup, top: usize) -> String {
    let mut section = String::new();

    section.push_str("## Area Ranking\n\n");

    let ranked = ranked_areas(rollup);
    if ranked.is_empty() {
        section.push_str("No area has any retention responses yet.\n\n");
        return section;
    }

    if let Some(best) = rollup.best_area() {
        section.push_str(&format!(
            "- **Best area:** {} (eNPS {})\n",
            best.label(),
            fmt_enps(best.metrics.enps_score)
        ));
    }
    if let Some(worst) = rollup.worst_area() {
        section.push_str(&format!(
            "- **Worst area:** {} (eNPS {})\n",
            worst.label(),
            fmt_enps(worst.metrics.enps_score)
        ));
    }
    if let Some(mean) = rollup.mean_enps {
        section.push_str(&format!("- **Mean area eNPS:** {:.1}\n", mean));
    }
    section.push('\n');

    section.push_str("| # | Area | eNPS | Promoters | Neutrals | Detractors | Avg. Score |\n");
    section.push_str("|:---:|:---|:---:|:---:|:---:|:---:|:---:|\n");

    for (i, area) in ranked.iter().take(top).enumerate() {
        let m = &area.metrics;
        section.push_str(&format!(
            "| {} | {} | {} {} | {} | {} | {} | {} |\n",
            i + 1,
            area.label(),
            m.band().map(|b| b.emoji()).unwrap_or(""),
            fmt_enps(m.enps_score),
            m.promoters,
            m.neutrals,
            m.detractors,
            fmt_score(m.average_score),
        ));
    }
    section.push('\n');

    section
}

/// Generate the per-area headcount table.
fn generate_headcount_section(rollup: &AreaRollup) -> String {
    let mut section = String::new();

    section.push_str("## Headcount by Area\n\n");

    if rollup.areas.is_empty() {
        section.push_str("No areas were fetched.\n\n");
        return section;
    }

    section.push_str("| Area | Employees | Responses |\n");
    section.push_str("|:---|:---:|:---:|\n");

    let mut areas: Vec<&AreaSummary> = rollup.areas.iter().collect();
    areas.sort_by_key(|a| std::cmp::Reverse(a.metrics.total_employees));

    for area in areas {
        section.push_str(&format!(
            "| {} | {} | {} |\n",
            area.label(),
            area.metrics.total_employees,
            area.metrics.valid_responses()
        ));
    }
    section.push('\n');

    section
}

/// Generate the headcount hierarchy as a nested list.
fn generate_hierarchy_section(hierarchy: &[HierarchyNode]) -> String {
    if hierarchy.is_empty() {
        return String::new();
    }

    let mut section = String::from("## Hierarchy\n\n");
    for node in hierarchy {
        push_node(&mut section, node, 0);
    }
    section.push('\n');

    section
}

fn push_node(out: &mut String, node: &HierarchyNode, depth: usize) {
    out.push_str(&format!(
        "{}- **{}** ({})\n",
        "  ".repeat(depth),
        node.name,
        node.total_employees
    ));
    for child in &node.children {
        push_node(out, child, depth + 1);
    }
}

/// Generate the tenure distribution table.
fn generate_tenure_section(tenure: &[TenureBucket]) -> String {
    if tenure.is_empty() {
        return String::new();
    }

    let mut section = String::from("## Tenure Distribution\n\n");
    section.push_str("| Tenure | Employees | Share |\n");
    section.push_str("|:---|:---:|:---:|\n");
    for bucket in tenure {
        section.push_str(&format!(
            "| {} | {} | {:.2}% |\n",
            bucket.label, bucket.count, bucket.percentage
        ));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Report generated by HRPulse*\n".to_string()
}
