//! Per-source trajectory classification and the overall trend roll-up.

use crate::domain::{
    CanonicalSourceRecord, Direction, Domain, RiskLevel, SourceSet, TrendLabel, TrendMap,
};

/// Classify every source and roll the four labels into an overall trend.
pub fn analyze_trends(sources: &SourceSet) -> TrendMap {
    let conflict = conflict_trend(&sources.conflict);
    let economic = economic_trend(&sources.economic);
    let climate = climate_trend(&sources.climate);
    let news = news_trend(&sources.news);
    TrendMap {
        conflict,
        economic,
        climate,
        news,
        overall: overall_trend(&[conflict, economic, climate, news]),
    }
}

/// Two or more worsening domains deteriorate the region; two or more
/// improving ones improve it. Worsening is checked first.
pub fn overall_trend(labels: &[TrendLabel]) -> TrendLabel {
    let worsening = labels.iter().filter(|l| l.is_worsening()).count();
    let improving = labels.iter().filter(|l| l.is_improving()).count();
    if worsening >= 2 {
        TrendLabel::Deteriorating
    } else if improving >= 2 {
        TrendLabel::Improving
    } else {
        TrendLabel::Stable
    }
}

/// Label for a single domain.
pub fn domain_trend(record: &CanonicalSourceRecord) -> TrendLabel {
    match record.domain {
        Domain::Conflict => conflict_trend(record),
        Domain::Economic => economic_trend(record),
        Domain::Climate => climate_trend(record),
        Domain::News => news_trend(record),
    }
}

fn conflict_trend(record: &CanonicalSourceRecord) -> TrendLabel {
    match record.conflict_detail() {
        None => TrendLabel::Unknown,
        Some(d) if d.increasing => TrendLabel::Increasing,
        Some(d) if d.decreasing => TrendLabel::Decreasing,
        Some(_) => TrendLabel::Stable,
    }
}

// A falling economic indicator is a worsening outcome.
fn economic_trend(record: &CanonicalSourceRecord) -> TrendLabel {
    let Some(detail) = record.economic_detail() else {
        return TrendLabel::Unknown;
    };
    let mut trends = detail.indicators.iter().filter_map(|i| i.trend);
    if trends.clone().any(|t| t == Direction::Decreasing) {
        return TrendLabel::Worsening;
    }
    let improving_stability = detail.stability.as_deref() == Some("improving");
    if improving_stability && trends.all(|t| t == Direction::Increasing) {
        TrendLabel::Improving
    } else {
        TrendLabel::Stable
    }
}

fn climate_trend(record: &CanonicalSourceRecord) -> TrendLabel {
    let Some(detail) = record.climate_detail() else {
        return TrendLabel::Unknown;
    };
    match detail.trend {
        Some(Direction::Increasing) => TrendLabel::Worsening,
        Some(Direction::Decreasing) => TrendLabel::Improving,
        Some(Direction::Stable) => TrendLabel::Stable,
        None if detail.has_hazard_at(RiskLevel::Critical) => TrendLabel::Worsening,
        None => TrendLabel::Stable,
    }
}

fn news_trend(record: &CanonicalSourceRecord) -> TrendLabel {
    match record.news_detail().map(|d| d.coverage) {
        None => TrendLabel::Unknown,
        Some(Some(Direction::Increasing)) => TrendLabel::Increasing,
        Some(Some(Direction::Decreasing)) => TrendLabel::Decreasing,
        Some(_) => TrendLabel::Stable,
    }
}
