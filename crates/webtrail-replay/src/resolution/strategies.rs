//! The individual resolution strategies.
//!
//! Text, position and visual matching are pure functions over a
//! [`PageSnapshot`]; the selector strategy scores what the driver returned
//! for the recorded backup selector.

use std::cmp::Ordering;

use webtrail_protocols::{Candidate, ElementSnapshot, Point, ResolutionMethod, Viewport};

use super::criteria::SearchCriteria;
use super::snapshot::PageSnapshot;
use crate::similarity::text_similarity;

/// Weights of the three visual signals. They sum to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualWeights {
    pub position: f64,
    pub text: f64,
    pub structure: f64,
}

pub const VISUAL_WEIGHTS: VisualWeights = VisualWeights {
    position: 0.45,
    text: 0.35,
    structure: 0.20,
};

/// Score for a signal the recording did not capture.
const NEUTRAL: f64 = 0.5;

const SELECTOR_UNIQUE: f64 = 1.0;
const SELECTOR_NEAREST: f64 = 0.75;
const SELECTOR_AMBIGUOUS: f64 = 0.5;

/// Offset of an element from the recorded point, in viewport percent.
///
/// Zero when the element's box contains the recorded point; otherwise the
/// per-axis offset of the element's center.
fn offset(element: &ElementSnapshot, recorded: Point, viewport: &Viewport) -> (f64, f64) {
    let absolute = viewport.to_absolute(recorded);
    if element.rect.contains(absolute.x, absolute.y) {
        return (0.0, 0.0);
    }
    let center = viewport.to_relative(element.rect.center());
    ((center.x - recorded.x).abs(), (center.y - recorded.y).abs())
}

fn distance(element: &ElementSnapshot, recorded: Point, viewport: &Viewport) -> f64 {
    let (dx, dy) = offset(element, recorded, viewport);
    dx.hypot(dy)
}

fn by_distance_then_area(a: (f64, f64), b: (f64, f64)) -> Ordering {
    a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1))
}

/// Elements within `tolerance` percent of `recorded` on both axes, nearest
/// first; equally near elements are ordered smallest first.
pub fn position_matches<'a>(
    elements: &'a [ElementSnapshot],
    viewport: &Viewport,
    recorded: Point,
    tolerance: f64,
) -> Vec<(&'a ElementSnapshot, f64)> {
    if !viewport.is_usable() || !recorded.is_finite() {
        return Vec::new();
    }
    let mut matches: Vec<(&ElementSnapshot, f64)> = elements
        .iter()
        .filter_map(|element| {
            let (dx, dy) = offset(element, recorded, viewport);
            (dx <= tolerance && dy <= tolerance).then(|| (element, dx.hypot(dy)))
        })
        .collect();
    matches.sort_by(|a, b| by_distance_then_area((a.1, a.0.rect.area()), (b.1, b.0.rect.area())));
    matches
}

/// Nearest element inside the tolerance box.
///
/// Confidence falls linearly from 1.0 at the recorded point to 0.5 at the
/// tolerance edge.
pub fn position_candidate(page: &PageSnapshot, criteria: &SearchCriteria) -> Option<Candidate> {
    let recorded = criteria.relative_position?;
    let tolerance = criteria.thresholds.tolerance;
    let (element, d) = position_matches(&page.elements, &page.viewport, recorded, tolerance)
        .into_iter()
        .next()?;
    let confidence = if tolerance > 0.0 {
        1.0 - 0.5 * (d / tolerance)
    } else {
        1.0
    };
    Some(Candidate::new(element.clone(), confidence, ResolutionMethod::Position))
}

fn text_score(element: &ElementSnapshot, wanted: &str) -> f64 {
    let attrs = &element.attributes;
    [Some(element.text.as_str()), attrs.placeholder.as_deref(), attrs.aria_label.as_deref()]
        .into_iter()
        .flatten()
        .map(|text| text_similarity(wanted, text))
        .fold(0.0, f64::max)
}

/// Element whose text, placeholder or accessible label best matches the
/// recorded text. Ties go to the element nearer the recorded point, then the
/// smaller one.
pub fn text_candidate(page: &PageSnapshot, criteria: &SearchCriteria) -> Option<Candidate> {
    let wanted = criteria.text.as_deref()?;
    let near = |e: &ElementSnapshot| {
        criteria
            .relative_position
            .map_or(0.0, |p| distance(e, p, &page.viewport))
    };
    let (element, score) = page
        .elements
        .iter()
        .map(|e| (e, text_score(e, wanted)))
        .filter(|(_, score)| *score > 0.0)
        .min_by(|(a, sa), (b, sb)| {
            sb.total_cmp(sa)
                .then_with(|| by_distance_then_area((near(a), a.rect.area()), (near(b), b.rect.area())))
        })?;
    Some(Candidate::new(element.clone(), score, ResolutionMethod::Text))
}

/// Weighted blend of position, text and structural similarity.
pub fn visual_score(element: &ElementSnapshot, criteria: &SearchCriteria, viewport: &Viewport) -> Option<f64> {
    let recorded = criteria.relative_position?;
    let reach = 2.0 * criteria.thresholds.tolerance.max(1.0);
    let position = (1.0 - distance(element, recorded, viewport) / reach).clamp(0.0, 1.0);

    let text = criteria
        .text
        .as_deref()
        .map_or(NEUTRAL, |wanted| text_score(element, wanted));

    let tag = criteria
        .tag
        .as_deref()
        .map_or(NEUTRAL, |tag| if tag.eq_ignore_ascii_case(&element.tag) { 1.0 } else { 0.0 });
    let size = criteria
        .bounding_box
        .map_or(NEUTRAL, |rect| rect.size_similarity(&element.rect));
    let structure = 0.5 * tag + 0.5 * size;

    let w = VISUAL_WEIGHTS;
    let score = w.position * position + w.text * text + w.structure * structure;
    // Six decimals keeps a perfect match at exactly 1.0.
    Some((score * 1e6).round() / 1e6)
}

/// Highest visual score on the page; the earlier element wins ties.
pub fn visual_candidate(page: &PageSnapshot, criteria: &SearchCriteria) -> Option<Candidate> {
    let mut best: Option<(&ElementSnapshot, f64)> = None;
    for element in &page.elements {
        let Some(score) = visual_score(element, criteria, &page.viewport) else {
            return None;
        };
        if best.is_none_or(|(_, top)| score > top) {
            best = Some((element, score));
        }
    }
    best.map(|(element, score)| Candidate::new(element.clone(), score, ResolutionMethod::Visual))
}

/// Scores the elements a backup selector matched.
///
/// A unique match is certain. With several matches the one nearest the
/// recorded box is preferred but discounted; without a recorded box the
/// first match is taken at a lower confidence still.
pub fn selector_candidate(matches: &[ElementSnapshot], criteria: &SearchCriteria) -> Option<Candidate> {
    let usable: Vec<&ElementSnapshot> = matches
        .iter()
        .filter(|e| e.visible && e.rect.has_layout())
        .collect();
    let (element, confidence) = match usable.as_slice() {
        [] => return None,
        [only] => (*only, SELECTOR_UNIQUE),
        [first, ..] => match criteria.bounding_box {
            Some(recorded) => {
                let target = recorded.center();
                let nearest = usable
                    .iter()
                    .min_by(|a, b| {
                        a.rect
                            .center()
                            .distance_to(&target)
                            .total_cmp(&b.rect.center().distance_to(&target))
                    })
                    .copied()
                    .unwrap_or(*first);
                (nearest, SELECTOR_NEAREST)
            }
            None => (*first, SELECTOR_AMBIGUOUS),
        },
    };
    Some(Candidate::new(element.clone(), confidence, ResolutionMethod::Selector))
}
